use thiserror::Error;

use crate::core::types::StationId;

#[derive(Error, Debug)]
pub enum MetroError {
    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Unknown station: {0}")]
    UnknownStation(StationId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl MetroError {
    pub fn topology(msg: impl Into<String>) -> Self {
        Self::Topology(msg.into())
    }

    /// True for errors caused by the caller rather than the engine
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::UnknownStation(_))
    }
}

pub type Result<T> = std::result::Result<T, MetroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_station_is_query_error() {
        let err = MetroError::UnknownStation(StationId::from("1-zocalo"));
        assert!(err.is_query_error());
        assert_eq!(err.to_string(), "Unknown station: 1-zocalo");
    }

    #[test]
    fn test_topology_error_message() {
        let err = MetroError::topology("empty network");
        assert!(!err.is_query_error());
        assert_eq!(err.to_string(), "Topology error: empty network");
    }
}
