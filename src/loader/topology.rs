//! Load topology descriptions from JSON
//!
//! Two layouts are accepted, mirroring `TopologySource`:
//!
//! ```json
//! {"lines": [{"line": "1", "stations": [{"name": "Observatorio", "location": [0, 0]}]}]}
//! ```
//!
//! ```json
//! {"lines": [{"line": "1", "geometry": [[[0, 0], [10, 0]]]}],
//!  "stops": [{"name": "Observatorio", "location": [0, 1]}]}
//! ```

use std::fs;
use std::path::Path;

use crate::core::error::{MetroError, Result};
use crate::network::TopologySource;

/// Parse a topology description
pub fn parse_topology(content: &str) -> Result<TopologySource> {
    let source: TopologySource = serde_json::from_str(content).map_err(|e| {
        MetroError::topology(format!(
            "network description matches neither the ordered nor the geometric layout: {}",
            e
        ))
    })?;
    Ok(source)
}

/// Load a topology description from a file
pub fn load_topology(path: &Path) -> Result<TopologySource> {
    let content = fs::read_to_string(path)?;
    let source = parse_topology(&content)?;

    match &source {
        TopologySource::Ordered { lines } => tracing::info!(
            "Loaded {} ordered lines from {}",
            lines.len(),
            path.display()
        ),
        TopologySource::Geometric { lines, stops } => tracing::info!(
            "Loaded {} line geometries and {} stops from {}",
            lines.len(),
            stops.len(),
            path.display()
        ),
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LineId;

    #[test]
    fn test_parse_ordered_layout() {
        let source = parse_topology(
            r#"{"lines": [{"line": "1", "stations": [
                {"name": "Observatorio", "location": [0, 0]},
                {"name": "Tacubaya", "location": [1, 0], "capacity": 3000, "id": "1-tac"}
            ]}]}"#,
        )
        .unwrap();

        let TopologySource::Ordered { lines } = source else {
            panic!("expected ordered layout");
        };
        assert_eq!(lines[0].line, LineId::from("1"));
        assert_eq!(lines[0].stations.len(), 2);
        assert_eq!(lines[0].stations[1].capacity, Some(3000));
        assert_eq!(lines[0].stations[1].id.as_ref().unwrap().as_str(), "1-tac");
    }

    #[test]
    fn test_parse_geometric_layout() {
        let source = parse_topology(
            r#"{"lines": [{"line": "A", "geometry": [[[0, 0], [10, 0]]]}],
                "stops": [{"name": "Pantitlán", "location": [0, 1]},
                          {"name": "La Paz", "location": [10, 1], "line": "A"}]}"#,
        )
        .unwrap();

        let TopologySource::Geometric { lines, stops } = source else {
            panic!("expected geometric layout");
        };
        assert_eq!(lines[0].geometry[0].len(), 2);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[1].line, Some(LineId::from("A")));
    }

    #[test]
    fn test_malformed_layout_is_topology_error() {
        let result = parse_topology(r#"{"routes": []}"#);
        assert!(matches!(result, Err(MetroError::Topology(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_topology(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(MetroError::IoError(_))));
    }
}
