//! Color definitions for lines and congestion levels

use serde::{Deserialize, Serialize};

use crate::core::types::Occupancy;

/// Color used for lines missing from the palette
pub const UNKNOWN_LINE: &str = "gray";

/// Get the map color for a line
pub fn line_color(line: &str) -> &'static str {
    match line {
        "1" => "#FF1493", // Pink
        "2" => "#0000FF", // Blue
        "3" => "#808000", // Olive
        "4" => "#00FFFF", // Cyan
        "5" => "#FFD700", // Yellow
        "6" => "#FF0000", // Red
        "7" => "#FFA500", // Orange
        "8" => "#008000", // Green
        "9" => "#8B4513", // Brown
        "A" => "#800080", // Purple
        "B" => "#696969", // Gray-green
        _ => UNKNOWN_LINE,
    }
}

/// Coarse crowding band used to fill station markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Moderate,
    High,
}

impl CongestionLevel {
    /// Bands: below 1500 low, below 3500 moderate, high otherwise
    pub fn from_occupancy(occupancy: Occupancy) -> Self {
        match occupancy {
            0..=1499 => Self::Low,
            1500..=3499 => Self::Moderate,
            _ => Self::High,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#2ecc40",      // Green
            Self::Moderate => "#ffd700", // Yellow
            Self::High => "#ff4136",     // Red
        }
    }
}

/// Marker radius in pixels: occupancy / 100, kept between 8 and 25
pub fn marker_radius(occupancy: Occupancy) -> f64 {
    (occupancy as f64 / 100.0).clamp(8.0, 25.0)
}
