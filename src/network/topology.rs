//! Topology input shapes
//!
//! These are what the topology loader produces and what the network builder
//! consumes. Two forms are accepted: lines whose stations are already in route
//! order, and raw line geometries plus an unordered set of named stops.

use serde::{Deserialize, Serialize};

use crate::core::types::{LineId, Location, StationId};

/// One station of an already-ordered line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(default)]
    pub id: Option<StationId>,
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl StationRecord {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            id: None,
            name: name.into(),
            location,
            capacity: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<StationId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// A line with its stations in route order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedLine {
    pub line: LineId,
    pub stations: Vec<StationRecord>,
}

impl OrderedLine {
    pub fn new(line: impl Into<LineId>, stations: Vec<StationRecord>) -> Self {
        Self {
            line: line.into(),
            stations,
        }
    }
}

/// Polyline geometry of one line, possibly split into several parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    pub line: LineId,
    pub geometry: Vec<Vec<Location>>,
}

impl LineGeometry {
    pub fn new(line: impl Into<LineId>, geometry: Vec<Vec<Location>>) -> Self {
        Self {
            line: line.into(),
            geometry,
        }
    }

    /// Single-part geometry
    pub fn single(line: impl Into<LineId>, points: Vec<Location>) -> Self {
        Self::new(line, vec![points])
    }
}

/// A named stop not yet associated with a line position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    #[serde(default)]
    pub id: Option<StationId>,
    pub name: String,
    pub location: Location,
    /// Explicit line; when absent the stop is snapped to the nearest geometry
    #[serde(default)]
    pub line: Option<LineId>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl StopRecord {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            id: None,
            name: name.into(),
            location,
            line: None,
            capacity: None,
        }
    }

    pub fn on_line(mut self, line: impl Into<LineId>) -> Self {
        self.line = Some(line.into());
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// Everything needed to build a `NetworkGraph`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopologySource {
    /// Lines whose geometry must be matched with free-standing stops
    Geometric {
        lines: Vec<LineGeometry>,
        stops: Vec<StopRecord>,
    },
    /// Lines whose stations are listed in route order
    Ordered { lines: Vec<OrderedLine> },
}

impl From<Vec<OrderedLine>> for TopologySource {
    fn from(lines: Vec<OrderedLine>) -> Self {
        Self::Ordered { lines }
    }
}
