//! Map view model - what a viewer needs to draw the network
//!
//! Built from the static graph plus one state snapshot. Read-only: nothing
//! here feeds back into the simulation.

use serde::Serialize;

use crate::core::types::{LineId, Location, Occupancy, StationId, Tick};
use crate::network::NetworkGraph;
use crate::simulation::StateSnapshot;
use super::colors::{line_color, marker_radius, CongestionLevel};

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub tick: Tick,
    /// Centroid of all stations, for the initial viewport
    pub center: Location,
    pub lines: Vec<LineView>,
    pub stations: Vec<StationMarker>,
    pub connections: Vec<Connection>,
}

/// A line drawn through its stations in route order
#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub line: LineId,
    pub color: &'static str,
    pub path: Vec<Location>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationMarker {
    pub id: StationId,
    pub name: String,
    pub line: LineId,
    pub location: Location,
    pub capacity: u32,
    pub occupancy: Occupancy,
    pub level: CongestionLevel,
    pub fill: &'static str,
    pub border: &'static str,
    pub radius: f64,
}

/// One undirected edge of the graph
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    pub from: StationId,
    pub to: StationId,
    pub color: &'static str,
    pub transfer: bool,
}

impl MapView {
    pub fn build(graph: &NetworkGraph, state: &StateSnapshot) -> Self {
        let stations: Vec<StationMarker> = graph
            .stations()
            .iter()
            .map(|station| {
                let occupancy = state.get(station.id.as_str()).unwrap_or(0);
                let level = CongestionLevel::from_occupancy(occupancy);
                StationMarker {
                    id: station.id.clone(),
                    name: station.name.clone(),
                    line: station.line.clone(),
                    location: station.location,
                    capacity: station.capacity,
                    occupancy,
                    level,
                    fill: level.color(),
                    border: line_color(station.line.as_str()),
                    radius: marker_radius(occupancy),
                }
            })
            .collect();

        let lines = graph
            .lines()
            .filter_map(|line| {
                let order = graph.line_stations(line)?;
                Some(LineView {
                    line: line.clone(),
                    color: line_color(line.as_str()),
                    path: order.iter().map(|&idx| graph.station(idx).location).collect(),
                })
            })
            .collect();

        let connections = graph
            .edges()
            .map(|(a, b)| {
                let (from, to) = (graph.station(a), graph.station(b));
                let transfer = from.line != to.line;
                Connection {
                    from: from.id.clone(),
                    to: to.id.clone(),
                    color: if transfer { "gray" } else { line_color(from.line.as_str()) },
                    transfer,
                }
            })
            .collect();

        Self {
            tick: state.tick,
            center: centroid(graph),
            lines,
            stations,
            connections,
        }
    }
}

fn centroid(graph: &NetworkGraph) -> Location {
    let n = graph.len().max(1) as f64;
    let (sx, sy) = graph
        .stations()
        .iter()
        .fold((0.0, 0.0), |(sx, sy), s| (sx + s.location.x, sy + s.location.y));
    Location::new(sx / n, sy / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::network::{NetworkBuilder, OrderedLine, StationRecord};
    use crate::occupancy::Baseline;
    use crate::simulation::SimulationEngine;

    fn engine() -> SimulationEngine {
        let l1 = OrderedLine::new(
            "1",
            vec![
                StationRecord::new("A", Location::new(0.0, 0.0)),
                StationRecord::new("Hub", Location::new(2.0, 0.0)),
            ],
        );
        let l2 = OrderedLine::new(
            "2",
            vec![
                StationRecord::new("Hub", Location::new(2.0, 0.0)),
                StationRecord::new("C", Location::new(2.0, 4.0)),
            ],
        );
        let config = SimulationConfig::default();
        let graph = NetworkBuilder::new(&config).from_ordered_lines(&[l1, l2]).unwrap();
        SimulationEngine::new(graph, &Baseline::new().with_id("1-a", 4000), &config).unwrap()
    }

    #[test]
    fn test_map_view_markers_follow_state() {
        let engine = engine();
        let view = MapView::build(engine.graph(), &engine.current_state());

        assert_eq!(view.stations.len(), 4);
        let a = view.stations.iter().find(|m| m.id.as_str() == "1-a").unwrap();
        assert_eq!(a.level, CongestionLevel::High);
        assert_eq!(a.fill, "#ff4136");
        assert_eq!(a.border, "#FF1493");
        assert_eq!(a.radius, 25.0);
    }

    #[test]
    fn test_map_view_connections_mark_transfers() {
        let engine = engine();
        let view = MapView::build(engine.graph(), &engine.current_state());

        assert_eq!(view.connections.len(), 3);
        let transfers: Vec<_> = view.connections.iter().filter(|c| c.transfer).collect();
        assert_eq!(transfers.len(), 1);
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[1].path.len(), 2);
        assert_eq!(view.center, Location::new(1.5, 1.0));
    }

    #[test]
    fn test_map_view_serializes_level_lowercase() {
        let engine = engine();
        let json = serde_json::to_value(MapView::build(engine.graph(), &engine.current_state())).unwrap();
        let a = json["stations"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["id"] == "1-a")
            .unwrap();
        assert_eq!(a["level"], "high");
        assert_eq!(a["location"], serde_json::json!([0.0, 0.0]));
        assert_eq!(json["tick"], 0);
    }
}
