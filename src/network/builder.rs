//! Network construction from a topology source
//!
//! Construction is a pure, one-time pass:
//! 1. Place every stop on a line (explicit line, or snap to nearest geometry)
//! 2. Order stops along their line
//! 3. Assign ids, validate, and link consecutive stations per line
//! 4. Resolve transfers: same name on different lines becomes an edge

use ahash::AHashMap;
use geo::{EuclideanDistance, LineLocatePoint};
use geo_types::{LineString, Point};
use ordered_float::OrderedFloat;

use crate::core::config::SimulationConfig;
use crate::core::error::{MetroError, Result};
use crate::core::types::{LineId, Location, StationId};
use super::graph::NetworkGraph;
use super::station::{derive_station_id, Station};
use super::topology::{LineGeometry, OrderedLine, StopRecord, TopologySource};

/// Builds an immutable `NetworkGraph` from topology input
pub struct NetworkBuilder<'a> {
    config: &'a SimulationConfig,
}

/// A station that has a line and a route position but no index yet
struct PendingStation<'s> {
    id: Option<&'s StationId>,
    name: &'s str,
    location: Location,
    capacity: Option<u32>,
}

struct PendingLine<'s> {
    line: LineId,
    stations: Vec<PendingStation<'s>>,
}

/// Position of a stop projected onto a line: which part, how far along it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct LinePosition {
    part: usize,
    fraction: OrderedFloat<f64>,
}

/// Line geometry converted to geo types
struct LineShape<'g> {
    line: &'g LineId,
    parts: Vec<LineString<f64>>,
}

impl<'g> LineShape<'g> {
    fn new(geometry: &'g LineGeometry) -> Result<Self> {
        if geometry.geometry.is_empty() {
            return Err(MetroError::topology(format!(
                "line {} has an empty geometry",
                geometry.line
            )));
        }

        let mut parts = Vec::with_capacity(geometry.geometry.len());
        for (i, part) in geometry.geometry.iter().enumerate() {
            if part.len() < 2 {
                return Err(MetroError::topology(format!(
                    "line {} geometry part {} needs at least two coordinates",
                    geometry.line, i
                )));
            }
            if let Some(bad) = part.iter().find(|loc| !loc.is_finite()) {
                return Err(MetroError::topology(format!(
                    "line {} geometry has a non-finite coordinate ({}, {})",
                    geometry.line, bad.x, bad.y
                )));
            }
            parts.push(LineString::from(
                part.iter().map(|loc| (loc.x, loc.y)).collect::<Vec<_>>(),
            ));
        }

        Ok(Self {
            line: &geometry.line,
            parts,
        })
    }

    /// Distance from `point` to the closest part, and the position on that part
    fn locate(&self, point: &Point<f64>) -> (f64, LinePosition) {
        let mut best = (f64::INFINITY, LinePosition { part: 0, fraction: OrderedFloat(0.0) });
        for (part, line_string) in self.parts.iter().enumerate() {
            let distance = point.euclidean_distance(line_string);
            if distance < best.0 {
                let fraction = line_string.line_locate_point(point).unwrap_or(0.0);
                best = (
                    distance,
                    LinePosition {
                        part,
                        fraction: OrderedFloat(fraction),
                    },
                );
            }
        }
        best
    }
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Build from either topology form
    pub fn build(&self, source: &TopologySource) -> Result<NetworkGraph> {
        match source {
            TopologySource::Ordered { lines } => self.from_ordered_lines(lines),
            TopologySource::Geometric { lines, stops } => self.from_geometries(lines, stops),
        }
    }

    /// Build from lines whose stations are already in route order
    pub fn from_ordered_lines(&self, lines: &[OrderedLine]) -> Result<NetworkGraph> {
        if lines.is_empty() {
            return Err(MetroError::topology("topology contains no lines"));
        }

        let pending = lines
            .iter()
            .map(|line| {
                if line.stations.is_empty() {
                    return Err(MetroError::topology(format!(
                        "line {} has no stations",
                        line.line
                    )));
                }
                Ok(PendingLine {
                    line: line.line.clone(),
                    stations: line
                        .stations
                        .iter()
                        .map(|record| PendingStation {
                            id: record.id.as_ref(),
                            name: &record.name,
                            location: record.location,
                            capacity: record.capacity,
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.assemble(pending)
    }

    /// Build from line polylines and a flat list of named stops.
    ///
    /// Stops naming a line are placed on that line; the rest are snapped to the
    /// nearest geometry within `snap_tolerance`. Each line's stations are then
    /// ordered by their projected position along the polyline.
    pub fn from_geometries(
        &self,
        lines: &[LineGeometry],
        stops: &[StopRecord],
    ) -> Result<NetworkGraph> {
        if lines.is_empty() || stops.is_empty() {
            return Err(MetroError::topology(format!(
                "topology needs line geometries and stops (got {} lines, {} stops)",
                lines.len(),
                stops.len()
            )));
        }

        let shapes = lines.iter().map(LineShape::new).collect::<Result<Vec<_>>>()?;
        for (i, shape) in shapes.iter().enumerate() {
            if shapes[..i].iter().any(|other| other.line == shape.line) {
                return Err(MetroError::topology(format!(
                    "line {} has more than one geometry record",
                    shape.line
                )));
            }
        }

        let mut placed: Vec<Vec<(LinePosition, &StopRecord)>> = vec![Vec::new(); shapes.len()];
        for stop in stops {
            if !stop.location.is_finite() {
                return Err(MetroError::topology(format!(
                    "stop '{}' has a non-finite location",
                    stop.name
                )));
            }
            let point = stop.location.to_point();

            let (line_idx, position) = match &stop.line {
                Some(line) => {
                    let line_idx = shapes
                        .iter()
                        .position(|shape| shape.line == line)
                        .ok_or_else(|| {
                            MetroError::topology(format!(
                                "stop '{}' references line {} which has no geometry",
                                stop.name, line
                            ))
                        })?;
                    (line_idx, shapes[line_idx].locate(&point).1)
                }
                None => self.snap(&shapes, stop, &point)?,
            };

            placed[line_idx].push((position, stop));
        }

        let mut pending = Vec::with_capacity(shapes.len());
        for (shape, mut line_stops) in shapes.iter().zip(placed) {
            if line_stops.is_empty() {
                tracing::debug!("Line {} has geometry but no stops, skipping", shape.line);
                continue;
            }
            // Stable sort keeps input order for stops at the same position
            line_stops.sort_by_key(|(position, _)| *position);
            pending.push(PendingLine {
                line: shape.line.clone(),
                stations: line_stops
                    .into_iter()
                    .map(|(_, stop)| PendingStation {
                        id: stop.id.as_ref(),
                        name: &stop.name,
                        location: stop.location,
                        capacity: stop.capacity,
                    })
                    .collect(),
            });
        }

        self.assemble(pending)
    }

    /// Nearest line geometry for a stop with no explicit line
    fn snap(
        &self,
        shapes: &[LineShape<'_>],
        stop: &StopRecord,
        point: &Point<f64>,
    ) -> Result<(usize, LinePosition)> {
        let mut best: Option<(usize, f64, LinePosition)> = None;
        for (idx, shape) in shapes.iter().enumerate() {
            let (distance, position) = shape.locate(point);
            if best.map_or(true, |(_, d, _)| distance < d) {
                best = Some((idx, distance, position));
            }
        }

        match best {
            Some((idx, distance, position)) if distance <= self.config.snap_tolerance => {
                Ok((idx, position))
            }
            Some((idx, distance, _)) => Err(MetroError::topology(format!(
                "stop '{}' at ({}, {}) is {:.1} from the nearest line ({}), beyond snap tolerance {}",
                stop.name,
                stop.location.x,
                stop.location.y,
                distance,
                shapes[idx].line,
                self.config.snap_tolerance
            ))),
            None => Err(MetroError::topology(format!(
                "stop '{}' cannot be associated with any line",
                stop.name
            ))),
        }
    }

    fn assemble(&self, pending: Vec<PendingLine<'_>>) -> Result<NetworkGraph> {
        let mut stations: Vec<Station> = Vec::new();
        let mut index: AHashMap<StationId, usize> = AHashMap::new();
        let mut lines: Vec<(LineId, Vec<usize>)> = Vec::with_capacity(pending.len());

        for pending_line in pending {
            if lines.iter().any(|(line, _)| *line == pending_line.line) {
                return Err(MetroError::topology(format!(
                    "line {} is listed more than once",
                    pending_line.line
                )));
            }

            let mut order = Vec::with_capacity(pending_line.stations.len());
            for ps in pending_line.stations {
                if ps.name.trim().is_empty() {
                    return Err(MetroError::topology(format!(
                        "line {} has a station without a name",
                        pending_line.line
                    )));
                }
                if !ps.location.is_finite() {
                    return Err(MetroError::topology(format!(
                        "station '{}' on line {} has a non-finite location",
                        ps.name, pending_line.line
                    )));
                }

                let capacity = ps.capacity.unwrap_or(self.config.default_capacity);
                if capacity == 0 {
                    return Err(MetroError::topology(format!(
                        "station '{}' on line {} has zero capacity",
                        ps.name, pending_line.line
                    )));
                }

                let id = match ps.id {
                    Some(id) => id.clone(),
                    None => derive_station_id(&pending_line.line, ps.name),
                };
                if index.contains_key(&id) {
                    return Err(MetroError::topology(format!("duplicate station id {}", id)));
                }

                let idx = stations.len();
                index.insert(id.clone(), idx);
                stations.push(Station::new(
                    id,
                    ps.name,
                    pending_line.line.clone(),
                    ps.location,
                    capacity,
                ));
                order.push(idx);
            }

            lines.push((pending_line.line, order));
        }

        if stations.is_empty() {
            return Err(MetroError::topology("topology contains no stations"));
        }

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); stations.len()];
        let mut link = |a: usize, b: usize| {
            if a != b {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        };

        for (_, order) in &lines {
            for pair in order.windows(2) {
                link(pair[0], pair[1]);
            }
        }

        let mut by_name: AHashMap<&str, Vec<usize>> = AHashMap::new();
        for (idx, station) in stations.iter().enumerate() {
            by_name.entry(station.name.as_str()).or_default().push(idx);
        }
        let mut transfer_edges = 0usize;
        for group in by_name.values().filter(|group| group.len() > 1) {
            for (i, &a) in group.iter().enumerate() {
                for &b in &group[i + 1..] {
                    if stations[a].line != stations[b].line {
                        link(a, b);
                        transfer_edges += 1;
                    }
                }
            }
        }

        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        tracing::info!(
            "Built network: {} stations on {} lines, {} transfer edges",
            stations.len(),
            lines.len(),
            transfer_edges
        );

        Ok(NetworkGraph::from_parts(stations, index, lines, adjacency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::topology::StationRecord;

    fn loc(x: f64, y: f64) -> Location {
        Location::new(x, y)
    }

    fn ordered(line: &str, names: &[&str]) -> OrderedLine {
        OrderedLine::new(
            line,
            names
                .iter()
                .enumerate()
                .map(|(i, name)| StationRecord::new(*name, loc(i as f64, 0.0)))
                .collect(),
        )
    }

    fn neighbor_ids(graph: &NetworkGraph, id: &str) -> Vec<String> {
        let mut ids: Vec<String> = graph
            .connected_stations(id)
            .unwrap()
            .into_iter()
            .map(|id| id.0)
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_ordered_line_links_consecutive_stations() {
        let config = SimulationConfig::default();
        let graph = NetworkBuilder::new(&config)
            .from_ordered_lines(&[ordered("1", &["A", "B", "C"])])
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(neighbor_ids(&graph, "1-a"), vec!["1-b"]);
        assert_eq!(neighbor_ids(&graph, "1-b"), vec!["1-a", "1-c"]);
        assert_eq!(graph.station_by_id("1-b").unwrap().capacity, config.default_capacity);
        assert_eq!(graph.total_capacity(), 3 * config.default_capacity as u64);
    }

    #[test]
    fn test_transfer_connects_same_name_across_lines() {
        let config = SimulationConfig::default();
        let graph = NetworkBuilder::new(&config)
            .from_ordered_lines(&[ordered("1", &["A", "X", "B"]), ordered("2", &["C", "X", "D"])])
            .unwrap();

        assert_eq!(neighbor_ids(&graph, "1-x"), vec!["1-a", "1-b", "2-x"]);
        assert_eq!(neighbor_ids(&graph, "2-x"), vec!["1-x", "2-c", "2-d"]);
        let idx = graph.index_of("1-x").unwrap();
        assert!(graph.is_transfer(idx));
        assert!(!graph.is_transfer(graph.index_of("1-a").unwrap()));
    }

    #[test]
    fn test_same_name_on_same_line_is_not_a_transfer() {
        let config = SimulationConfig::default();
        let line = OrderedLine::new(
            "1",
            vec![
                StationRecord::new("Loop", loc(0.0, 0.0)).with_id("1-loop-north"),
                StationRecord::new("Mid", loc(1.0, 0.0)),
                StationRecord::new("Loop", loc(2.0, 0.0)).with_id("1-loop-south"),
            ],
        );
        let graph = NetworkBuilder::new(&config).from_ordered_lines(&[line]).unwrap();
        assert_eq!(neighbor_ids(&graph, "1-loop-north"), vec!["1-mid"]);
    }

    #[test]
    fn test_empty_topology_fails() {
        let config = SimulationConfig::default();
        let builder = NetworkBuilder::new(&config);
        assert!(matches!(builder.from_ordered_lines(&[]), Err(MetroError::Topology(_))));
        assert!(matches!(
            builder.from_ordered_lines(&[OrderedLine::new("1", vec![])]),
            Err(MetroError::Topology(_))
        ));
        assert!(matches!(builder.from_geometries(&[], &[]), Err(MetroError::Topology(_))));
    }

    #[test]
    fn test_duplicate_id_fails() {
        let config = SimulationConfig::default();
        let result = NetworkBuilder::new(&config).from_ordered_lines(&[ordered("1", &["A", "A"])]);
        assert!(matches!(result, Err(MetroError::Topology(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_zero_capacity_fails() {
        let config = SimulationConfig::default();
        let line = OrderedLine::new("1", vec![StationRecord::new("A", loc(0.0, 0.0)).with_capacity(0)]);
        assert!(NetworkBuilder::new(&config).from_ordered_lines(&[line]).is_err());
    }

    #[test]
    fn test_geometry_orders_stops_along_line() {
        let config = SimulationConfig::default();
        let geometry = LineGeometry::single("1", vec![loc(0.0, 0.0), loc(100.0, 0.0)]);
        // Stops deliberately listed out of route order
        let stops = vec![
            StopRecord::new("East", loc(90.0, 5.0)),
            StopRecord::new("West", loc(10.0, -5.0)),
            StopRecord::new("Center", loc(50.0, 2.0)),
        ];

        let graph = NetworkBuilder::new(&config).from_geometries(&[geometry], &stops).unwrap();
        let order: Vec<&str> = graph
            .line_stations(&LineId::from("1"))
            .unwrap()
            .iter()
            .map(|&idx| graph.station(idx).name.as_str())
            .collect();
        assert_eq!(order, vec!["West", "Center", "East"]);
        assert_eq!(neighbor_ids(&graph, "1-center"), vec!["1-east", "1-west"]);
    }

    #[test]
    fn test_geometry_snaps_to_nearest_line() {
        let config = SimulationConfig::default();
        let lines = vec![
            LineGeometry::single("1", vec![loc(0.0, 0.0), loc(100.0, 0.0)]),
            LineGeometry::single("2", vec![loc(0.0, 50.0), loc(100.0, 50.0)]),
        ];
        let stops = vec![
            StopRecord::new("South", loc(20.0, 3.0)),
            StopRecord::new("North", loc(20.0, 48.0)),
        ];

        let graph = NetworkBuilder::new(&config).from_geometries(&lines, &stops).unwrap();
        assert_eq!(graph.station_by_id("1-south").unwrap().line, LineId::from("1"));
        assert_eq!(graph.station_by_id("2-north").unwrap().line, LineId::from("2"));
    }

    #[test]
    fn test_stop_beyond_tolerance_fails() {
        let config = SimulationConfig {
            snap_tolerance: 10.0,
            ..SimulationConfig::default()
        };
        let lines = vec![LineGeometry::single("1", vec![loc(0.0, 0.0), loc(100.0, 0.0)])];
        let stops = vec![StopRecord::new("Far", loc(50.0, 500.0))];

        let result = NetworkBuilder::new(&config).from_geometries(&lines, &stops);
        assert!(matches!(result, Err(MetroError::Topology(msg)) if msg.contains("Far")));
    }

    #[test]
    fn test_stop_with_unknown_explicit_line_fails() {
        let config = SimulationConfig::default();
        let lines = vec![LineGeometry::single("1", vec![loc(0.0, 0.0), loc(100.0, 0.0)])];
        let stops = vec![StopRecord::new("Lost", loc(5.0, 0.0)).on_line("9")];

        assert!(NetworkBuilder::new(&config).from_geometries(&lines, &stops).is_err());
    }

    #[test]
    fn test_multipart_geometry_orders_by_part_then_fraction() {
        let config = SimulationConfig::default();
        let geometry = LineGeometry::new(
            "B",
            vec![
                vec![loc(0.0, 0.0), loc(10.0, 0.0)],
                vec![loc(10.0, 0.0), loc(10.0, 10.0)],
            ],
        );
        let stops = vec![
            StopRecord::new("Top", loc(10.0, 9.0)),
            StopRecord::new("Start", loc(1.0, 0.0)),
            StopRecord::new("Corner", loc(8.0, 0.0)),
        ];

        let graph = NetworkBuilder::new(&config).from_geometries(&[geometry], &stops).unwrap();
        let order: Vec<&str> = graph
            .line_stations(&LineId::from("B"))
            .unwrap()
            .iter()
            .map(|&idx| graph.station(idx).name.as_str())
            .collect();
        assert_eq!(order, vec!["Start", "Corner", "Top"]);
    }

    #[test]
    fn test_degenerate_geometry_fails() {
        let config = SimulationConfig::default();
        let lines = vec![LineGeometry::single("1", vec![loc(0.0, 0.0)])];
        let stops = vec![StopRecord::new("A", loc(0.0, 0.0))];
        assert!(NetworkBuilder::new(&config).from_geometries(&lines, &stops).is_err());
    }
}
