//! Seeded synthetic networks for benchmarks and offline runs
//!
//! Lines are random walks across a square area. A fraction of stations reuse
//! the name of a station already placed on an earlier line, which turns them
//! into transfer points once the graph is built.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::Location;
use crate::occupancy::baseline::Baseline;
use super::topology::{OrderedLine, StationRecord};

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub lines: usize,
    pub stations_per_line: usize,
    /// Chance that a station shares its name with one on an earlier line
    pub transfer_probability: f64,
    /// Side of the square area stations are placed in (projected units)
    pub extent: f64,
    pub capacity_range: (u32, u32),
    pub ridership_range: (u64, u64),
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            lines: 12,
            stations_per_line: 16,
            transfer_probability: 0.12,
            extent: 20_000.0,
            capacity_range: (2_000, 8_000),
            ridership_range: (0, 6_000),
        }
    }
}

/// Generate ordered lines plus a by-name baseline for them
pub fn generate(config: &SyntheticConfig) -> (Vec<OrderedLine>, Baseline) {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut lines = Vec::with_capacity(config.lines);
    let mut placed: Vec<(String, Location)> = Vec::new();
    let mut baseline = Baseline::new();
    let step = config.extent / (config.stations_per_line.max(1) as f64);

    for line_idx in 0..config.lines {
        let line_id = line_label(line_idx);
        let mut position = Location::new(
            rng.gen_range(0.0..config.extent),
            rng.gen_range(0.0..config.extent),
        );
        let heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let mut stations = Vec::with_capacity(config.stations_per_line);

        for station_idx in 0..config.stations_per_line {
            let reuse = !placed.is_empty()
                && line_idx > 0
                && rng.gen_bool(config.transfer_probability.clamp(0.0, 1.0));

            let (name, location) = if reuse {
                let (name, location) = &placed[rng.gen_range(0..placed.len())];
                (name.clone(), *location)
            } else {
                let wobble: f64 = rng.gen_range(-0.6..0.6);
                position = Location::new(
                    position.x + step * (heading + wobble).cos(),
                    position.y + step * (heading + wobble).sin(),
                );
                let name = format!("L{} Station {}", line_id, station_idx + 1);
                baseline.insert_by_name(
                    name.clone(),
                    rng.gen_range(config.ridership_range.0..=config.ridership_range.1),
                );
                (name, position)
            };

            // The same name twice on one line would collide on the derived id
            if stations.iter().any(|s: &StationRecord| s.name == name) {
                continue;
            }

            stations.push(
                StationRecord::new(name.clone(), location)
                    .with_capacity(rng.gen_range(config.capacity_range.0..=config.capacity_range.1)),
            );
            if !reuse {
                placed.push((name, location));
            }
        }

        lines.push(OrderedLine::new(line_id, stations));
    }

    (lines, baseline)
}

/// Line labels follow the numbered-then-lettered scheme: 1..9, A, B, ...
fn line_label(idx: usize) -> String {
    if idx < 9 {
        (idx + 1).to_string()
    } else {
        let letter = (b'A' + ((idx - 9) % 26) as u8) as char;
        if idx - 9 < 26 {
            letter.to_string()
        } else {
            format!("{}{}", letter, (idx - 9) / 26)
        }
    }
}
