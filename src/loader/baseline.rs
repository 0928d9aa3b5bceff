//! Load baseline ridership from JSON
//!
//! Either the structured form `{"by_id": {...}, "by_name": {...}}` or a flat
//! `{"<station name>": ridership}` map, which is how ridership reports are
//! usually published.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde_json::Value;

use crate::core::error::Result;
use crate::occupancy::Baseline;

pub fn parse_baseline(content: &str) -> Result<Baseline> {
    let value: Value = serde_json::from_str(content)?;

    let structured = value.as_object().map_or(false, |map| {
        !map.is_empty() && map.keys().all(|k| k == "by_id" || k == "by_name")
    });

    let baseline = if structured {
        serde_json::from_value(value)?
    } else {
        let by_name: AHashMap<String, u64> = serde_json::from_value(value)?;
        Baseline {
            by_name,
            ..Baseline::default()
        }
    };

    Ok(baseline)
}

pub fn load_baseline(path: &Path) -> Result<Baseline> {
    let content = fs::read_to_string(path)?;
    let baseline = parse_baseline(&content)?;
    tracing::info!(
        "Loaded baseline from {}: {} by id, {} by name",
        path.display(),
        baseline.by_id.len(),
        baseline.by_name.len()
    );
    Ok(baseline)
}
