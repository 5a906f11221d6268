// File: src/model/region.rs
// Resolves the time span a merged cell covers on the time axis.
use crate::model::axis::TimeAxis;
use crate::model::grid::MergedRegion;
use crate::model::time::TimeInterval;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegionTime {
    Resolved { interval: TimeInterval },
    /// None of the covered rows carries a time range.
    Indeterminate,
}

impl RegionTime {
    pub fn interval(&self) -> Option<TimeInterval> {
        match self {
            RegionTime::Resolved { interval } => Some(*interval),
            RegionTime::Indeterminate => None,
        }
    }
}

impl fmt::Display for RegionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionTime::Resolved { interval } => write!(f, "{}", interval),
            RegionTime::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

/// Union of every row interval inside the region: earliest start, latest end.
pub fn resolve_region(region: &MergedRegion, axis: &TimeAxis) -> RegionTime {
    let Some(last) = axis.last_row() else {
        return RegionTime::Indeterminate;
    };
    // Rows past the last labelled row cannot contribute.
    (region.start_row..=region.end_row.min(last))
        .filter_map(|row| axis.interval(row))
        .reduce(TimeInterval::union)
        .map_or(RegionTime::Indeterminate, |interval| RegionTime::Resolved {
            interval,
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionHint {
    pub region: MergedRegion,
    pub time: RegionTime,
}

impl fmt::Display for RegionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.region;
        write!(
            f,
            "Merged {}: rows {}-{}, columns {}-{}, time: {}",
            r, r.start_row, r.end_row, r.start_col, r.end_col, self.time
        )
    }
}

pub fn region_hints(regions: &[MergedRegion], axis: &TimeAxis) -> Vec<RegionHint> {
    regions
        .iter()
        .map(|region| RegionHint {
            region: *region,
            time: resolve_region(region, axis),
        })
        .collect()
}
