// File: ./src/model/mod.rs
pub mod adapter;
pub mod axis;
pub mod event;
pub mod grid;
pub mod matcher;
pub mod merge;
pub mod parser;
pub mod region;
pub mod time;

pub use axis::{TimeAxis, analyze_time_axis};
pub use event::{CandidateEvent, FinalEvent, ScheduleEvent};
pub use grid::{CellValue, Grid, GridError, MergedRegion, Sheet};
pub use merge::{MergeOptions, MergeOutcome, merge_consecutive_events, merge_runs};
pub use parser::parse_time_range;
pub use region::{RegionHint, RegionTime, resolve_region};
pub use time::{TimeError, TimeInterval, WallTime, time_to_minutes};
