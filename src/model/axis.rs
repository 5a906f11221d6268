// File: src/model/axis.rs
// Builds the row -> time slot mapping from the leading columns of a grid.
use crate::model::grid::Grid;
use crate::model::matcher::{self, TimeCellKind};
use crate::model::parser::parse_time_range;
use crate::model::time::TimeInterval;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_SCAN_COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisEntry {
    /// Trimmed cell text that matched.
    pub text: String,
    pub kind: TimeCellKind,
    /// `None` for cells such as "morning" that mark time without a range.
    pub interval: Option<TimeInterval>,
    /// 1-based column the text came from.
    pub column: u32,
}

/// Row number (1-based) to the time slot that row represents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeAxis {
    entries: BTreeMap<u32, AxisEntry>,
}

impl TimeAxis {
    pub fn get(&self, row: u32) -> Option<&AxisEntry> {
        self.entries.get(&row)
    }

    pub fn interval(&self, row: u32) -> Option<TimeInterval> {
        self.entries.get(&row).and_then(|e| e.interval)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest row that carries a time label.
    pub fn last_row(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AxisEntry)> {
        self.entries.iter().map(|(row, entry)| (*row, entry))
    }

    fn record(&mut self, row: u32, entry: AxisEntry) {
        match self.entries.get(&row) {
            // A later column refines the row, but never throws away a
            // parsed range in favour of a bare label.
            Some(existing) if existing.interval.is_some() && entry.interval.is_none() => {}
            _ => {
                self.entries.insert(row, entry);
            }
        }
    }
}

/// Scans the first `max_columns` columns (column by column, top to bottom)
/// and records every time-bearing cell.
pub fn analyze_time_axis(grid: &Grid, max_columns: usize) -> TimeAxis {
    let mut axis = TimeAxis::default();
    let columns = max_columns.min(grid.col_count()) as u32;

    for col in 1..=columns {
        for (row, _) in grid.rows() {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            let text = cell.to_string();
            let text = text.trim();
            let Some(kind) = matcher::classify(text) else {
                continue;
            };
            let interval = parse_time_range(text);
            if let Some(i) = interval
                && i.overflows_day()
            {
                log::warn!(
                    "Row {} time '{}' runs past midnight ({}); kept as written",
                    row,
                    text,
                    i
                );
            }
            axis.record(
                row,
                AxisEntry {
                    text: text.to_string(),
                    kind,
                    interval,
                    column: col,
                },
            );
        }
    }

    log::info!("Found {} time slots in the first {} columns", axis.len(), columns);
    axis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timetable() -> Grid {
        Grid::from_text_rows(vec![
            vec!["Period", "Time", "Mon", "Tue"],
            vec!["第1節", "08:25~09:05", "Math", "English"],
            vec!["第2節", "09:15~10:05", "Math", "Art"],
            vec!["", "Lunch", "", ""],
            vec!["Afternoon", "", "Physics", ""],
            vec!["第5節", "", "Physics", "PE"],
        ])
    }

    #[test]
    fn test_rows_are_one_based() {
        let axis = analyze_time_axis(&timetable(), DEFAULT_SCAN_COLUMNS);
        assert!(axis.get(1).is_none());
        assert_eq!(axis.interval(2).unwrap().to_string(), "08:25~09:05");
        assert_eq!(axis.interval(3).unwrap().to_string(), "09:15~10:05");
        assert!(axis.get(4).is_none());
    }

    #[test]
    fn test_precise_column_overrides_period_label() {
        let axis = analyze_time_axis(&timetable(), DEFAULT_SCAN_COLUMNS);
        let entry = axis.get(2).unwrap();
        assert_eq!(entry.column, 2);
        assert_eq!(entry.kind, TimeCellKind::Clock);
        assert_eq!(entry.kind.to_string(), "clock");
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let axis = analyze_time_axis(&timetable(), 1);
        let json = serde_json::to_value(axis.get(2).unwrap()).unwrap();
        assert_eq!(json["kind"], "ordinal-period");
        let json = serde_json::to_value(axis.get(5).unwrap()).unwrap();
        assert_eq!(json["kind"], "day-part");
    }

    #[test]
    fn test_label_without_range_is_recorded() {
        let axis = analyze_time_axis(&timetable(), DEFAULT_SCAN_COLUMNS);
        let entry = axis.get(5).unwrap();
        assert_eq!(entry.text, "Afternoon");
        assert!(entry.interval.is_none());
        assert_eq!(axis.interval(6).unwrap().to_string(), "12:00~13:00");
    }

    #[test]
    fn test_scan_window_is_bounded() {
        let grid = Grid::from_text_rows(vec![vec!["Mon", "Tue", "Wed", "10:00"]]);
        assert!(analyze_time_axis(&grid, 3).is_empty());
        assert_eq!(analyze_time_axis(&grid, 4).len(), 1);
        assert!(analyze_time_axis(&grid, 0).is_empty());
    }

    #[test]
    fn test_later_label_does_not_erase_range() {
        let grid = Grid::from_text_rows(vec![vec!["14:00", "afternoon"]]);
        let axis = analyze_time_axis(&grid, 2);
        assert_eq!(axis.get(1).unwrap().column, 1);
        assert_eq!(axis.interval(1).unwrap().to_string(), "14:00~15:00");
    }
}
