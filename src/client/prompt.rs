// File: src/client/prompt.rs
// Renders the grid and the resolved region times for the extraction service.
use crate::model::grid::Grid;
use crate::model::region::RegionHint;
use std::fmt::Write;

pub const DEFAULT_PREVIEW_ROWS: usize = 25;
pub const DEFAULT_MAX_REGION_HINTS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    pub preview_rows: usize,
    pub max_region_hints: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_region_hints: DEFAULT_MAX_REGION_HINTS,
        }
    }
}

const INSTRUCTIONS: &str = r#"Extract every calendar event from the schedule above and answer with a JSON array only.

Each record has:
- title: event name (required)
- start_date: YYYY-MM-DD (required)
- start_time: HH:MM, default "09:00"
- end_date: YYYY-MM-DD (required)
- end_time: HH:MM, default "18:00"
- description: optional
- location: optional

Rules:
1. A merged cell is one event spanning several time slots. Use the time listed
   for it under "Merged cells" as the full range, not the time of its first row.
2. A cell that is not merged uses the time slot of its own row.
3. Infer missing dates from the surrounding headers.
4. Skip blank or meaningless cells.
5. Output only the JSON array: no prose, no code fences, no code.

Example:
[
  {"title": "Staff meeting", "start_date": "2024-12-01", "start_time": "10:00",
   "end_date": "2024-12-01", "end_time": "12:00", "description": "Budget review",
   "location": "Room A"}
]"#;

/// Non-empty leading rows, one line each: `Row N: ["a", "b", ...]`.
pub fn render_rows(grid: &Grid, limit: usize) -> String {
    let mut out = String::new();
    for (row, cells) in grid.rows().take(limit) {
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        let rendered: Vec<String> = cells.iter().map(|c| format!("{:?}", c.to_string())).collect();
        let _ = writeln!(out, "Row {}: [{}]", row, rendered.join(", "));
    }
    out
}

pub fn render_hints(hints: &[RegionHint], limit: usize) -> String {
    let mut out = String::new();
    for hint in hints.iter().take(limit) {
        let _ = writeln!(out, "{}", hint);
    }
    if hints.len() > limit {
        let _ = writeln!(out, "({} more merged cells not listed)", hints.len() - limit);
    }
    out
}

pub fn build_prompt(grid: &Grid, hints: &[RegionHint], options: &PromptOptions) -> String {
    let mut prompt = String::from("You are a careful analyst of schedule spreadsheets.\n\n");
    prompt.push_str("Spreadsheet rows:\n");
    prompt.push_str(&render_rows(grid, options.preview_rows));
    prompt.push_str("\nMerged cells:\n");
    if hints.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        prompt.push_str(&render_hints(hints, options.max_region_hints));
    }
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt.push('\n');
    prompt
}
