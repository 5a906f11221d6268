// File: src/model/grid.rs
// Sheet model handed over by the grid source: cell values plus merged regions.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("sheet file not found: {0}")]
    NotFound(String),
    #[error("failed to read sheet '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse sheet '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid merged region '{0}'")]
    InvalidRegion(String),
}

/// One cell as read from the spreadsheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// A merged cell. Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RegionSpec")]
pub struct MergedRegion {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl MergedRegion {
    pub fn new(start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Result<Self, GridError> {
        let region = Self {
            start_row,
            end_row,
            start_col,
            end_col,
        };
        if start_row == 0 || start_col == 0 || start_row > end_row || start_col > end_col {
            return Err(GridError::InvalidRegion(format!(
                "rows {}-{}, columns {}-{}",
                start_row, end_row, start_col, end_col
            )));
        }
        Ok(region)
    }

    /// Parses `B3:B5` (or a single `B3`).
    pub fn parse_a1(range: &str) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidRegion(range.to_string());
        let (first, last) = match range.trim().split_once(':') {
            Some((a, b)) => (a, b),
            None => (range.trim(), range.trim()),
        };
        let (r1, c1) = parse_a1_cell(first).ok_or_else(invalid)?;
        let (r2, c2) = parse_a1_cell(last).ok_or_else(invalid)?;
        Self::new(r1, r2, c1, c2)
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start_row..=self.end_row
    }

    pub fn to_a1_string(&self) -> String {
        let start = format!("{}{}", column_to_letters(self.start_col), self.start_row);
        if self.start_row == self.end_row && self.start_col == self.end_col {
            start
        } else {
            format!("{}:{}{}", start, column_to_letters(self.end_col), self.end_row)
        }
    }
}

impl fmt::Display for MergedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegionSpec {
    A1(String),
    Bounds {
        start_row: u32,
        end_row: u32,
        start_col: u32,
        end_col: u32,
    },
}

impl TryFrom<RegionSpec> for MergedRegion {
    type Error = GridError;

    fn try_from(spec: RegionSpec) -> Result<Self, Self::Error> {
        match spec {
            RegionSpec::A1(range) => MergedRegion::parse_a1(&range),
            RegionSpec::Bounds {
                start_row,
                end_row,
                start_col,
                end_col,
            } => MergedRegion::new(start_row, end_row, start_col, end_col),
        }
    }
}

/// 1-based column number to letters (1 = A, 27 = AA).
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

fn parse_a1_cell(cell: &str) -> Option<(u32, u32)> {
    let cell = cell.trim().replace('$', "");
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    let row = digits.parse::<u32>().ok()?;
    Some((row, col))
}

/// Rectangular grid of cells. Read once, never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
    cols: usize,
}

impl Grid {
    /// Pads ragged input to a rectangle.
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, CellValue::Empty);
        }
        Self { rows, cols }
    }

    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|r| {
                    r.into_iter()
                        .map(|s| {
                            let s: String = s.into();
                            if s.is_empty() {
                                CellValue::Empty
                            } else {
                                CellValue::Text(s)
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// 1-based lookup.
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
    }

    /// Rows with their 1-based numbers.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i as u32 + 1, r.as_slice()))
    }
}

#[derive(Deserialize)]
struct SheetFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cells: Vec<Vec<CellValue>>,
    #[serde(default)]
    merged: Vec<MergedRegion>,
}

/// What the grid source hands to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
    pub merged: Vec<MergedRegion>,
}

impl Sheet {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: SheetFile = serde_json::from_str(raw)?;
        Ok(Self {
            name: file.name,
            grid: Grid::new(file.cells),
            merged: file.merged,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, GridError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(GridError::NotFound(display));
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GridError::Io {
                path: display.clone(),
                source,
            })?;
        let sheet = Self::from_json(&raw).map_err(|source| GridError::Parse {
            path: display,
            source,
        })?;
        log::info!(
            "Loaded sheet '{}': {} rows x {} columns, {} merged regions",
            sheet.name,
            sheet.grid.row_count(),
            sheet.grid.col_count(),
            sheet.merged.len()
        );
        Ok(sheet)
    }
}
