//! Raw tabular data as handed over by the file-loading side

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::TableError;

/// A single spreadsheet-like cell before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Build a cell from a raw string field (CSV and similar text sources).
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// True for empty cells, whitespace-only text and NaN numbers.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::DateTime(_) => false,
        }
    }

    /// Render the cell as text, `None` when blank.
    ///
    /// Integral numbers render without a fractional part so numeric order ids
    /// read back as `"12345"` rather than `"12345.0"`.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Label used when this cell sits in the header row.
    pub fn as_label(&self) -> String {
        self.as_text().unwrap_or_default()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One parse of a source with a specific row treated as the header.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub header_row: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Cell at `(row, column)`, `Empty` for short rows.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A tabular input that can be re-read with an arbitrary header row.
///
/// Implementations re-parse on every call: header selection can change where
/// columns start and end in spreadsheet-like sources.
pub trait TableSource {
    fn name(&self) -> &str;

    fn read_with_header(&self, header_row: usize) -> Result<RawTable, TableError>;
}

/// Grid of cells already held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTableSource {
    name: String,
    grid: Vec<Vec<CellValue>>,
}

impl MemoryTableSource {
    pub fn new(name: impl Into<String>, grid: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Convenience constructor from string rows; blank strings become `Empty`.
    pub fn from_strings<R, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grid = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| CellValue::from_raw(cell.as_ref()))
                    .collect()
            })
            .collect();
        Self::new(name, grid)
    }
}

impl TableSource for MemoryTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_with_header(&self, header_row: usize) -> Result<RawTable, TableError> {
        let header = self.grid.get(header_row).ok_or_else(|| TableError::HeaderOutOfRange {
            table: self.name.clone(),
            header_row,
            rows: self.grid.len(),
        })?;

        let columns: Vec<String> = header.iter().map(CellValue::as_label).collect();
        let width = columns.len();

        let rows = self.grid[header_row + 1..]
            .iter()
            .map(|row| {
                let mut cells: Vec<CellValue> = row.iter().take(width).cloned().collect();
                cells.resize(width, CellValue::Empty);
                cells
            })
            .collect();

        Ok(RawTable {
            header_row,
            columns,
            rows,
        })
    }
}
