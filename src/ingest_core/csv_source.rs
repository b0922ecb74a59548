//! CSV-backed table source, re-parsed from disk for every header candidate

use std::fs::File;
use std::path::{Path, PathBuf};

use super::table::{CellValue, RawTable, TableSource};
use crate::errors::TableError;

pub struct CsvTableSource {
    name: String,
    path: PathBuf,
    delimiter: u8,
}

impl CsvTableSource {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_with_header(&self, header_row: usize) -> Result<RawTable, TableError> {
        let file = File::open(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(file);

        let mut columns: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut seen = 0usize;

        for result in rdr.byte_records() {
            let record = result.map_err(|source| TableError::Csv {
                table: self.name.clone(),
                source,
            })?;

            if seen < header_row {
                seen += 1;
                continue;
            }
            seen += 1;

            // Exports are not always UTF-8; undecodable bytes become U+FFFD.
            let fields = record.iter().map(|field| String::from_utf8_lossy(field));

            match columns {
                None => {
                    columns = Some(fields.map(|s| s.into_owned()).collect());
                }
                Some(ref header) => {
                    let mut cells: Vec<CellValue> = fields
                        .take(header.len())
                        .map(|s| CellValue::from_raw(&s))
                        .collect();
                    cells.resize(header.len(), CellValue::Empty);
                    rows.push(cells);
                }
            }
        }

        let columns = columns.ok_or_else(|| TableError::HeaderOutOfRange {
            table: self.name.clone(),
            header_row,
            rows: seen,
        })?;

        Ok(RawTable {
            header_row,
            columns,
            rows,
        })
    }
}
