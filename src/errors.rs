use std::io;

use thiserror::Error;

use crate::ingest_core::resolver::SchemaUnresolved;

/// Failures reading a tabular source at a given header row.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table '{table}' has {rows} rows, header row {header_row} is out of range")]
    HeaderOutOfRange {
        table: String,
        header_row: usize,
        rows: usize,
    },
    #[error("failed to decode '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome of a header resolution that did not produce a mapping.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Unresolved(#[from] SchemaUnresolved),
    #[error(transparent)]
    Source(#[from] TableError),
}

/// Fatal errors for an analysis run. Nothing is reported when one occurs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{}", describe_unresolved(.0))]
    SchemaUnresolved(Vec<SchemaUnresolved>),
    #[error(transparent)]
    Source(#[from] TableError),
}

fn describe_unresolved(tables: &[SchemaUnresolved]) -> String {
    tables
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
