//! Ingest Core - Header Reconciliation and Record Mapping
//!
//! Turns the loosely-structured orders and notes exports into canonical records.
//!
//! # Architecture
//!
//! ```text
//! TableSource (CSV file / in-memory grid)
//!     ↓  read_with_header(row) for each candidate header row
//! HeaderResolver (FieldAliasSpec → HeaderMapping | SchemaUnresolved)
//!     ↓
//! RowMapper (coerce_timestamp, identifier filtering)
//!     ↓
//! OrderRecord / AnnotationRecord
//! ```

pub mod coerce;
pub mod csv_source;
pub mod mapper;
pub mod resolver;
pub mod schema;
pub mod table;

pub use coerce::coerce_timestamp;
pub use csv_source::CsvTableSource;
pub use mapper::{AnnotationRecord, OrderRecord, RowMapper};
pub use resolver::{HeaderMapping, HeaderResolver, MissingField, ResolvedTable, SchemaUnresolved};
pub use schema::{normalize_label, CanonicalField, FieldAliasSpec, FieldAliases, TableKind};
pub use table::{CellValue, MemoryTableSource, RawTable, TableSource};
