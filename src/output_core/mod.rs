//! Output Core - Report Writer Backends
//!
//! # Architecture
//!
//! ```text
//! AnalysisReport
//!     ↓
//! ReportWriter (OutputFormat router)
//!     ├── JsonlReportWriter → one display row per line
//!     └── JsonReportWriter  → one pretty document (metrics + typed rows)
//! ```

pub mod json_writer;
pub mod jsonl_writer;
pub mod writer;
pub mod writer_backend;

pub use json_writer::JsonReportWriter;
pub use jsonl_writer::JsonlReportWriter;
pub use writer::{OutputFormat, ReportWriter};
pub use writer_backend::{ReportWriterBackend, ReportWriterError};
