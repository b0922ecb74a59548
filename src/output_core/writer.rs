//! Unified writer interface for analysis reports
//!
//! Routes writes to either the JSONL or the JSON backend based on configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::json_writer::JsonReportWriter;
use super::jsonl_writer::JsonlReportWriter;
use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analysis::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jsonl,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" => Some(OutputFormat::Jsonl),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jsonl
    }
}

/// Unified writer that routes to either the JSONL or the JSON backend
pub enum ReportWriter {
    Jsonl(JsonlReportWriter),
    Json(JsonReportWriter),
}

impl ReportWriter {
    /// Create a new report writer for the given format
    pub fn new(format: OutputFormat, path: impl AsRef<Path>) -> Result<Self, ReportWriterError> {
        match format {
            OutputFormat::Jsonl => Ok(ReportWriter::Jsonl(JsonlReportWriter::new(path)?)),
            OutputFormat::Json => Ok(ReportWriter::Json(JsonReportWriter::new(path)?)),
        }
    }

    pub async fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError> {
        match self {
            ReportWriter::Jsonl(w) => ReportWriterBackend::write_report(w, report).await,
            ReportWriter::Json(w) => ReportWriterBackend::write_report(w, report).await,
        }
    }

    pub async fn flush(&mut self) -> Result<(), ReportWriterError> {
        match self {
            ReportWriter::Jsonl(w) => ReportWriterBackend::flush(w).await,
            ReportWriter::Json(w) => ReportWriterBackend::flush(w).await,
        }
    }

    /// Get backend type for logging
    pub fn backend_type(&self) -> &'static str {
        match self {
            ReportWriter::Jsonl(w) => w.backend_type(),
            ReportWriter::Json(w) => w.backend_type(),
        }
    }
}
