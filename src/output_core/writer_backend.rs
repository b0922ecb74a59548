//! Writer backend trait for analysis reports
//!
//! Defines the interface for writing a finished report to different backends.

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::AnalysisReport;

#[derive(Debug, Error)]
pub enum ReportWriterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend trait for writing analysis reports
#[async_trait]
pub trait ReportWriterBackend: Send {
    /// Write the report rows (and, where the format allows, metrics)
    async fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), ReportWriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
