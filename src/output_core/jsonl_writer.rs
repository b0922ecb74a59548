//! JSONL writer - one display row per line, keyed by dashboard column names

use async_trait::async_trait;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analysis::AnalysisReport;

pub struct JsonlReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlReportWriter {
    /// Create (or truncate) the output file, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;

        log::info!("📝 Writing report rows to: {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError> {
        for row in &report.rows {
            let json = serde_json::to_string(&row.to_display())?;
            writeln!(self.writer, "{}", json)?;
        }
        log::debug!("Wrote {} rows to {}", report.rows.len(), self.path.display());
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[async_trait]
impl ReportWriterBackend for JsonlReportWriter {
    async fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError> {
        JsonlReportWriter::write_report(self, report)
    }

    async fn flush(&mut self) -> Result<(), ReportWriterError> {
        JsonlReportWriter::flush(self)?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
