//! JSON writer - a single pretty document with metrics and typed rows

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analysis::AnalysisReport;
use crate::tat_core::{ReportRow, RunMetrics};

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: String,
    metrics: &'a RunMetrics,
    rows: &'a [ReportRow],
}

pub struct JsonReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonReportWriter {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;

        log::info!("📝 Writing report document to: {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError> {
        let document = ReportDocument {
            generated_at: Utc::now().to_rfc3339(),
            metrics: &report.metrics,
            rows: &report.rows,
        };
        serde_json::to_writer_pretty(&mut self.writer, &document)?;
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for JsonReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[async_trait]
impl ReportWriterBackend for JsonReportWriter {
    async fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportWriterError> {
        JsonReportWriter::write_report(self, report)
    }

    async fn flush(&mut self) -> Result<(), ReportWriterError> {
        JsonReportWriter::flush(self)?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSON"
    }
}
