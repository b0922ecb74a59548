//! tatflow - Order TAT Breach Analyzer
//!
//! Reads an orders export and a notes export, flags stage TAT breaches and
//! links support notes to them.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin tatflow -- --orders orders.csv --notes notes.csv
//! ```
//!
//! ## Environment Variables
//!
//! - TATFLOW_ORDERS_PATH - Orders export (CSV)
//! - TATFLOW_NOTES_PATH - Notes export (CSV)
//! - TATFLOW_OUTPUT_PATH - Report destination (default: reports/tat_report.jsonl)
//! - TATFLOW_OUTPUT_FORMAT - jsonl or json (default: jsonl)
//! - TATFLOW_ORDERS_HEADER_ROW / TATFLOW_NOTES_HEADER_ROW / TATFLOW_MAX_HEADER_ROW
//! - TATFLOW_REPORT_SCOPE - breached or resolvable (default: breached)
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use std::path::PathBuf;
use tatflow::errors::AnalysisError;
use tatflow::ingest_core::CsvTableSource;
use tatflow::output_core::{OutputFormat, ReportWriter};
use tatflow::{AnalysisConfig, ReportScope, TatAnalyzer};

/// Order TAT breach analyzer
#[derive(Parser, Debug)]
#[command(name = "tatflow")]
#[command(about = "Flag order stage TAT breaches and correlate support notes", long_about = None)]
#[command(version)]
struct Cli {
    /// Orders export (CSV)
    #[arg(long, env = "TATFLOW_ORDERS_PATH")]
    orders: PathBuf,

    /// Notes export (CSV)
    #[arg(long, env = "TATFLOW_NOTES_PATH")]
    notes: PathBuf,

    /// Report destination
    #[arg(
        short,
        long,
        env = "TATFLOW_OUTPUT_PATH",
        default_value = "reports/tat_report.jsonl"
    )]
    output: PathBuf,

    /// Output format: jsonl or json
    #[arg(short, long, env = "TATFLOW_OUTPUT_FORMAT", default_value = "jsonl")]
    format: String,

    /// Preferred header row of the orders export (overrides TATFLOW_ORDERS_HEADER_ROW)
    #[arg(long)]
    orders_header_row: Option<usize>,

    /// Preferred header row of the notes export (overrides TATFLOW_NOTES_HEADER_ROW)
    #[arg(long)]
    notes_header_row: Option<usize>,

    /// Report scope: breached or resolvable (overrides TATFLOW_REPORT_SCOPE)
    #[arg(long)]
    scope: Option<String>,

    /// Field delimiter of both exports
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = AnalysisConfig::from_env();

    if let Some(row) = cli.orders_header_row {
        config.orders_header_row = row;
    }
    if let Some(row) = cli.notes_header_row {
        config.notes_header_row = row;
    }
    if let Some(scope) = &cli.scope {
        config.report_scope = ReportScope::from_str(scope)
            .ok_or_else(|| format!("Invalid scope '{}' (expected breached or resolvable)", scope))?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| format!("Invalid format '{}' (expected jsonl or json)", cli.format))?;
    if !cli.delimiter.is_ascii() {
        return Err(format!("Delimiter '{}' must be a single ASCII character", cli.delimiter).into());
    }
    let delimiter = cli.delimiter as u8;

    log::info!("🚀 Starting TAT breach analysis");
    log::info!("   Orders: {}", cli.orders.display());
    log::info!("   Notes: {}", cli.notes.display());
    log::info!(
        "   Header rows: orders {}, notes {} (scan 0..={})",
        config.orders_header_row,
        config.notes_header_row,
        config.max_header_row
    );
    log::info!("   Scope: {}", config.report_scope.as_str());

    let orders = CsvTableSource::new("orders", &cli.orders).with_delimiter(delimiter);
    let notes = CsvTableSource::new("notes", &cli.notes).with_delimiter(delimiter);

    let analyzer = TatAnalyzer::new(config);
    let report = match analyzer.run(&orders, &notes) {
        Ok(report) => report,
        Err(AnalysisError::SchemaUnresolved(tables)) => {
            for table in &tables {
                log::error!("❌ {}", table);
            }
            return Err(AnalysisError::SchemaUnresolved(tables).into());
        }
        Err(e) => {
            log::error!("❌ Failed to read input: {}", e);
            return Err(e.into());
        }
    };

    let metrics = &report.metrics;
    log::info!(
        "📊 Orders: {} total, {} with breach, {} without",
        metrics.total_orders,
        metrics.orders_with_breach,
        metrics.orders_without_breach
    );
    log::info!(
        "📊 Breaches: {} | Notes: {} across {} orders",
        metrics.total_breaches,
        metrics.total_notes,
        metrics.orders_with_notes
    );
    for stage in &metrics.stages {
        log::info!(
            "   {} (>{} min): {} breached",
            stage.label,
            stage.threshold_minutes,
            stage.breached_count
        );
    }
    for agent in metrics.agents.iter().take(5) {
        log::info!(
            "   👤 {}: {} notes on {} orders",
            agent.agent,
            agent.notes_added,
            agent.unique_orders
        );
    }

    let mut writer = ReportWriter::new(format, &cli.output)?;
    log::info!("📝 Backend: {}", writer.backend_type());
    writer.write_report(&report).await?;
    writer.flush().await?;

    log::info!(
        "✅ Wrote {} report rows to {}",
        report.rows.len(),
        cli.output.display()
    );
    Ok(())
}
