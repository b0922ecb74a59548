pub mod analysis;
pub mod config;
pub mod errors;
pub mod ingest_core;
pub mod output_core;
pub mod tat_core;

pub use analysis::{AnalysisReport, TatAnalyzer};
pub use config::{AnalysisConfig, ReportScope};
pub use errors::{AnalysisError, ResolveError, TableError};
