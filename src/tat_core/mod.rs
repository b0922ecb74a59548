//! TAT Core - Stage Breach and Note Correlation Engine
//!
//! # Architecture
//!
//! ```text
//! OrderRecord → BreachEngine (5 fixed stages, strict > threshold)
//!     ↓                 ↓
//!     ↓          first_breach (earliest segment end)
//!     ↓
//! NoteIndex (notes per order, time-sorted) → CorrelationEngine (ReportScope, 5 min grace)
//!     ↓
//! OrderOutcome (stages + correlations) → ReportBuilder (flat rows) + RunMetrics (KPIs, agents)
//! ```

pub mod breach;
pub mod correlator;
pub mod metrics;
pub mod outcome;
pub mod report;
pub mod stages;

pub use breach::{first_breach, BreachEngine, StageResult};
pub use correlator::{
    Classification, Correlation, CorrelationEngine, NoteIndex, ReportScope,
    BREACH_NOTE_GRACE_MINUTES,
};
pub use metrics::{AgentMetrics, RunMetrics, StageSummary};
pub use outcome::OrderOutcome;
pub use report::{DisplayRow, ReportBuilder, ReportRow, SENTINEL};
pub use stages::{StageDefinition, StageKey, STAGE_DEFINITIONS};
