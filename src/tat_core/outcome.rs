//! Per-order evaluation result

use serde::Serialize;

use super::breach::{first_breach, BreachEngine, StageResult};
use super::correlator::{Correlation, CorrelationEngine, NoteIndex};
use crate::ingest_core::mapper::OrderRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderOutcome {
    pub identifier: String,
    pub stages: Vec<StageResult>,
    pub first_breach: Option<StageResult>,
    pub correlations: Vec<Correlation>,
}

impl OrderOutcome {
    /// Evaluate one order. Orders share nothing, so callers may evaluate them
    /// in any order or in parallel.
    pub fn evaluate(
        order: &OrderRecord,
        notes: &NoteIndex,
        breaches: &BreachEngine,
        correlator: &CorrelationEngine,
    ) -> Self {
        let stages = breaches.compute_breaches(order);
        let first = first_breach(&stages).cloned();
        let correlations = correlator.correlate(&stages, notes.for_order(&order.identifier));

        Self {
            identifier: order.identifier.clone(),
            stages,
            first_breach: first,
            correlations,
        }
    }

    pub fn has_breach(&self) -> bool {
        self.stages.iter().any(|s| s.breached)
    }

    pub fn breach_count(&self) -> usize {
        self.stages.iter().filter(|s| s.breached).count()
    }
}
