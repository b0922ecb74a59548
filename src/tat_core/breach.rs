//! Per-order stage durations, breach flags and first-breach selection

use chrono::NaiveDateTime;
use serde::Serialize;

use super::stages::{StageDefinition, StageKey, STAGE_DEFINITIONS};
use crate::ingest_core::mapper::OrderRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub key: StageKey,
    pub label: &'static str,
    pub threshold_minutes: u32,
    pub duration_minutes: Option<f64>,
    pub breached: bool,
    pub segment_start: Option<NaiveDateTime>,
    pub segment_end: Option<NaiveDateTime>,
}

pub struct BreachEngine {
    stages: Vec<StageDefinition>,
}

impl BreachEngine {
    pub fn new(stages: Vec<StageDefinition>) -> Self {
        Self { stages }
    }

    pub fn with_defaults() -> Self {
        Self::new(STAGE_DEFINITIONS.to_vec())
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Evaluate every stage of `order`, in definition order.
    ///
    /// Missing endpoints give an unknown duration, which is never a breach.
    /// Durations are clamped at zero when the end precedes the start.
    pub fn compute_breaches(&self, order: &OrderRecord) -> Vec<StageResult> {
        self.stages
            .iter()
            .map(|def| {
                let start = order.timestamp(def.start);
                let end = order.timestamp(def.end);
                let duration_minutes = duration_minutes(start, end);
                StageResult {
                    key: def.key,
                    label: def.label,
                    threshold_minutes: def.threshold_minutes,
                    duration_minutes,
                    breached: duration_minutes
                        .map_or(false, |d| d > f64::from(def.threshold_minutes)),
                    segment_start: start,
                    segment_end: end,
                }
            })
            .collect()
    }
}

impl Default for BreachEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Earliest-ending breached stage; ties resolve to the earlier stage.
///
/// Breached stages without an end instant cannot be ordered and are skipped.
pub fn first_breach(stages: &[StageResult]) -> Option<&StageResult> {
    stages
        .iter()
        .filter(|s| s.breached)
        .filter_map(|s| s.segment_end.map(|end| (end, s)))
        .min_by_key(|(end, _)| *end)
        .map(|(_, s)| s)
}

/// Elapsed minutes from `start` to `end`, never negative.
pub fn duration_minutes(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Option<f64> {
    let (start, end) = (start?, end?);
    let millis = (end - start).num_milliseconds();
    Some((millis as f64 / 60_000.0).max(0.0))
}
