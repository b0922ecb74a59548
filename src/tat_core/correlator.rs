//! Note-to-breach correlation with a fixed grace window

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::breach::StageResult;
use super::stages::StageKey;
use crate::ingest_core::mapper::AnnotationRecord;

/// Minutes after a breach during which a note counts as a timely response.
pub const BREACH_NOTE_GRACE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Note time is strictly before the breach instant.
    Before,
    /// `breach <= note <= breach + grace`
    WithinGrace,
    /// `note > breach + grace`
    AfterGrace,
    /// Note time missing, or no breached stage with a known end.
    Unclassified,
}

impl Classification {
    pub fn is_within_grace(&self) -> bool {
        matches!(self, Classification::WithinGrace)
    }

    pub fn is_after_grace(&self) -> bool {
        matches!(self, Classification::AfterGrace)
    }
}

/// Which stages of an order are correlated with notes and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    /// Breached stages with a known end instant.
    BreachedStages,
    /// Every stage with a known end instant, breached or not.
    ResolvableStages,
}

impl ReportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportScope::BreachedStages => "breached",
            ReportScope::ResolvableStages => "resolvable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breached" => Some(ReportScope::BreachedStages),
            "resolvable" | "all" => Some(ReportScope::ResolvableStages),
            _ => None,
        }
    }

    pub fn includes(&self, stage: &StageResult) -> bool {
        match self {
            ReportScope::BreachedStages => stage.breached && stage.segment_end.is_some(),
            ReportScope::ResolvableStages => stage.segment_end.is_some(),
        }
    }
}

impl Default for ReportScope {
    fn default() -> Self {
        ReportScope::BreachedStages
    }
}

/// One annotation placed against one in-scope stage (or against none).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub stage: Option<StageKey>,
    pub breached_at: Option<NaiveDateTime>,
    pub annotation: AnnotationRecord,
    pub classification: Classification,
    /// `note_at - breached_at` in whole seconds, when both are known.
    pub gap_seconds: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    grace: Duration,
    scope: ReportScope,
}

impl CorrelationEngine {
    pub fn new(grace_minutes: i64, scope: ReportScope) -> Self {
        Self {
            grace: Duration::minutes(grace_minutes),
            scope,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BREACH_NOTE_GRACE_MINUTES, ReportScope::default())
    }

    pub fn scope(&self) -> ReportScope {
        self.scope
    }

    /// Classify a note instant against a breach instant.
    pub fn classify(
        &self,
        breached_at: Option<NaiveDateTime>,
        note_at: Option<NaiveDateTime>,
    ) -> Classification {
        let (breach, note) = match (breached_at, note_at) {
            (Some(b), Some(n)) => (b, n),
            _ => return Classification::Unclassified,
        };

        if note < breach {
            Classification::Before
        } else if note <= breach + self.grace {
            Classification::WithinGrace
        } else {
            Classification::AfterGrace
        }
    }

    /// Correlate an order's (time-sorted) annotations with its in-scope stages.
    ///
    /// Produces one entry per (in-scope stage, annotation), stage-major. Only
    /// breached stages classify notes; other in-scope stages leave them
    /// unclassified but still carry the gap. When no stage is in scope every
    /// annotation is returned unclassified with no stage.
    pub fn correlate(
        &self,
        stages: &[StageResult],
        annotations: &[AnnotationRecord],
    ) -> Vec<Correlation> {
        let in_scope: Vec<&StageResult> =
            stages.iter().filter(|s| self.scope.includes(s)).collect();

        if in_scope.is_empty() {
            return annotations
                .iter()
                .map(|note| Correlation {
                    stage: None,
                    breached_at: None,
                    annotation: note.clone(),
                    classification: Classification::Unclassified,
                    gap_seconds: None,
                })
                .collect();
        }

        in_scope
            .iter()
            .flat_map(|stage| {
                annotations.iter().map(move |note| Correlation {
                    stage: Some(stage.key),
                    breached_at: stage.segment_end,
                    annotation: note.clone(),
                    classification: if stage.breached {
                        self.classify(stage.segment_end, note.note_at)
                    } else {
                        Classification::Unclassified
                    },
                    gap_seconds: match (stage.segment_end, note.note_at) {
                        (Some(end), Some(at)) => Some((at - end).num_seconds()),
                        _ => None,
                    },
                })
            })
            .collect()
    }
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Annotations grouped by order identifier, each group sorted by note time
/// with missing times first.
#[derive(Debug, Default)]
pub struct NoteIndex {
    by_order: HashMap<String, Vec<AnnotationRecord>>,
    total: usize,
}

impl NoteIndex {
    pub fn new(notes: Vec<AnnotationRecord>) -> Self {
        let total = notes.len();
        let mut by_order: HashMap<String, Vec<AnnotationRecord>> = HashMap::new();
        for note in notes {
            by_order.entry(note.identifier.clone()).or_default().push(note);
        }
        // Option orders None before Some, and sort_by_key is stable.
        for group in by_order.values_mut() {
            group.sort_by_key(|n| n.note_at);
        }
        Self { by_order, total }
    }

    pub fn for_order(&self, identifier: &str) -> &[AnnotationRecord] {
        self.by_order
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.by_order.values().flatten()
    }

    pub fn order_count(&self) -> usize {
        self.by_order.len()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest_core::mapper::OrderRecord;
    use crate::tat_core::breach::BreachEngine;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn note(id: &str, when: Option<NaiveDateTime>) -> AnnotationRecord {
        AnnotationRecord::new(id, when, "checked with kitchen", "agent1")
    }

    fn kitchen_breach() -> Vec<StageResult> {
        let mut order = OrderRecord::new("A-1");
        order.accepted_at = Some(at(9, 0));
        order.ready_at = Some(at(9, 30));
        BreachEngine::with_defaults().compute_breaches(&order)
    }

    #[test]
    fn test_within_grace() {
        let engine = CorrelationEngine::with_defaults();
        assert_eq!(
            engine.classify(Some(at(9, 30)), Some(at(9, 33))),
            Classification::WithinGrace
        );
        // Both window edges are inclusive.
        assert_eq!(
            engine.classify(Some(at(9, 30)), Some(at(9, 30))),
            Classification::WithinGrace
        );
        assert_eq!(
            engine.classify(Some(at(9, 30)), Some(at(9, 35))),
            Classification::WithinGrace
        );
    }

    #[test]
    fn test_after_grace() {
        let engine = CorrelationEngine::with_defaults();
        let c = engine.classify(Some(at(9, 30)), Some(at(9, 40)));
        assert_eq!(c, Classification::AfterGrace);
        assert!(c.is_after_grace());
        assert!(!c.is_within_grace());
    }

    #[test]
    fn test_before_and_unclassified() {
        let engine = CorrelationEngine::with_defaults();
        assert_eq!(
            engine.classify(Some(at(9, 30)), Some(at(9, 29))),
            Classification::Before
        );
        assert_eq!(engine.classify(Some(at(9, 30)), None), Classification::Unclassified);
        assert_eq!(engine.classify(None, Some(at(9, 29))), Classification::Unclassified);
    }

    #[test]
    fn test_correlate_pairs_every_breach_with_every_note() {
        let engine = CorrelationEngine::with_defaults();
        let notes = vec![note("A-1", Some(at(9, 33))), note("A-1", Some(at(9, 40)))];

        let correlations = engine.correlate(&kitchen_breach(), &notes);
        assert_eq!(correlations.len(), 4);
        assert_eq!(correlations[0].stage, Some(StageKey::AcceptedToInKitchen));
        assert_eq!(correlations[0].classification, Classification::WithinGrace);
        assert_eq!(correlations[0].gap_seconds, Some(180));
        assert_eq!(correlations[1].classification, Classification::AfterGrace);
        assert_eq!(correlations[2].stage, Some(StageKey::InKitchenToReady));
    }

    #[test]
    fn test_correlate_without_breach_is_unclassified() {
        let engine = CorrelationEngine::with_defaults();
        let stages = BreachEngine::with_defaults().compute_breaches(&OrderRecord::new("A-2"));
        let notes = vec![note("A-2", Some(at(9, 33)))];

        let correlations = engine.correlate(&stages, &notes);
        assert_eq!(correlations.len(), 1);
        assert_eq!(correlations[0].stage, None);
        assert_eq!(correlations[0].classification, Classification::Unclassified);
    }

    #[test]
    fn test_resolvable_scope_correlates_unbreached_stages() {
        let engine = CorrelationEngine::new(BREACH_NOTE_GRACE_MINUTES, ReportScope::ResolvableStages);
        let mut order = OrderRecord::new("A-3");
        order.created_on = Some(at(9, 0));
        order.placed_at = Some(at(9, 2));
        let stages = BreachEngine::with_defaults().compute_breaches(&order);
        let notes = vec![note("A-3", Some(at(9, 3)))];

        let correlations = engine.correlate(&stages, &notes);
        assert_eq!(correlations.len(), 1);
        assert_eq!(correlations[0].stage, Some(StageKey::CreatedToPlaced));
        assert_eq!(correlations[0].classification, Classification::Unclassified);
        assert_eq!(correlations[0].gap_seconds, Some(60));

        // The same order has nothing in the default scope.
        let default = CorrelationEngine::with_defaults().correlate(&stages, &notes);
        assert_eq!(default[0].stage, None);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(ReportScope::from_str("Breached"), Some(ReportScope::BreachedStages));
        assert_eq!(ReportScope::from_str("resolvable"), Some(ReportScope::ResolvableStages));
        assert_eq!(ReportScope::from_str("sometimes"), None);
    }

    #[test]
    fn test_note_index_sorts_missing_first() {
        let index = NoteIndex::new(vec![
            note("A-1", Some(at(10, 0))),
            note("B-1", Some(at(8, 0))),
            note("A-1", None),
            note("A-1", Some(at(9, 0))),
        ]);

        let times: Vec<Option<NaiveDateTime>> =
            index.for_order("A-1").iter().map(|n| n.note_at).collect();
        assert_eq!(times, vec![None, Some(at(9, 0)), Some(at(10, 0))]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.order_count(), 2);
        assert!(index.for_order("Z-9").is_empty());
    }
}
