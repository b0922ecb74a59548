//! Flat order-level report rows
//!
//! One row per (order, reported stage, note); one row per reported stage when
//! the order has no notes; a single placeholder row when the order has no
//! reportable stage at all.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::breach::StageResult;
use super::correlator::{Classification, Correlation, ReportScope};
use super::outcome::OrderOutcome;
use super::stages::StageKey;

/// Rendered in place of any absent value.
pub const SENTINEL: &str = "—";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub order_id: String,
    /// `None` on placeholder rows.
    pub breached: Option<bool>,
    pub stage: Option<StageKey>,
    pub stage_label: Option<&'static str>,
    pub breached_at: Option<NaiveDateTime>,
    pub note_at: Option<NaiveDateTime>,
    pub agent: Option<String>,
    pub description: Option<String>,
    pub classification: Option<Classification>,
    pub gap_seconds: Option<i64>,
}

impl ReportRow {
    fn placeholder(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            breached: None,
            stage: None,
            stage_label: None,
            breached_at: None,
            note_at: None,
            agent: None,
            description: None,
            classification: None,
            gap_seconds: None,
        }
    }

    fn for_stage(order_id: &str, stage: &StageResult) -> Self {
        Self {
            breached: Some(stage.breached),
            stage: Some(stage.key),
            stage_label: Some(stage.label),
            breached_at: stage.segment_end,
            ..Self::placeholder(order_id)
        }
    }

    fn for_correlation(order_id: &str, stage: &StageResult, correlation: &Correlation) -> Self {
        let note = &correlation.annotation;
        Self {
            note_at: note.note_at,
            agent: Some(note.agent.clone()),
            description: Some(note.description.clone()),
            classification: Some(correlation.classification),
            gap_seconds: correlation.gap_seconds,
            ..Self::for_stage(order_id, stage)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.stage.is_none()
    }

    pub fn within_grace(&self) -> bool {
        self.classification.map_or(false, |c| c.is_within_grace())
    }

    pub fn after_grace(&self) -> bool {
        self.classification.map_or(false, |c| c.is_after_grace())
    }

    /// Signed `mm:ss` gap between breach and note.
    pub fn gap_display(&self) -> Option<String> {
        self.gap_seconds.map(format_gap)
    }

    /// Human-facing rendering with sentinels for absent values.
    pub fn to_display(&self) -> DisplayRow {
        let text = |value: &Option<String>| match value.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => SENTINEL.to_string(),
        };
        let flag = |set: bool| {
            if set {
                "Yes".to_string()
            } else {
                SENTINEL.to_string()
            }
        };

        DisplayRow {
            order_id: self.order_id.clone(),
            breached: match self.breached {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => SENTINEL.to_string(),
            },
            stage: self.stage_label.unwrap_or(SENTINEL).to_string(),
            breached_at: format_time(self.breached_at),
            note_at: format_time(self.note_at),
            agent: text(&self.agent),
            description: text(&self.description),
            within_grace: flag(self.within_grace()),
            after_grace: flag(self.after_grace()),
            gap: self.gap_display().unwrap_or_else(|| SENTINEL.to_string()),
        }
    }
}

/// Report row as shown to people, keyed by the dashboard's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    #[serde(rename = "Network Order ID")]
    pub order_id: String,
    #[serde(rename = "TAT Breached (Yes/No)")]
    pub breached: String,
    #[serde(rename = "TAT Breached at Stage")]
    pub stage: String,
    #[serde(rename = "TAT Breached at Time")]
    pub breached_at: String,
    #[serde(rename = "Notes Added Time")]
    pub note_at: String,
    #[serde(rename = "Agent")]
    pub agent: String,
    #[serde(rename = "Note Description")]
    pub description: String,
    #[serde(rename = "Notes added within 5 mins of order stage TAT breached")]
    pub within_grace: String,
    #[serde(rename = "Notes added after 5 mins of order stage TAT breached")]
    pub after_grace: String,
    #[serde(rename = "Time gap between TAT breached and Notes added (mm:ss)")]
    pub gap: String,
}

pub struct ReportBuilder {
    scope: ReportScope,
}

impl ReportBuilder {
    /// `scope` must match the scope the outcomes were correlated under.
    pub fn new(scope: ReportScope) -> Self {
        Self { scope }
    }

    pub fn build(&self, outcomes: &[OrderOutcome]) -> Vec<ReportRow> {
        outcomes.iter().flat_map(|o| self.rows_for(o)).collect()
    }

    /// Rows for one order, taken from its correlations; stages without notes
    /// still get a row.
    pub fn rows_for(&self, outcome: &OrderOutcome) -> Vec<ReportRow> {
        let stages: Vec<&StageResult> = outcome
            .stages
            .iter()
            .filter(|s| self.scope.includes(s))
            .collect();

        if stages.is_empty() {
            return vec![ReportRow::placeholder(&outcome.identifier)];
        }

        let mut rows = Vec::new();
        for stage in stages {
            let start = rows.len();
            rows.extend(
                outcome
                    .correlations
                    .iter()
                    .filter(|c| c.stage == Some(stage.key))
                    .map(|c| ReportRow::for_correlation(&outcome.identifier, stage, c)),
            );
            if rows.len() == start {
                rows.push(ReportRow::for_stage(&outcome.identifier, stage));
            }
        }
        rows
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(ReportScope::default())
    }
}

pub fn format_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// Format a signed second count as `mm:ss`, minutes unbounded.
pub fn format_gap(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let secs = seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, secs / 60, secs % 60)
}
