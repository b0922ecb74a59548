//! Run-level breach and note metrics

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::correlator::NoteIndex;
use super::outcome::OrderOutcome;
use super::stages::{StageDefinition, StageKey};
use crate::ingest_core::mapper::AnnotationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub key: StageKey,
    pub label: &'static str,
    pub threshold_minutes: u32,
    pub breached_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentMetrics {
    pub agent: String,
    pub notes_added: usize,
    pub unique_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub total_orders: usize,
    pub orders_with_breach: usize,
    pub orders_without_breach: usize,
    pub total_breaches: usize,
    pub total_notes: usize,
    pub orders_with_notes: usize,
    pub stages: Vec<StageSummary>,
    pub agents: Vec<AgentMetrics>,
}

impl RunMetrics {
    pub fn compute(
        definitions: &[StageDefinition],
        outcomes: &[OrderOutcome],
        notes: &NoteIndex,
    ) -> Self {
        let mut counts: HashMap<StageKey, usize> = HashMap::new();
        let mut orders_with_breach = 0;

        for outcome in outcomes {
            let mut any_breach = false;
            for stage in outcome.stages.iter().filter(|s| s.breached) {
                *counts.entry(stage.key).or_insert(0) += 1;
                any_breach = true;
            }
            if any_breach {
                orders_with_breach += 1;
            }
        }

        let stages: Vec<StageSummary> = definitions
            .iter()
            .map(|def| StageSummary {
                key: def.key,
                label: def.label,
                threshold_minutes: def.threshold_minutes,
                breached_count: counts.get(&def.key).copied().unwrap_or(0),
            })
            .collect();

        Self {
            total_orders: outcomes.len(),
            orders_with_breach,
            orders_without_breach: outcomes.len() - orders_with_breach,
            total_breaches: stages.iter().map(|s| s.breached_count).sum(),
            total_notes: notes.len(),
            orders_with_notes: notes.order_count(),
            stages,
            agents: agent_metrics(notes.iter()),
        }
    }
}

/// Notes and distinct orders per agent, busiest agents first.
pub fn agent_metrics<'a>(notes: impl Iterator<Item = &'a AnnotationRecord>) -> Vec<AgentMetrics> {
    let mut per_agent: HashMap<&str, (usize, HashSet<&str>)> = HashMap::new();
    for note in notes {
        let entry = per_agent.entry(note.agent.as_str()).or_default();
        entry.0 += 1;
        entry.1.insert(note.identifier.as_str());
    }

    let mut agents: Vec<AgentMetrics> = per_agent
        .into_iter()
        .map(|(agent, (notes_added, orders))| AgentMetrics {
            agent: agent.to_string(),
            notes_added,
            unique_orders: orders.len(),
        })
        .collect();

    agents.sort_by(|a, b| {
        b.notes_added
            .cmp(&a.notes_added)
            .then(b.unique_orders.cmp(&a.unique_orders))
            .then(a.agent.cmp(&b.agent))
    });
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest_core::mapper::OrderRecord;
    use crate::tat_core::breach::BreachEngine;
    use crate::tat_core::correlator::CorrelationEngine;
    use crate::tat_core::stages::STAGE_DEFINITIONS;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn note(id: &str, agent: &str) -> AnnotationRecord {
        AnnotationRecord::new(id, Some(at(10, 0)), "note", agent)
    }

    #[test]
    fn test_run_metrics_counts() {
        let mut kitchen = OrderRecord::new("A-1");
        kitchen.accepted_at = Some(at(9, 0));
        kitchen.ready_at = Some(at(9, 30));
        let clean = OrderRecord::new("A-2");

        let notes = NoteIndex::new(vec![note("A-1", "ravi"), note("Z-9", "ravi")]);
        let breaches = BreachEngine::with_defaults();
        let correlator = CorrelationEngine::with_defaults();
        let outcomes: Vec<OrderOutcome> = [kitchen, clean]
            .iter()
            .map(|o| OrderOutcome::evaluate(o, &notes, &breaches, &correlator))
            .collect();

        let metrics = RunMetrics::compute(&STAGE_DEFINITIONS, &outcomes, &notes);
        assert_eq!(metrics.total_orders, 2);
        assert_eq!(metrics.orders_with_breach, 1);
        assert_eq!(metrics.orders_without_breach, 1);
        assert_eq!(metrics.total_breaches, 2);
        assert_eq!(metrics.total_notes, 2);
        assert_eq!(metrics.orders_with_notes, 2);

        let counts: Vec<usize> = metrics.stages.iter().map(|s| s.breached_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 1, 0]);
    }

    #[test]
    fn test_agent_metrics_sorted_by_activity() {
        let notes = vec![
            note("A-1", "ravi"),
            note("A-1", "ravi"),
            note("A-2", "asha"),
            note("A-3", "asha"),
            note("A-4", ""),
        ];

        let agents = agent_metrics(notes.iter());
        assert_eq!(
            agents,
            vec![
                AgentMetrics {
                    agent: "asha".to_string(),
                    notes_added: 2,
                    unique_orders: 2
                },
                AgentMetrics {
                    agent: "ravi".to_string(),
                    notes_added: 2,
                    unique_orders: 1
                },
                AgentMetrics {
                    agent: "Unknown".to_string(),
                    notes_added: 1,
                    unique_orders: 1
                },
            ]
        );
    }
}
