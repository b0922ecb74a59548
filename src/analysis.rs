//! End-to-end analysis run: resolve → map → evaluate → report

use log::{info, warn};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, ResolveError};
use crate::ingest_core::{
    FieldAliasSpec, HeaderMapping, HeaderResolver, ResolvedTable, RowMapper, TableSource,
};
use crate::tat_core::{
    BreachEngine, CorrelationEngine, NoteIndex, OrderOutcome, ReportBuilder, ReportRow, RunMetrics,
    BREACH_NOTE_GRACE_MINUTES,
};

/// Everything produced by one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub outcomes: Vec<OrderOutcome>,
    pub rows: Vec<ReportRow>,
    pub metrics: RunMetrics,
    pub orders_mapping: HeaderMapping,
    pub notes_mapping: HeaderMapping,
}

pub struct TatAnalyzer {
    config: AnalysisConfig,
    resolver: HeaderResolver,
    breaches: BreachEngine,
    correlator: CorrelationEngine,
    orders_spec: FieldAliasSpec,
    notes_spec: FieldAliasSpec,
}

impl TatAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            resolver: HeaderResolver::new(config.max_header_row),
            breaches: BreachEngine::with_defaults(),
            correlator: CorrelationEngine::new(BREACH_NOTE_GRACE_MINUTES, config.report_scope),
            orders_spec: FieldAliasSpec::orders(),
            notes_spec: FieldAliasSpec::notes(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full analysis over one orders source and one notes source.
    ///
    /// Both tables are resolved before failing, so a schema error names every
    /// table that could not be mapped.
    pub fn run(
        &self,
        orders: &dyn TableSource,
        notes: &dyn TableSource,
    ) -> Result<AnalysisReport, AnalysisError> {
        let orders_resolved = self.resolver.resolve(
            orders,
            &self.orders_spec,
            Some(self.config.orders_header_row),
        );
        let notes_resolved =
            self.resolver
                .resolve(notes, &self.notes_spec, Some(self.config.notes_header_row));

        let (orders_table, notes_table) = collect_resolved(orders_resolved, notes_resolved)?;

        let order_records = RowMapper::map_orders(&orders_table);
        let note_index = NoteIndex::new(RowMapper::map_annotations(&notes_table));
        info!(
            "📥 Loaded {} orders and {} notes",
            order_records.len(),
            note_index.len()
        );

        let outcomes: Vec<OrderOutcome> = order_records
            .iter()
            .map(|order| {
                OrderOutcome::evaluate(order, &note_index, &self.breaches, &self.correlator)
            })
            .collect();

        let rows = ReportBuilder::new(self.correlator.scope()).build(&outcomes);
        let metrics = RunMetrics::compute(self.breaches.stages(), &outcomes, &note_index);

        info!(
            "📊 {} orders, {} with breach, {} breaches, {} report rows",
            metrics.total_orders,
            metrics.orders_with_breach,
            metrics.total_breaches,
            rows.len()
        );

        Ok(AnalysisReport {
            outcomes,
            rows,
            metrics,
            orders_mapping: orders_table.mapping,
            notes_mapping: notes_table.mapping,
        })
    }
}

impl Default for TatAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Combine both resolution results. Source errors win over schema errors;
/// schema errors from both tables are reported together.
fn collect_resolved(
    orders: Result<ResolvedTable, ResolveError>,
    notes: Result<ResolvedTable, ResolveError>,
) -> Result<(ResolvedTable, ResolvedTable), AnalysisError> {
    match (orders, notes) {
        (Ok(o), Ok(n)) => Ok((o, n)),
        (Err(ResolveError::Source(e)), _) | (_, Err(ResolveError::Source(e))) => {
            Err(AnalysisError::Source(e))
        }
        (orders, notes) => {
            let unresolved: Vec<_> = [orders.err(), notes.err()]
                .into_iter()
                .flatten()
                .filter_map(|e| match e {
                    ResolveError::Unresolved(u) => Some(u),
                    ResolveError::Source(_) => None,
                })
                .collect();
            for table in &unresolved {
                warn!("❌ {}", table);
            }
            Err(AnalysisError::SchemaUnresolved(unresolved))
        }
    }
}
