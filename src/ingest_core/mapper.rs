//! Canonical record construction from resolved tables

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::coerce::coerce_timestamp;
use super::resolver::ResolvedTable;
use super::schema::CanonicalField;
use super::table::CellValue;

/// Agent name used when a note carries no author.
pub const UNKNOWN_AGENT: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub identifier: String,
    pub created_on: Option<NaiveDateTime>,
    pub placed_at: Option<NaiveDateTime>,
    pub accepted_at: Option<NaiveDateTime>,
    pub ready_at: Option<NaiveDateTime>,
    pub shipped_at: Option<NaiveDateTime>,
}

impl OrderRecord {
    /// Order with only an identifier; every lifecycle timestamp absent.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            created_on: None,
            placed_at: None,
            accepted_at: None,
            ready_at: None,
            shipped_at: None,
        }
    }

    /// Lifecycle timestamp selected by a canonical field.
    pub fn timestamp(&self, field: CanonicalField) -> Option<NaiveDateTime> {
        match field {
            CanonicalField::CreatedOn => self.created_on,
            CanonicalField::PlacedAt => self.placed_at,
            CanonicalField::AcceptedAt => self.accepted_at,
            CanonicalField::ReadyAt => self.ready_at,
            CanonicalField::ShippedAt => self.shipped_at,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub identifier: String,
    pub note_at: Option<NaiveDateTime>,
    pub description: String,
    pub agent: String,
}

impl AnnotationRecord {
    pub fn new(
        identifier: impl Into<String>,
        note_at: Option<NaiveDateTime>,
        description: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        let agent = agent.into();
        let agent = agent.trim();
        Self {
            identifier: identifier.into(),
            note_at,
            description: description.into(),
            agent: if agent.is_empty() {
                UNKNOWN_AGENT.to_string()
            } else {
                agent.to_string()
            },
        }
    }
}

pub struct RowMapper;

impl RowMapper {
    /// Build order records, dropping rows without an identifier.
    pub fn map_orders(resolved: &ResolvedTable) -> Vec<OrderRecord> {
        let rows = Self::identified_rows(resolved);
        let timestamp = |row: usize, field| coerce_timestamp(Self::cell(resolved, row, field));

        let orders: Vec<OrderRecord> = rows
            .into_iter()
            .map(|(row, identifier)| OrderRecord {
                identifier,
                created_on: timestamp(row, CanonicalField::CreatedOn),
                placed_at: timestamp(row, CanonicalField::PlacedAt),
                accepted_at: timestamp(row, CanonicalField::AcceptedAt),
                ready_at: timestamp(row, CanonicalField::ReadyAt),
                shipped_at: timestamp(row, CanonicalField::ShippedAt),
            })
            .collect();

        log::debug!(
            "Mapped {} orders from {} rows",
            orders.len(),
            resolved.table.row_count()
        );
        orders
    }

    /// Build annotation records, dropping rows without an identifier.
    pub fn map_annotations(resolved: &ResolvedTable) -> Vec<AnnotationRecord> {
        let rows = Self::identified_rows(resolved);
        let text = |row: usize, field| Self::cell(resolved, row, field).as_text().unwrap_or_default();

        let notes: Vec<AnnotationRecord> = rows
            .into_iter()
            .map(|(row, identifier)| {
                AnnotationRecord::new(
                    identifier,
                    coerce_timestamp(Self::cell(resolved, row, CanonicalField::NoteAt)),
                    text(row, CanonicalField::Description),
                    text(row, CanonicalField::Agent),
                )
            })
            .collect();

        log::debug!(
            "Mapped {} notes from {} rows",
            notes.len(),
            resolved.table.row_count()
        );
        notes
    }

    /// Row indices paired with their trimmed identifier; blank identifiers are skipped.
    fn identified_rows(resolved: &ResolvedTable) -> Vec<(usize, String)> {
        (0..resolved.table.row_count())
            .filter_map(|row| {
                let id = Self::cell(resolved, row, CanonicalField::Identifier).as_text()?;
                let id = id.trim();
                (!id.is_empty()).then(|| (row, id.to_string()))
            })
            .collect()
    }

    fn cell(resolved: &ResolvedTable, row: usize, field: CanonicalField) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        match resolved.mapping.column(field) {
            Some(column) => resolved.table.cell(row, column),
            None => &EMPTY,
        }
    }
}
