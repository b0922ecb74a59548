//! Header row discovery and alias-based column mapping

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::schema::{normalize_label, CanonicalField, FieldAliasSpec, FieldAliases, TableKind};
use super::table::{RawTable, TableSource};
use crate::errors::ResolveError;

/// Last header row index tried when scanning a source.
pub const DEFAULT_MAX_HEADER_ROW: usize = 30;

/// Upper bound for any configured scan depth.
pub const MAX_HEADER_ROW_LIMIT: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMapping {
    pub header_row: usize,
    pub columns: BTreeMap<CanonicalField, ResolvedColumn>,
}

impl HeaderMapping {
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).map(|c| c.index)
    }
}

/// Parsed table together with the mapping that was accepted for it.
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    pub table: RawTable,
    pub mapping: HeaderMapping,
}

/// A required field none of whose aliases appear in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "any of {:?} for '{}'", self.aliases, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaUnresolved {
    pub table: TableKind,
    pub header_row: usize,
    pub missing: Vec<MissingField>,
}

impl SchemaUnresolved {
    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        self.missing.iter().map(|m| m.field).collect()
    }
}

impl fmt::Display for SchemaUnresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing: Vec<String> = self.missing.iter().map(|m| m.to_string()).collect();
        write!(f, "Missing columns in {}: {}", self.table, missing.join(", "))
    }
}

impl std::error::Error for SchemaUnresolved {}

pub struct HeaderResolver {
    max_header_row: usize,
}

impl HeaderResolver {
    /// `max_header_row` is capped at `MAX_HEADER_ROW_LIMIT`.
    pub fn new(max_header_row: usize) -> Self {
        Self {
            max_header_row: max_header_row.min(MAX_HEADER_ROW_LIMIT),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_MAX_HEADER_ROW)
    }

    pub fn max_header_row(&self) -> usize {
        self.max_header_row
    }

    /// Candidate header rows: the preferred row first, then `0..=max_header_row`.
    pub fn candidates(&self, preferred: Option<usize>) -> Vec<usize> {
        let mut rows = Vec::with_capacity(self.max_header_row.saturating_add(2));
        rows.extend(preferred);
        rows.extend((0..=self.max_header_row).filter(|idx| Some(*idx) != preferred));
        rows
    }

    /// Find the first candidate header row under which every required field resolves.
    ///
    /// On failure the missing fields are reported against the first candidate
    /// that could be read, normally the preferred row.
    pub fn resolve(
        &self,
        source: &dyn TableSource,
        spec: &FieldAliasSpec,
        preferred: Option<usize>,
    ) -> Result<ResolvedTable, ResolveError> {
        let mut first_readable: Option<(usize, Vec<MissingField>)> = None;

        for header_row in self.candidates(preferred) {
            let table = match source.read_with_header(header_row) {
                Ok(table) => table,
                Err(e) => {
                    log::debug!(
                        "{}: header row {} unreadable: {}",
                        source.name(),
                        header_row,
                        e
                    );
                    continue;
                }
            };

            let (columns, missing) = match_columns(&table.columns, spec);
            if missing.is_empty() {
                log::info!(
                    "🧭 {}: header row {} resolved ({} of {} fields mapped)",
                    source.name(),
                    header_row,
                    columns.len(),
                    spec.fields.len()
                );
                return Ok(ResolvedTable {
                    mapping: HeaderMapping {
                        header_row,
                        columns,
                    },
                    table,
                });
            }
            log::debug!(
                "{}: header row {} missing {:?}",
                source.name(),
                header_row,
                missing.iter().map(|m| m.field).collect::<Vec<_>>()
            );
            if first_readable.is_none() {
                first_readable = Some((header_row, missing));
            }
        }

        let (fallback, missing) = match first_readable {
            Some(found) => found,
            None => {
                // Nothing was readable: surface the error for the row we expected.
                let row = preferred.unwrap_or(0);
                let table = source.read_with_header(row)?;
                (row, match_columns(&table.columns, spec).1)
            }
        };

        log::warn!(
            "⚠️  {}: no header row satisfied the {} schema, falling back to row {}",
            source.name(),
            spec.table,
            fallback
        );

        Err(SchemaUnresolved {
            table: spec.table,
            header_row: fallback,
            missing,
        }
        .into())
    }
}

impl Default for HeaderResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Map every field of `spec` onto `labels`, returning resolved columns and
/// the required fields that found no column.
pub fn match_columns(
    labels: &[String],
    spec: &FieldAliasSpec,
) -> (BTreeMap<CanonicalField, ResolvedColumn>, Vec<MissingField>) {
    let normalized: Vec<String> = labels.iter().map(|l| normalize_label(l)).collect();
    let mut columns = BTreeMap::new();
    let mut missing = Vec::new();

    for field in &spec.fields {
        match find_column(&normalized, field) {
            Some(index) => {
                columns.insert(
                    field.field,
                    ResolvedColumn {
                        index,
                        label: labels[index].clone(),
                    },
                );
            }
            None if field.required => missing.push(MissingField {
                field: field.field,
                aliases: field.aliases.clone(),
            }),
            None => {}
        }
    }

    (columns, missing)
}

fn find_column(normalized: &[String], field: &FieldAliases) -> Option<usize> {
    field.aliases.iter().find_map(|alias| {
        let alias = normalize_label(alias);
        normalized.iter().position(|label| *label == alias)
    })
}
