//! Canonical field sets and the header aliases each field accepts

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Identifier,
    CreatedOn,
    PlacedAt,
    AcceptedAt,
    ReadyAt,
    ShippedAt,
    NoteAt,
    Description,
    Agent,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Identifier => "identifier",
            CanonicalField::CreatedOn => "createdOn",
            CanonicalField::PlacedAt => "placedAt",
            CanonicalField::AcceptedAt => "acceptedAt",
            CanonicalField::ReadyAt => "readyAt",
            CanonicalField::ShippedAt => "shippedAt",
            CanonicalField::NoteAt => "noteAt",
            CanonicalField::Description => "description",
            CanonicalField::Agent => "agent",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Orders,
    Notes,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Orders => "Orders",
            TableKind::Notes => "Notes",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted header strings for one canonical field, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
    pub required: bool,
}

impl FieldAliases {
    pub fn required(field: CanonicalField, aliases: &[&str]) -> Self {
        Self {
            field,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            required: true,
        }
    }

    pub fn optional(field: CanonicalField, aliases: &[&str]) -> Self {
        Self {
            required: false,
            ..Self::required(field, aliases)
        }
    }
}

/// Header vocabulary of one table kind. Built once and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliasSpec {
    pub table: TableKind,
    pub fields: Vec<FieldAliases>,
}

const ORDER_ID_ALIASES: &[&str] = &[
    "Network Order Id",
    "Network Order ID",
    "Network order id",
    "order id",
    "Order ID",
    "Order No",
    "Order Number",
    "Order #",
    "Order Reference",
    "Network Ref",
];

const NOTE_ID_ALIASES: &[&str] = &[
    "Network order ID",
    "Network Order Id",
    "Network Order ID",
    "Network order id",
    "Order ID",
    "Order No",
    "Order Number",
    "Order #",
    "Order Reference",
    "Network Ref",
];

impl FieldAliasSpec {
    pub fn new(table: TableKind, fields: Vec<FieldAliases>) -> Self {
        Self { table, fields }
    }

    /// Order-lifecycle export: identifier plus all five timestamps are required.
    pub fn orders() -> Self {
        Self::new(
            TableKind::Orders,
            vec![
                FieldAliases::required(CanonicalField::Identifier, ORDER_ID_ALIASES),
                FieldAliases::required(
                    CanonicalField::CreatedOn,
                    &["Created On", "Created", "Created Date", "Created Time"],
                ),
                FieldAliases::required(
                    CanonicalField::PlacedAt,
                    &["Order Placed Time", "Placed At", "Order Placed", "Placed Time"],
                ),
                FieldAliases::required(
                    CanonicalField::AcceptedAt,
                    &["Order Accepted Time", "Accepted At", "Order Accepted", "Accepted Time"],
                ),
                FieldAliases::required(
                    CanonicalField::ReadyAt,
                    &["Order Ready Time", "Ready At", "Order Ready", "Ready Time"],
                ),
                FieldAliases::required(
                    CanonicalField::ShippedAt,
                    &[
                        "Shipped At Date & Time",
                        "Shipped at",
                        "Shipped At",
                        "Shipped Time",
                        "Out For Delivery",
                    ],
                ),
            ],
        )
    }

    /// Notes export: only identifier and note time are required.
    pub fn notes() -> Self {
        Self::new(
            TableKind::Notes,
            vec![
                FieldAliases::required(CanonicalField::Identifier, NOTE_ID_ALIASES),
                FieldAliases::required(
                    CanonicalField::NoteAt,
                    &["Created at", "Note Time", "Created On", "Created"],
                ),
                FieldAliases::optional(
                    CanonicalField::Description,
                    &["Description", "Notes", "Comment", "Body"],
                ),
                FieldAliases::optional(
                    CanonicalField::Agent,
                    &[
                        "Reported by",
                        "Agent",
                        "Agent Name",
                        "User",
                        "Updated By",
                        "Created By",
                        "Author",
                        "Owner",
                        "Assignee",
                    ],
                ),
            ],
        )
    }

    pub fn aliases_for(&self, field: CanonicalField) -> Option<&FieldAliases> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldAliases> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Normalize a header label for comparison.
///
/// Lowercases, turns newlines and tabs into spaces, collapses whitespace runs
/// and trims.
pub fn normalize_label(label: &str) -> String {
    let mut normalized = String::with_capacity(label.len());
    let mut seen_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.extend(ch.to_lowercase());
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}
