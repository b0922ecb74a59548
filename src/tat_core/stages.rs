//! Fixed order-lifecycle stages and their TAT thresholds

use serde::{Deserialize, Serialize};

use crate::ingest_core::schema::CanonicalField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
    CreatedToPlaced,
    PlacedToAccepted,
    AcceptedToInKitchen,
    InKitchenToReady,
    ReadyToShipped,
}

impl StageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKey::CreatedToPlaced => "created_to_placed",
            StageKey::PlacedToAccepted => "placed_to_accepted",
            StageKey::AcceptedToInKitchen => "accepted_to_in_kitchen",
            StageKey::InKitchenToReady => "in_kitchen_to_ready",
            StageKey::ReadyToShipped => "ready_to_shipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        STAGE_DEFINITIONS
            .iter()
            .map(|d| d.key)
            .find(|k| k.as_str() == s)
    }
}

/// One timed segment of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDefinition {
    pub key: StageKey,
    pub label: &'static str,
    pub threshold_minutes: u32,
    pub start: CanonicalField,
    pub end: CanonicalField,
}

/// The stage sequence, in evaluation order.
///
/// `AcceptedToInKitchen` and `InKitchenToReady` share the accepted → ready
/// interval and are both evaluated against it with their own thresholds.
pub const STAGE_DEFINITIONS: [StageDefinition; 5] = [
    StageDefinition {
        key: StageKey::CreatedToPlaced,
        label: "Created → Placed",
        threshold_minutes: 5,
        start: CanonicalField::CreatedOn,
        end: CanonicalField::PlacedAt,
    },
    StageDefinition {
        key: StageKey::PlacedToAccepted,
        label: "Placed → Accepted",
        threshold_minutes: 7,
        start: CanonicalField::PlacedAt,
        end: CanonicalField::AcceptedAt,
    },
    StageDefinition {
        key: StageKey::AcceptedToInKitchen,
        label: "Order Accepted → Kitchen",
        threshold_minutes: 5,
        start: CanonicalField::AcceptedAt,
        end: CanonicalField::ReadyAt,
    },
    StageDefinition {
        key: StageKey::InKitchenToReady,
        label: "In Kitchen → Ready",
        threshold_minutes: 15,
        start: CanonicalField::AcceptedAt,
        end: CanonicalField::ReadyAt,
    },
    StageDefinition {
        key: StageKey::ReadyToShipped,
        label: "Ready → Shipped",
        threshold_minutes: 10,
        start: CanonicalField::ReadyAt,
        end: CanonicalField::ShippedAt,
    },
];

pub fn definition(key: StageKey) -> &'static StageDefinition {
    match key {
        StageKey::CreatedToPlaced => &STAGE_DEFINITIONS[0],
        StageKey::PlacedToAccepted => &STAGE_DEFINITIONS[1],
        StageKey::AcceptedToInKitchen => &STAGE_DEFINITIONS[2],
        StageKey::InKitchenToReady => &STAGE_DEFINITIONS[3],
        StageKey::ReadyToShipped => &STAGE_DEFINITIONS[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_lookup_matches_table() {
        for def in STAGE_DEFINITIONS.iter() {
            assert_eq!(definition(def.key), def);
            assert_eq!(StageKey::from_str(def.key.as_str()), Some(def.key));
        }
        assert_eq!(StageKey::from_str("unknown"), None);
    }

    #[test]
    fn test_kitchen_stages_share_interval() {
        let a = definition(StageKey::AcceptedToInKitchen);
        let b = definition(StageKey::InKitchenToReady);
        assert_eq!((a.start, a.end), (b.start, b.end));
        assert_ne!(a.threshold_minutes, b.threshold_minutes);
    }
}
