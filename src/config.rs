//! Analysis configuration from environment variables

use log::warn;
use std::env;
use std::str::FromStr;

use crate::ingest_core::resolver::{DEFAULT_MAX_HEADER_ROW, MAX_HEADER_ROW_LIMIT};
pub use crate::tat_core::correlator::ReportScope;

/// Header row the orders export usually carries its labels on.
pub const DEFAULT_ORDERS_HEADER_ROW: usize = 11;
pub const DEFAULT_NOTES_HEADER_ROW: usize = 0;

/// Configuration for one analysis run
///
/// Loaded from environment variables with defaults; invalid values are
/// logged and replaced by the default.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Header row tried first for the orders table
    pub orders_header_row: usize,

    /// Header row tried first for the notes table
    pub notes_header_row: usize,

    /// Last row index scanned when looking for a header
    pub max_header_row: usize,

    pub report_scope: ReportScope,
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TATFLOW_ORDERS_HEADER_ROW` (default: 11)
    /// - `TATFLOW_NOTES_HEADER_ROW` (default: 0)
    /// - `TATFLOW_MAX_HEADER_ROW` (default: 30, at most 1000)
    /// - `TATFLOW_REPORT_SCOPE` (default: breached; also resolvable)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this over `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let report_scope = match lookup("TATFLOW_REPORT_SCOPE") {
            Some(raw) => ReportScope::from_str(&raw).unwrap_or_else(|| {
                warn!(
                    "⚠️  Invalid TATFLOW_REPORT_SCOPE '{}', using '{}'",
                    raw,
                    defaults.report_scope.as_str()
                );
                defaults.report_scope
            }),
            None => defaults.report_scope,
        };

        Self {
            orders_header_row: parse_or(
                &lookup,
                "TATFLOW_ORDERS_HEADER_ROW",
                defaults.orders_header_row,
            ),
            notes_header_row: parse_or(&lookup, "TATFLOW_NOTES_HEADER_ROW", defaults.notes_header_row),
            max_header_row: bounded_or(
                parse_or(&lookup, "TATFLOW_MAX_HEADER_ROW", defaults.max_header_row),
                "TATFLOW_MAX_HEADER_ROW",
                MAX_HEADER_ROW_LIMIT,
                defaults.max_header_row,
            ),
            report_scope,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            orders_header_row: DEFAULT_ORDERS_HEADER_ROW,
            notes_header_row: DEFAULT_NOTES_HEADER_ROW,
            max_header_row: DEFAULT_MAX_HEADER_ROW,
            report_scope: ReportScope::default(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("⚠️  Invalid {} '{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn bounded_or(value: usize, key: &str, limit: usize, default: usize) -> usize {
    if value > limit {
        warn!("⚠️  {} {} exceeds {}, using {}", key, value, limit, default);
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.orders_header_row, 11);
        assert_eq!(config.notes_header_row, 0);
        assert_eq!(config.max_header_row, 30);
        assert_eq!(config.report_scope, ReportScope::BreachedStages);
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_custom_config() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("TATFLOW_ORDERS_HEADER_ROW", "3"),
            ("TATFLOW_NOTES_HEADER_ROW", " 1 "),
            ("TATFLOW_MAX_HEADER_ROW", "50"),
            ("TATFLOW_REPORT_SCOPE", "resolvable"),
        ]));

        assert_eq!(config.orders_header_row, 3);
        assert_eq!(config.notes_header_row, 1);
        assert_eq!(config.max_header_row, 50);
        assert_eq!(config.report_scope, ReportScope::ResolvableStages);
    }

    #[test]
    fn test_oversized_scan_depth_falls_back() {
        let huge = usize::MAX.to_string();
        let config = AnalysisConfig::from_lookup(lookup_from(&[(
            "TATFLOW_MAX_HEADER_ROW",
            huge.as_str(),
        )]));
        assert_eq!(config.max_header_row, 30);

        let config = AnalysisConfig::from_lookup(lookup_from(&[("TATFLOW_MAX_HEADER_ROW", "1000")]));
        assert_eq!(config.max_header_row, 1000);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("TATFLOW_ORDERS_HEADER_ROW", "eleven"),
            ("TATFLOW_MAX_HEADER_ROW", "-4"),
            ("TATFLOW_REPORT_SCOPE", "sometimes"),
        ]));

        assert_eq!(config, AnalysisConfig::default());
    }
}
