//! Integration tests for the full analysis run
//!
//! Drives `TatAnalyzer` end to end over in-memory and CSV sources:
//! - header discovery behind a seller-dashboard preamble
//! - stage durations, breaches and first breach per order
//! - note classification and gap rendering in display rows
//! - schema failures reported for both tables at once

#[cfg(test)]
mod analysis_pipeline_tests {
    use std::io::Write;

    use tatflow::ingest_core::{CsvTableSource, MemoryTableSource, TableKind};
    use tatflow::tat_core::{Classification, StageKey, SENTINEL};
    use tatflow::{AnalysisConfig, AnalysisError, ReportScope, TatAnalyzer};
    use tempfile::NamedTempFile;

    const ORDER_HEADER: [&str; 6] = [
        "Network Order Id",
        "Created On",
        "Order Placed Time",
        "Order Accepted Time",
        "Order Ready Time",
        "Shipped At Date & Time",
    ];

    const NOTE_HEADER: [&str; 4] = ["Network order ID", "Created at", "Description", "Reported by"];

    /// Orders export as the dashboard produces it: 11 preamble rows, header on row 11.
    fn orders_export(rows: &[[&str; 6]]) -> MemoryTableSource {
        let mut grid: Vec<Vec<String>> = (0..11)
            .map(|i| vec![format!("Report line {}", i)])
            .collect();
        grid.push(ORDER_HEADER.iter().map(|s| s.to_string()).collect());
        for row in rows {
            grid.push(row.iter().map(|s| s.to_string()).collect());
        }
        MemoryTableSource::from_strings("orders", grid)
    }

    fn notes_export(rows: &[[&str; 4]]) -> MemoryTableSource {
        let mut grid: Vec<Vec<&str>> = vec![NOTE_HEADER.to_vec()];
        grid.extend(rows.iter().map(|r| r.to_vec()));
        MemoryTableSource::from_strings("notes", grid)
    }

    #[test]
    fn test_created_to_placed_within_threshold() {
        let orders = orders_export(&[["A-1", "2024-01-01 10:00", "2024-01-01 10:04", "", "", ""]]);
        let notes = notes_export(&[]);

        let report = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap();
        assert_eq!(report.orders_mapping.header_row, 11);

        let stage = &report.outcomes[0].stages[0];
        assert_eq!(stage.key, StageKey::CreatedToPlaced);
        assert_eq!(stage.duration_minutes, Some(4.0));
        assert!(!stage.breached);
        assert!(report.outcomes[0].first_breach.is_none());
        assert_eq!(report.metrics.orders_without_breach, 1);
    }

    #[test]
    fn test_kitchen_stages_both_breach_and_notes_classified() {
        let orders = orders_export(&[[
            "A-2",
            "",
            "",
            "2024-01-01 09:00",
            "2024-01-01 09:30",
            "",
        ]]);
        let notes = notes_export(&[
            ["A-2", "2024-01-01 09:40", "escalated to store", "ravi"],
            ["A-2", "2024-01-01 09:33", "called kitchen", "asha"],
        ]);

        let report = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap();
        let outcome = &report.outcomes[0];

        let kitchen: Vec<(StageKey, Option<f64>, bool)> = outcome
            .stages
            .iter()
            .filter(|s| s.breached)
            .map(|s| (s.key, s.duration_minutes, s.breached))
            .collect();
        assert_eq!(
            kitchen,
            vec![
                (StageKey::AcceptedToInKitchen, Some(30.0), true),
                (StageKey::InKitchenToReady, Some(30.0), true),
            ]
        );
        assert_eq!(
            outcome.first_breach.as_ref().map(|s| s.key),
            Some(StageKey::AcceptedToInKitchen)
        );

        // Two breached stages × two notes, notes in time order.
        assert_eq!(report.rows.len(), 4);
        let within = report.rows[0].to_display();
        assert_eq!(within.agent, "asha");
        assert_eq!(within.within_grace, "Yes");
        assert_eq!(within.after_grace, SENTINEL);
        assert_eq!(within.gap, "03:00");
        assert_eq!(within.breached_at, "2024-01-01 09:30");

        let after = report.rows[1].to_display();
        assert_eq!(after.agent, "ravi");
        assert_eq!(after.within_grace, SENTINEL);
        assert_eq!(after.after_grace, "Yes");
        assert_eq!(after.gap, "10:00");

        assert_eq!(report.metrics.total_breaches, 2);
        assert_eq!(report.metrics.agents.len(), 2);
    }

    #[test]
    fn test_order_without_timestamps_gets_placeholder() {
        let orders = orders_export(&[["E-1", "", "", "", "", ""], ["", "", "", "", "", ""]]);
        let notes = notes_export(&[["E-1", "not a date", "", ""]]);

        let report = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap();

        // Blank identifiers are dropped.
        assert_eq!(report.outcomes.len(), 1);
        let outcome = &report.outcomes[0];
        assert!(!outcome.has_breach());
        assert!(outcome.first_breach.is_none());
        assert!(outcome.stages.iter().all(|s| s.duration_minutes.is_none()));
        assert_eq!(
            outcome.correlations[0].classification,
            Classification::Unclassified
        );

        assert_eq!(report.rows.len(), 1);
        let display = report.rows[0].to_display();
        assert_eq!(display.order_id, "E-1");
        assert_eq!(display.breached, SENTINEL);
        assert_eq!(display.stage, SENTINEL);
        assert_eq!(display.note_at, SENTINEL);
    }

    #[test]
    fn test_resolvable_scope_reports_unbreached_stages() {
        let orders = orders_export(&[["A-1", "2024-01-01 10:00", "2024-01-01 10:04", "", "", ""]]);
        let notes = notes_export(&[]);
        let analyzer = TatAnalyzer::new(AnalysisConfig {
            report_scope: ReportScope::ResolvableStages,
            ..AnalysisConfig::default()
        });

        let report = analyzer.run(&orders, &notes).unwrap();
        assert_eq!(report.rows.len(), 1);
        let display = report.rows[0].to_display();
        assert_eq!(display.breached, "No");
        assert_eq!(display.stage, "Created → Placed");
    }

    #[test]
    fn test_schema_failure_names_both_tables() {
        let orders = MemoryTableSource::from_strings(
            "orders",
            vec![vec!["Order ID", "Created On", "Placed At"], vec!["A-1", "", ""]],
        );
        let notes = MemoryTableSource::from_strings(
            "notes",
            vec![vec!["Order ID", "Description"], vec!["A-1", "hello"]],
        );

        let err = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Missing columns in Orders"));
        assert!(message.contains("Missing columns in Notes"));

        match err {
            AnalysisError::SchemaUnresolved(tables) => {
                assert_eq!(tables.len(), 2);
                assert_eq!(tables[0].table, TableKind::Orders);
                assert_eq!(tables[0].missing.len(), 3);
                assert_eq!(tables[1].table, TableKind::Notes);
                assert_eq!(tables[1].missing.len(), 1);
            }
            other => panic!("expected schema failure, got {}", other),
        }
    }

    #[test]
    fn test_csv_sources_end_to_end() {
        let mut orders_file = NamedTempFile::new().unwrap();
        writeln!(orders_file, "Seller Orders Export").unwrap();
        writeln!(orders_file, "Generated,2024-01-02").unwrap();
        writeln!(
            orders_file,
            "Order ID,Created On,Placed At,Accepted At,Ready At,Shipped At"
        )
        .unwrap();
        writeln!(
            orders_file,
            "R-7,2024-01-01 12:00,2024-01-01 12:02,2024-01-01 12:04,2024-01-01 12:08,2024-01-01 12:30"
        )
        .unwrap();
        orders_file.flush().unwrap();

        let mut notes_file = NamedTempFile::new().unwrap();
        writeln!(notes_file, "Order ID,Note Time,Notes,Agent").unwrap();
        writeln!(notes_file, "R-7,2024-01-01 12:31,\"rider, stuck\",meera").unwrap();
        notes_file.flush().unwrap();

        let orders = CsvTableSource::new("orders", orders_file.path());
        let notes = CsvTableSource::new("notes", notes_file.path());
        let report = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap();

        assert_eq!(report.orders_mapping.header_row, 2);
        assert_eq!(report.notes_mapping.header_row, 0);
        assert_eq!(
            report.outcomes[0].first_breach.as_ref().map(|s| s.key),
            Some(StageKey::ReadyToShipped)
        );

        assert_eq!(report.rows.len(), 1);
        let display = report.rows[0].to_display();
        assert_eq!(display.stage, "Ready → Shipped");
        assert_eq!(display.description, "rider, stuck");
        assert_eq!(display.agent, "meera");
        assert_eq!(display.gap, "01:00");
    }

    #[test]
    fn test_non_utf8_note_text_does_not_abort_run() {
        let mut orders_file = NamedTempFile::new().unwrap();
        writeln!(orders_file, "Order ID,Created On,Placed At,Accepted At,Ready At,Shipped At").unwrap();
        writeln!(orders_file, "R-7,,,,2024-01-01 12:08,2024-01-01 12:30").unwrap();
        orders_file.flush().unwrap();

        let mut notes_file = NamedTempFile::new().unwrap();
        notes_file.write_all(b"Order ID,Note Time,Notes,Agent\n").unwrap();
        notes_file
            .write_all(b"R-7,2024-01-01 12:31,caf\xe9 closed,meera\n")
            .unwrap();
        notes_file.flush().unwrap();

        let orders = CsvTableSource::new("orders", orders_file.path());
        let notes = CsvTableSource::new("notes", notes_file.path());
        let report = TatAnalyzer::with_defaults().run(&orders, &notes).unwrap();

        assert_eq!(report.rows.len(), 1);
        let display = report.rows[0].to_display();
        assert_eq!(display.description, "caf\u{FFFD} closed");
        assert_eq!(display.agent, "meera");
        assert_eq!(display.within_grace, "Yes");
    }
}
