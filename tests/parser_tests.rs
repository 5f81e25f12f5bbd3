//! Spec loading and validation tests against the fixtures in test-data/

use budget_generator::parser::{collect_problems, load_spec, parse_spec};
use budget_generator::types::{TransactionType, Visibility};
use budget_generator::BudgetError;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

// ═══════════════════════════════════════════════════════════════════════════
// VALID SPECS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_tutorial_spec() {
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();

    assert_eq!(spec.workbook.sheets.len(), 6);
    assert_eq!(spec.workbook.sheets[1].visibility, Visibility::Hidden);
    assert_eq!(spec.workbook.named_ranges.len(), 16);
    assert_eq!(spec.workbook.named_ranges["YearsList"].reference, "$B$3:$B$7");

    assert_eq!(spec.sheets.settings.general.starting_year, 2025);
    assert_eq!(spec.sheets.dropdown.years.count, 5);
    assert_eq!(
        spec.sheets.planning.categories.expenses.as_deref(),
        Some(
            &[
                "Rent".to_string(),
                "Groceries".to_string(),
                "Utilities".to_string(),
                "Transport".to_string(),
            ][..]
        )
    );

    let entries: Vec<_> = spec
        .sheets
        .tracking
        .sample_entries
        .iter()
        .filter_map(|raw| raw.to_entry())
        .collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].transaction_type, TransactionType::Saving);
    assert_eq!(entries[2].details, None);
}

#[test]
fn test_minimal_spec_uses_defaults() {
    let spec = parse_spec(&fixture("minimal_spec.json")).unwrap();

    assert_eq!(spec.sheets.planning.scaffold_years, 16);
    assert_eq!(spec.sheets.tracking.max_rows, 200);
    assert_eq!(spec.sheets.tracking.table_name, "tblTracking");
    assert_eq!(spec.sheets.dashboard.selectors.default_period, "Jan");
    assert!(spec.workbook.named_ranges.is_empty());
    assert!(spec
        .workbook
        .sheets
        .iter()
        .all(|s| s.visibility == Visibility::Visible));
}

#[test]
fn test_empty_category_lists_are_kept() {
    let spec = parse_spec(&fixture("empty_categories_spec.json")).unwrap();
    assert_eq!(spec.sheets.planning.categories.income, Some(vec![]));
    assert_eq!(spec.sheets.planning.scaffold_years, 2);
    assert_eq!(spec.workbook.sheets[4].visibility, Visibility::VeryHidden);
}

// ═══════════════════════════════════════════════════════════════════════════
// LOAD ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_file() {
    let err = parse_spec(&fixture("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, BudgetError::SpecNotFound { .. }));
    assert!(err.to_string().starts_with("Specification not found:"));
    assert!(err.is_spec_error());
}

#[test]
fn test_malformed_json_reports_position() {
    let err = load_spec(&fixture("malformed.json")).unwrap_err();
    match err {
        BudgetError::SpecParse { line, column, .. } => {
            assert_eq!(line, 6);
            assert!(column > 0);
        }
        other => panic!("expected SpecParse, got {other:?}"),
    }
}

#[test]
fn test_empty_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "").unwrap();

    let err = parse_spec(&path).unwrap_err();
    assert!(err.to_string().starts_with("Invalid JSON in"));
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_invalid_spec_reports_every_problem() {
    let err = parse_spec(&fixture("invalid_spec.json")).unwrap_err();
    let BudgetError::Validation(problems) = &err else {
        panic!("expected Validation, got {err:?}");
    };

    let expected = [
        "Sheet entry #4 has unknown name 'Mystery Sheet'",
        "Missing required sheets: Dropdown Data, Calculations, Budget Dashboard",
        "Named range 'Broken' targets unknown sheet 'Nowhere'",
        "Sample entry #1 has invalid date '2025-13-40' (expected YYYY-MM-DD)",
        "Sample entry #1: unknown transaction type 'Refund' (expected Income, Expense or Saving)",
    ];
    for message in expected {
        assert!(
            problems.iter().any(|p| p == message),
            "missing '{}' in {:?}",
            message,
            problems
        );
    }

    let text = err.to_string();
    assert!(text.starts_with("Specification validation failed:"));
    assert!(text.contains("; "));
}

#[test]
fn test_schema_type_errors_collected() {
    let value = serde_json::json!({
        "meta": {},
        "workbook": {"sheets": "Settings", "named_ranges": {}},
        "sheets": {"Settings": {"general": {"starting_year": "soon"}}}
    });

    let problems = collect_problems(&value);
    assert!(problems.len() >= 2, "{:?}", problems);
}
