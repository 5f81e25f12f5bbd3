//! End-to-end workbook generation tests
//!
//! Generates real .xlsx files into temp directories and reads them back with
//! calamine (structure) and zip (table and chart parts).

use budget_generator::excel::{read_workbook, ExcelImporter};
use budget_generator::generator::{named_range_drift, GeneratorState, WorkbookGenerator};
use budget_generator::parser::parse_spec;
use budget_generator::workbook::CellValue;
use budget_generator::{generate_workbook, BudgetError, GeneratorError, Visibility};
use pretty_assertions::assert_eq;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

fn generate_fixture(name: &str, dir: &TempDir) -> (WorkbookGenerator, PathBuf) {
    let output = dir.path().join("budget.xlsx");
    let mut generator = WorkbookGenerator::from_path(&fixture(name)).unwrap();
    generator.generate(&output).unwrap();
    (generator, output)
}

fn zip_entries(path: &Path, prefix: &str) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
        .collect();
    names.sort();
    names
}

fn zip_text(path: &Path, entry: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut text = String::new();
    archive
        .by_name(entry)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

/// The `<sheet .../>` element for `name` in xl/workbook.xml.
fn sheet_element(path: &Path, name: &str) -> String {
    let xml = zip_text(path, "xl/workbook.xml");
    let start = xml
        .find(&format!(r#"<sheet name="{}""#, name))
        .unwrap_or_else(|| panic!("no sheet '{}' in {}", name, xml));
    let end = start + xml[start..].find("/>").unwrap();
    xml[start..end].to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// STATE MACHINE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_state_progression() {
    let dir = TempDir::new().unwrap();
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();
    let mut generator = WorkbookGenerator::new(spec);
    assert_eq!(generator.state(), GeneratorState::Uninitialized);

    generator.create_workbook();
    assert_eq!(generator.state(), GeneratorState::WorkbookCreated);

    generator.create_sheets().unwrap();
    assert_eq!(generator.state(), GeneratorState::SheetsCreated);

    generator.build_sheet_contents().unwrap();
    assert_eq!(generator.state(), GeneratorState::ContentBuilt);

    generator.save_workbook(&dir.path().join("budget.xlsx")).unwrap();
    assert_eq!(generator.state(), GeneratorState::Saved);
}

#[test]
fn test_save_requires_workbook() {
    let dir = TempDir::new().unwrap();
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();
    let mut generator = WorkbookGenerator::new(spec);

    let err = generator
        .save_workbook(&dir.path().join("budget.xlsx"))
        .unwrap_err();
    assert!(matches!(err, GeneratorError::WorkbookNotInitialized));
}

#[test]
fn test_save_before_sheets_is_invalid_state() {
    let dir = TempDir::new().unwrap();
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();
    let mut generator = WorkbookGenerator::new(spec);
    generator.create_workbook();

    let err = generator
        .save_workbook(&dir.path().join("budget.xlsx"))
        .unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidState { .. }));
}

#[test]
fn test_structure_only_workbook_can_be_saved() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("structure.xlsx");
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();
    let mut generator = WorkbookGenerator::new(spec);
    generator.create_workbook();
    generator.create_sheets().unwrap();
    generator.save_workbook(&output).unwrap();

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(snapshot.sheets.len(), 6);
    assert!(snapshot.defined_names.is_empty());
}

#[test]
fn test_build_twice_is_invalid_state() {
    let spec = parse_spec(&fixture("tutorial_spec.json")).unwrap();
    let mut generator = WorkbookGenerator::new(spec);
    generator.create_workbook();
    generator.create_sheets().unwrap();
    generator.build_sheet_contents().unwrap();

    let err = generator.build_sheet_contents().unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidState { .. }));
}

#[test]
fn test_generate_twice_resets_workbook() {
    let dir = TempDir::new().unwrap();
    let (mut generator, output) = generate_fixture("tutorial_spec.json", &dir);
    generator.generate(&output).unwrap();

    let workbook = generator.workbook().unwrap();
    assert_eq!(workbook.sheets().len(), 6);
    assert_eq!(generator.state(), GeneratorState::Saved);
}

// ═══════════════════════════════════════════════════════════════════════════
// SAVED WORKBOOK STRUCTURE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheet_order_and_visibility() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("tutorial_spec.json", &dir);

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(
        snapshot.sheet_names(),
        vec![
            "Settings",
            "Dropdown Data",
            "Budget Planning",
            "Budget Tracking",
            "Calculations",
            "Budget Dashboard",
        ]
    );
    assert_eq!(
        snapshot.sheet("Dropdown Data").unwrap().visibility,
        Visibility::Hidden
    );
    assert_eq!(
        snapshot.sheet("Calculations").unwrap().visibility,
        Visibility::Hidden
    );
    assert_eq!(
        snapshot.sheet("Budget Dashboard").unwrap().visibility,
        Visibility::Visible
    );
}

#[test]
fn test_defined_names_round_trip() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("tutorial_spec.json", &dir);

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(snapshot.defined_name("StartingYear"), Some("Settings!$C$4"));
    assert_eq!(
        snapshot.defined_name("YearsList"),
        Some("'Dropdown Data'!$B$3:$B$7")
    );
    assert_eq!(
        snapshot.defined_name("IncomeTotals"),
        Some("'Budget Planning'!$E$24:$Q$24")
    );
    assert_eq!(snapshot.defined_name("MonthIdx"), Some("Calculations!$K$1"));
    assert_eq!(
        snapshot.defined_name("DashPeriod"),
        Some("'Budget Dashboard'!$C$4")
    );
    assert_eq!(snapshot.defined_name("expenses_max_row"), Some("44"));
}

#[test]
fn test_tracking_table() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("tutorial_spec.json", &dir);

    let snapshot = read_workbook(&output).unwrap();
    let table = snapshot.table("tblTracking").unwrap();
    assert_eq!(table.sheet, "Budget Tracking");
    assert_eq!(
        table.columns,
        vec![
            "Date",
            "Type",
            "Category",
            "Amount",
            "Details",
            "Balance",
            "Effective Date",
        ]
    );

    let tables = zip_entries(&output, "xl/tables/");
    assert_eq!(tables.len(), 1);
    let xml = zip_text(&output, &tables[0]);
    assert!(xml.contains(r#"ref="C11:I200""#), "{}", xml);
    assert!(xml.contains("TableStyleMedium2"));
}

#[test]
fn test_three_doughnut_charts() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("tutorial_spec.json", &dir);

    let charts = zip_entries(&output, "xl/charts/chart");
    assert_eq!(charts.len(), 3);
    for chart in &charts {
        let xml = zip_text(&output, chart);
        assert!(xml.contains("<c:doughnutChart>"));
        assert!(xml.contains(r#"<c:holeSize val="50"/>"#));
        assert!(xml.contains("Calculations!$F$2:$G$2"));
    }
}

#[test]
fn test_cells_round_trip() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("tutorial_spec.json", &dir);

    let mut importer = ExcelImporter::open(&output).unwrap();
    assert_eq!(
        importer.cell("Calculations", "B2").unwrap(),
        CellValue::Text("Metric".into())
    );
    assert_eq!(
        importer.cell("Calculations", "C3").unwrap(),
        CellValue::Formula("=TODAY()".into())
    );
    assert_eq!(
        importer.cell("Settings", "C4").unwrap(),
        CellValue::Number(2025.0)
    );
    assert_eq!(
        importer.cell("Budget Planning", "D12").unwrap(),
        CellValue::Text("Salary".into())
    );
    assert_eq!(
        importer.cell("Budget Tracking", "E12").unwrap(),
        CellValue::Text("Salary".into())
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SPEC VARIANT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_tutorial_has_no_named_range_drift() {
    let dir = TempDir::new().unwrap();
    let (generator, _) = generate_fixture("tutorial_spec.json", &dir);

    let drift = named_range_drift(generator.spec(), generator.workbook().unwrap());
    assert!(drift.is_empty(), "unexpected drift: {:?}", drift);
}

#[test]
fn test_hyphenated_planning_sheet() {
    let dir = TempDir::new().unwrap();
    let (generator, output) = generate_fixture("minimal_spec.json", &dir);

    let workbook = generator.workbook().unwrap();
    assert!(workbook.has_sheet("Budget-Planning"));
    assert_eq!(
        workbook.resolve_name("IncomeCats"),
        Some("'Budget-Planning'!$D$12:$D$23")
    );

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(snapshot.sheet_names()[2], "Budget-Planning");
}

#[test]
fn test_empty_categories_and_visibility_overrides() {
    let dir = TempDir::new().unwrap();
    let (generator, output) = generate_fixture("empty_categories_spec.json", &dir);

    let workbook = generator.workbook().unwrap();
    assert_eq!(
        workbook.sheet("Dropdown Data").unwrap().visibility(),
        Visibility::Hidden
    );
    assert_eq!(
        workbook.sheet("Calculations").unwrap().visibility(),
        Visibility::VeryHidden
    );

    let planning = workbook.sheet("Budget Planning").unwrap();
    assert_eq!(planning.text_at("D12"), Some(""));
    assert_eq!(planning.text_at("Q12"), Some("=SUM(E12:P12)"));

    // Default sample rows fall back into the configured starting year.
    let tracking = workbook.sheet("Budget Tracking").unwrap();
    assert_eq!(
        tracking.value_at("C12"),
        Some(&CellValue::Date(
            chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
        ))
    );

    assert!(output.exists());
}

#[test]
fn test_very_hidden_round_trip() {
    let dir = TempDir::new().unwrap();
    let (_, output) = generate_fixture("empty_categories_spec.json", &dir);

    assert!(sheet_element(&output, "Calculations").contains(r#"state="veryHidden""#));
    assert!(sheet_element(&output, "Dropdown Data").contains(r#"state="hidden""#));

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(
        snapshot.sheet("Calculations").unwrap().visibility,
        Visibility::VeryHidden
    );
}

#[test]
fn test_helper_sheet_declared_first_stays_hidden() {
    let dir = TempDir::new().unwrap();
    let mut spec: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fixture("tutorial_spec.json")).unwrap(),
    )
    .unwrap();
    let sheets = spec["workbook"]["sheets"].as_array_mut().unwrap();
    let calculations = sheets.remove(4);
    sheets.insert(0, calculations);

    let spec_path = dir.path().join("calculations_first.json");
    std::fs::write(&spec_path, serde_json::to_string_pretty(&spec).unwrap()).unwrap();
    let output = dir.path().join("budget.xlsx");
    generate_workbook(&spec_path, &output).unwrap();

    assert!(sheet_element(&output, "Calculations").contains(r#"state="hidden""#));
    assert!(!sheet_element(&output, "Settings").contains("state="));

    let first_sheet = zip_text(&output, "xl/worksheets/sheet1.xml");
    assert!(!first_sheet.contains(r#"tabSelected="1""#));
    let settings_sheet = zip_text(&output, "xl/worksheets/sheet2.xml");
    assert!(settings_sheet.contains(r#"tabSelected="1""#));

    let snapshot = read_workbook(&output).unwrap();
    assert_eq!(snapshot.sheet_names()[0], "Calculations");
    assert_eq!(
        snapshot.sheet("Calculations").unwrap().visibility,
        Visibility::Hidden
    );
}

#[test]
fn test_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("deeper").join("budget.xlsx");

    let saved = generate_workbook(&fixture("tutorial_spec.json"), &output).unwrap();
    assert_eq!(saved, output);
    assert!(output.exists());
}

#[test]
fn test_generate_workbook_missing_spec() {
    let dir = TempDir::new().unwrap();
    let err = generate_workbook(
        &dir.path().join("missing.json"),
        &dir.path().join("budget.xlsx"),
    )
    .unwrap_err();

    assert!(matches!(err, BudgetError::SpecNotFound { .. }));
    assert!(!dir.path().join("budget.xlsx").exists());
}
