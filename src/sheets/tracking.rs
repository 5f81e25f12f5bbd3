//! Budget Tracking sheet: the `tblTracking` transaction ledger.

use crate::formulas::{category_switch, effective_date, running_balance};
use crate::layout::{column_letter, CellRange};
use crate::types::{TrackingConfig, TrackingEntry, TransactionType, TRACKING_HEADERS};
use crate::workbook::{
    CellStyle, ConditionalRule, Sheet, TableDefinition, ValidationRule, ACCOUNTING_FORMAT,
    DATE_FORMAT, TEXT_FORMAT,
};
use chrono::NaiveDate;
use tracing::{debug, warn};

const HEADER_FILL: u32 = 0xCFE2F3;
const INVALID_CATEGORY_FILL: u32 = 0xFCE5CD;
const INCOME_ROW_FILL: u32 = 0xD9EAD3;

const COLUMN_WIDTHS: [(u16, f64); 8] = [
    (2, 40.0),
    (3, 14.0),
    (4, 12.0),
    (5, 24.0),
    (6, 12.0),
    (7, 30.0),
    (8, 16.0),
    (9, 16.0),
];

/// Column lookup that cannot miss for the fixed header set.
fn column(config: &TrackingConfig, name: &str) -> u16 {
    config
        .column_of(name)
        .unwrap_or(config.start_column)
}

/// Sample rows used when the spec provides none.
pub fn default_entries(starting_year: i32) -> Vec<TrackingEntry> {
    let day = |d| NaiveDate::from_ymd_opt(starting_year, 1, d);
    [
        (day(1), TransactionType::Income, "Salary", 3000.0),
        (day(2), TransactionType::Saving, "Emergency Fund", 500.0),
        (day(3), TransactionType::Expense, "Groceries", 250.0),
    ]
    .into_iter()
    .filter_map(|(date, transaction_type, category, amount)| {
        Some(TrackingEntry {
            date: date?,
            transaction_type,
            category: category.to_string(),
            amount,
            details: None,
        })
    })
    .collect()
}

/// Entries from the spec, falling back to the defaults when none are usable.
pub fn resolve_entries(config: &TrackingConfig, starting_year: i32) -> Vec<TrackingEntry> {
    let entries: Vec<TrackingEntry> = config
        .sample_entries
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let entry = raw.to_entry();
            if entry.is_none() {
                debug!(index, "Skipping incomplete sample entry");
            }
            entry
        })
        .collect();

    if entries.is_empty() {
        default_entries(starting_year)
    } else {
        entries
    }
}

pub fn build_tracking_sheet(sheet: &mut Sheet, config: &TrackingConfig, starting_year: i32) {
    write_intro(sheet, config);
    write_headers(sheet, config);
    for (column, width) in COLUMN_WIDTHS {
        sheet.set_column_width(column, width);
    }
    apply_number_formats(sheet, config);
    write_entries(sheet, config, &resolve_entries(config, starting_year));
    write_formulas(sheet, config);
    add_table(sheet, config);
    add_tracking_validations(sheet, config);
    add_tracking_conditional_formatting(sheet, config);
}

fn write_intro(sheet: &mut Sheet, config: &TrackingConfig) {
    sheet
        .write(1, 2, config.intro.title.as_str())
        .set_style(&CellStyle::new().bold().size(16.0));

    if let Some(duration) = &config.intro.duration {
        sheet
            .write(5, 5, duration.as_str())
            .set_style(&CellStyle::new().italic());
    }
    if let Some(label) = &config.notes.tutorial_label {
        sheet.write(6, 2, label.as_str());
    }
    if let Some(label) = &config.notes.pause_label {
        sheet.write(7, 2, label.as_str());
    }
}

fn write_headers(sheet: &mut Sheet, config: &TrackingConfig) {
    let style = CellStyle::header(HEADER_FILL);
    for (offset, header) in TRACKING_HEADERS.iter().enumerate() {
        sheet
            .write(config.header_row, config.start_column + offset as u16, *header)
            .set_style(&style);
    }
}

fn apply_number_formats(sheet: &mut Sheet, config: &TrackingConfig) {
    let formats = [
        ("Date", DATE_FORMAT),
        ("Amount", ACCOUNTING_FORMAT),
        ("Details", TEXT_FORMAT),
        ("Balance", ACCOUNTING_FORMAT),
        ("Effective Date", DATE_FORMAT),
    ];
    for row in config.data_start_row()..=config.end_row() {
        for (name, format) in formats {
            sheet.cell_mut(row, column(config, name)).set_number_format(format);
        }
    }
}

fn write_entries(sheet: &mut Sheet, config: &TrackingConfig, entries: &[TrackingEntry]) {
    let capacity = config.data_row_count() as usize;
    if entries.len() > capacity {
        warn!(
            capacity,
            dropped = entries.len() - capacity,
            "More sample entries than table rows; extra entries dropped"
        );
    }

    for (entry, row) in entries.iter().zip(config.data_start_row()..=config.end_row()) {
        sheet.write(row, column(config, "Date"), entry.date);
        sheet.write(row, column(config, "Type"), entry.transaction_type.as_str());
        sheet.write(row, column(config, "Category"), entry.category.as_str());
        sheet.write(row, column(config, "Amount"), entry.amount);
        if let Some(details) = &entry.details {
            sheet.write(row, column(config, "Details"), details.as_str());
        }
    }
}

/// Balance and Effective Date formulas; identical on every data row.
pub fn write_formulas(sheet: &mut Sheet, config: &TrackingConfig) {
    let balance = running_balance(&config.table_name);
    let effective = effective_date(&config.table_name);
    for row in config.data_start_row()..=config.end_row() {
        sheet.write_formula(row, column(config, "Balance"), balance.as_str());
        sheet.write_formula(row, column(config, "Effective Date"), effective.as_str());
    }
}

fn add_table(sheet: &mut Sheet, config: &TrackingConfig) {
    sheet.add_table(TableDefinition {
        name: config.table_name.clone(),
        range: table_range(config),
        columns: TRACKING_HEADERS.iter().map(|h| h.to_string()).collect(),
        header_style: CellStyle::header(HEADER_FILL),
        show_row_stripes: true,
    });
}

/// Header row through the last data row, e.g. `C11:I200`.
pub fn table_range(config: &TrackingConfig) -> CellRange {
    CellRange::new(
        config.header_row,
        config.start_column,
        config.end_row(),
        config.end_column(),
    )
}

/// Date, type and per-row category validations.
pub fn add_tracking_validations(sheet: &mut Sheet, config: &TrackingConfig) {
    let first = config.data_start_row();
    let last = config.end_row();
    let date_column = column(config, "Date");
    let type_column = column(config, "Type");
    let category_column = column(config, "Category");

    if let (Some(min), Some(max)) = (
        NaiveDate::from_ymd_opt(2000, 1, 1),
        NaiveDate::from_ymd_opt(2100, 12, 31),
    ) {
        sheet.add_validation(
            CellRange::new(first, date_column, last, date_column),
            ValidationRule::DateBetween(min, max),
            true,
        );
    }

    sheet.add_validation(
        CellRange::new(first, type_column, last, type_column),
        ValidationRule::List(
            TransactionType::ALL
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        ),
        false,
    );

    let type_letter = column_letter(type_column);
    for row in first..=last {
        sheet.add_validation(
            CellRange::single(row, category_column),
            ValidationRule::ListFormula(category_switch(&format!("${}{}", type_letter, row))),
            true,
        );
    }
}

/// Highlight categories outside their type's list, and shade income rows.
pub fn add_tracking_conditional_formatting(sheet: &mut Sheet, config: &TrackingConfig) {
    let first = config.data_start_row();
    let last = config.end_row();
    let category_column = column(config, "Category");
    let type_ref = format!("${}{}", column_letter(column(config, "Type")), first);
    let category_ref = format!("${}{}", column_letter(category_column), first);

    let allowed = category_switch(&type_ref);
    let allowed = allowed.trim_start_matches('=');
    sheet.add_conditional_format(
        CellRange::new(first, category_column, last, category_column),
        ConditionalRule::Formula(format!(
            "=AND({c}<>\"\",ISNA(MATCH({c},{allowed},0)))",
            c = category_ref
        )),
        INVALID_CATEGORY_FILL,
    );

    sheet.add_conditional_format(
        CellRange::new(first, config.start_column, last, config.end_column()),
        ConditionalRule::Formula(format!("={}=\"Income\"", type_ref)),
        INCOME_ROW_FILL,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawTrackingEntry, Visibility};
    use crate::workbook::CellValue;

    fn build(config: &TrackingConfig) -> Sheet {
        let mut sheet = Sheet::new("Budget Tracking", Visibility::Visible);
        build_tracking_sheet(&mut sheet, config, 2025);
        sheet
    }

    #[test]
    fn test_table_covers_header_to_max_rows() {
        let sheet = build(&TrackingConfig::default());
        let table = sheet.table("tblTracking").unwrap();
        assert_eq!(table.range.to_string(), "C11:I200");
        assert_eq!(table.columns, TRACKING_HEADERS.to_vec());
        assert_eq!(sheet.text_at("C11"), Some("Date"));
        assert_eq!(sheet.text_at("I11"), Some("Effective Date"));
    }

    #[test]
    fn test_one_category_validation_per_data_row() {
        let config = TrackingConfig::default();
        let sheet = build(&config);
        let per_row: Vec<_> = sheet
            .validations()
            .iter()
            .filter(|v| matches!(v.rule, ValidationRule::ListFormula(_)))
            .collect();

        assert_eq!(per_row.len(), (config.max_rows - config.header_row) as usize);
        assert_eq!(
            per_row[0].rule,
            ValidationRule::ListFormula(
                "=IF($D12=\"Income\",IncomeCats,IF($D12=\"Expense\",ExpenseCats,SavingsCats))"
                    .to_string()
            )
        );
        assert_eq!(per_row[0].range.to_string(), "E12");
    }

    #[test]
    fn test_formulas_identical_on_every_row() {
        let sheet = build(&TrackingConfig::default());
        let balance = sheet.text_at("H12").unwrap();
        let effective = sheet.text_at("I12").unwrap();
        for row in [13u32, 100, 200] {
            assert_eq!(sheet.cell(row, 8).unwrap().value.as_text(), Some(balance));
            assert_eq!(sheet.cell(row, 9).unwrap().value.as_text(), Some(effective));
        }
        assert!(sheet.cell(201, 8).is_none());
    }

    #[test]
    fn test_default_entries_in_starting_year() {
        let sheet = build(&TrackingConfig::default());
        assert_eq!(
            sheet.value_at("C12"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        );
        assert_eq!(sheet.text_at("D12"), Some("Income"));
        assert_eq!(sheet.text_at("D13"), Some("Saving"));
        assert_eq!(sheet.text_at("D14"), Some("Expense"));
        assert_eq!(sheet.cell_at("F14").unwrap().number_format(), Some(ACCOUNTING_FORMAT));
    }

    #[test]
    fn test_incomplete_entries_skipped() {
        let config = TrackingConfig {
            sample_entries: vec![
                RawTrackingEntry {
                    date: Some("2024-02-10".to_string()),
                    transaction_type: Some("Expenses".to_string()),
                    category: Some("Rent".to_string()),
                    amount: Some(900.0),
                    details: Some("February".to_string()),
                },
                RawTrackingEntry {
                    date: Some("2024-02-11".to_string()),
                    ..RawTrackingEntry::default()
                },
            ],
            ..TrackingConfig::default()
        };
        let sheet = build(&config);

        assert_eq!(sheet.text_at("D12"), Some("Expense"));
        assert_eq!(sheet.text_at("G12"), Some("February"));
        assert_eq!(sheet.value_at("C13"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_max_rows_clamped_to_one_data_row() {
        let config = TrackingConfig {
            max_rows: 3,
            ..TrackingConfig::default()
        };
        let sheet = build(&config);
        assert_eq!(sheet.table("tblTracking").unwrap().range.to_string(), "C11:I12");
        assert_eq!(sheet.text_at("D12"), Some("Income"));
        assert!(sheet.cell_at("D13").is_none());
    }

    #[test]
    fn test_conditional_formats() {
        let sheet = build(&TrackingConfig::default());
        let rules = sheet.conditional_formats();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].range.to_string(), "E12:E200");
        assert_eq!(
            rules[0].rule,
            ConditionalRule::Formula(
                "=AND($E12<>\"\",ISNA(MATCH($E12,IF($D12=\"Income\",IncomeCats,IF($D12=\"Expense\",ExpenseCats,SavingsCats)),0)))"
                    .to_string()
            )
        );
        assert_eq!(rules[1].range.to_string(), "C12:I200");
        assert_eq!(rules[1].rule, ConditionalRule::Formula("=$D12=\"Income\"".to_string()));
    }
}
