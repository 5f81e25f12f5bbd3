use crate::error::{BudgetError, BudgetResult};
use crate::layout::CellRange;
use crate::types::{parse_entry_date, BudgetSpec, SheetKind, TransactionType};
use chrono::Datelike;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Keys accepted under the top-level `sheets` object.
const SHEET_CONFIG_KEYS: [&str; 7] = [
    "Settings",
    "Dropdown Data",
    "Budget Planning",
    "Budget-Planning",
    "Budget Tracking",
    "Calculations",
    "Budget Dashboard",
];

/// Load, validate and type a budget specification.
///
/// This is the main entry point for reading spec files. It runs three stages
/// and stops at the first one that fails:
/// 1. read the file and parse it as JSON ([`load_spec`])
/// 2. check the structural contract, collecting every problem ([`validate_structure`])
/// 3. deserialize into [`BudgetSpec`], filling documented defaults
///
/// # Example
/// ```no_run
/// use budget_generator::parser::parse_spec;
/// use std::path::Path;
///
/// let spec = parse_spec(Path::new("budget.json"))?;
/// println!("Sheets: {}", spec.workbook.sheets.len());
/// # Ok::<(), budget_generator::error::BudgetError>(())
/// ```
pub fn parse_spec(path: &Path) -> BudgetResult<BudgetSpec> {
    let value = load_spec(path)?;
    validate_structure(&value)?;
    spec_from_value(value)
}

/// Deserialize an already validated JSON value.
pub fn spec_from_value(value: Value) -> BudgetResult<BudgetSpec> {
    BudgetSpec::from_value(value)
        .map_err(|e| BudgetError::Validation(vec![format!("Invalid configuration: {}", e)]))
}

/// Read `path` and parse it as JSON.
pub fn load_spec(path: &Path) -> BudgetResult<Value> {
    if !path.exists() {
        return Err(BudgetError::SpecNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| BudgetError::SpecRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_str(&content).map_err(|e| BudgetError::SpecParse {
        path: path.to_path_buf(),
        message: strip_position(&e.to_string()),
        line: e.line(),
        column: e.column(),
    })?;

    debug!(path = %path.display(), "Loaded specification");
    Ok(value)
}

/// `serde_json` appends " at line X column Y"; we report the position separately.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message.to_string(),
    }
}

/// Check the structural contract of a spec.
///
/// All problems are collected and reported together in a single
/// [`BudgetError::Validation`].
pub fn validate_structure(value: &Value) -> BudgetResult<()> {
    let problems = collect_problems(value);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(BudgetError::Validation(problems))
    }
}

/// Every structural problem found in `value`, in a stable order.
pub fn collect_problems(value: &Value) -> Vec<String> {
    let mut problems = schema_problems(value);

    if !value.is_object() {
        return problems;
    }

    check_declared_sheets(value, &mut problems);
    check_named_ranges(value, &mut problems);
    check_sheet_config_keys(value, &mut problems);
    check_sample_entries(value, &mut problems);

    problems
}

/// Validate against the embedded JSON Schema.
fn schema_problems(value: &Value) -> Vec<String> {
    let schema_str = include_str!("../../schema/budget-spec.schema.json");
    let schema_value: Value = match serde_json::from_str(schema_str) {
        Ok(schema) => schema,
        Err(e) => return vec![format!("Failed to parse schema: {}", e)],
    };

    let compiled_schema = match JSONSchema::compile(&schema_value) {
        Ok(compiled) => compiled,
        Err(e) => return vec![format!("Failed to compile schema: {}", e)],
    };

    let result = match compiled_schema.validate(value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let location = e.instance_path.to_string();
                if location.is_empty() {
                    e.to_string()
                } else {
                    format!("{} (at {})", e, location)
                }
            })
            .collect(),
    };
    result
}

fn check_declared_sheets(value: &Value, problems: &mut Vec<String>) {
    let Some(sheets) = value.pointer("/workbook/sheets").and_then(Value::as_array) else {
        return;
    };

    let mut seen = BTreeSet::new();
    for (index, sheet) in sheets.iter().enumerate() {
        let Some(name) = sheet.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }
        match SheetKind::from_name(name) {
            Some(kind) => {
                if !seen.insert(kind) {
                    problems.push(format!("Sheet '{}' is declared more than once", name));
                }
            }
            None => problems.push(format!(
                "Sheet entry #{} has unknown name '{}'",
                index + 1,
                name
            )),
        }
    }

    let missing: Vec<&str> = SheetKind::ALL
        .iter()
        .filter(|kind| !seen.contains(kind))
        .map(|kind| kind.display_name())
        .collect();
    if !missing.is_empty() {
        problems.push(format!("Missing required sheets: {}", missing.join(", ")));
    }
}

fn check_named_ranges(value: &Value, problems: &mut Vec<String>) {
    let Some(ranges) = value
        .pointer("/workbook/named_ranges")
        .and_then(Value::as_object)
    else {
        return;
    };

    for (name, target) in ranges {
        if let Some(sheet) = target.get("sheet").and_then(Value::as_str) {
            if SheetKind::from_name(sheet).is_none() {
                problems.push(format!(
                    "Named range '{}' targets unknown sheet '{}'",
                    name, sheet
                ));
            }
        }
        if let Some(reference) = target.get("ref").and_then(Value::as_str) {
            if CellRange::parse(reference).is_err() {
                problems.push(format!(
                    "Named range '{}' has invalid reference '{}'",
                    name, reference
                ));
            }
        }
    }
}

fn check_sheet_config_keys(value: &Value, problems: &mut Vec<String>) {
    let Some(configs) = value.get("sheets").and_then(Value::as_object) else {
        return;
    };

    for key in configs.keys() {
        if !SHEET_CONFIG_KEYS.contains(&key.as_str()) {
            problems.push(format!("Unknown sheet configuration '{}'", key));
        }
    }

    if configs.contains_key("Budget Planning") && configs.contains_key("Budget-Planning") {
        problems.push(
            "Configure either 'Budget Planning' or 'Budget-Planning', not both".to_string(),
        );
    }
}

/// Years an Excel serial date can hold.
const EXCEL_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

fn check_sample_entries(value: &Value, problems: &mut Vec<String>) {
    let Some(entries) = value
        .pointer("/sheets/Budget Tracking/sample_entries")
        .and_then(Value::as_array)
    else {
        return;
    };

    for (index, entry) in entries.iter().enumerate() {
        if let Some(date) = entry.get("date").and_then(Value::as_str) {
            match parse_entry_date(date) {
                None => problems.push(format!(
                    "Sample entry #{} has invalid date '{}' (expected YYYY-MM-DD)",
                    index + 1,
                    date
                )),
                Some(day) if !EXCEL_YEARS.contains(&day.year()) => problems.push(format!(
                    "Sample entry #{} has date '{}' outside Excel's range (years 1900 to 9999)",
                    index + 1,
                    date
                )),
                Some(_) => {}
            }
        }
        if let Some(kind) = entry.get("type").and_then(Value::as_str) {
            if let Err(e) = kind.parse::<TransactionType>() {
                problems.push(format!("Sample entry #{}: {}", index + 1, e));
            }
        }
    }
}
