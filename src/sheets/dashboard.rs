//! Budget Dashboard sheet: period selectors and KPI tiles.
//!
//! The doughnut charts are attached separately by [`crate::charts`].

use super::SheetNames;
use crate::error::GeneratorResult;
use crate::layout::{cell_ref, CellRange};
use crate::named_ranges::NamedRangeManager;
use crate::types::DashboardConfig;
use crate::workbook::{
    Border, CellStyle, CellValue, Sheet, ValidationRule, ACCOUNTING_FORMAT, PERCENT_FORMAT,
};

const HEADER_FILL: u32 = 0xDAEEF3;
const SELECTOR_FILL: u32 = 0xE7F3F9;
const TILE_FILL: u32 = 0xF9FBFD;
const TILE_BORDER: u32 = 0xC5D1DE;

const HEADERS: [&str; 7] = [
    "Year",
    "Period",
    "Category",
    "Tracked",
    "Budgeted",
    "% of Budget",
    "Remaining",
];

pub const YEAR_SELECTOR: (u32, u16) = (3, 3);
pub const PERIOD_SELECTOR: (u32, u16) = (4, 3);

/// Formula text stays a formula; anything else is written as a literal.
fn formula_or_text(text: &str) -> CellValue {
    if text.starts_with('=') {
        CellValue::formula(text)
    } else {
        CellValue::Text(text.to_string())
    }
}

pub fn build_dashboard_sheet(sheet: &mut Sheet, config: &DashboardConfig) {
    let header = CellStyle::header(HEADER_FILL);
    for (column, label) in (2u16..).zip(HEADERS) {
        sheet.write(2, column, label).set_style(&header);
    }

    write_selectors(sheet, config);
    write_tiles(sheet, config);

    sheet.set_column_width(2, 18.0);
    sheet.set_column_width(3, 16.0);
}

fn write_selectors(sheet: &mut Sheet, config: &DashboardConfig) {
    let selector = CellStyle::new().fill(SELECTOR_FILL);
    let selectors = [
        (
            YEAR_SELECTOR,
            "Year",
            formula_or_text(&config.selectors.default_year_formula),
            "=YearsList",
        ),
        (
            PERIOD_SELECTOR,
            "Period",
            formula_or_text(&config.selectors.default_period),
            "=MonthsList",
        ),
    ];

    for ((row, column), label, value, source) in selectors {
        sheet.write(row, column - 1, label).style.bold = true;
        sheet.write(row, column, value).set_style(&selector);
        sheet.add_validation(
            CellRange::single(row, column),
            ValidationRule::ListFormula(source.to_string()),
            false,
        );
    }
}

fn write_tiles(sheet: &mut Sheet, config: &DashboardConfig) {
    let tiles = [
        ("Selected Year", "=DashYear", None),
        ("Selected Period", "=DashPeriod", None),
        (
            "Tracking Balance",
            config.tiles.tracking_balance_formula.as_str(),
            Some(ACCOUNTING_FORMAT),
        ),
        (
            "Savings Rate",
            config.tiles.savings_rate_formula.as_str(),
            Some(PERCENT_FORMAT),
        ),
    ];

    let border = Border::thin_colored(TILE_BORDER);
    let label_style = CellStyle::new().bold().fill(TILE_FILL).border(border);
    let value_style = CellStyle::new().fill(TILE_FILL).border(border);

    for ((label, formula, format), row) in tiles.into_iter().zip(6u32..) {
        sheet.write(row, 2, label).set_style(&label_style);
        let cell = sheet.write(row, 3, formula_or_text(formula));
        cell.set_style(&value_style);
        if let Some(format) = format {
            cell.set_number_format(format);
        }
    }
}

pub fn register_dashboard_named_ranges(
    manager: &mut NamedRangeManager<'_>,
    names: &SheetNames,
) -> GeneratorResult<()> {
    let sheet = names.dashboard();
    manager.register("DashYear", sheet, &cell_ref(YEAR_SELECTOR.0, YEAR_SELECTOR.1))?;
    manager.register(
        "DashPeriod",
        sheet,
        &cell_ref(PERIOD_SELECTOR.0, PERIOD_SELECTOR.1),
    )?;
    Ok(())
}
