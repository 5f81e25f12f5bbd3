//! Dropdown Data sheet: the year and month lists used by validations.

use super::SheetNames;
use crate::error::GeneratorResult;
use crate::formulas::year_formula;
use crate::layout::CellRange;
use crate::named_ranges::NamedRangeManager;
use crate::types::{DropdownConfig, MONTHS};
use crate::workbook::{CellStyle, Sheet};

const HEADER_FILL: u32 = 0xD9D2E9;
const YEARS_COLUMN: u16 = 2;
const MONTHS_COLUMN: u16 = 3;

fn years_range(config: &DropdownConfig) -> CellRange {
    let start = config.years.start_row;
    let count = config.years.count.max(1);
    CellRange::new(start, YEARS_COLUMN, start + count - 1, YEARS_COLUMN)
}

fn months_range(config: &DropdownConfig) -> CellRange {
    let start = config.years.start_row;
    CellRange::new(
        start,
        MONTHS_COLUMN,
        start + MONTHS.len() as u32 - 1,
        MONTHS_COLUMN,
    )
}

pub fn build_dropdown_sheet(sheet: &mut Sheet, config: &DropdownConfig) {
    let header = CellStyle::header(HEADER_FILL);
    sheet.write(2, YEARS_COLUMN, "Years").set_style(&header);
    sheet.write(2, MONTHS_COLUMN, "Months").set_style(&header);

    let years = years_range(config);
    for (offset, row) in (years.first_row..=years.last_row).enumerate() {
        sheet.write_formula(row, YEARS_COLUMN, year_formula(offset as i64));
    }

    let months = months_range(config);
    for (month, row) in MONTHS.iter().zip(months.first_row..=months.last_row) {
        sheet.write(row, MONTHS_COLUMN, *month);
    }
}

pub fn register_dropdown_named_ranges(
    manager: &mut NamedRangeManager<'_>,
    names: &SheetNames,
    config: &DropdownConfig,
) -> GeneratorResult<()> {
    let sheet = names.dropdown();
    manager.register("YearsList", sheet, &years_range(config).to_string())?;
    manager.register("MonthsList", sheet, &months_range(config).to_string())?;
    Ok(())
}
