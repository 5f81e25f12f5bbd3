//! Settings sheet: starting year and late-income switches.

use super::SheetNames;
use crate::error::GeneratorResult;
use crate::layout::CellRange;
use crate::named_ranges::{NamedRangeManager, NamedRangeSpec};
use crate::types::SettingsConfig;
use crate::workbook::{Border, CellStyle, Sheet, ValidationRule};

pub const STARTING_YEAR_CELL: &str = "$C$4";
pub const LATE_INCOME_ENABLED_CELL: &str = "$C$6";
pub const LATE_INCOME_DAY_CELL: &str = "$C$7";

const HEADER_FILL: u32 = 0xD9EAD3;
const HEADER_BORDER: u32 = 0x006600;
const INPUT_FILL: u32 = 0xFFFFFF;

pub fn build_settings_sheet(sheet: &mut Sheet, config: &SettingsConfig) {
    let header = CellRange::new(2, 2, 2, 5);
    sheet.merge(header);
    sheet
        .write(2, 2, config.general.title.as_str())
        .set_style(&CellStyle::header(HEADER_FILL));
    for column in header.first_column..=header.last_column {
        sheet.cell_mut(2, column).style.border = Some(Border::bottom(HEADER_BORDER));
    }

    sheet.write(4, 2, "Starting Year");
    sheet
        .write(4, 3, config.general.starting_year)
        .set_number_format("0");
    sheet.write(4, 4, config.general.starting_year_help.as_str());

    sheet.write(6, 2, "Late Monthly Income Enabled");
    sheet.write(6, 3, config.late_income.enabled_default);
    sheet.write(
        6,
        4,
        "Toggle support for paycheques that arrive after month end",
    );
    sheet.write(7, 2, "Late Income Day");
    sheet.write(7, 3, config.late_income.day_default);
    sheet.write(7, 4, "Day of month to post late income");

    for (row, column) in [(6, 2), (6, 3), (7, 3)] {
        sheet.cell_mut(row, column).style.fill = Some(INPUT_FILL);
    }

    sheet.add_validation(
        CellRange::single(6, 3),
        ValidationRule::List(vec!["TRUE".to_string(), "FALSE".to_string()]),
        false,
    );
    sheet.add_validation(
        CellRange::single(7, 3),
        ValidationRule::WholeBetween(1, 31),
        false,
    );

    sheet.set_column_width(2, 30.0);
    sheet.set_column_width(3, 14.0);
    sheet.set_column_width(4, 58.0);
}

pub fn register_settings_named_ranges(
    manager: &mut NamedRangeManager<'_>,
    names: &SheetNames,
) -> GeneratorResult<()> {
    let sheet = names.settings();
    manager.register_many(&[
        NamedRangeSpec::new("StartingYear", sheet, STARTING_YEAR_CELL),
        NamedRangeSpec::new("LateIncomeEnabled", sheet, LATE_INCOME_ENABLED_CELL),
        NamedRangeSpec::new("LateIncomeDay", sheet, LATE_INCOME_DAY_CELL),
    ])
}
