//! Calculations sheet: hidden helper metrics feeding the dashboard.

use super::planning::{PlanningLayout, SectionKind};
use super::SheetNames;
use crate::error::GeneratorResult;
use crate::formulas::{choose_month, column_ref, monthly_tracking_sumproduct};
use crate::layout::{cell_ref, CellRange};
use crate::named_ranges::NamedRangeManager;
use crate::types::MONTHS;
use crate::workbook::{Border, CellStyle, Sheet, ACCOUNTING_FORMAT, DATE_FORMAT};

const METRIC_FILL: u32 = 0xEAD1DC;
const COMPARISON_FILL: u32 = 0xDEEAF6;

/// Header row shared by the metric tiles and the comparison table.
pub const HEADER_ROW: u32 = 2;
pub const SECTION_COLUMN: u16 = 5;
pub const BUDGETED_COLUMN: u16 = 6;
pub const TRACKED_COLUMN: u16 = 7;
pub const REMAINING_COLUMN: u16 = 8;

const MONTH_LABEL_COLUMN: u16 = 10;
const MONTH_INDEX_COLUMN: u16 = 11;
const MONTH_INDEX_ROW: u32 = 1;

/// Row of the budget-vs-tracked table holding `kind`.
pub fn comparison_row(kind: SectionKind) -> u32 {
    match kind {
        SectionKind::Income => 3,
        SectionKind::Expenses => 4,
        SectionKind::Savings => 5,
    }
}

pub fn build_calculations_sheet(
    sheet: &mut Sheet,
    names: &SheetNames,
    layout: &PlanningLayout,
    tracking_table: &str,
) {
    write_metrics(sheet, tracking_table);
    write_month_map(sheet);
    write_comparison(sheet, names, layout, tracking_table);

    sheet.set_column_width(2, 20.0);
    sheet.set_column_width(3, 14.0);
    sheet.set_column_width(4, 28.0);
    for column in SECTION_COLUMN..=REMAINING_COLUMN {
        sheet.set_column_width(column, 16.0);
    }
}

fn write_metrics(sheet: &mut Sheet, table: &str) {
    let header = CellStyle::header(METRIC_FILL);
    for (column, label) in (2u16..).zip(["Metric", "Value", "Notes"]) {
        sheet.write(HEADER_ROW, column, label).set_style(&header);
    }

    let date = column_ref(table, "Date");
    let metrics = [
        ("Current Date", "=TODAY()".to_string(), DATE_FORMAT, "Refreshes on recalculation"),
        ("Last Record Date", format!("=MAX({})", date), DATE_FORMAT, "Most recent tracked date"),
        ("Number of Records", format!("=COUNTA({})", date), "0", "Rows with a date"),
        (
            "Tracking Balance",
            format!(
                "=IFERROR(LOOKUP(2,1/({}<>\"\"),{}),0)",
                date,
                column_ref(table, "Balance")
            ),
            ACCOUNTING_FORMAT,
            "Balance on the last tracked row",
        ),
    ];
    for ((label, formula, format, note), row) in metrics.into_iter().zip(HEADER_ROW + 1..) {
        sheet.write(row, 2, label);
        sheet.write_formula(row, 3, formula).set_number_format(format);
        sheet.write(row, 4, note);
    }

    sheet.apply_border(CellRange::new(HEADER_ROW, 2, HEADER_ROW + 4, 4), Border::thin());
}

fn write_month_map(sheet: &mut Sheet) {
    sheet
        .write(MONTH_INDEX_ROW, MONTH_LABEL_COLUMN, "MonthIdx")
        .style
        .bold = true;
    sheet.write_formula(
        MONTH_INDEX_ROW,
        MONTH_INDEX_COLUMN,
        "=INDEX(INDEX(MonthMap,0,2),MATCH(DashPeriod,INDEX(MonthMap,0,1),0))",
    );

    for ((index, month), row) in MONTHS.iter().enumerate().zip(HEADER_ROW..) {
        sheet.write(row, MONTH_LABEL_COLUMN, *month);
        sheet.write(row, MONTH_INDEX_COLUMN, index as u32 + 1);
    }
}

fn write_comparison(sheet: &mut Sheet, names: &SheetNames, layout: &PlanningLayout, table: &str) {
    let header = CellStyle::header(COMPARISON_FILL);
    let labels = ["Section", "BudgetedMonth", "TrackedMonth", "Remaining"];
    for (column, label) in (SECTION_COLUMN..).zip(labels) {
        sheet.write(HEADER_ROW, column, label).set_style(&header);
    }

    for kind in SectionKind::ALL {
        let row = comparison_row(kind);
        sheet.write(row, SECTION_COLUMN, kind.title());

        let cells = layout.month_total_cells(kind, names.planning());
        sheet
            .write_formula(row, BUDGETED_COLUMN, choose_month(&cells, "MonthIdx"))
            .set_number_format(ACCOUNTING_FORMAT);
        sheet
            .write_formula(
                row,
                TRACKED_COLUMN,
                monthly_tracking_sumproduct(table, kind.transaction_type().as_str(), "MonthIdx"),
            )
            .set_number_format(ACCOUNTING_FORMAT);
        sheet
            .write_formula(
                row,
                REMAINING_COLUMN,
                format!(
                    "={}-{}",
                    cell_ref(row, BUDGETED_COLUMN),
                    cell_ref(row, TRACKED_COLUMN)
                ),
            )
            .set_number_format(ACCOUNTING_FORMAT);
    }

    sheet.apply_border(
        CellRange::new(
            HEADER_ROW,
            SECTION_COLUMN,
            comparison_row(SectionKind::Savings),
            REMAINING_COLUMN,
        ),
        Border::thin(),
    );
}

pub fn register_calculations_named_ranges(
    manager: &mut NamedRangeManager<'_>,
    names: &SheetNames,
) -> GeneratorResult<()> {
    let sheet = names.calculations();
    let map = CellRange::new(
        HEADER_ROW,
        MONTH_LABEL_COLUMN,
        HEADER_ROW + MONTHS.len() as u32 - 1,
        MONTH_INDEX_COLUMN,
    );
    manager.register("MonthMap", sheet, &map.to_string())?;
    manager.register(
        "MonthIdx",
        sheet,
        &cell_ref(MONTH_INDEX_ROW, MONTH_INDEX_COLUMN),
    )?;
    Ok(())
}
