//! Excel exporter: renders a [`BudgetWorkbook`] with rust_xlsxwriter.
//!
//! The model is 1-based; rust_xlsxwriter is 0-based. Every conversion goes
//! through [`zero_based`] so the offset lives in one place.

use crate::error::{GeneratorError, GeneratorResult};
use crate::layout::{quote_sheet_name, CellRange};
use crate::types::Visibility;
use crate::workbook::{
    BudgetWorkbook, Cell, CellStyle, CellValue, ChartDefinition, ChartKind, ConditionalRule,
    HorizontalAlign, Sheet, SheetRange, TableDefinition, ValidationRule, DATE_FORMAT,
};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Color, ConditionalFormatCell, ConditionalFormatCellRule,
    ConditionalFormatFormula, DataValidation, DataValidationRule, ExcelDateTime, Format,
    FormatAlign, FormatBorder, FormatPattern, Formula, Table, TableColumn, TableStyle, Workbook,
    Worksheet, XlsxError,
};
use std::path::Path;
use tracing::debug;

type Bounds = (u32, u16, u32, u16);

fn zero_based(range: &CellRange) -> Bounds {
    (
        range.first_row - 1,
        range.first_column - 1,
        range.last_row - 1,
        range.last_column - 1,
    )
}

/// Excel exporter for the in-memory budget workbook
pub struct ExcelExporter<'a> {
    workbook: &'a BudgetWorkbook,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(workbook: &'a BudgetWorkbook) -> Self {
        Self { workbook }
    }

    /// Export the workbook to an .xlsx file
    pub fn export(&self, output_path: &Path) -> GeneratorResult<()> {
        let mut workbook = self.render()?;
        workbook
            .save(output_path)
            .map_err(|source| GeneratorError::Save {
                path: output_path.to_path_buf(),
                source,
            })
    }

    /// Export the workbook to an in-memory .xlsx buffer
    pub fn to_bytes(&self) -> GeneratorResult<Vec<u8>> {
        let mut workbook = self.render()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn render(&self) -> GeneratorResult<Workbook> {
        let mut workbook = Workbook::new();
        // Without an explicit active sheet the first tab is selected and shown,
        // even when it is hidden.
        let active = self
            .workbook
            .sheets()
            .iter()
            .position(|sheet| !sheet.visibility().is_hidden());

        for (index, sheet) in self.workbook.sheets().iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            export_sheet(worksheet, sheet)?;
            if Some(index) == active {
                worksheet.set_active(true);
            }
            debug!(
                sheet = sheet.name(),
                tables = sheet.tables().len(),
                charts = sheet.charts().len(),
                "Rendered worksheet"
            );
        }

        for defined in self.workbook.defined_names() {
            let name = match &defined.scope {
                Some(sheet) => format!("{}!{}", quote_sheet_name(sheet), defined.name),
                None => defined.name.clone(),
            };
            workbook.define_name(&name, &format!("={}", defined.refers_to))?;
        }

        Ok(workbook)
    }
}

fn export_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), XlsxError> {
    worksheet.set_name(sheet.name())?;
    match sheet.visibility() {
        Visibility::Visible => {}
        Visibility::Hidden => {
            worksheet.set_hidden(true);
        }
        Visibility::VeryHidden => {
            worksheet.set_very_hidden(true);
        }
    }

    for (column, width) in sheet.column_widths() {
        worksheet.set_column_width(column - 1, width)?;
    }

    // Merges first: merge_range blanks the whole block, cells then fill it in.
    for merge in sheet.merges() {
        let (r1, c1, r2, c2) = zero_based(&merge.range);
        let style = sheet
            .cell(merge.range.first_row, merge.range.first_column)
            .map(|cell| to_format(&cell.style))
            .unwrap_or_default();
        worksheet.merge_range(r1, c1, r2, c2, "", &style)?;
    }

    for (row, column, cell) in sheet.cells() {
        write_cell(worksheet, row - 1, column - 1, cell)?;
    }

    for table in sheet.tables() {
        add_table(worksheet, table)?;
    }

    for validation in sheet.validations() {
        let (r1, c1, r2, c2) = zero_based(&validation.range);
        let rule = to_validation(&validation.rule)?.ignore_blank(validation.allow_blank);
        worksheet.add_data_validation(r1, c1, r2, c2, &rule)?;
    }

    for conditional in sheet.conditional_formats() {
        let (r1, c1, r2, c2) = zero_based(&conditional.range);
        let fill = Format::new()
            .set_background_color(Color::RGB(conditional.fill))
            .set_pattern(FormatPattern::Solid);
        match &conditional.rule {
            ConditionalRule::EqualTo(value) => {
                let rule = ConditionalFormatCell::new()
                    .set_rule(ConditionalFormatCellRule::EqualTo(*value))
                    .set_format(fill);
                worksheet.add_conditional_format(r1, c1, r2, c2, &rule)?;
            }
            ConditionalRule::LessThan(value) => {
                let rule = ConditionalFormatCell::new()
                    .set_rule(ConditionalFormatCellRule::LessThan(*value))
                    .set_format(fill);
                worksheet.add_conditional_format(r1, c1, r2, c2, &rule)?;
            }
            ConditionalRule::Formula(formula) => {
                let rule = ConditionalFormatFormula::new()
                    .set_rule(formula.as_str())
                    .set_format(fill);
                worksheet.add_conditional_format(r1, c1, r2, c2, &rule)?;
            }
        }
    }

    for chart in sheet.charts() {
        insert_chart(worksheet, chart)?;
    }

    if let Some((row, column)) = sheet.freeze_position() {
        worksheet.set_freeze_panes(row - 1, column - 1)?;
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    let format = to_format(&cell.style);

    match &cell.value {
        CellValue::Empty => {
            if !cell.style.is_default() {
                worksheet.write_blank(row, col, &format)?;
            }
        }
        CellValue::Text(text) if text.is_empty() => {
            worksheet.write_blank(row, col, &format)?;
        }
        CellValue::Text(text) => {
            worksheet.write_string_with_format(row, col, text, &format)?;
        }
        CellValue::Number(value) => {
            worksheet.write_number_with_format(row, col, *value, &format)?;
        }
        CellValue::Bool(value) => {
            worksheet.write_boolean_with_format(row, col, *value, &format)?;
        }
        CellValue::Date(date) => {
            let format = if cell.style.number_format.is_none() {
                format.set_num_format(DATE_FORMAT)
            } else {
                format
            };
            worksheet.write_datetime_with_format(row, col, &excel_date(date)?, &format)?;
        }
        CellValue::Formula(formula) => {
            worksheet.write_formula_with_format(row, col, Formula::new(formula), &format)?;
        }
    }

    Ok(())
}

fn excel_date(date: &NaiveDate) -> Result<ExcelDateTime, XlsxError> {
    let year = u16::try_from(date.year())
        .map_err(|_| XlsxError::ParameterError(format!("Year out of range: {}", date)))?;
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color));
    }
    if let Some(fill) = style.fill {
        format = format
            .set_background_color(Color::RGB(fill))
            .set_pattern(FormatPattern::Solid);
    }
    if let Some(align) = style.align {
        format = format.set_align(match align {
            HorizontalAlign::Left => FormatAlign::Left,
            HorizontalAlign::Center => FormatAlign::Center,
            HorizontalAlign::Right => FormatAlign::Right,
        });
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if let Some(border) = style.border {
        format = match (border.bottom_only, border.color) {
            (true, Some(color)) => format
                .set_border_bottom(FormatBorder::Thin)
                .set_border_bottom_color(Color::RGB(color)),
            (true, None) => format.set_border_bottom(FormatBorder::Thin),
            (false, Some(color)) => format
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(color)),
            (false, None) => format.set_border(FormatBorder::Thin),
        };
    }
    if let Some(number_format) = &style.number_format {
        format = format.set_num_format(number_format);
    }

    format
}

fn to_validation(rule: &ValidationRule) -> Result<DataValidation, XlsxError> {
    let validation = match rule {
        ValidationRule::List(options) => {
            let options: Vec<&str> = options.iter().map(String::as_str).collect();
            DataValidation::new().allow_list_strings(options.as_slice())?
        }
        ValidationRule::ListFormula(source) => {
            DataValidation::new().allow_list_formula(Formula::new(source))
        }
        ValidationRule::WholeBetween(min, max) => {
            DataValidation::new().allow_whole_number(DataValidationRule::Between(*min, *max))
        }
        ValidationRule::DateBetween(from, to) => DataValidation::new().allow_date(
            DataValidationRule::Between(excel_date(from)?, excel_date(to)?),
        ),
    };
    Ok(validation)
}

fn add_table(worksheet: &mut Worksheet, table: &TableDefinition) -> Result<(), XlsxError> {
    let header_format = to_format(&table.header_style);
    let columns: Vec<TableColumn> = table
        .columns
        .iter()
        .map(|name| {
            TableColumn::new()
                .set_header(name)
                .set_header_format(header_format.clone())
        })
        .collect();

    let excel_table = Table::new()
        .set_name(&table.name)
        .set_columns(&columns)
        .set_style(TableStyle::Medium2)
        .set_banded_rows(table.show_row_stripes);

    let (r1, c1, r2, c2) = zero_based(&table.range);
    worksheet.add_table(r1, c1, r2, c2, &excel_table)?;
    Ok(())
}

fn chart_range(range: &SheetRange) -> (&str, u32, u16, u32, u16) {
    let (r1, c1, r2, c2) = zero_based(&range.range);
    (range.sheet.as_str(), r1, c1, r2, c2)
}

fn insert_chart(worksheet: &mut Worksheet, definition: &ChartDefinition) -> Result<(), XlsxError> {
    let mut chart = match definition.kind {
        ChartKind::Doughnut => Chart::new(ChartType::Doughnut),
    };
    chart.title().set_name(definition.title.as_str());
    chart.set_style(definition.style);
    chart.set_hole_size(definition.hole_size);
    chart.set_width(definition.width);
    chart.set_height(definition.height);

    let mut label = ChartDataLabel::new();
    if definition.show_value {
        label.show_value();
    }
    if definition.show_percentage {
        label.show_percentage();
    }

    chart
        .add_series()
        .set_categories(chart_range(&definition.categories))
        .set_values(chart_range(&definition.values))
        .set_data_label(&label);

    worksheet.insert_chart(
        definition.anchor_row - 1,
        definition.anchor_column - 1,
        &chart,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Visibility;
    use crate::workbook::{Border, DefinedName};

    #[test]
    fn test_format_mapping_is_total() {
        let style = CellStyle::header(0xCFE2F3)
            .italic()
            .size(14.0)
            .font_color(0x1F3864)
            .wrap()
            .border(Border::bottom(0x006600))
            .number_format("0");
        // Distinct styles must not collapse to the same format.
        assert_ne!(to_format(&style), Format::new());
        assert_eq!(to_format(&CellStyle::new()), Format::new());
    }

    #[test]
    fn test_renders_small_workbook() {
        let mut workbook = BudgetWorkbook::new();
        {
            let sheet = workbook.add_sheet("Settings", Visibility::Visible).unwrap();
            sheet.write(4, 3, 2025);
            sheet.write(6, 3, true);
            sheet.write(9, 3, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
            sheet.write_formula(10, 3, "=C4+1");
            sheet.merge(CellRange::new(2, 2, 2, 5));
            sheet.freeze_panes(3, 1);
            sheet.add_validation(
                CellRange::single(6, 3),
                ValidationRule::List(vec!["TRUE".into(), "FALSE".into()]),
                false,
            );
        }
        workbook
            .add_sheet("Dropdown Data", Visibility::Hidden)
            .unwrap();
        workbook
            .add_defined_name(DefinedName {
                name: "StartingYear".into(),
                refers_to: "Settings!$C$4".into(),
                scope: None,
            })
            .unwrap();

        let bytes = ExcelExporter::new(&workbook).to_bytes().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
