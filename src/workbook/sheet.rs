//! Worksheet model: cells plus the sheet-level objects the builders attach.

use super::style::CellStyle;
use crate::layout::{cell_ref, parse_cell, CellRange};
use crate::types::Visibility;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Value held by a cell. Formulas keep their leading `=`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Formula(String),
}

impl CellValue {
    pub fn formula(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.starts_with('=') {
            CellValue::Formula(text)
        } else {
            CellValue::Formula(format!("={}", text))
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Formula(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn set_style(&mut self, style: &CellStyle) -> &mut Self {
        self.style = style.clone();
        self
    }

    pub fn set_number_format(&mut self, format: &str) -> &mut Self {
        self.style.number_format = Some(format.to_string());
        self
    }

    pub fn number_format(&self) -> Option<&str> {
        self.style.number_format.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// Literal options, written as `"a,b,c"`.
    List(Vec<String>),
    /// List sourced from a formula such as `=YearsList`.
    ListFormula(String),
    WholeBetween(i32, i32),
    DateBetween(NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataValidation {
    pub range: CellRange,
    pub rule: ValidationRule,
    pub allow_blank: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalRule {
    EqualTo(f64),
    LessThan(f64),
    /// Formula rule; relative references resolve against the range's first cell.
    Formula(String),
}

/// Conditional format applied with a solid fill. Rules keep insertion order,
/// which is also their priority (first added wins).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormat {
    pub range: CellRange,
    pub rule: ConditionalRule,
    pub fill: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub range: CellRange,
    pub columns: Vec<String>,
    pub header_style: CellStyle,
    pub show_row_stripes: bool,
}

/// Reference into another sheet, used by chart series.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRange {
    pub sheet: String,
    pub range: CellRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Doughnut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartDefinition {
    pub kind: ChartKind,
    pub title: String,
    pub anchor_row: u32,
    pub anchor_column: u16,
    pub values: SheetRange,
    pub categories: SheetRange,
    pub style: u8,
    pub hole_size: u8,
    pub width: u32,
    pub height: u32,
    pub show_value: bool,
    pub show_percentage: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub range: CellRange,
}

/// One worksheet of the in-memory workbook.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    visibility: Visibility,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<Merge>,
    column_widths: BTreeMap<u16, f64>,
    freeze_panes: Option<(u32, u16)>,
    validations: Vec<DataValidation>,
    conditional_formats: Vec<ConditionalFormat>,
    tables: Vec<TableDefinition>,
    charts: Vec<ChartDefinition>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
            freeze_panes: None,
            validations: Vec::new(),
            conditional_formats: Vec::new(),
            tables: Vec::new(),
            charts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// Write a value, keeping any style already set on the cell.
    pub fn write(&mut self, row: u32, column: u16, value: impl Into<CellValue>) -> &mut Cell {
        let cell = self.cell_mut(row, column);
        cell.value = value.into();
        cell
    }

    pub fn write_formula(&mut self, row: u32, column: u16, formula: impl Into<String>) -> &mut Cell {
        self.write(row, column, CellValue::formula(formula))
    }

    /// Cell at `(row, column)`, created blank if absent.
    pub fn cell_mut(&mut self, row: u32, column: u16) -> &mut Cell {
        self.cells.entry((row, column)).or_default()
    }

    pub fn cell(&self, row: u32, column: u16) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Look a cell up by A1 reference; `None` for empty or invalid references.
    pub fn cell_at(&self, reference: &str) -> Option<&Cell> {
        let (row, column) = parse_cell(reference).ok()?;
        self.cell(row, column)
    }

    pub fn value_at(&self, reference: &str) -> Option<&CellValue> {
        self.cell_at(reference).map(|cell| &cell.value)
    }

    /// Text or formula stored at `reference`.
    pub fn text_at(&self, reference: &str) -> Option<&str> {
        self.value_at(reference).and_then(CellValue::as_text)
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.cells.iter().map(|(&(row, column), cell)| (row, column, cell))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Apply `style` to every cell in `range`, creating blank cells as needed.
    pub fn apply_border(&mut self, range: CellRange, border: super::style::Border) {
        for row in range.first_row..=range.last_row {
            for column in range.first_column..=range.last_column {
                self.cell_mut(row, column).style.border = Some(border);
            }
        }
    }

    // ------------------------------------------------------------------
    // Sheet-level objects
    // ------------------------------------------------------------------

    pub fn merge(&mut self, range: CellRange) {
        if !range.is_single_cell() {
            self.merges.push(Merge { range });
        }
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn set_column_width(&mut self, column: u16, width: f64) {
        self.column_widths.insert(column, width);
    }

    pub fn column_width(&self, column: u16) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(&column, &width)| (column, width))
    }

    /// Freeze rows above `row` and columns left of `column`.
    pub fn freeze_panes(&mut self, row: u32, column: u16) {
        self.freeze_panes = Some((row, column));
    }

    pub fn frozen_at(&self) -> Option<String> {
        self.freeze_panes.map(|(row, column)| cell_ref(row, column))
    }

    pub fn freeze_position(&self) -> Option<(u32, u16)> {
        self.freeze_panes
    }

    pub fn add_validation(&mut self, range: CellRange, rule: ValidationRule, allow_blank: bool) {
        self.validations.push(DataValidation {
            range,
            rule,
            allow_blank,
        });
    }

    pub fn validations(&self) -> &[DataValidation] {
        &self.validations
    }

    pub fn add_conditional_format(&mut self, range: CellRange, rule: ConditionalRule, fill: u32) {
        self.conditional_formats.push(ConditionalFormat { range, rule, fill });
    }

    pub fn conditional_formats(&self) -> &[ConditionalFormat] {
        &self.conditional_formats
    }

    pub fn add_table(&mut self, table: TableDefinition) {
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[TableDefinition] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn add_chart(&mut self, chart: ChartDefinition) {
        self.charts.push(chart);
    }

    pub fn charts(&self) -> &[ChartDefinition] {
        &self.charts
    }
}
