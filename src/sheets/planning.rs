//! Budget Planning sheet: the multi-year income / expense / savings grid.
//!
//! Layout, 1-based:
//! - column D holds category labels, year blocks start at column E
//! - each block is 12 month columns plus a total column, followed by one
//!   gap column, so block `i` starts at `E + 14 * i`
//! - row 5 carries the merged year banner, row 6 the month headers, row 7
//!   the Unallocated formulas and row 8 a short note
//! - the three sections sit below, each with a title row, a fixed number of
//!   category rows and a total row

use super::SheetNames;
use crate::error::GeneratorResult;
use crate::formulas::{balanced_label, section_total_indirect};
use crate::layout::{cell_ref, column_letter, sheet_ref, CellRange, MAX_COLUMN};
use crate::named_ranges::NamedRangeManager;
use crate::types::{PlanningConfig, TransactionType, MONTHS};
use crate::workbook::{
    Border, CellStyle, ConditionalRule, HorizontalAlign, Sheet, ACCOUNTING_FORMAT,
};
use tracing::{debug, warn};

pub const CATEGORY_COLUMN: u16 = 4;
pub const FIRST_YEAR_COLUMN: u16 = 5;
pub const BLOCK_GAP: u16 = 1;
/// Columns occupied by one year block including its trailing gap.
pub const YEAR_STRIDE: u16 = MONTHS.len() as u16 + 1 + BLOCK_GAP;
/// Most year blocks that fit before Excel's last column.
pub const MAX_YEAR_BLOCKS: u16 = (MAX_COLUMN - FIRST_YEAR_COLUMN - MONTHS.len() as u16) / YEAR_STRIDE + 1;

pub const BANNER_ROW: u32 = 5;
pub const MONTH_HEADER_ROW: u32 = 6;
pub const UNALLOCATED_ROW: u32 = 7;
pub const NOTE_ROW: u32 = 8;
/// First category row of the first section; panes freeze above it.
pub const FREEZE_ROW: u32 = 12;

const BANNER_FILL: u32 = 0xCFE2F3;
const MONTH_HEADER_FILL: u32 = 0xDAE3F3;
const TOTAL_FILL: u32 = 0xFFF2CC;
const NOT_STARTED_FILL: u32 = 0xD9D9D9;
const BALANCED_FILL: u32 = 0xB6D7A8;
const OVERSPENT_FILL: u32 = 0xF4CCCC;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Income,
    Expenses,
    Savings,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Income,
        SectionKind::Expenses,
        SectionKind::Savings,
    ];

    /// Prefix of the row-boundary constants, e.g. `income_min_row`.
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Income => "income",
            SectionKind::Expenses => "expenses",
            SectionKind::Savings => "savings",
        }
    }

    /// Prefix of the range names, e.g. `ExpenseCats`.
    pub fn range_prefix(self) -> &'static str {
        match self {
            SectionKind::Income => "Income",
            SectionKind::Expenses => "Expense",
            SectionKind::Savings => "Savings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Income => "Income",
            SectionKind::Expenses => "Expenses",
            SectionKind::Savings => "Savings",
        }
    }

    pub fn transaction_type(self) -> TransactionType {
        match self {
            SectionKind::Income => TransactionType::Income,
            SectionKind::Expenses => TransactionType::Expense,
            SectionKind::Savings => TransactionType::Saving,
        }
    }

    pub fn default_categories(self) -> &'static [&'static str] {
        match self {
            SectionKind::Income => &["Salary", "Freelance", "Investments", "Other"],
            SectionKind::Expenses => &[
                "Housing",
                "Utilities",
                "Groceries",
                "Transportation",
                "Insurance",
                "Healthcare",
                "Debt Repayments",
                "Entertainment",
                "Subscriptions",
                "Miscellaneous",
            ],
            SectionKind::Savings => &[
                "Emergency Fund",
                "Retirement",
                "Investments",
                "Vacation",
                "Other",
            ],
        }
    }
}

/// One section of the planning grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDefinition {
    pub kind: SectionKind,
    pub title: String,
    pub title_row: u32,
    /// First category row.
    pub start_row: u32,
    /// Row holding the section totals; category rows end just above it.
    pub total_row: u32,
    pub fill_color: u32,
    pub categories: Vec<String>,
}

impl SectionDefinition {
    fn standard(kind: SectionKind, title_row: u32, start_row: u32, total_row: u32, fill: u32) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            title_row,
            start_row,
            total_row,
            fill_color: fill,
            categories: kind
                .default_categories()
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Number of category rows.
    pub fn capacity(&self) -> u32 {
        self.total_row - self.start_row
    }

    pub fn last_row(&self) -> u32 {
        self.total_row - 1
    }

    pub fn min_row_name(&self) -> String {
        format!("{}_min_row", self.kind.key())
    }

    pub fn max_row_name(&self) -> String {
        format!("{}_max_row", self.kind.key())
    }

    /// Categories that fit, padded with blanks to the section capacity.
    pub fn row_labels(&self) -> Vec<&str> {
        let capacity = self.capacity() as usize;
        if self.categories.len() > capacity {
            warn!(
                section = self.kind.key(),
                capacity,
                dropped = self.categories.len() - capacity,
                "More categories than rows; extra categories dropped"
            );
        }
        let mut labels: Vec<&str> = self
            .categories
            .iter()
            .take(capacity)
            .map(String::as_str)
            .collect();
        labels.resize(capacity, "");
        labels
    }
}

/// The three standard sections with their default categories.
pub fn default_sections() -> Vec<SectionDefinition> {
    vec![
        SectionDefinition::standard(SectionKind::Income, 10, 12, 24, 0x43D40F),
        SectionDefinition::standard(SectionKind::Expenses, 31, 33, 45, 0xF01010),
        SectionDefinition::standard(SectionKind::Savings, 53, 55, 67, 0x1564ED),
    ]
}

/// One scaffolded year of twelve month columns and a total column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBlock {
    pub offset: u16,
    pub first_column: u16,
}

impl YearBlock {
    pub fn new(offset: u16) -> Self {
        Self {
            offset,
            first_column: FIRST_YEAR_COLUMN + offset * YEAR_STRIDE,
        }
    }

    pub fn month_columns(&self) -> [u16; 12] {
        std::array::from_fn(|i| self.first_column + i as u16)
    }

    pub fn last_month_column(&self) -> u16 {
        self.first_column + MONTHS.len() as u16 - 1
    }

    pub fn total_column(&self) -> u16 {
        self.first_column + MONTHS.len() as u16
    }

    /// Month columns followed by the total column.
    pub fn value_columns(&self) -> impl Iterator<Item = u16> {
        self.first_column..=self.total_column()
    }
}

/// Section and year-block geometry of the planning sheet.
///
/// Built once per run and shared with the Calculations builder so both sheets
/// agree on where the section totals live.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningLayout {
    pub sections: Vec<SectionDefinition>,
    pub blocks: Vec<YearBlock>,
}

impl PlanningLayout {
    pub fn new(sections: Vec<SectionDefinition>, years: u16) -> Self {
        if years > MAX_YEAR_BLOCKS {
            warn!(
                requested = years,
                max = MAX_YEAR_BLOCKS,
                "Too many scaffold years for the sheet width; clamping"
            );
        }
        Self {
            sections,
            blocks: (0..years.clamp(1, MAX_YEAR_BLOCKS))
                .map(YearBlock::new)
                .collect(),
        }
    }

    /// Default sections with category overrides from `config`.
    pub fn from_config(config: &PlanningConfig) -> Self {
        let mut sections = default_sections();
        for section in &mut sections {
            let overrides = match section.kind {
                SectionKind::Income => &config.categories.income,
                SectionKind::Expenses => &config.categories.expenses,
                SectionKind::Savings => &config.categories.savings,
            };
            if let Some(categories) = overrides {
                section.categories = categories.clone();
            }
        }
        Self::new(sections, config.year_count())
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionDefinition> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn first_block(&self) -> YearBlock {
        self.blocks.first().copied().unwrap_or_else(|| YearBlock::new(0))
    }

    pub fn last_column(&self) -> u16 {
        self.blocks
            .last()
            .map(YearBlock::total_column)
            .unwrap_or_else(|| self.first_block().total_column())
    }

    fn total_row_of(&self, kind: SectionKind) -> Option<u32> {
        self.section(kind).map(|section| section.total_row)
    }

    /// `=<c>24-(<c>45+<c>67)` for column `column`.
    pub fn unallocated_formula(&self, column: u16) -> String {
        let letter = column_letter(column);
        let row = |kind| self.total_row_of(kind).unwrap_or_default();
        format!(
            "={l}{}-({l}{}+{l}{})",
            row(SectionKind::Income),
            row(SectionKind::Expenses),
            row(SectionKind::Savings),
            l = letter
        )
    }

    /// Gray "nothing planned yet" rule anchored on the first block column.
    pub fn not_started_formula(&self) -> String {
        let letter = column_letter(self.first_block().first_column);
        let checks: Vec<String> = SectionKind::ALL
            .iter()
            .filter_map(|kind| self.total_row_of(*kind))
            .map(|row| format!("{}${}=0", letter, row))
            .collect();
        format!("=AND({})", checks.join(","))
    }

    /// Block-0 month cells of a section's total row, sheet-qualified.
    pub fn month_total_cells(&self, kind: SectionKind, sheet: &str) -> Vec<String> {
        let Some(row) = self.total_row_of(kind) else {
            return Vec::new();
        };
        self.first_block()
            .month_columns()
            .iter()
            .map(|column| sheet_ref(sheet, &cell_ref(row, *column)))
            .collect()
    }
}

pub fn build_planning_sheet(sheet: &mut Sheet, config: &PlanningConfig, layout: &PlanningLayout) {
    build_hero(sheet, config);
    for block in &layout.blocks {
        build_year_block(sheet, block);
    }

    sheet
        .write(UNALLOCATED_ROW, CATEGORY_COLUMN, "Unallocated (per month)")
        .style
        .bold = true;

    for section in &layout.sections {
        render_section(sheet, section, layout);
    }

    for block in &layout.blocks {
        for column in block.value_columns() {
            sheet
                .write_formula(UNALLOCATED_ROW, column, layout.unallocated_formula(column))
                .set_style(&CellStyle::new().bold().number_format(ACCOUNTING_FORMAT));
        }
    }

    apply_unallocated_formatting(sheet, layout);

    sheet.set_column_width(3, 4.0);
    sheet.set_column_width(CATEGORY_COLUMN, 26.0);
    sheet.freeze_panes(FREEZE_ROW, layout.first_block().first_column);
}

fn build_hero(sheet: &mut Sheet, config: &PlanningConfig) {
    sheet
        .write(1, 3, config.hero_title.as_str())
        .set_style(&CellStyle::new().bold().size(16.0));
    sheet
        .write(3, 3, config.hero_subtitle.as_str())
        .set_style(&CellStyle::new().italic().size(11.0).wrap());
}

fn build_year_block(sheet: &mut Sheet, block: &YearBlock) {
    debug!(offset = block.offset, column = block.first_column, "Scaffolding year block");

    let banner = if block.offset == 0 {
        "=StartingYear".to_string()
    } else {
        let previous = block.first_column - YEAR_STRIDE;
        format!("={}+1", cell_ref(BANNER_ROW, previous))
    };
    sheet
        .write_formula(BANNER_ROW, block.first_column, banner)
        .set_style(&CellStyle::header(BANNER_FILL).size(13.0));
    sheet.merge(CellRange::new(
        BANNER_ROW,
        block.first_column,
        BANNER_ROW,
        block.total_column(),
    ));

    let header = CellStyle::header(MONTH_HEADER_FILL);
    let labels = MONTHS.iter().copied().chain(std::iter::once("Total"));
    for (column, label) in block.value_columns().zip(labels) {
        let flag = cell_ref(UNALLOCATED_ROW, column);
        sheet
            .write_formula(MONTH_HEADER_ROW, column, balanced_label(&flag, label))
            .set_style(&header);
    }

    let note = if block.offset == 0 {
        "Year 1 overview".to_string()
    } else {
        format!("Year {} scaffold \u{2013} extend rows as needed", block.offset + 1)
    };
    sheet
        .write(NOTE_ROW, block.first_column, note)
        .set_style(&CellStyle::new().italic().size(10.0).wrap());
}

fn render_section(sheet: &mut Sheet, section: &SectionDefinition, layout: &PlanningLayout) {
    sheet
        .write(section.title_row, CATEGORY_COLUMN, section.title.as_str())
        .set_style(
            &CellStyle::new()
                .bold()
                .font_color(0xFFFFFF)
                .fill(section.fill_color)
                .align(HorizontalAlign::Left),
        );

    let money = CellStyle::new().number_format(ACCOUNTING_FORMAT);
    for (row, label) in (section.start_row..).zip(section.row_labels()) {
        sheet.write(row, CATEGORY_COLUMN, label);
        for block in &layout.blocks {
            for column in block.month_columns() {
                sheet.write(row, column, 0).set_style(&money);
            }
            let sum = format!(
                "=SUM({}:{})",
                cell_ref(row, block.first_column),
                cell_ref(row, block.last_month_column())
            );
            sheet
                .write_formula(row, block.total_column(), sum)
                .set_style(&money);
        }
    }

    let total_style = CellStyle::new().bold().fill(TOTAL_FILL);
    sheet
        .write(
            section.total_row,
            CATEGORY_COLUMN,
            format!("Total {}", section.title),
        )
        .set_style(&total_style);
    let total_formula = section_total_indirect(&section.min_row_name(), &section.max_row_name());
    for block in &layout.blocks {
        for column in block.value_columns() {
            sheet
                .write_formula(section.total_row, column, total_formula.as_str())
                .set_style(&total_style.clone().number_format(ACCOUNTING_FORMAT));
        }
    }

    sheet.apply_border(
        CellRange::new(
            section.title_row,
            CATEGORY_COLUMN,
            section.total_row,
            layout.last_column(),
        ),
        Border::thin(),
    );
}

/// Rules in priority order: not started, balanced, overspent.
fn apply_unallocated_formatting(sheet: &mut Sheet, layout: &PlanningLayout) {
    let span = CellRange::new(
        UNALLOCATED_ROW,
        layout.first_block().first_column,
        UNALLOCATED_ROW,
        layout.last_column(),
    );
    sheet.add_conditional_format(
        span,
        ConditionalRule::Formula(layout.not_started_formula()),
        NOT_STARTED_FILL,
    );
    sheet.add_conditional_format(span, ConditionalRule::EqualTo(0.0), BALANCED_FILL);
    sheet.add_conditional_format(span, ConditionalRule::LessThan(0.0), OVERSPENT_FILL);
}

pub fn register_planning_named_ranges(
    manager: &mut NamedRangeManager<'_>,
    names: &SheetNames,
    layout: &PlanningLayout,
) -> GeneratorResult<()> {
    let sheet = names.planning();
    let block = layout.first_block();

    for section in &layout.sections {
        let prefix = section.kind.range_prefix();
        let cats = CellRange::new(
            section.start_row,
            CATEGORY_COLUMN,
            section.last_row(),
            CATEGORY_COLUMN,
        );
        let grid = CellRange::new(
            section.start_row,
            block.first_column,
            section.last_row(),
            block.total_column(),
        );
        let totals = CellRange::new(
            section.total_row,
            block.first_column,
            section.total_row,
            block.total_column(),
        );

        manager.register(&format!("{}Cats", prefix), sheet, &cats.to_string())?;
        manager.register(&format!("{}Grid", prefix), sheet, &grid.to_string())?;
        manager.register(
            &format!("{}Header", prefix),
            sheet,
            &cell_ref(section.title_row, CATEGORY_COLUMN),
        )?;
        manager.register(&format!("{}Totals", prefix), sheet, &totals.to_string())?;
    }

    let unallocated = CellRange::new(
        UNALLOCATED_ROW,
        block.first_column,
        UNALLOCATED_ROW,
        block.total_column(),
    );
    manager.register("UnallocatedRow", sheet, &unallocated.to_string())?;

    for section in &layout.sections {
        manager.register_constant(&section.min_row_name(), section.start_row)?;
        manager.register_constant(&section.max_row_name(), section.last_row())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Visibility;
    use crate::workbook::{BudgetWorkbook, CellValue};

    fn build(config: &PlanningConfig) -> (Sheet, PlanningLayout) {
        let layout = PlanningLayout::from_config(config);
        let mut sheet = Sheet::new("Budget Planning", Visibility::Visible);
        build_planning_sheet(&mut sheet, config, &layout);
        (sheet, layout)
    }

    #[test]
    fn test_year_block_geometry() {
        let block = YearBlock::new(1);
        assert_eq!(block.first_column, 19);
        assert_eq!(column_letter(block.first_column), "S");
        assert_eq!(block.total_column(), 31);
        assert_eq!(block.month_columns()[11], 30);
    }

    #[test]
    fn test_year_blocks_stop_at_last_column() {
        let layout = PlanningLayout::new(default_sections(), u16::MAX);
        assert_eq!(layout.blocks.len(), MAX_YEAR_BLOCKS as usize);
        assert!(layout.last_column() <= MAX_COLUMN);
    }

    #[test]
    fn test_banner_chain() {
        let config = PlanningConfig {
            scaffold_years: 3,
            ..PlanningConfig::default()
        };
        let (sheet, layout) = build(&config);

        assert_eq!(layout.blocks.len(), 3);
        assert_eq!(sheet.text_at("E5"), Some("=StartingYear"));
        assert_eq!(sheet.text_at("S5"), Some("=E5+1"));
        assert_eq!(sheet.text_at("AG5"), Some("=S5+1"));
        assert_eq!(sheet.merges().len(), 3);
        assert_eq!(sheet.merges()[0].range.to_string(), "E5:Q5");
    }

    #[test]
    fn test_headers_and_unallocated() {
        let (sheet, _) = build(&PlanningConfig::default());

        assert_eq!(sheet.text_at("E6"), Some("=IF(E7=0,\"Jan \u{2713}\",\"Jan\")"));
        assert_eq!(sheet.text_at("Q6"), Some("=IF(Q7=0,\"Total \u{2713}\",\"Total\")"));
        assert_eq!(sheet.text_at("E7"), Some("=E24-(E45+E67)"));
        assert_eq!(sheet.text_at("Q7"), Some("=Q24-(Q45+Q67)"));
        assert!(sheet.cell_at("R7").is_none());
        assert_eq!(sheet.frozen_at(), Some("E12".to_string()));
    }

    #[test]
    fn test_grid_initialised_with_zeroes() {
        let (sheet, _) = build(&PlanningConfig {
            scaffold_years: 1,
            ..PlanningConfig::default()
        });

        for row in [12u32, 23, 33, 44, 55, 66] {
            let cell = sheet.cell(row, 5).unwrap();
            assert_eq!(cell.value, CellValue::Number(0.0));
            assert_eq!(cell.number_format(), Some(ACCOUNTING_FORMAT));
        }
        assert_eq!(sheet.text_at("Q12"), Some("=SUM(E12:P12)"));
        assert_eq!(sheet.text_at("D12"), Some("Salary"));
        assert_eq!(sheet.text_at("D16"), Some(""));
        assert_eq!(sheet.text_at("D24"), Some("Total Income"));
    }

    #[test]
    fn test_section_totals_use_row_constants() {
        let (sheet, _) = build(&PlanningConfig::default());
        assert_eq!(
            sheet.text_at("F45"),
            Some("=SUM(INDIRECT(ADDRESS(expenses_min_row,COLUMN()) & \":\" & ADDRESS(expenses_max_row,COLUMN())))")
        );
    }

    #[test]
    fn test_category_truncation() {
        let mut config = PlanningConfig::default();
        config.categories.income = Some((1..=15).map(|i| format!("Source {}", i)).collect());
        let (sheet, layout) = build(&config);

        let income = layout.section(SectionKind::Income).unwrap();
        assert_eq!(income.capacity(), 12);
        assert_eq!(sheet.text_at("D23"), Some("Source 12"));
        assert_eq!(sheet.text_at("D24"), Some("Total Income"));
    }

    #[test]
    fn test_conditional_format_priority() {
        let (sheet, _) = build(&PlanningConfig {
            scaffold_years: 2,
            ..PlanningConfig::default()
        });
        let rules = sheet.conditional_formats();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].range.to_string(), "E7:AE7");
        assert_eq!(
            rules[0].rule,
            ConditionalRule::Formula("=AND(E$24=0,E$45=0,E$67=0)".to_string())
        );
        assert_eq!(rules[1].rule, ConditionalRule::EqualTo(0.0));
        assert_eq!(rules[2].rule, ConditionalRule::LessThan(0.0));
    }

    #[test]
    fn test_named_ranges() {
        let layout = PlanningLayout::from_config(&PlanningConfig::default());
        let mut workbook = BudgetWorkbook::new();
        let mut manager = NamedRangeManager::new(&mut workbook);
        register_planning_named_ranges(&mut manager, &SheetNames::default(), &layout).unwrap();

        assert_eq!(
            workbook.resolve_name("IncomeCats"),
            Some("'Budget Planning'!$D$12:$D$23")
        );
        assert_eq!(
            workbook.resolve_name("ExpenseGrid"),
            Some("'Budget Planning'!$E$33:$Q$44")
        );
        assert_eq!(
            workbook.resolve_name("SavingsHeader"),
            Some("'Budget Planning'!$D$53")
        );
        assert_eq!(
            workbook.resolve_name("IncomeTotals"),
            Some("'Budget Planning'!$E$24:$Q$24")
        );
        assert_eq!(
            workbook.resolve_name("UnallocatedRow"),
            Some("'Budget Planning'!$E$7:$Q$7")
        );
        assert_eq!(workbook.resolve_name("savings_max_row"), Some("66"));
    }
}
