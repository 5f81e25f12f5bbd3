use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Month abbreviations in calendar order, shared by every sheet that lists months.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

//==============================================================================
// Sheets
//==============================================================================

/// The six worksheets a budget workbook is made of, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SheetKind {
    Settings,
    DropdownData,
    BudgetPlanning,
    BudgetTracking,
    Calculations,
    BudgetDashboard,
}

impl SheetKind {
    pub const ALL: [SheetKind; 6] = [
        SheetKind::Settings,
        SheetKind::DropdownData,
        SheetKind::BudgetPlanning,
        SheetKind::BudgetTracking,
        SheetKind::Calculations,
        SheetKind::BudgetDashboard,
    ];

    /// Canonical display name.
    pub fn display_name(self) -> &'static str {
        match self {
            SheetKind::Settings => "Settings",
            SheetKind::DropdownData => "Dropdown Data",
            SheetKind::BudgetPlanning => "Budget Planning",
            SheetKind::BudgetTracking => "Budget Tracking",
            SheetKind::Calculations => "Calculations",
            SheetKind::BudgetDashboard => "Budget Dashboard",
        }
    }

    /// Resolve a display name, accepting the hyphenated planning variant.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Budget-Planning" => Some(SheetKind::BudgetPlanning),
            other => Self::ALL
                .into_iter()
                .find(|kind| kind.display_name() == other),
        }
    }

    /// Helper sheets are always hidden in the generated workbook.
    pub fn is_helper(self) -> bool {
        matches!(self, SheetKind::DropdownData | SheetKind::Calculations)
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::VeryHidden => "veryHidden",
        }
    }

    pub fn is_hidden(self) -> bool {
        self != Visibility::Visible
    }
}

//==============================================================================
// Specification
//==============================================================================

/// A parsed budget workbook specification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetSpec {
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub workbook: WorkbookSpec,
    #[serde(default)]
    pub sheets: SheetConfigs,
}

impl BudgetSpec {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Sheet declarations with their resolved kinds, in declaration order.
    pub fn declared_sheets(&self) -> impl Iterator<Item = (&SheetMetadata, Option<SheetKind>)> {
        self.workbook
            .sheets
            .iter()
            .map(|meta| (meta, SheetKind::from_name(&meta.name)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkbookSpec {
    #[serde(default)]
    pub sheets: Vec<SheetMetadata>,
    #[serde(default)]
    pub named_ranges: BTreeMap<String, NamedRangeDecl>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SheetMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl SheetMetadata {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }
}

/// A named range declared in the spec. Only used to report drift against
/// the names the builders actually register.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedRangeDecl {
    pub sheet: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Builder configuration keyed by sheet display name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SheetConfigs {
    #[serde(rename = "Settings")]
    pub settings: SettingsConfig,
    #[serde(rename = "Dropdown Data")]
    pub dropdown: DropdownConfig,
    #[serde(rename = "Budget Planning", alias = "Budget-Planning")]
    pub planning: PlanningConfig,
    #[serde(rename = "Budget Tracking")]
    pub tracking: TrackingConfig,
    #[serde(rename = "Calculations")]
    pub calculations: CalculationsConfig,
    #[serde(rename = "Budget Dashboard")]
    pub dashboard: DashboardConfig,
}

//==============================================================================
// Settings
//==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub general: GeneralSettings,
    pub late_income: LateIncomeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub title: String,
    pub starting_year: i32,
    pub starting_year_help: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            title: "General Settings".to_string(),
            starting_year: 2025,
            starting_year_help: "\u{2190} Change this to your budget base year".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LateIncomeSettings {
    pub enabled_default: bool,
    pub day_default: u32,
}

impl Default for LateIncomeSettings {
    fn default() -> Self {
        Self {
            enabled_default: false,
            day_default: 25,
        }
    }
}

//==============================================================================
// Dropdown Data
//==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropdownConfig {
    pub years: YearsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YearsConfig {
    pub count: u32,
    pub start_row: u32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            count: 5,
            start_row: 3,
        }
    }
}

//==============================================================================
// Budget Planning
//==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub scaffold_years: i64,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub categories: PlanningCategories,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            scaffold_years: 16,
            hero_title: "Budget Planning".to_string(),
            hero_subtitle: "Plan each month ahead, then compare against what you actually tracked."
                .to_string(),
            categories: PlanningCategories::default(),
        }
    }
}

impl PlanningConfig {
    /// Number of year blocks to scaffold; never less than one.
    pub fn year_count(&self) -> u16 {
        self.scaffold_years.clamp(1, u16::MAX as i64) as u16
    }
}

/// Per-section category overrides. `None` keeps the built-in defaults; an
/// explicit empty list leaves every row of the section blank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanningCategories {
    pub income: Option<Vec<String>>,
    pub expenses: Option<Vec<String>>,
    pub savings: Option<Vec<String>>,
}

//==============================================================================
// Budget Tracking
//==============================================================================

/// Column headers of the tracking table, left to right.
pub const TRACKING_HEADERS: [&str; 7] = [
    "Date",
    "Type",
    "Category",
    "Amount",
    "Details",
    "Balance",
    "Effective Date",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Row number of the last data row of the table.
    pub max_rows: u32,
    pub table_name: String,
    pub header_row: u32,
    /// 1-based column of the Date column.
    pub start_column: u16,
    pub intro: TrackingIntro,
    pub notes: TrackingNotes,
    pub sample_entries: Vec<RawTrackingEntry>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_rows: 200,
            table_name: "tblTracking".to_string(),
            header_row: 11,
            start_column: 3,
            intro: TrackingIntro::default(),
            notes: TrackingNotes::default(),
            sample_entries: Vec::new(),
        }
    }
}

impl TrackingConfig {
    pub fn data_start_row(&self) -> u32 {
        self.header_row.saturating_add(1)
    }

    /// Last data row; always leaves at least one data row under the header.
    pub fn end_row(&self) -> u32 {
        self.max_rows.max(self.data_start_row())
    }

    pub fn end_column(&self) -> u16 {
        self.start_column + TRACKING_HEADERS.len() as u16 - 1
    }

    /// Column of the header called `name`.
    pub fn column_of(&self, name: &str) -> Option<u16> {
        TRACKING_HEADERS
            .iter()
            .position(|header| *header == name)
            .map(|offset| self.start_column + offset as u16)
    }

    pub fn data_row_count(&self) -> u32 {
        self.end_row() - self.header_row
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingIntro {
    pub title: String,
    pub duration: Option<String>,
}

impl Default for TrackingIntro {
    fn default() -> Self {
        Self {
            title: "Budget Tracking".to_string(),
            duration: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackingNotes {
    pub tutorial_label: Option<String>,
    pub pause_label: Option<String>,
}

/// A sample entry as written in the spec. Fields stay optional so incomplete
/// entries can be skipped instead of failing the whole spec.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTrackingEntry {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub details: Option<String>,
}

impl RawTrackingEntry {
    /// Convert into a typed entry; `None` when a required field is missing
    /// or unparseable.
    pub fn to_entry(&self) -> Option<TrackingEntry> {
        let date = parse_entry_date(self.date.as_deref()?)?;
        let transaction_type = self.transaction_type.as_deref()?.parse().ok()?;
        let category = self.category.as_deref().filter(|c| !c.is_empty())?;
        let amount = self.amount?;

        Some(TrackingEntry {
            date,
            transaction_type,
            category: category.to_string(),
            amount,
            details: self.details.clone().filter(|d| !d.is_empty()),
        })
    }
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component.
pub fn parse_entry_date(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingEntry {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: f64,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
    Saving,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Saving,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Saving => "Saving",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" | "Expenses" => Ok(TransactionType::Expense),
            "Saving" | "Savings" => Ok(TransactionType::Saving),
            other => Err(format!(
                "unknown transaction type '{}' (expected Income, Expense or Saving)",
                other
            )),
        }
    }
}

//==============================================================================
// Calculations / Dashboard
//==============================================================================

/// The Calculations sheet has a fixed layout and takes no options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculationsConfig {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub selectors: DashboardSelectors,
    pub tiles: DashboardTiles,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSelectors {
    pub default_period: String,
    pub default_year_formula: String,
}

impl Default for DashboardSelectors {
    fn default() -> Self {
        Self {
            default_period: "Jan".to_string(),
            default_year_formula: "=StartingYear".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardTiles {
    pub tracking_balance_formula: String,
    pub savings_rate_formula: String,
}

impl Default for DashboardTiles {
    fn default() -> Self {
        Self {
            tracking_balance_formula: "=Calculations!C6".to_string(),
            savings_rate_formula: "=IFERROR(Calculations!G5/SUM(Calculations!F3:F5),0)"
                .to_string(),
        }
    }
}
