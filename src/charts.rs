//! Doughnut charts on the dashboard, wired to the Calculations comparison table.

use crate::layout::CellRange;
use crate::sheets::calculations::{comparison_row, BUDGETED_COLUMN, HEADER_ROW, TRACKED_COLUMN};
use crate::sheets::planning::SectionKind;
use crate::sheets::SheetNames;
use crate::workbook::{ChartDefinition, ChartKind, Sheet, SheetRange};
use tracing::debug;

pub const CHART_STYLE: u8 = 10;
pub const HOLE_SIZE: u8 = 50;
/// Roughly 8cm square.
pub const CHART_SIZE: u32 = 302;

/// Title and top-left anchor of one dashboard chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub section: SectionKind,
    pub title: &'static str,
    pub anchor_row: u32,
    pub anchor_column: u16,
}

pub const CHART_SPECS: [ChartSpec; 3] = [
    ChartSpec {
        section: SectionKind::Income,
        title: "Income (Budget vs Tracked)",
        anchor_row: 6,
        anchor_column: 5,
    },
    ChartSpec {
        section: SectionKind::Expenses,
        title: "Expenses (Budget vs Tracked)",
        anchor_row: 6,
        anchor_column: 9,
    },
    ChartSpec {
        section: SectionKind::Savings,
        title: "Savings (Budget vs Tracked)",
        anchor_row: 6,
        anchor_column: 13,
    },
];

/// Budgeted vs tracked doughnut for one section.
pub fn doughnut_chart(spec: &ChartSpec, calculations_sheet: &str) -> ChartDefinition {
    let row = comparison_row(spec.section);
    ChartDefinition {
        kind: ChartKind::Doughnut,
        title: spec.title.to_string(),
        anchor_row: spec.anchor_row,
        anchor_column: spec.anchor_column,
        values: SheetRange {
            sheet: calculations_sheet.to_string(),
            range: CellRange::new(row, BUDGETED_COLUMN, row, TRACKED_COLUMN),
        },
        categories: SheetRange {
            sheet: calculations_sheet.to_string(),
            range: CellRange::new(HEADER_ROW, BUDGETED_COLUMN, HEADER_ROW, TRACKED_COLUMN),
        },
        style: CHART_STYLE,
        hole_size: HOLE_SIZE,
        width: CHART_SIZE,
        height: CHART_SIZE,
        show_value: true,
        show_percentage: true,
    }
}

/// Attach the three section charts to the dashboard sheet.
pub fn add_dashboard_doughnut_charts(dashboard: &mut Sheet, names: &SheetNames) {
    for spec in &CHART_SPECS {
        debug!(title = spec.title, "Adding dashboard chart");
        dashboard.add_chart(doughnut_chart(spec, names.calculations()));
    }
}
