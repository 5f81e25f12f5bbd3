//! Excel rendering and read-back
//!
//! - Export: in-memory workbook → .xlsx via rust_xlsxwriter
//! - Import: .xlsx → structural snapshot via calamine

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::{read_workbook, ExcelImporter, SheetSummary, TableSummary, WorkbookSnapshot};
