//! Excel importer: reads a saved workbook back with calamine.
//!
//! Used by `inspect` and by the round-trip tests. Values come back as
//! [`CellValue`]; formula cells keep their leading `=`.

use crate::error::{BudgetError, BudgetResult};
use crate::layout::parse_cell;
use crate::types::Visibility;
use crate::workbook::CellValue;
use calamine::{open_workbook, Data, Reader, SheetVisible, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub name: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub name: String,
    pub sheet: String,
    pub columns: Vec<String>,
}

/// Structure of a saved workbook: sheets, defined names and tables.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSnapshot {
    pub path: PathBuf,
    pub sheets: Vec<SheetSummary>,
    /// `(name, refers_to)` as stored in the file.
    pub defined_names: Vec<(String, String)>,
    pub tables: Vec<TableSummary>,
}

impl WorkbookSnapshot {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSummary> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn defined_name(&self, name: &str) -> Option<&str> {
        self.defined_names
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, refers_to)| refers_to.trim_start_matches('='))
    }

    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Excel importer for generated budget workbooks
pub struct ExcelImporter {
    path: PathBuf,
    workbook: Xlsx<BufReader<File>>,
}

impl ExcelImporter {
    pub fn open<P: AsRef<Path>>(path: P) -> BudgetResult<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook: Xlsx<_> = open_workbook(&path).map_err(|e: calamine::XlsxError| BudgetError::Import {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, workbook })
    }

    fn import_error(&self, message: impl ToString) -> BudgetError {
        BudgetError::Import {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    pub fn sheets(&self) -> Vec<SheetSummary> {
        self.workbook
            .sheets_metadata()
            .iter()
            .map(|sheet| SheetSummary {
                name: sheet.name.clone(),
                visibility: match sheet.visible {
                    SheetVisible::Visible => Visibility::Visible,
                    SheetVisible::Hidden => Visibility::Hidden,
                    SheetVisible::VeryHidden => Visibility::VeryHidden,
                },
            })
            .collect()
    }

    pub fn defined_names(&self) -> Vec<(String, String)> {
        self.workbook.defined_names().to_vec()
    }

    pub fn tables(&mut self) -> BudgetResult<Vec<TableSummary>> {
        self.workbook
            .load_tables()
            .map_err(|e| self.import_error(e))?;

        let names: Vec<String> = self
            .workbook
            .table_names()
            .into_iter()
            .cloned()
            .collect();

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let table = self
                .workbook
                .table_by_name(&name)
                .map_err(|e| self.import_error(e))?;
            tables.push(TableSummary {
                name: table.name().to_string(),
                sheet: table.sheet_name().to_string(),
                columns: table.columns().to_vec(),
            });
        }
        Ok(tables)
    }

    pub fn snapshot(&mut self) -> BudgetResult<WorkbookSnapshot> {
        Ok(WorkbookSnapshot {
            path: self.path.clone(),
            sheets: self.sheets(),
            defined_names: self.defined_names(),
            tables: self.tables()?,
        })
    }

    /// Cell at an A1 reference; formula cells come back as formulas.
    pub fn cell(&mut self, sheet: &str, reference: &str) -> BudgetResult<CellValue> {
        let (row, column) = parse_cell(reference).map_err(|e| self.import_error(e))?;
        let position = (row - 1, u32::from(column) - 1);

        let formulas = self
            .workbook
            .worksheet_formula(sheet)
            .map_err(|e| self.import_error(e))?;
        if let Some(formula) = formulas.get_value(position).filter(|f| !f.is_empty()) {
            return Ok(CellValue::Formula(format!("={}", formula)));
        }

        let values = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| self.import_error(e))?;
        Ok(values.get_value(position).map(to_cell_value).unwrap_or_default())
    }
}

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

/// Open `path` and capture its structure.
pub fn read_workbook(path: &Path) -> BudgetResult<WorkbookSnapshot> {
    ExcelImporter::open(path)?.snapshot()
}
