//! In-memory workbook model.
//!
//! Sheet builders write into this model; nothing touches disk until
//! [`crate::excel::ExcelExporter`] renders it.

pub mod sheet;
pub mod style;

pub use sheet::{
    Cell, CellValue, ChartDefinition, ChartKind, ConditionalFormat, ConditionalRule,
    DataValidation, Sheet, SheetRange, TableDefinition, ValidationRule,
};
pub use style::{
    Border, CellStyle, HorizontalAlign, ACCOUNTING_FORMAT, DATE_FORMAT, PERCENT_FORMAT,
    TEXT_FORMAT,
};

use crate::error::{GeneratorError, GeneratorResult};
use crate::types::Visibility;

/// A workbook-level or sheet-local defined name.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedName {
    pub name: String,
    /// Formula text without the leading `=`, e.g. `Settings!$C$4` or `12`.
    pub refers_to: String,
    /// Sheet name for sheet-local names, `None` for workbook scope.
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetWorkbook {
    sheets: Vec<Sheet>,
    defined_names: Vec<DefinedName>,
}

impl BudgetWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. Names are unique ignoring case, as in Excel.
    pub fn add_sheet(&mut self, name: &str, visibility: Visibility) -> GeneratorResult<&mut Sheet> {
        if self.position(name).is_some() {
            return Err(GeneratorError::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Sheet::new(name, visibility));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|sheet| sheet.name().eq_ignore_ascii_case(name))
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|index| &self.sheets[index])
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.position(name).map(move |index| &mut self.sheets[index])
    }

    /// Mutable sheet lookup that fails with [`GeneratorError::SheetMissing`].
    pub fn require_sheet_mut(&mut self, name: &str) -> GeneratorResult<&mut Sheet> {
        self.sheet_mut(name)
            .ok_or_else(|| GeneratorError::SheetMissing(name.to_string()))
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Add a defined name; fails if the name already exists in the same scope.
    pub fn add_defined_name(&mut self, defined: DefinedName) -> GeneratorResult<()> {
        let clash = self.defined_names.iter().any(|existing| {
            existing.name.eq_ignore_ascii_case(&defined.name) && existing.scope == defined.scope
        });
        if clash {
            return Err(GeneratorError::DuplicateName(defined.name));
        }
        self.defined_names.push(defined);
        Ok(())
    }

    /// Workbook-scoped name lookup, ignoring case.
    pub fn defined_name(&self, name: &str) -> Option<&DefinedName> {
        self.defined_names
            .iter()
            .find(|defined| defined.scope.is_none() && defined.name.eq_ignore_ascii_case(name))
    }

    pub fn scoped_name(&self, sheet: &str, name: &str) -> Option<&DefinedName> {
        self.defined_names.iter().find(|defined| {
            defined.scope.as_deref() == Some(sheet) && defined.name.eq_ignore_ascii_case(name)
        })
    }

    pub fn defined_names(&self) -> &[DefinedName] {
        &self.defined_names
    }

    /// `refers_to` text of a workbook-scoped name.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        self.defined_name(name).map(|defined| defined.refers_to.as_str())
    }
}
