//! Registration of defined names against a workbook.

use crate::error::{GeneratorError, GeneratorResult};
use crate::layout::{absolute_reference, quote_sheet_name};
use crate::workbook::{BudgetWorkbook, DefinedName};
use std::fmt::Display;
use tracing::debug;

/// A name bound to a cell or range on a given sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRangeSpec {
    pub name: String,
    pub sheet: String,
    pub reference: String,
}

impl NamedRangeSpec {
    pub fn new(
        name: impl Into<String>,
        sheet: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sheet: sheet.into(),
            reference: reference.into(),
        }
    }
}

/// Sheet-qualified absolute reference, e.g. `'Dropdown Data'!$B$3:$B$7`.
pub fn qualified_reference(sheet: &str, reference: &str) -> GeneratorResult<String> {
    Ok(format!(
        "{}!{}",
        quote_sheet_name(sheet),
        absolute_reference(reference)?
    ))
}

/// Adds defined names to a workbook for the duration of one build step.
pub struct NamedRangeManager<'a> {
    workbook: &'a mut BudgetWorkbook,
}

impl<'a> NamedRangeManager<'a> {
    pub fn new(workbook: &'a mut BudgetWorkbook) -> Self {
        Self { workbook }
    }

    /// Bind `name` to `sheet!reference` at workbook scope and return the
    /// stored reference text.
    pub fn register(&mut self, name: &str, sheet: &str, reference: &str) -> GeneratorResult<String> {
        let refers_to = qualified_reference(sheet, reference)?;
        self.add(name, refers_to, None)
    }

    /// Same as [`register`](Self::register), visible only on `scope`.
    pub fn register_scoped(
        &mut self,
        name: &str,
        sheet: &str,
        reference: &str,
        scope: &str,
    ) -> GeneratorResult<String> {
        if !self.workbook.has_sheet(scope) {
            return Err(GeneratorError::SheetMissing(scope.to_string()));
        }
        let refers_to = qualified_reference(sheet, reference)?;
        self.add(name, refers_to, Some(scope.to_string()))
    }

    /// Bind `name` to a literal value such as a row number.
    pub fn register_constant(&mut self, name: &str, value: impl Display) -> GeneratorResult<String> {
        self.add(name, value.to_string(), None)
    }

    /// Register in order; stops at the first failure, keeping earlier names.
    pub fn register_many(&mut self, specs: &[NamedRangeSpec]) -> GeneratorResult<()> {
        for spec in specs {
            self.register(&spec.name, &spec.sheet, &spec.reference)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workbook.defined_name(name).is_some()
    }

    fn add(
        &mut self,
        name: &str,
        refers_to: String,
        scope: Option<String>,
    ) -> GeneratorResult<String> {
        debug!(name, refers_to = %refers_to, "Registering defined name");
        self.workbook.add_defined_name(DefinedName {
            name: name.to_string(),
            refers_to: refers_to.clone(),
            scope,
        })?;
        Ok(refers_to)
    }
}
