use std::path::PathBuf;
use thiserror::Error;

pub type BudgetResult<T> = Result<T, BudgetError>;
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Top-level error for a generation run.
///
/// The `Display` text of each variant starts with a stable prefix so the CLI
/// can surface it verbatim.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Specification not found: {}", path.display())]
    SpecNotFound { path: PathBuf },

    #[error("Unable to read specification {}: {source}", path.display())]
    SpecRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {message} (line {line}, column {column})", path.display())]
    SpecParse {
        path: PathBuf,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Specification validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Workbook generation failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Failed to read workbook {}: {message}", path.display())]
    Import { path: PathBuf, message: String },
}

/// Errors raised while building or saving a workbook.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Call create_workbook() before using the workbook")]
    WorkbookNotInitialized,

    #[error("Expected worksheet '{0}' to exist")]
    SheetMissing(String),

    #[error("Cannot {operation} while the workbook is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Sheet metadata #{0} must include a non-empty 'name'")]
    InvalidSheetMetadata(usize),

    #[error("Worksheet '{0}' is declared more than once")]
    DuplicateSheet(String),

    #[error("Named range '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write workbook to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl BudgetError {
    /// Whether the error originates from the spec file rather than the generator.
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            BudgetError::SpecNotFound { .. }
                | BudgetError::SpecRead { .. }
                | BudgetError::SpecParse { .. }
                | BudgetError::Validation(_)
        )
    }
}
