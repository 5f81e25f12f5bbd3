//! Budget Generator - JSON spec to multi-sheet Excel budget workbook
//!
//! This library reads a declarative JSON description of a personal budgeting
//! workbook, validates it, builds every sheet in memory and renders the result
//! to `.xlsx`.
//!
//! # Features
//!
//! - JSON Schema plus semantic validation of the spec
//! - Six cross-linked sheets driven by named ranges
//! - Planning layout scaffolded for any number of years
//! - Structured tracking table, data validation and conditional formatting
//! - Doughnut charts on the dashboard
//!
//! # Example
//!
//! ```no_run
//! use budget_generator::generator::WorkbookGenerator;
//! use std::path::Path;
//!
//! let mut generator = WorkbookGenerator::from_path(Path::new("budget_spec.json"))?;
//! generator.generate(Path::new("out/budget.xlsx"))?;
//!
//! let workbook = generator.workbook().unwrap();
//! println!("Sheets: {}", workbook.sheets().len());
//! # Ok::<(), budget_generator::error::BudgetError>(())
//! ```

pub mod charts;
pub mod cli;
pub mod error;
pub mod excel;
pub mod formulas;
pub mod generator;
pub mod layout;
pub mod named_ranges;
pub mod parser;
pub mod sheets;
pub mod types;
pub mod workbook;

// Re-export commonly used types
pub use error::{BudgetError, BudgetResult, GeneratorError, GeneratorResult};
pub use generator::{generate_workbook, GeneratorState, WorkbookGenerator};
pub use types::{BudgetSpec, SheetKind, Visibility};
pub use workbook::BudgetWorkbook;
