//! Workbook orchestration.
//!
//! [`WorkbookGenerator`] owns the single workbook of a run and walks it
//! through `Uninitialized → WorkbookCreated → SheetsCreated → ContentBuilt →
//! Saved`. Each step checks its precondition and fails with a
//! [`GeneratorError`] instead of silently doing nothing.

use crate::charts::add_dashboard_doughnut_charts;
use crate::error::{BudgetResult, GeneratorError, GeneratorResult};
use crate::excel::ExcelExporter;
use crate::named_ranges::{qualified_reference, NamedRangeManager};
use crate::parser::parse_spec;
use crate::sheets::calculations::{build_calculations_sheet, register_calculations_named_ranges};
use crate::sheets::dashboard::{build_dashboard_sheet, register_dashboard_named_ranges};
use crate::sheets::dropdown::{build_dropdown_sheet, register_dropdown_named_ranges};
use crate::sheets::planning::{build_planning_sheet, register_planning_named_ranges, PlanningLayout};
use crate::sheets::settings::{build_settings_sheet, register_settings_named_ranges};
use crate::sheets::tracking::build_tracking_sheet;
use crate::sheets::SheetNames;
use crate::types::{BudgetSpec, SheetKind, Visibility};
use crate::workbook::BudgetWorkbook;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneratorState {
    Uninitialized,
    WorkbookCreated,
    SheetsCreated,
    ContentBuilt,
    Saved,
}

impl GeneratorState {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneratorState::Uninitialized => "uninitialized",
            GeneratorState::WorkbookCreated => "created without sheets",
            GeneratorState::SheetsCreated => "structured but empty",
            GeneratorState::ContentBuilt => "already built",
            GeneratorState::Saved => "already saved",
        }
    }
}

pub struct WorkbookGenerator {
    spec: BudgetSpec,
    workbook: Option<BudgetWorkbook>,
    state: GeneratorState,
}

impl WorkbookGenerator {
    pub fn new(spec: BudgetSpec) -> Self {
        Self {
            spec,
            workbook: None,
            state: GeneratorState::Uninitialized,
        }
    }

    /// Load and validate a spec file, then wrap it in a generator.
    pub fn from_path(path: &Path) -> BudgetResult<Self> {
        Ok(Self::new(parse_spec(path)?))
    }

    pub fn spec(&self) -> &BudgetSpec {
        &self.spec
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn workbook(&self) -> Option<&BudgetWorkbook> {
        self.workbook.as_ref()
    }

    /// Start from an empty workbook, discarding any previous one.
    pub fn create_workbook(&mut self) {
        self.workbook = Some(BudgetWorkbook::new());
        self.state = GeneratorState::WorkbookCreated;
        debug!("Created empty workbook");
    }

    /// Create one worksheet per declared sheet, in declaration order.
    pub fn create_sheets(&mut self) -> GeneratorResult<()> {
        let workbook = self
            .workbook
            .as_mut()
            .ok_or(GeneratorError::WorkbookNotInitialized)?;

        for (index, meta) in self.spec.workbook.sheets.iter().enumerate() {
            let name = meta.name.trim();
            if name.is_empty() {
                return Err(GeneratorError::InvalidSheetMetadata(index + 1));
            }
            workbook.add_sheet(name, meta.visibility)?;
            debug!(sheet = name, visibility = meta.visibility.as_str(), "Created worksheet");
        }

        self.state = GeneratorState::SheetsCreated;
        Ok(())
    }

    /// Populate every sheet and register the named ranges between them.
    pub fn build_sheet_contents(&mut self) -> GeneratorResult<()> {
        let workbook = self
            .workbook
            .as_mut()
            .ok_or(GeneratorError::WorkbookNotInitialized)?;
        if self.state != GeneratorState::SheetsCreated {
            return Err(GeneratorError::InvalidState {
                operation: "build sheet contents",
                state: self.state.as_str(),
            });
        }

        let names = SheetNames::from_declared(workbook.sheet_names());
        let configs = &self.spec.sheets;
        let layout = PlanningLayout::from_config(&configs.planning);
        let starting_year = configs.settings.general.starting_year;

        build_settings_sheet(workbook.require_sheet_mut(names.settings())?, &configs.settings);
        register_settings_named_ranges(&mut NamedRangeManager::new(workbook), &names)?;
        info!(sheet = names.settings(), "Built sheet");

        build_dropdown_sheet(workbook.require_sheet_mut(names.dropdown())?, &configs.dropdown);
        register_dropdown_named_ranges(
            &mut NamedRangeManager::new(workbook),
            &names,
            &configs.dropdown,
        )?;
        info!(sheet = names.dropdown(), "Built sheet");

        build_planning_sheet(
            workbook.require_sheet_mut(names.planning())?,
            &configs.planning,
            &layout,
        );
        register_planning_named_ranges(&mut NamedRangeManager::new(workbook), &names, &layout)?;
        info!(
            sheet = names.planning(),
            years = layout.blocks.len(),
            "Built sheet"
        );

        build_tracking_sheet(
            workbook.require_sheet_mut(names.tracking())?,
            &configs.tracking,
            starting_year,
        );
        info!(sheet = names.tracking(), "Built sheet");

        build_calculations_sheet(
            workbook.require_sheet_mut(names.calculations())?,
            &names,
            &layout,
            &configs.tracking.table_name,
        );
        register_calculations_named_ranges(&mut NamedRangeManager::new(workbook), &names)?;
        info!(sheet = names.calculations(), "Built sheet");

        let dashboard = workbook.require_sheet_mut(names.dashboard())?;
        build_dashboard_sheet(dashboard, &configs.dashboard);
        add_dashboard_doughnut_charts(dashboard, &names);
        register_dashboard_named_ranges(&mut NamedRangeManager::new(workbook), &names)?;
        info!(sheet = names.dashboard(), "Built sheet");

        for kind in SheetKind::ALL.into_iter().filter(|kind| kind.is_helper()) {
            let sheet = workbook.require_sheet_mut(names.get(kind))?;
            if !sheet.visibility().is_hidden() {
                sheet.set_visibility(Visibility::Hidden);
            }
        }

        for message in named_range_drift(&self.spec, workbook) {
            warn!("{}", message);
        }

        self.state = GeneratorState::ContentBuilt;
        Ok(())
    }

    /// Render the workbook to `path`, creating parent directories.
    ///
    /// Allowed once sheets exist, so a structure-only workbook can be saved.
    pub fn save_workbook(&mut self, path: &Path) -> GeneratorResult<PathBuf> {
        let workbook = self
            .workbook
            .as_ref()
            .ok_or(GeneratorError::WorkbookNotInitialized)?;
        if self.state < GeneratorState::SheetsCreated {
            return Err(GeneratorError::InvalidState {
                operation: "save the workbook",
                state: self.state.as_str(),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| GeneratorError::OutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        ExcelExporter::new(workbook).export(path)?;
        info!(path = %path.display(), "Saved workbook");

        self.state = GeneratorState::Saved;
        Ok(path.to_path_buf())
    }

    /// Run every step and save to `path`.
    pub fn generate(&mut self, path: &Path) -> GeneratorResult<PathBuf> {
        self.create_workbook();
        self.create_sheets()?;
        self.build_sheet_contents()?;
        self.save_workbook(path)
    }
}

/// Differences between the spec's declared named ranges and the generated ones.
pub fn named_range_drift(spec: &BudgetSpec, workbook: &BudgetWorkbook) -> Vec<String> {
    let names = SheetNames::from_declared(workbook.sheet_names());
    let mut drift = Vec::new();

    for (name, declared) in &spec.workbook.named_ranges {
        let sheet = SheetKind::from_name(&declared.sheet)
            .map(|kind| names.get(kind).to_string())
            .unwrap_or_else(|| declared.sheet.clone());
        let expected = match qualified_reference(&sheet, &declared.reference) {
            Ok(expected) => expected,
            Err(_) => {
                drift.push(format!(
                    "Declared named range '{}' has an invalid reference '{}'",
                    name, declared.reference
                ));
                continue;
            }
        };

        match workbook.resolve_name(name) {
            None => drift.push(format!(
                "Declared named range '{}' was not generated",
                name
            )),
            Some(actual) if actual != expected => drift.push(format!(
                "Declared named range '{}' points to {} but the workbook uses {}",
                name, expected, actual
            )),
            Some(_) => {}
        }
    }

    drift
}

/// Parse `spec_path` and write the workbook to `output`.
pub fn generate_workbook(spec_path: &Path, output: &Path) -> BudgetResult<PathBuf> {
    let mut generator = WorkbookGenerator::from_path(spec_path)?;
    Ok(generator.generate(output)?)
}
