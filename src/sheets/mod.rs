//! Sheet builders.
//!
//! Each module exposes a `build_*_sheet` function that writes one worksheet
//! and a `register_*_named_ranges` function that binds the names other
//! sheets rely on.

pub mod calculations;
pub mod dashboard;
pub mod dropdown;
pub mod planning;
pub mod settings;
pub mod tracking;

use crate::types::SheetKind;
use std::collections::BTreeMap;

/// Actual worksheet names in use, keyed by kind.
///
/// The planning sheet may be declared as `Budget-Planning`; everything that
/// builds a cross-sheet reference looks the name up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    names: BTreeMap<SheetKind, String>,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            names: SheetKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.display_name().to_string()))
                .collect(),
        }
    }
}

impl SheetNames {
    /// Override the name used for `kind`.
    pub fn with_name(mut self, kind: SheetKind, name: impl Into<String>) -> Self {
        self.names.insert(kind, name.into());
        self
    }

    /// Resolve from a list of declared names; unknown names are ignored.
    pub fn from_declared<'a>(declared: impl IntoIterator<Item = &'a str>) -> Self {
        declared
            .into_iter()
            .fold(Self::default(), |names, name| match SheetKind::from_name(name) {
                Some(kind) => names.with_name(kind, name),
                None => names,
            })
    }

    pub fn get(&self, kind: SheetKind) -> &str {
        self.names
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.display_name())
    }

    pub fn settings(&self) -> &str {
        self.get(SheetKind::Settings)
    }

    pub fn dropdown(&self) -> &str {
        self.get(SheetKind::DropdownData)
    }

    pub fn planning(&self) -> &str {
        self.get(SheetKind::BudgetPlanning)
    }

    pub fn tracking(&self) -> &str {
        self.get(SheetKind::BudgetTracking)
    }

    pub fn calculations(&self) -> &str {
        self.get(SheetKind::Calculations)
    }

    pub fn dashboard(&self) -> &str {
        self.get(SheetKind::BudgetDashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenated_planning_name() {
        let names = SheetNames::from_declared(["Settings", "Budget-Planning", "Bogus"]);
        assert_eq!(names.planning(), "Budget-Planning");
        assert_eq!(names.settings(), "Settings");
        assert_eq!(names.dashboard(), "Budget Dashboard");
    }
}
