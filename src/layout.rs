//! Cell coordinate helpers shared by every sheet builder.
//!
//! All row and column numbers in this crate are 1-based, matching the A1
//! notation written into formulas. The exporter converts to the 0-based
//! indices `rust_xlsxwriter` expects.

use crate::error::{GeneratorError, GeneratorResult};
use regex::Regex;
use std::fmt;

/// Highest column Excel accepts (XFD).
pub const MAX_COLUMN: u16 = 16_384;
/// Highest row Excel accepts.
pub const MAX_ROW: u32 = 1_048_576;

/// Convert a 1-based column number to its letter form.
///
/// Examples:
/// - 1 → A
/// - 26 → Z
/// - 27 → AA
/// - 702 → ZZ
pub fn column_letter(column: u16) -> String {
    let mut result = String::new();
    let mut idx = column.saturating_sub(1) as usize;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert column letters (case-insensitive) to a 1-based column number.
pub fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    if index == 0 || index > MAX_COLUMN as u32 {
        return None;
    }
    Some(index as u16)
}

/// Relative A1 reference, e.g. `E12`.
pub fn cell_ref(row: u32, column: u16) -> String {
    format!("{}{}", column_letter(column), row)
}

/// Absolute A1 reference, e.g. `$E$12`.
pub fn absolute_cell_ref(row: u32, column: u16) -> String {
    format!("${}${}", column_letter(column), row)
}

/// Parse an A1 reference (with or without `$` anchors) into `(row, column)`.
pub fn parse_cell(reference: &str) -> GeneratorResult<(u32, u16)> {
    let pattern = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$")
        .map_err(|_| GeneratorError::InvalidReference(reference.to_string()))?;

    let captures = pattern
        .captures(reference.trim())
        .ok_or_else(|| GeneratorError::InvalidReference(reference.to_string()))?;

    let column = column_index(&captures[1])
        .ok_or_else(|| GeneratorError::InvalidReference(reference.to_string()))?;
    let row: u32 = captures[2]
        .parse()
        .map_err(|_| GeneratorError::InvalidReference(reference.to_string()))?;

    if row == 0 || row > MAX_ROW {
        return Err(GeneratorError::InvalidReference(reference.to_string()));
    }

    Ok((row, column))
}

/// Normalise `A1` or `A1:B2` (any mix of anchors) to the fully absolute form.
pub fn absolute_reference(reference: &str) -> GeneratorResult<String> {
    let range = CellRange::parse(reference)?;
    Ok(range.to_absolute())
}

/// Quote a sheet name for use in a formula when Excel requires it.
///
/// Names made only of letters, digits, `_` and `.` stay bare; anything else
/// (spaces, hyphens, ...) is wrapped in single quotes with embedded quotes
/// doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let bare = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');

    if bare {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Sheet-qualified reference, e.g. `'Budget Planning'!E24`.
pub fn sheet_ref(sheet: &str, reference: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet), reference)
}

/// A rectangular block of cells, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first_row: u32,
    pub first_column: u16,
    pub last_row: u32,
    pub last_column: u16,
}

impl CellRange {
    pub fn new(first_row: u32, first_column: u16, last_row: u32, last_column: u16) -> Self {
        Self {
            first_row: first_row.min(last_row),
            first_column: first_column.min(last_column),
            last_row: first_row.max(last_row),
            last_column: first_column.max(last_column),
        }
    }

    pub fn single(row: u32, column: u16) -> Self {
        Self::new(row, column, row, column)
    }

    /// Parse `A1` or `A1:B2`.
    pub fn parse(reference: &str) -> GeneratorResult<Self> {
        match reference.split_once(':') {
            Some((start, end)) => {
                let (first_row, first_column) = parse_cell(start)?;
                let (last_row, last_column) = parse_cell(end)?;
                Ok(Self::new(first_row, first_column, last_row, last_column))
            }
            None => {
                let (row, column) = parse_cell(reference)?;
                Ok(Self::single(row, column))
            }
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_column == self.last_column
    }

    pub fn contains(&self, row: u32, column: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_column..=self.last_column).contains(&column)
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn to_absolute(&self) -> String {
        let start = absolute_cell_ref(self.first_row, self.first_column);
        if self.is_single_cell() {
            start
        } else {
            format!(
                "{}:{}",
                start,
                absolute_cell_ref(self.last_row, self.last_column)
            )
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = cell_ref(self.first_row, self.first_column);
        if self.is_single_cell() {
            write!(f, "{}", start)
        } else {
            write!(
                f,
                "{}:{}",
                start,
                cell_ref(self.last_row, self.last_column)
            )
        }
    }
}
