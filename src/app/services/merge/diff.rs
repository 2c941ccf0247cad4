//! Column difference classification between aligned files
//!
//! Value columns and their flag pseudo-columns are classified separately, so
//! a flag-only correction shows up as a difference in `<P>_FLAG_W` while `<P>`
//! stays the same.

use crate::app::models::{Column, DataFile, Value, display_cell};
use crate::app::services::merge::RowAlignment;
use crate::constants::{FLAG_ENDING_IGOSS, FLAG_ENDING_WOCE};
use indexmap::IndexSet;
use tracing::{debug, info};

/// What a merge request or diff entry refers to within a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnPart {
    Values,
    FlagsWoce,
    FlagsIgoss,
}

impl ColumnPart {
    /// Split a column or pseudo-column name into its parameter and part
    pub fn split(name: &str) -> (&str, ColumnPart) {
        if let Some(parameter) = name.strip_suffix(FLAG_ENDING_WOCE) {
            (parameter, ColumnPart::FlagsWoce)
        } else if let Some(parameter) = name.strip_suffix(FLAG_ENDING_IGOSS) {
            (parameter, ColumnPart::FlagsIgoss)
        } else {
            (name, ColumnPart::Values)
        }
    }
}

/// Classification of one column name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStatus {
    Same,
    Different,
    NewInDerivative,
    MissingFromDerivative,
}

/// Column names of two files grouped by classification
///
/// Names include flag pseudo-columns. Each list keeps origin display order,
/// followed by derivative-only names in derivative display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDifferences {
    pub different: Vec<String>,
    pub not_in_origin: Vec<String>,
    pub not_in_derivative: Vec<String>,
    pub common: Vec<String>,
}

impl ColumnDifferences {
    /// Classification of a column or pseudo-column name
    pub fn status(&self, name: &str) -> Option<ColumnStatus> {
        let contains = |list: &[String]| list.iter().any(|n| n == name);
        if contains(&self.different) {
            Some(ColumnStatus::Different)
        } else if contains(&self.not_in_origin) {
            Some(ColumnStatus::NewInDerivative)
        } else if contains(&self.not_in_derivative) {
            Some(ColumnStatus::MissingFromDerivative)
        } else if contains(&self.common) {
            Some(ColumnStatus::Same)
        } else {
            None
        }
    }

    /// Whether the two files hold the same columns with the same data
    pub fn is_identical(&self) -> bool {
        self.different.is_empty() && self.not_in_origin.is_empty() && self.not_in_derivative.is_empty()
    }

    /// Union with another classification, keeping first-seen order
    ///
    /// A name that is the same in one pair of files but different in another
    /// ends up only in `different`.
    pub fn absorb(&mut self, other: ColumnDifferences) {
        extend_unique(&mut self.different, other.different);
        extend_unique(&mut self.not_in_origin, other.not_in_origin);
        extend_unique(&mut self.not_in_derivative, other.not_in_derivative);
        extend_unique(&mut self.common, other.common);
        let different = &self.different;
        self.common.retain(|name| !different.contains(name));
    }
}

fn extend_unique(target: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}

/// Value and flag column names of a file in display order
pub fn parameter_mnemonics(file: &DataFile) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for column in file.sorted_columns() {
        let mnemonic = column.parameter().mnemonic_woce();
        names.insert(mnemonic.to_string());
        if column.is_flagged_woce() {
            names.insert(format!("{}{}", mnemonic, FLAG_ENDING_WOCE));
        }
        if column.is_flagged_igoss() {
            names.insert(format!("{}{}", mnemonic, FLAG_ENDING_IGOSS));
        }
    }
    names
}

/// Relative closeness: `a == b` or `|a - b| <= epsilon * max(|a|, |b|)`
pub fn equal_with_epsilon(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a - b).abs() <= epsilon * a.abs().max(b.abs())
}

/// Whether two cells hold the same datum
///
/// Numbers must be close and print with the same number of decimal places;
/// anything else compares exactly.
pub fn cells_equal(origin: Option<&Value>, derivative: Option<&Value>, epsilon: f64) -> bool {
    match (origin, derivative) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => {
                equal_with_epsilon(x, y, epsilon) && a.decimal_places() == b.decimal_places()
            }
            _ => a == b,
        },
        _ => false,
    }
}

/// Classifies the columns of two files over a fixed alignment
#[derive(Debug, Clone, Copy)]
pub struct ColumnDiffer<'a> {
    alignment: &'a RowAlignment,
    epsilon: f64,
}

impl<'a> ColumnDiffer<'a> {
    /// Create a differ using a relative tolerance for numbers
    pub fn new(alignment: &'a RowAlignment, epsilon: f64) -> Self {
        Self { alignment, epsilon }
    }

    /// Classify every value and flag column of either file
    pub fn different_columns(&self, origin: &DataFile, derivative: &DataFile) -> ColumnDifferences {
        let origin_names = parameter_mnemonics(origin);
        let derivative_names = parameter_mnemonics(derivative);

        let mut differences = ColumnDifferences {
            not_in_origin: derivative_names
                .difference(&origin_names)
                .cloned()
                .collect(),
            not_in_derivative: origin_names
                .difference(&derivative_names)
                .cloned()
                .collect(),
            ..Default::default()
        };

        for name in origin_names.intersection(&derivative_names) {
            let (parameter, part) = ColumnPart::split(name);
            let (Some(origin_column), Some(derivative_column)) =
                (origin.column(parameter), derivative.column(parameter))
            else {
                continue;
            };

            if self.column_differs(name, part, origin_column, derivative_column) {
                differences.different.push(name.clone());
            } else {
                differences.common.push(name.clone());
            }
        }

        debug!(
            "Column classification: {} different, {} new, {} missing, {} same",
            differences.different.len(),
            differences.not_in_origin.len(),
            differences.not_in_derivative.len(),
            differences.common.len()
        );
        differences
    }

    fn column_differs(
        &self,
        name: &str,
        part: ColumnPart,
        origin: &Column,
        derivative: &Column,
    ) -> bool {
        let mut differs = false;
        for m in self.alignment.matches() {
            let (o, d) = match part {
                ColumnPart::Values => {
                    let o = origin.get(m.origin_row);
                    let d = derivative.get(m.derivative_row);
                    if cells_equal(o, d, self.epsilon) {
                        continue;
                    }
                    (display_cell(o), display_cell(d))
                }
                ColumnPart::FlagsWoce => {
                    let o = origin.flag_woce(m.origin_row);
                    let d = derivative.flag_woce(m.derivative_row);
                    if o == d {
                        continue;
                    }
                    (display_flag(o), display_flag(d))
                }
                ColumnPart::FlagsIgoss => {
                    let o = origin.flag_igoss(m.origin_row);
                    let d = derivative.flag_igoss(m.derivative_row);
                    if o == d {
                        continue;
                    }
                    (display_flag(o), display_flag(d))
                }
            };
            info!("{} differs at origin row {}: ({}, {})", name, m.origin_row, o, d);
            differs = true;
        }

        if part == ColumnPart::Values
            && origin.parameter().units_mnemonic() != derivative.parameter().units_mnemonic()
        {
            info!(
                "{} units differ: ({}, {})",
                name,
                origin.parameter().units_mnemonic().unwrap_or(""),
                derivative.parameter().units_mnemonic().unwrap_or("")
            );
            differs = true;
        }
        differs
    }
}

fn display_flag(flag: Option<u8>) -> String {
    flag.map_or_else(|| "None".to_string(), |f| f.to_string())
}
