//! Data files: one station/cast (or a whole bottle cruise) as named columns
//!
//! A [`DataFile`] owns its columns, keyed by canonical parameter name in
//! insertion order, plus the file-level globals (`stamp`, `header`, cast
//! identifiers). Parameter resolution lives in the parameter registry service
//! ([`DataFile::finalize`]) and depth derivation in the depth service
//! ([`DataFile::calculate_depths`]).

use crate::app::models::{Column, Parameter, Unit, Value, is_flag_name};
use crate::constants::{
    BOTTLE_COLUMN, CAST_COLUMN, EXPOCODE_COLUMN, FLAG_ENDING_IGOSS, FLAG_ENDING_WOCE,
    HEADER_GLOBAL, PRESSURE_PARAMETERS, STAMP_GLOBAL, STATION_COLUMN,
};
use crate::{Error, Result};
use indexmap::IndexMap;
use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series, TimeUnit};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info, warn};

// =============================================================================
// Row Keys
// =============================================================================

/// Normalized key tuple identifying one row (sample) of a file
///
/// Parts follow the order of the key columns used to build it; an absent key
/// cell is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub Vec<String>);

impl RowKey {
    /// Key parts in key column order
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

// =============================================================================
// DataFile
// =============================================================================

/// Columnar in-memory representation of one data file
#[derive(Debug, Clone, PartialEq)]
pub struct DataFile {
    /// Columns keyed by parameter name
    pub(crate) columns: IndexMap<String, Column>,

    /// Explicit display order overriding parameter display order
    pub(crate) ordered_columns: Vec<String>,

    /// File-level values; always holds `stamp` and `header`
    pub(crate) globals: IndexMap<String, Value>,

    /// Human-readable changes made while curating this file
    pub(crate) changes_to_report: Vec<String>,

    /// Whether parameter resolution has run
    pub(crate) finalized: bool,
}

impl Default for DataFile {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFile {
    /// Create an empty file with blank `stamp` and `header` globals
    pub fn new() -> Self {
        let mut globals = IndexMap::new();
        globals.insert(STAMP_GLOBAL.to_string(), Value::from(""));
        globals.insert(HEADER_GLOBAL.to_string(), Value::from(""));
        Self {
            columns: IndexMap::new(),
            ordered_columns: Vec::new(),
            globals,
            changes_to_report: Vec::new(),
            finalized: false,
        }
    }

    /// Number of rows: the length of the longest column
    pub fn len(&self) -> usize {
        self.columns.values().map(Column::len).max().unwrap_or(0)
    }

    /// Whether the file has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether a column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Mutable column by name
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Column by name, failing with [`Error::ColumnNotFound`]
    pub fn get_column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Mutable column by name, failing with [`Error::ColumnNotFound`]
    pub fn get_column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .get_mut(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Insert a column under its parameter name, returning any column it replaces
    pub fn insert_column(&mut self, column: Column) -> Option<Column> {
        self.columns.insert(column.name().to_string(), column)
    }

    /// Remove a column, keeping the order of the others
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.ordered_columns.retain(|n| n != name);
        self.columns.shift_remove(name)
    }

    /// Existing column, or a new declared column added at the end
    pub fn ensure_column(&mut self, name: &str) -> &mut Column {
        self.columns
            .entry(name.to_string())
            .or_insert_with(|| Column::declared(name, None))
    }

    /// Move a column to a new key, keeping its position
    pub(crate) fn rekey_column(&mut self, old: &str, new: &str) -> Result<()> {
        let index = self
            .columns
            .get_index_of(old)
            .ok_or_else(|| Error::column_not_found(old))?;
        let Some(column) = self.columns.shift_remove(old) else {
            return Err(Error::column_not_found(old));
        };
        let index = index.min(self.columns.len());
        self.columns.shift_insert(index, new.to_string(), column);
        for name in self.ordered_columns.iter_mut() {
            if name == old {
                *name = new.to_string();
            }
        }
        Ok(())
    }

    /// All columns in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    // -------------------------------------------------------------------------
    // Globals
    // -------------------------------------------------------------------------

    /// File-level values
    pub fn globals(&self) -> &IndexMap<String, Value> {
        &self.globals
    }

    /// Global value by name
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Set a global value
    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Processing stamp
    pub fn stamp(&self) -> String {
        self.global_text(STAMP_GLOBAL)
    }

    /// Free-text header
    pub fn header(&self) -> String {
        self.global_text(HEADER_GLOBAL)
    }

    fn global_text(&self, name: &str) -> String {
        self.globals
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Changes recorded while curating this file
    pub fn changes_to_report(&self) -> &[String] {
        &self.changes_to_report
    }

    /// Record a change for the next stamp
    pub fn report_change(&mut self, change: impl Into<String>) {
        self.changes_to_report.push(change.into());
    }

    /// Whether parameter resolution has run
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // -------------------------------------------------------------------------
    // Display order
    // -------------------------------------------------------------------------

    /// Override parameter display order with an explicit column order
    pub fn set_ordered_columns(&mut self, names: &[&str]) {
        self.ordered_columns = names.iter().map(|n| n.to_string()).collect();
    }

    /// Explicit column order, empty when parameter display order applies
    pub fn ordered_columns(&self) -> &[String] {
        &self.ordered_columns
    }

    /// Columns in display order
    ///
    /// With an explicit order, the listed columns come first and the rest
    /// follow by parameter display order. Ties keep insertion order.
    pub fn sorted_columns(&self) -> Vec<&Column> {
        let mut listed: Vec<&Column> = self
            .ordered_columns
            .iter()
            .filter_map(|name| self.columns.get(name))
            .collect();

        let mut rest: Vec<&Column> = self
            .columns
            .iter()
            .filter(|(name, _)| !self.ordered_columns.contains(name))
            .map(|(_, column)| column)
            .collect();
        rest.sort_by_key(|column| column.parameter().display_order);

        listed.append(&mut rest);
        listed
    }

    /// WOCE mnemonics in display order
    pub fn column_headers(&self) -> Vec<String> {
        self.sorted_columns()
            .into_iter()
            .map(|c| c.parameter().mnemonic_woce().to_string())
            .collect()
    }

    /// Display formats in display order
    pub fn formats(&self) -> Vec<String> {
        self.sorted_columns()
            .into_iter()
            .map(|c| c.parameter().format.clone())
            .collect()
    }

    /// Parameters in display order
    pub fn parameters(&self) -> Vec<&Parameter> {
        self.sorted_columns()
            .into_iter()
            .map(Column::parameter)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Construction helpers
    // -------------------------------------------------------------------------

    /// Create columns for the given parameters
    ///
    /// Flag pseudo-names and already present columns are skipped. When units
    /// are given they are positional; a parameter that already knows its unit
    /// is checked against the given one and a mismatch is logged. With
    /// `ordered`, the creation order becomes the explicit display order.
    pub fn create_columns<P, I>(&mut self, parameters: I, units: Option<&[&str]>, ordered: bool)
    where
        P: Into<Parameter>,
        I: IntoIterator<Item = P>,
    {
        for (i, parameter) in parameters.into_iter().enumerate() {
            let mut parameter: Parameter = parameter.into();
            let name = parameter.mnemonic_woce().to_string();

            if is_flag_name(&name) {
                info!("Skipped creating column for flag {}", name);
                continue;
            }
            if self.columns.contains_key(&name) {
                info!("Skipped creating already present column {}", name);
                continue;
            }

            let given = units
                .and_then(|u| u.get(i))
                .map(|u| u.trim())
                .filter(|u| !u.is_empty());
            let expected = parameter.units_mnemonic().map(str::to_string);
            match (expected, given) {
                (Some(expected), Some(given)) if expected != given => {
                    warn!(
                        "Mismatched units for {}. Expected '{}' and received '{}'",
                        name, expected, given
                    );
                }
                (None, Some(given)) if !parameter.is_canonical() => {
                    parameter.units = Some(Unit::from_mnemonic(given));
                }
                _ => {}
            }

            self.columns.insert(name.clone(), Column::new(parameter));
            if ordered {
                self.ordered_columns.push(name);
            }
        }
    }

    /// Empty file with the same parameters, column order and globals
    pub fn copy_shape(&self) -> DataFile {
        let mut copy = DataFile::new();
        copy.create_columns(self.parameters().into_iter().cloned(), None, false);
        copy.ordered_columns = self.ordered_columns.clone();
        copy.globals = self.globals.clone();
        copy
    }

    /// Unique expocodes in first-seen order
    ///
    /// Falls back to the `EXPOCODE` global for files that carry it there.
    pub fn expocodes(&self) -> Vec<String> {
        let mut unique: Vec<String> = Vec::new();
        match self.columns.get(EXPOCODE_COLUMN) {
            Some(column) => {
                for value in column.values().iter().flatten() {
                    let code = value.to_string();
                    if !unique.contains(&code) {
                        unique.push(code);
                    }
                }
            }
            None => {
                if let Some(value) = self.globals.get(EXPOCODE_COLUMN) {
                    unique.push(value.to_string());
                }
            }
        }
        unique
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Cells of one row in display order
    pub fn row(&self, index: usize) -> Vec<Option<&Value>> {
        self.sorted_columns()
            .into_iter()
            .map(|column| column.get(index))
            .collect()
    }

    /// Key columns from `candidates` that exist in this file, in candidate order
    pub fn available_keys<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        candidates
            .iter()
            .map(|k| k.as_ref())
            .filter(|k| self.columns.contains_key(*k))
            .map(str::to_string)
            .collect()
    }

    /// Normalized key tuple of one row over the given key columns
    pub fn row_key<S: AsRef<str>>(&self, index: usize, keys: &[S]) -> RowKey {
        RowKey(
            keys.iter()
                .map(|key| {
                    self.columns
                        .get(key.as_ref())
                        .and_then(|column| column.get(index))
                        .map(Value::key_part)
                        .unwrap_or_default()
                })
                .collect(),
        )
    }

    /// Sort the rows of each contiguous station/cast run by pressure, then bottle number
    ///
    /// Files without a pressure column are left untouched.
    pub fn reorder_by_pressure(&mut self, pres_ascending: bool, bot_ascending: bool) {
        let Some(pressure_name) = PRESSURE_PARAMETERS
            .iter()
            .find(|p| self.columns.contains_key(**p))
        else {
            debug!("No pressure column; row order unchanged");
            return;
        };

        let length = self.len();
        if length == 0 {
            return;
        }

        let pressures: Vec<Option<f64>> = (0..length)
            .map(|i| self.columns[*pressure_name].get(i).and_then(Value::as_f64))
            .collect();
        let bottles: Vec<String> = (0..length)
            .map(|i| {
                self.columns
                    .get(BOTTLE_COLUMN)
                    .and_then(|c| c.get(i))
                    .map(Value::key_part)
                    .unwrap_or_default()
            })
            .collect();

        let run_keys = [STATION_COLUMN, CAST_COLUMN];
        let mut order: Vec<usize> = Vec::with_capacity(length);
        let mut start = 0;
        while start < length {
            let run_key = self.row_key(start, &run_keys);
            let mut end = start + 1;
            while end < length && self.row_key(end, &run_keys) == run_key {
                end += 1;
            }

            let mut run: Vec<usize> = (start..end).collect();
            run.sort_by(|&a, &b| {
                let by_pressure = compare_pressure(pressures[a], pressures[b]);
                let by_pressure = if pres_ascending {
                    by_pressure
                } else {
                    by_pressure.reverse()
                };
                let by_bottle = compare_bottle(&bottles[a], &bottles[b]);
                let by_bottle = if bot_ascending {
                    by_bottle
                } else {
                    by_bottle.reverse()
                };
                by_pressure.then(by_bottle)
            });
            order.extend(run);
            start = end;
        }

        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return;
        }
        debug!("Reordering {} rows by {}", length, pressure_name);
        self.permute_rows(&order);
    }

    /// Rearrange every column so that new row `i` is old row `order[i]`
    fn permute_rows(&mut self, order: &[usize]) {
        let length = order.len();
        for column in self.columns.values_mut() {
            column.set_length(length);
            column.values = order.iter().map(|&i| column.values[i].clone()).collect();
            if column.is_flagged_woce() {
                column.flags_woce = order.iter().map(|&i| column.flags_woce[i]).collect();
            }
            if column.is_flagged_igoss() {
                column.flags_igoss = order.iter().map(|&i| column.flags_igoss[i]).collect();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Export the file as a polars DataFrame in display order
    ///
    /// Flag tracks in use become `<P>_FLAG_W` / `<P>_FLAG_I` integer columns.
    /// Columns shorter than the file are padded with nulls.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let length = self.len();
        let mut frame_columns = Vec::new();

        for column in self.sorted_columns() {
            let name = column.parameter().mnemonic_woce();
            let cells: Vec<Option<&Value>> = (0..length).map(|i| column.get(i)).collect();
            frame_columns.push(values_to_series(name, &cells)?.into_column());

            if column.is_flagged_woce() {
                let flags: Vec<Option<i32>> = (0..length)
                    .map(|i| column.flag_woce(i).map(i32::from))
                    .collect();
                let flag_name = format!("{}{}", name, FLAG_ENDING_WOCE);
                frame_columns.push(Series::new(flag_name.as_str().into(), flags).into_column());
            }
            if column.is_flagged_igoss() {
                let flags: Vec<Option<i32>> = (0..length)
                    .map(|i| column.flag_igoss(i).map(i32::from))
                    .collect();
                let flag_name = format!("{}{}", name, FLAG_ENDING_IGOSS);
                frame_columns.push(Series::new(flag_name.as_str().into(), flags).into_column());
            }
        }

        DataFrame::new(frame_columns)
            .map_err(|e| Error::frame("Failed to assemble data file frame", e))
    }
}

impl From<&str> for Parameter {
    fn from(name: &str) -> Self {
        Parameter::declared(name, None)
    }
}

/// Build a typed series from a column's cells
///
/// Columns of only integers become Int64, of only numbers Float64, of only
/// timestamps Datetime(ms); anything mixed is exported as text.
fn values_to_series(name: &str, cells: &[Option<&Value>]) -> Result<Series> {
    let present = || cells.iter().flatten();

    if present().all(|v| matches!(v, Value::Integer(_))) {
        let data: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Some(Value::Integer(i)) => Some(*i),
                _ => None,
            })
            .collect();
        return Ok(Series::new(name.into(), data));
    }

    if present().all(|v| v.is_numeric()) {
        let data: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(Value::as_f64)).collect();
        return Ok(Series::new(name.into(), data));
    }

    if present().all(|v| matches!(v, Value::DateTime(_))) {
        let millis: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Some(Value::DateTime(dt)) => Some(dt.and_utc().timestamp_millis()),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| Error::frame(format!("Failed to cast {} to datetime", name), e));
    }

    let data: Vec<Option<String>> = cells.iter().map(|c| c.map(|v| v.to_string())).collect();
    Ok(Series::new(name.into(), data))
}

fn compare_pressure(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_bottle(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Globals:")?;
        for (name, value) in &self.globals {
            writeln!(f, "{}: {}", name, value)?;
        }
        writeln!(f, "Data:")?;
        for column in self.sorted_columns() {
            writeln!(f, "{}", column)?;
            if column.is_flagged_woce() {
                writeln!(f, "\t{:?}", column.flags_woce())?;
            }
            if column.is_flagged_igoss() {
                writeln!(f, "\t{:?}", column.flags_igoss())?;
            }
        }
        Ok(())
    }
}
