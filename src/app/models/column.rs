//! Flag-aware value series for one parameter
//!
//! A [`Column`] holds the values of one parameter for every row of a file,
//! plus two independent quality flag tracks (WOCE and IGOSS). A flag track is
//! "in use" once any flag has been written to it; from then on it is kept the
//! same length as the values.

use crate::app::models::{Parameter, Value};
use crate::constants::{FILL_VALUE, igoss, woce};
use crate::{Error, Result};
use std::fmt;
use tracing::warn;

/// One parameter's values and quality flags
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) parameter: Parameter,
    pub(crate) values: Vec<Option<Value>>,
    pub(crate) flags_woce: Vec<Option<u8>>,
    pub(crate) flags_igoss: Vec<Option<u8>>,
}

impl Column {
    /// Create an empty column for a parameter
    pub fn new(parameter: Parameter) -> Self {
        Self {
            parameter,
            values: Vec::new(),
            flags_woce: Vec::new(),
            flags_igoss: Vec::new(),
        }
    }

    /// Create an empty column for a parameter name as declared by a decoder
    pub fn declared(name: &str, units: Option<&str>) -> Self {
        Self::new(Parameter::declared(name, units))
    }

    /// Parameter describing this column
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Column name (the parameter's mnemonic)
    pub fn name(&self) -> &str {
        &self.parameter.name
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a row; `None` when absent or past the end
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(|cell| cell.as_ref())
    }

    /// All cells
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Mutable access to the cells without changing the row count
    pub fn values_mut(&mut self) -> &mut [Option<Value>] {
        &mut self.values
    }

    /// WOCE flag track
    pub fn flags_woce(&self) -> &[Option<u8>] {
        &self.flags_woce
    }

    /// IGOSS flag track
    pub fn flags_igoss(&self) -> &[Option<u8>] {
        &self.flags_igoss
    }

    /// WOCE flag at a row
    pub fn flag_woce(&self, row: usize) -> Option<u8> {
        self.flags_woce.get(row).copied().flatten()
    }

    /// IGOSS flag at a row
    pub fn flag_igoss(&self, row: usize) -> Option<u8> {
        self.flags_igoss.get(row).copied().flatten()
    }

    /// Whether any flag track is in use
    pub fn is_flagged(&self) -> bool {
        self.is_flagged_woce() || self.is_flagged_igoss()
    }

    /// Whether the WOCE flag track is in use
    pub fn is_flagged_woce(&self) -> bool {
        !self.flags_woce.is_empty()
    }

    /// Whether the IGOSS flag track is in use
    pub fn is_flagged_igoss(&self) -> bool {
        !self.flags_igoss.is_empty()
    }

    /// Whether the column contains a value
    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().flatten().any(|v| v == value)
    }

    /// Whether every row holds the same cell
    pub fn is_global(&self) -> bool {
        match self.values.first() {
            Some(first) => self.values.iter().all(|cell| cell == first),
            None => true,
        }
    }

    /// Apply the range and flag policy shared by [`Column::set`] and [`Column::append`]
    ///
    /// Returns the value and WOCE flag that will actually be stored.
    pub fn check_range(
        &self,
        row: usize,
        value: Option<Value>,
        flag_woce: Option<u8>,
    ) -> Result<(Option<Value>, u8)> {
        if let Some(flag) = flag_woce {
            if !woce::is_valid(flag) {
                return Err(Error::invalid_flag(self.name(), "WOCE", flag));
            }
        }

        let (value, flag_woce) = match value {
            Some(v) if !self.parameter.is_in_range(&v) => {
                warn!(
                    "{} is not in range for {} ({:?}, {:?}) at row {}; storing as missing",
                    v, self.parameter, self.parameter.bound_lower, self.parameter.bound_upper, row
                );
                (None, Some(woce::MISSING))
            }
            other => (other, flag_woce),
        };

        match (value, flag_woce) {
            (None, None) | (None, Some(woce::MISSING)) => Ok((None, woce::MISSING)),
            (None, Some(flag)) => Err(Error::invalid_flag_for_missing_value(
                self.name(),
                row,
                flag,
            )),
            (Some(v), None) => Ok((Some(v), woce::ACCEPTABLE)),
            (Some(v), Some(flag)) => Ok((Some(v), flag)),
        }
    }

    /// Set a row, extending the column when writing past the end
    pub fn set(
        &mut self,
        row: usize,
        value: Option<Value>,
        flag_woce: Option<u8>,
        flag_igoss: Option<u8>,
    ) -> Result<()> {
        let (value, flag_woce) = self.check_range(row, value, flag_woce)?;
        if let Some(flag) = flag_igoss {
            if !igoss::is_valid(flag) {
                return Err(Error::invalid_flag(self.name(), "IGOSS", flag));
            }
        }

        self.ensure_row(row);
        self.values[row] = value;
        start_track(&mut self.flags_woce, self.values.len());
        self.flags_woce[row] = Some(flag_woce);
        if flag_igoss.is_some() {
            start_track(&mut self.flags_igoss, self.values.len());
            self.flags_igoss[row] = flag_igoss;
        }
        Ok(())
    }

    /// Append a row under the same policy as [`Column::set`]
    pub fn append(
        &mut self,
        value: Option<Value>,
        flag_woce: Option<u8>,
        flag_igoss: Option<u8>,
    ) -> Result<()> {
        let row = self.values.len();
        self.set(row, value, flag_woce, flag_igoss)
    }

    /// Write the WOCE flag of a row, leaving its value untouched
    pub fn set_flag_woce(&mut self, row: usize, flag: u8) -> Result<()> {
        if !woce::is_valid(flag) {
            return Err(Error::invalid_flag(self.name(), "WOCE", flag));
        }
        self.ensure_row(row);
        start_track(&mut self.flags_woce, self.values.len());
        self.flags_woce[row] = Some(flag);
        Ok(())
    }

    /// Write the IGOSS flag of a row, leaving its value untouched
    pub fn set_flag_igoss(&mut self, row: usize, flag: u8) -> Result<()> {
        if !igoss::is_valid(flag) {
            return Err(Error::invalid_flag(self.name(), "IGOSS", flag));
        }
        self.ensure_row(row);
        start_track(&mut self.flags_igoss, self.values.len());
        self.flags_igoss[row] = Some(flag);
        Ok(())
    }

    /// Store a cell verbatim, bypassing the range policy
    ///
    /// Used when copying already-validated cells between files.
    pub(crate) fn put_raw(
        &mut self,
        row: usize,
        value: Option<Value>,
        flag_woce: Option<u8>,
        flag_igoss: Option<u8>,
    ) {
        self.ensure_row(row);
        self.values[row] = value;
        if flag_woce.is_some() {
            start_track(&mut self.flags_woce, self.values.len());
            self.flags_woce[row] = flag_woce;
        }
        if flag_igoss.is_some() {
            start_track(&mut self.flags_igoss, self.values.len());
            self.flags_igoss[row] = flag_igoss;
        }
    }

    /// Resize every track to `length` rows
    ///
    /// New rows are absent; in-use flag tracks are padded with flag 9.
    pub fn set_length(&mut self, length: usize) {
        self.values.resize(length, None);
        if self.is_flagged_woce() {
            self.flags_woce.resize(length, Some(woce::MISSING));
        }
        if self.is_flagged_igoss() {
            self.flags_igoss.resize(length, Some(igoss::MISSING));
        }
    }

    /// Start the WOCE flag track (if not yet in use) padded with flag 9
    pub(crate) fn start_woce_track(&mut self) {
        if self.flags_woce.is_empty() {
            self.flags_woce = vec![Some(woce::MISSING); self.values.len()];
        }
    }

    /// Start the IGOSS flag track (if not yet in use) padded with flag 9
    pub(crate) fn start_igoss_track(&mut self) {
        if self.flags_igoss.is_empty() {
            self.flags_igoss = vec![Some(igoss::MISSING); self.values.len()];
        }
    }

    /// Maximum number of decimal places over present values
    ///
    /// Fails for a column holding a value without tracked precision rather
    /// than guessing a format.
    pub fn decimal_places(&self) -> Result<u32> {
        let mut places = 0;
        for (row, cell) in self.values.iter().enumerate() {
            let Some(value) = cell else {
                continue;
            };
            match value.decimal_places() {
                Some(p) => places = places.max(p),
                None => return Err(Error::precision_untracked(self.name(), row)),
            }
        }
        Ok(places)
    }

    /// Every row printed at the column's decimal places, absent rows as the fill value
    pub fn formatted_values(&self) -> Result<Vec<String>> {
        let places = self.decimal_places()? as usize;
        Ok(self
            .values
            .iter()
            .map(|cell| match cell.as_ref().and_then(Value::as_f64) {
                Some(number) => format!("{:.*}", places, number),
                None => format!("{:.*}", places, FILL_VALUE),
            })
            .collect())
    }

    /// Extend values and in-use flag tracks so that `row` exists
    fn ensure_row(&mut self, row: usize) {
        let needed = row + 1;
        if self.values.len() < needed {
            self.values.resize(needed, None);
        }
        let len = self.values.len();
        if self.is_flagged_woce() && self.flags_woce.len() < len {
            self.flags_woce.resize(len, Some(woce::MISSING));
        }
        if self.is_flagged_igoss() && self.flags_igoss.len() < len {
            self.flags_igoss.resize(len, Some(igoss::MISSING));
        }
    }
}

/// Begin a flag track sized to the values, leaving earlier rows unflagged
fn start_track(track: &mut Vec<Option<u8>>, len: usize) {
    if track.len() < len {
        track.resize(len, None);
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self
            .values
            .iter()
            .map(|cell| crate::app::models::value::display_cell(cell.as_ref()))
            .collect();
        write!(f, "Column({}): [{}]", self.parameter, cells.join(", "))
    }
}
