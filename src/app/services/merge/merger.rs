//! Selective merge of derivative columns into an origin file

use crate::app::models::{Column, DataFile, Value};
use crate::app::services::merge::{
    ColumnDiffer, ColumnDifferences, ColumnPart, ColumnStatus, KeySelection, MergeReport,
    MergeWarning, RowAlignment, determine_bottle_keys, determine_ctd_keys, parameter_mnemonics,
};
use crate::config::MergeConfig;
use crate::constants::{HEADER_GLOBAL, woce};
use crate::{Error, Result};
use indexmap::IndexSet;
use tracing::{info, warn};

/// Merged file and what happened while producing it
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: DataFile,
    pub report: MergeReport,
}

/// Merges selected columns of a derivative file into a copy of an origin file
///
/// Keys, row alignment and column classification are computed once in the
/// constructor and reused by every [`Merger::merge`] call.
#[derive(Debug, Clone)]
pub struct Merger<'a> {
    origin: &'a DataFile,
    derivative: &'a DataFile,
    selection: KeySelection,
    alignment: RowAlignment,
    differences: ColumnDifferences,
}

impl<'a> Merger<'a> {
    /// Prepare a bottle merge keyed on the configured sample identifiers
    pub fn new(origin: &'a DataFile, derivative: &'a DataFile, config: &MergeConfig) -> Result<Self> {
        let selection = determine_bottle_keys(origin, derivative, &config.key_columns)?;
        Self::with_selection(origin, derivative, selection, config)
    }

    /// Prepare a CTD merge keyed on the first shared pressure column
    pub fn for_ctd<S: AsRef<str>>(
        origin: &'a DataFile,
        derivative: &'a DataFile,
        pressure_parameters: &[S],
        config: &MergeConfig,
    ) -> Result<Self> {
        let selection = determine_ctd_keys(origin, derivative, pressure_parameters)?;
        Self::with_selection(origin, derivative, selection, config)
    }

    /// Prepare a merge on an explicit key selection
    pub fn with_selection(
        origin: &'a DataFile,
        derivative: &'a DataFile,
        selection: KeySelection,
        config: &MergeConfig,
    ) -> Result<Self> {
        let alignment =
            RowAlignment::build(origin, derivative, &selection.keys, config.duplicate_keys)?;
        let differences =
            ColumnDiffer::new(&alignment, config.epsilon).different_columns(origin, derivative);
        Ok(Self {
            origin,
            derivative,
            selection,
            alignment,
            differences,
        })
    }

    /// Key columns in use
    pub fn keys(&self) -> &[String] {
        &self.selection.keys
    }

    /// Row alignment in use
    pub fn alignment(&self) -> &RowAlignment {
        &self.alignment
    }

    /// Column classification between the two files
    pub fn differences(&self) -> &ColumnDifferences {
        &self.differences
    }

    /// Merge the requested value columns and flag pseudo-columns
    ///
    /// Fails, producing nothing, when a request names a key column or a
    /// column neither file has. Requests that name origin-only columns are
    /// skipped with a warning.
    pub fn merge<S: AsRef<str>>(&self, requested: &[S]) -> Result<MergeOutcome> {
        let requests: IndexSet<&str> = requested.iter().map(|r| r.as_ref().trim()).collect();

        let origin_names = parameter_mnemonics(self.origin);
        let derivative_names = parameter_mnemonics(self.derivative);
        for &request in &requests {
            let (parameter, _) = ColumnPart::split(request);
            if self.selection.keys.iter().any(|k| k == parameter) {
                return Err(Error::merge_key_column(request));
            }
            if !origin_names.contains(request) && !derivative_names.contains(request) {
                return Err(Error::column_not_found(request));
            }
        }

        let mut report = self.base_report();
        let mut merged = self.origin.clone();
        let rows = merged.len();

        for &request in &requests {
            match self.differences.status(request) {
                Some(ColumnStatus::MissingFromDerivative) => {
                    warn!("{} is not in the derivative file; not merging it", request);
                    report.warnings.push(MergeWarning::MissingFromDerivative {
                        column: request.to_string(),
                    });
                    continue;
                }
                Some(ColumnStatus::Same) => {
                    info!("Instructed to merge {} which is not different; merging anyway", request);
                }
                _ => {}
            }

            let (parameter, part) = ColumnPart::split(request);
            let source = self.derivative.get_column(parameter)?;
            let target = merged
                .columns
                .entry(parameter.to_string())
                .or_insert_with(|| new_column_like(source, rows));
            target.set_length(rows.max(target.len()));

            let updated = match part {
                ColumnPart::Values => {
                    adopt_units(target, source, &mut report);
                    self.overwrite_values(target, source, &mut report)
                }
                ColumnPart::FlagsWoce => self.overwrite_flags_woce(target, source, &mut report),
                ColumnPart::FlagsIgoss => self.overwrite_flags_igoss(target, source),
            };

            merged.report_change(format!(
                "Merged {} from derivative: {} aligned rows updated",
                request, updated
            ));
            report.merged.push(request.to_string());
        }

        let mut header = format!(
            "# Merged parameters: {}\n# {}\n",
            report.merged.join(", "),
            self.origin.stamp().trim_end()
        );
        let origin_header = self.origin.header();
        let origin_header = origin_header.trim_end();
        if !origin_header.is_empty() {
            header.push_str(origin_header);
            header.push('\n');
        }
        merged.set_global(HEADER_GLOBAL, header);

        info!("{}", report.summary());
        Ok(MergeOutcome { merged, report })
    }

    /// Report seeded with the key and alignment warnings
    fn base_report(&self) -> MergeReport {
        let mut warnings = Vec::new();
        if self.selection.is_mismatched() {
            warnings.push(MergeWarning::KeyMismatch {
                origin: self.selection.origin.clone(),
                derivative: self.selection.derivative.clone(),
            });
        }
        warnings.extend(self.alignment.duplicates().iter().map(|d| {
            MergeWarning::DuplicateKey {
                side: d.side,
                key: d.key.clone(),
                first: d.first,
                ignored: d.ignored,
            }
        }));
        warnings.extend(self.alignment.unmatched_derivative().iter().map(|u| {
            MergeWarning::UnmatchedDerivativeKey {
                row: u.row,
                key: u.key.clone(),
            }
        }));
        warnings.extend(self.alignment.unmatched_origin().iter().map(|u| {
            MergeWarning::UnmatchedOriginKey {
                row: u.row,
                key: u.key.clone(),
            }
        }));

        MergeReport {
            keys: self.selection.keys.clone(),
            merged: Vec::new(),
            warnings,
        }
    }

    fn overwrite_values(&self, target: &mut Column, source: &Column, report: &mut MergeReport) -> usize {
        for m in self.alignment.matches() {
            match source.get(m.derivative_row) {
                Some(value) if !target.parameter().is_in_range(value) => {
                    store_out_of_range(target, m.origin_row, value, report);
                }
                cell => {
                    target.values[m.origin_row] = cell.cloned();
                    check_absent_flag(target, m.origin_row, report);
                }
            }
        }
        self.alignment.len()
    }

    fn overwrite_flags_woce(
        &self,
        target: &mut Column,
        source: &Column,
        report: &mut MergeReport,
    ) -> usize {
        target.start_woce_track();
        for m in self.alignment.matches() {
            target.flags_woce[m.origin_row] = source.flag_woce(m.derivative_row);
            check_absent_flag(target, m.origin_row, report);
        }
        self.alignment.len()
    }

    fn overwrite_flags_igoss(&self, target: &mut Column, source: &Column) -> usize {
        target.start_igoss_track();
        for m in self.alignment.matches() {
            target.flags_igoss[m.origin_row] = source.flag_igoss(m.derivative_row);
        }
        self.alignment.len()
    }
}

/// Empty column for a derivative-only parameter: absent values flagged 9
fn new_column_like(source: &Column, rows: usize) -> Column {
    let mut column = Column::new(source.parameter().clone());
    column.set_length(rows);
    column.start_woce_track();
    if source.is_flagged_igoss() {
        column.start_igoss_track();
    }
    column
}

fn adopt_units(target: &mut Column, source: &Column, report: &mut MergeReport) {
    let Some(units) = source.parameter().units.as_ref() else {
        return;
    };
    let from = target.parameter().units_mnemonic().map(str::to_string);
    if from.as_deref() == Some(units.mnemonic.as_str()) {
        return;
    }
    warn!(
        "Changed units for {} from '{}' to '{}'",
        target.name(),
        from.as_deref().unwrap_or(""),
        units.mnemonic
    );
    report.warnings.push(MergeWarning::UnitsChanged {
        column: target.name().to_string(),
        from,
        to: Some(units.mnemonic.clone()),
    });
    target.parameter.units = Some(units.clone());
}

/// Bounds hold for merged cells too: an out-of-range value is stored absent with flag 9
fn store_out_of_range(column: &mut Column, row: usize, value: &Value, report: &mut MergeReport) {
    warn!(
        "{} is not in range for {} ({:?}, {:?}) at row {}; storing as missing",
        value,
        column.name(),
        column.parameter().bound_lower,
        column.parameter().bound_upper,
        row
    );
    report.warnings.push(MergeWarning::OutOfRange {
        column: column.name().to_string(),
        row,
        value: value.to_string(),
    });
    column.start_woce_track();
    column.values[row] = None;
    column.flags_woce[row] = Some(woce::MISSING);
}

/// An absent value may only carry WOCE flag 9
fn check_absent_flag(column: &mut Column, row: usize, report: &mut MergeReport) {
    if column.values[row].is_some() {
        return;
    }
    let Some(Some(flag)) = column.flags_woce.get(row).copied() else {
        return;
    };
    if flag == woce::MISSING {
        return;
    }
    warn!(
        "Flag {} for absent value of {} at row {}; storing 9",
        flag,
        column.name(),
        row
    );
    report.warnings.push(MergeWarning::FlagOnAbsentValue {
        column: column.name().to_string(),
        row,
        flag,
    });
    column.flags_woce[row] = Some(woce::MISSING);
}
