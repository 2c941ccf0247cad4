//! Finalize pass: resolve declared columns against the registry
//!
//! Decoders create columns with the names and units found in the file and
//! then call [`DataFile::finalize`] once. Each column is resolved to its
//! canonical parameter, renamed if it was declared under an alias, and has
//! its values converted when the declared unit differs from the canonical one
//! and a conversion is registered.

use crate::app::models::{Column, DataFile, DataFileCollection, Parameter, is_contrived_name};
use crate::app::services::parameter_registry::{ParameterRegistry, UnitConverterRegistry};
use crate::config::ResolutionConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Declared and canonical units that could not be reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMismatch {
    /// Canonical column name
    pub column: String,
    /// Unit mnemonic found in the file
    pub declared: String,
    /// Unit mnemonic of the canonical parameter
    pub canonical: String,
}

/// Outcome of a finalize pass over one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Columns resolved to a canonical parameter
    pub resolved: Vec<String>,

    /// Alias columns moved to their canonical name, as `(alias, canonical)`
    pub renamed: Vec<(String, String)>,

    /// Columns whose name is not in the registry; left in place unresolved
    pub unknown: Vec<String>,

    /// Contrived columns passed through without lookup
    pub contrived: Vec<String>,

    /// Aliases left unresolved because their canonical column already exists
    pub conflicting: Vec<String>,

    /// Conversion descriptions, as recorded in the file's change log
    pub conversions: Vec<String>,

    /// Unit differences left unconverted
    pub unconverted: Vec<UnitMismatch>,

    /// Set when the file had already been finalized and nothing was done
    pub already_finalized: bool,
}

impl ResolutionReport {
    /// Whether every non-contrived column was resolved without unit problems
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.conflicting.is_empty() && self.unconverted.is_empty()
    }
}

/// Registry, converters and settings used by the finalize pass
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    registry: ParameterRegistry,
    converters: UnitConverterRegistry,
    config: ResolutionConfig,
}

impl Default for ParameterResolver {
    fn default() -> Self {
        Self::new(ParameterRegistry::woce_defaults())
    }
}

impl ParameterResolver {
    /// Create a resolver with the built-in conversions and default settings
    pub fn new(registry: ParameterRegistry) -> Self {
        Self {
            registry,
            converters: UnitConverterRegistry::with_defaults(),
            config: ResolutionConfig::default(),
        }
    }

    /// Replace the unit conversions
    pub fn with_converters(mut self, converters: UnitConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    /// Replace the resolution settings
    pub fn with_config(mut self, config: ResolutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry used for lookups
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Conversions available to the pass
    pub fn converters(&self) -> &UnitConverterRegistry {
        &self.converters
    }

    /// Resolve one column of a file in place
    fn resolve_column(
        &self,
        file: &mut DataFile,
        name: &str,
        report: &mut ResolutionReport,
    ) -> Result<()> {
        let declared = file.get_column(name)?.parameter().clone();

        if declared.is_canonical() {
            debug!("{} is already canonical", name);
            return Ok(());
        }

        if declared.is_contrived() || is_contrived_name(name) {
            if !name.contains("_FLAG_") {
                info!(
                    "Parameter '{}' will not be checked against known parameters",
                    name
                );
            }
            report.contrived.push(name.to_string());
            return Ok(());
        }

        let canonical = match self.registry.resolve(&declared.name) {
            Ok(parameter) => parameter,
            Err(Error::UnknownParameter { .. }) => {
                warn!("Unknown parameter '{}'", name);
                report.unknown.push(name.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut key = name.to_string();
        if canonical.name != name {
            if file.contains_column(&canonical.name) {
                warn!(
                    "{} is an alias for {} but that column already exists; leaving it unresolved",
                    name, canonical.name
                );
                report.conflicting.push(name.to_string());
                return Ok(());
            }
            file.rekey_column(name, &canonical.name)?;
            report
                .renamed
                .push((name.to_string(), canonical.name.clone()));
            key = canonical.name.clone();
        }

        let adopted = self.reconcile_units(file, &key, &declared, canonical, report)?;
        file.get_column_mut(&key)?.parameter = adopted;
        report.resolved.push(key);
        Ok(())
    }

    /// Convert values if needed and return the parameter the column adopts
    fn reconcile_units(
        &self,
        file: &mut DataFile,
        key: &str,
        declared: &Parameter,
        canonical: Parameter,
        report: &mut ResolutionReport,
    ) -> Result<Parameter> {
        let given = declared.units_mnemonic().map(str::to_string);
        let expected = canonical.units_mnemonic().map(str::to_string);

        if !self.config.convert_units {
            let mut adopted = canonical;
            adopted.units = declared.units.clone();
            return Ok(adopted);
        }

        let (Some(given), Some(expected)) = (given, expected) else {
            return Ok(canonical);
        };
        if given == expected {
            return Ok(canonical);
        }

        warn!(
            "Mismatched units for '{}'. Found '{}' but expected '{}'",
            key, given, expected
        );

        let Some(conversion) = self.converters.get(&given, &expected) else {
            info!(
                "No unit converter registered for '{}' -> '{}'. Skipping conversion.",
                given, expected
            );
            report.unconverted.push(UnitMismatch {
                column: key.to_string(),
                declared: given,
                canonical: expected,
            });
            let mut adopted = canonical;
            adopted.units = declared.units.clone();
            return Ok(adopted);
        };

        info!("Converting from '{}' -> '{}' for {}", given, expected, key);
        let slot = file.get_column_mut(key)?;
        let mut column = std::mem::replace(slot, Column::new(canonical.clone()));
        let outcome = conversion.apply(&mut column, file);
        *file.get_column_mut(key)? = column;
        outcome?;

        let change = format!(
            "Converted {} from {} to {} using {}",
            key, given, expected, conversion.technique
        );
        file.report_change(change.clone());
        report.conversions.push(change);
        Ok(canonical)
    }
}

impl DataFile {
    /// Resolve every column against the registry
    ///
    /// Runs once per file; a second call logs and returns an empty report
    /// marked `already_finalized`. Unknown parameters and unconvertible units
    /// are reported, not raised. A failing unit conversion aborts the pass.
    pub fn finalize(&mut self, resolver: &ParameterResolver) -> Result<ResolutionReport> {
        let mut report = ResolutionReport::default();
        if self.finalized {
            info!("Data file already finalized; skipping parameter resolution");
            report.already_finalized = true;
            return Ok(report);
        }

        let names: Vec<String> = self.columns.keys().cloned().collect();
        for name in names {
            resolver.resolve_column(self, &name, &mut report)?;
        }

        self.finalized = true;
        debug!(
            "Finalized data file: {} resolved, {} renamed, {} unknown",
            report.resolved.len(),
            report.renamed.len(),
            report.unknown.len()
        );
        Ok(report)
    }
}

impl DataFileCollection {
    /// Finalize every file, returning one report per file
    pub fn finalize(&mut self, resolver: &ParameterResolver) -> Result<Vec<ResolutionReport>> {
        self.iter_mut().map(|file| file.finalize(resolver)).collect()
    }
}
