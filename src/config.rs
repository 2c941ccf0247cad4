//! Configuration management and validation.
//!
//! Provides configuration structures for parameter resolution, depth
//! derivation and dataset merging. The configuration is passed explicitly
//! into each entry point; there is no process-wide curation state.

use crate::constants::{self, BOTTLE_KEY_COLUMNS, PRESSURE_PARAMETERS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Behaviour when one file contains the same key tuple on several rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DuplicateKeyPolicy {
    /// Abort alignment with [`Error::DuplicateKey`]
    #[default]
    Reject,
    /// Use the first row of each duplicate group and report the rest
    FirstWins,
}

/// Parameter resolution settings used by the finalize pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Apply registered unit converters when declared and canonical units differ
    pub convert_units: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            convert_units: true,
        }
    }
}

/// Depth derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Columns holding measured depth, returned unchanged when present
    pub direct_depth_parameters: Vec<String>,

    /// Pressure columns in order of preference
    pub pressure_parameters: Vec<String>,

    /// Salinity columns in order of preference
    pub salinity_parameters: Vec<String>,

    /// Temperature columns in order of preference
    pub temperature_parameters: Vec<String>,

    /// Integration starting deeper than this (dbar) is relative to the first level
    pub shallow_start_dbar: f64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            direct_depth_parameters: vec!["_ACTUAL_DEPTH".to_string()],
            pressure_parameters: PRESSURE_PARAMETERS.iter().map(|p| p.to_string()).collect(),
            salinity_parameters: vec!["CTDSAL".to_string(), "SALNTY".to_string()],
            temperature_parameters: vec!["CTDTMP".to_string()],
            shallow_start_dbar: constants::SHALLOW_START_DBAR,
        }
    }
}

/// Merge and diff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Relative tolerance for numeric equality
    pub epsilon: f64,

    /// Handling of repeated key tuples within one file
    pub duplicate_keys: DuplicateKeyPolicy,

    /// Candidate key columns, in key order
    pub key_columns: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            epsilon: constants::DEFAULT_EPSILON,
            duplicate_keys: DuplicateKeyPolicy::default(),
            key_columns: BOTTLE_KEY_COLUMNS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Global configuration for curation operations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CurationConfig {
    /// Parameter resolution settings
    pub resolution: ResolutionConfig,

    /// Depth derivation settings
    pub depth: DepthConfig,

    /// Merge settings
    pub merge: MergeConfig,
}

impl CurationConfig {
    /// Read a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::registry_load("Invalid curation configuration", e))?;
        config.validate()?;
        debug!("Loaded curation configuration: {:?}", config);
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.merge.epsilon.is_finite() || self.merge.epsilon <= 0.0 {
            return Err(Error::configuration(format!(
                "Merge epsilon must be finite and positive, got {}",
                self.merge.epsilon
            )));
        }

        if self.merge.key_columns.is_empty() {
            return Err(Error::configuration(
                "At least one merge key column is required",
            ));
        }

        if self.depth.pressure_parameters.is_empty() {
            return Err(Error::configuration(
                "At least one pressure parameter is required for depth derivation",
            ));
        }

        if !self.depth.shallow_start_dbar.is_finite() || self.depth.shallow_start_dbar < 0.0 {
            return Err(Error::configuration(format!(
                "Shallow start pressure must be finite and non-negative, got {}",
                self.depth.shallow_start_dbar
            )));
        }

        Ok(())
    }

    /// Disable unit conversion during finalize
    pub fn without_unit_conversion(mut self) -> Self {
        self.resolution.convert_units = false;
        self
    }

    /// Set the merge tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.merge.epsilon = epsilon;
        self
    }

    /// Set the duplicate key policy
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.merge.duplicate_keys = policy;
        self
    }

    /// Set the candidate key columns
    pub fn with_key_columns(mut self, keys: &[&str]) -> Self {
        self.merge.key_columns = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Set the depth configuration
    pub fn with_depth(mut self, depth: DepthConfig) -> Self {
        self.depth = depth;
        self
    }
}
