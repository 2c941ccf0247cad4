//! Cruise Curator Library
//!
//! A Rust library for curating oceanographic station/cast measurements
//! (pressure, temperature, salinity, nutrients, ...) for a hydrographic data archive.
//!
//! This library provides tools for:
//! - Holding bottle and CTD casts in a columnar, flag-aware in-memory model
//! - Resolving declared parameter names and units against a canonical registry
//! - Enforcing WOCE quality-flag and parameter-bound invariants on every write
//! - Deriving depth from pressure (direct, Sverdrup/EOS-80, or UNESCO 1983)
//! - Aligning two processed versions of a cruise by sample key, classifying
//!   their differences and merging selected columns back into the original
//!
//! Format readers and writers live outside this crate: decoders populate a
//! [`DataFile`] and call [`DataFile::finalize`], encoders read
//! [`DataFile::sorted_columns`] and [`Column::decimal_places`].

pub mod config;
pub mod constants;
pub mod logging;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod depth;
        pub mod merge;
        pub mod parameter_registry;
    }
}

// Re-export commonly used types
pub use app::models::{
    Column, DataFile, DataFileCollection, Decimal, Parameter, ParameterOrigin, RowKey, Unit,
    Value,
};
pub use app::services::depth::{DepthMethod, DepthSeries};
pub use app::services::merge::{MergeOutcome, MergeReport, Merger};
pub use app::services::parameter_registry::{
    ParameterRegistry, ParameterResolver, UnitConversion, UnitConverterRegistry,
};
pub use config::CurationConfig;

/// Result type alias for curation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for curation operations
///
/// Per-row problems (out-of-range values, unmatched keys, unknown parameters)
/// are recovered locally and reported; the variants here are the conditions
/// that abort an operation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Parameter name has no canonical, alias or override match
    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    /// Flag outside the valid range for its flag scheme
    #[error("Invalid {scheme} flag {flag} for column '{column}'")]
    InvalidFlag {
        column: String,
        scheme: &'static str,
        flag: u8,
    },

    /// A WOCE flag other than 9 was supplied for a missing value
    #[error("WOCE flag {flag} set for missing data value in column '{column}' at row {row}")]
    InvalidFlagForMissingValue { column: String, row: usize, flag: u8 },

    /// Column holds numeric values whose printed precision is not tracked
    #[error("Column '{column}' holds a value without tracked precision at row {row}")]
    PrecisionUntracked { column: String, row: usize },

    /// Column absent from every file consulted
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// No key column is shared between the two files being aligned
    #[error("No common key columns to align on: origin {origin:?}, derivative {derivative:?}")]
    NoCommonKeys {
        origin: Vec<String>,
        derivative: Vec<String>,
    },

    /// Same key tuple found on more than one row of one file
    #[error("Duplicate key {key} in {side} at rows {first} and {second}")]
    DuplicateKey {
        side: &'static str,
        key: String,
        first: usize,
        second: usize,
    },

    /// Key columns of one file have differing lengths
    #[error("Key columns of {side} have differing lengths: {lengths:?}")]
    RaggedKeyColumns {
        side: &'static str,
        lengths: Vec<(String, usize)>,
    },

    /// A key column was requested as a merge target
    #[error("Cannot merge key column using itself: {name}")]
    MergeKeyColumn { name: String },

    /// Surface gravity series did not converge to a finite value
    #[error("Surface gravity overflowed for latitude {latitude}")]
    GravityOverflow { latitude: f64 },

    /// Latitude outside [-90, 90]
    #[error("Invalid latitude {latitude}: must be between -90 and 90 degrees")]
    InvalidLatitude { latitude: f64 },

    /// Every depth strategy was inapplicable or failed
    #[error("No depth strategy succeeded: {reasons}")]
    DepthUnavailable { reasons: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Registry or configuration document could not be decoded
    #[error("Registry load error: {message}")]
    RegistryLoad {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Polars frame construction failed
    #[error("Frame export error: {message}")]
    Frame {
        message: String,
        #[source]
        source: polars::error::PolarsError,
    },
}

impl Error {
    /// Create an unknown parameter error
    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter { name: name.into() }
    }

    /// Create an invalid flag error
    pub fn invalid_flag(column: impl Into<String>, scheme: &'static str, flag: u8) -> Self {
        Self::InvalidFlag {
            column: column.into(),
            scheme,
            flag,
        }
    }

    /// Create an invalid flag-for-missing-value error
    pub fn invalid_flag_for_missing_value(column: impl Into<String>, row: usize, flag: u8) -> Self {
        Self::InvalidFlagForMissingValue {
            column: column.into(),
            row,
            flag,
        }
    }

    /// Create a precision untracked error
    pub fn precision_untracked(column: impl Into<String>, row: usize) -> Self {
        Self::PrecisionUntracked {
            column: column.into(),
            row,
        }
    }

    /// Create a column not found error
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create a no common keys error
    pub fn no_common_keys(origin: &[&str], derivative: &[&str]) -> Self {
        Self::NoCommonKeys {
            origin: origin.iter().map(|k| k.to_string()).collect(),
            derivative: derivative.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(
        side: &'static str,
        key: impl Into<String>,
        first: usize,
        second: usize,
    ) -> Self {
        Self::DuplicateKey {
            side,
            key: key.into(),
            first,
            second,
        }
    }

    /// Create a ragged key columns error
    pub fn ragged_key_columns(side: &'static str, lengths: Vec<(String, usize)>) -> Self {
        Self::RaggedKeyColumns { side, lengths }
    }

    /// Create a merge key column error
    pub fn merge_key_column(name: impl Into<String>) -> Self {
        Self::MergeKeyColumn { name: name.into() }
    }

    /// Create a gravity overflow error
    pub fn gravity_overflow(latitude: f64) -> Self {
        Self::GravityOverflow { latitude }
    }

    /// Create an invalid latitude error
    pub fn invalid_latitude(latitude: f64) -> Self {
        Self::InvalidLatitude { latitude }
    }

    /// Create a depth unavailable error
    pub fn depth_unavailable(reasons: impl Into<String>) -> Self {
        Self::DepthUnavailable {
            reasons: reasons.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a registry load error
    pub fn registry_load(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::RegistryLoad {
            message: message.into(),
            source,
        }
    }

    /// Create a frame export error
    pub fn frame(message: impl Into<String>, source: polars::error::PolarsError) -> Self {
        Self::Frame {
            message: message.into(),
            source,
        }
    }

    /// Whether the error aborts a whole merge rather than a single column
    pub fn is_alignment_error(&self) -> bool {
        matches!(
            self,
            Self::NoCommonKeys { .. } | Self::DuplicateKey { .. } | Self::RaggedKeyColumns { .. }
        )
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(error: polars::error::PolarsError) -> Self {
        Self::Frame {
            message: "Polars operation failed".to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_column() {
        let e = Error::column_not_found("DELC14");
        assert_eq!(e.to_string(), "Column not found: DELC14");

        let e = Error::invalid_flag_for_missing_value("CTDOXY", 3, 2);
        assert_eq!(
            e.to_string(),
            "WOCE flag 2 set for missing data value in column 'CTDOXY' at row 3"
        );
    }

    #[test]
    fn test_alignment_errors_are_distinguished() {
        assert!(Error::no_common_keys(&["STNNBR"], &["SAMPNO"]).is_alignment_error());
        assert!(!Error::column_not_found("X").is_alignment_error());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<Error>();
    }
}
