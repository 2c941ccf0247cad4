//! Merge results and the recoverable conditions met along the way

use crate::app::models::RowKey;
use std::fmt;

/// A recoverable condition recorded during alignment or merge
#[derive(Debug, Clone, PartialEq)]
pub enum MergeWarning {
    /// The two files offered different key columns; the intersection was used
    KeyMismatch {
        origin: Vec<String>,
        derivative: Vec<String>,
    },

    /// A derivative row whose key is not in the origin; it was dropped
    UnmatchedDerivativeKey { row: usize, key: RowKey },

    /// An origin row the derivative does not mention; it was left untouched
    UnmatchedOriginKey { row: usize, key: RowKey },

    /// A repeated key; only the first row was used
    DuplicateKey {
        side: &'static str,
        key: RowKey,
        first: usize,
        ignored: usize,
    },

    /// A requested column exists only in the origin; nothing was merged
    MissingFromDerivative { column: String },

    /// A merged column adopted the derivative's units
    UnitsChanged {
        column: String,
        from: Option<String>,
        to: Option<String>,
    },

    /// A merged flag landed on an absent value and was stored as 9
    FlagOnAbsentValue { column: String, row: usize, flag: u8 },

    /// A merged value fell outside the parameter's bounds and was stored absent with flag 9
    OutOfRange {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMismatch { origin, derivative } => write!(
                f,
                "Mismatched key composition: origin {:?}, derivative {:?}",
                origin, derivative
            ),
            Self::UnmatchedDerivativeKey { row, key } => write!(
                f,
                "Key on row {} of derivative file does not exist in origin: {}",
                row, key
            ),
            Self::UnmatchedOriginKey { row, key } => write!(
                f,
                "Key on row {} of origin file does not exist in derivative: {}",
                row, key
            ),
            Self::DuplicateKey {
                side,
                key,
                first,
                ignored,
            } => write!(
                f,
                "Duplicate key {} in {} at row {}; using row {}",
                key, side, ignored, first
            ),
            Self::MissingFromDerivative { column } => {
                write!(f, "{} is not in the derivative file; not merged", column)
            }
            Self::UnitsChanged { column, from, to } => write!(
                f,
                "Changed units for {} from '{}' to '{}'",
                column,
                from.as_deref().unwrap_or(""),
                to.as_deref().unwrap_or("")
            ),
            Self::FlagOnAbsentValue { column, row, flag } => write!(
                f,
                "Flag {} for absent value of {} at row {} stored as 9",
                flag, column, row
            ),
            Self::OutOfRange { column, row, value } => write!(
                f,
                "{} is not in range for {} at row {}; stored as missing",
                value, column, row
            ),
        }
    }
}

/// Result summary of merging one pair of files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Key columns the files were aligned on
    pub keys: Vec<String>,

    /// Requested names that were merged, in request order
    pub merged: Vec<String>,

    /// Recoverable conditions, in the order they were met
    pub warnings: Vec<MergeWarning>,
}

impl MergeReport {
    /// Number of derivative rows dropped for lack of an origin key
    pub fn unmatched_derivative_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, MergeWarning::UnmatchedDerivativeKey { .. }))
            .count()
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "Merged [{}] on [{}] with {} warnings ({} derivative keys dropped)",
            self.merged.join(", "),
            self.keys.join(", "),
            self.warnings.len(),
            self.unmatched_derivative_count()
        )
    }
}

/// A file pair whose merge failed; the origin file was kept unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct FileMergeFailure {
    pub key: RowKey,
    pub error: String,
}

/// Result summary of merging two collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionMergeReport {
    /// Per-file reports for the pairs that merged
    pub files: Vec<(RowKey, MergeReport)>,

    /// Pairs whose merge failed
    pub failures: Vec<FileMergeFailure>,

    /// Origin files with no derivative counterpart, kept unchanged
    pub unmatched_origin: Vec<RowKey>,

    /// Derivative files with no origin counterpart, dropped
    pub unmatched_derivative: Vec<RowKey>,
}

impl CollectionMergeReport {
    /// Whether every paired file merged
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
