//! Merge and diff engine for two processed versions of a cruise
//!
//! Curators receive re-calibrated values or corrected quality flags long after
//! a cruise. This module lines those updates up with the archived data and
//! writes them back selectively.
//!
//! # Architecture
//!
//! - [`keys`] - Choose the key columns both files share
//! - [`alignment`] - Map derivative rows onto origin rows by key
//! - [`diff`] - Classify value and flag columns as same, different, new or missing
//! - [`merger`] - Copy requested values or flags into a copy of the origin
//! - [`collections`] - Pair cast files of two collections and merge them one by one
//! - [`report`] - Merge summaries and typed warnings
//!
//! Values are addressed by parameter name (`DELC14`) and flags by pseudo-column
//! name (`DELC14_FLAG_W`, `DELC14_FLAG_I`), so flags can be merged without
//! touching values.
//!
//! # Example Usage
//!
//! ```rust
//! use cruise_curator::config::MergeConfig;
//! use cruise_curator::{DataFile, Merger};
//!
//! # fn example(origin: &DataFile, derivative: &DataFile) -> cruise_curator::Result<()> {
//! let merger = Merger::new(origin, derivative, &MergeConfig::default())?;
//! println!("Different: {:?}", merger.differences().different);
//!
//! let outcome = merger.merge(&["DELC14", "DELC14_FLAG_W"])?;
//! println!("{}", outcome.report.summary());
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod collections;
pub mod diff;
pub mod keys;
pub mod merger;
pub mod report;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use alignment::{DuplicateRow, RowAlignment, RowMatch, UnmatchedRow};
pub use collections::{
    CollectionMap, FilePair, different_columns_for_collections, file_key, map_collections,
    merge_collections, merge_collections_with,
};
pub use diff::{
    ColumnDiffer, ColumnDifferences, ColumnPart, ColumnStatus, cells_equal, equal_with_epsilon,
    parameter_mnemonics,
};
pub use keys::{KeySelection, determine_bottle_keys, determine_ctd_keys};
pub use merger::{MergeOutcome, Merger};
pub use report::{CollectionMergeReport, FileMergeFailure, MergeReport, MergeWarning};
