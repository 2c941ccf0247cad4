//! Row alignment between an origin and a derivative file
//!
//! Each side is grouped by its [`RowKey`] once; derivative rows are then
//! matched to origin rows by key. The alignment is immutable and shared by
//! every diff and merge run between the same two files.

use crate::app::models::{DataFile, RowKey};
use crate::config::DuplicateKeyPolicy;
use crate::{Error, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, error, warn};

/// Origin side label used in errors and warnings
pub const ORIGIN: &str = "origin";

/// Derivative side label used in errors and warnings
pub const DERIVATIVE: &str = "derivative";

/// One derivative row matched to one origin row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch {
    pub origin_row: usize,
    pub derivative_row: usize,
    pub key: RowKey,
}

/// A row whose key has no counterpart on the other side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRow {
    pub row: usize,
    pub key: RowKey,
}

/// A repeated key ignored under [`DuplicateKeyPolicy::FirstWins`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRow {
    pub side: &'static str,
    pub key: RowKey,
    pub first: usize,
    pub ignored: usize,
}

/// Mapping of derivative rows onto origin rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAlignment {
    keys: Vec<String>,
    matches: Vec<RowMatch>,
    unmatched_derivative: Vec<UnmatchedRow>,
    unmatched_origin: Vec<UnmatchedRow>,
    duplicates: Vec<DuplicateRow>,
}

impl RowAlignment {
    /// Align two files on the given key columns
    ///
    /// Fails when a key column is missing or the key columns of one side
    /// have differing lengths, and on repeated keys unless the policy is
    /// [`DuplicateKeyPolicy::FirstWins`].
    pub fn build<S: AsRef<str>>(
        origin: &DataFile,
        derivative: &DataFile,
        keys: &[S],
        policy: DuplicateKeyPolicy,
    ) -> Result<Self> {
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        let mut duplicates = Vec::new();

        let origin_rows = group_rows(origin, &keys, ORIGIN, policy, &mut duplicates)?;
        let derivative_rows = group_rows(derivative, &keys, DERIVATIVE, policy, &mut duplicates)?;

        let mut matches = Vec::new();
        let mut unmatched_derivative = Vec::new();
        for (key, &derivative_row) in &derivative_rows {
            match origin_rows.get(key) {
                Some(&origin_row) => matches.push(RowMatch {
                    origin_row,
                    derivative_row,
                    key: key.clone(),
                }),
                None => {
                    warn!(
                        "Key on row {} of derivative file does not exist in origin: {}",
                        derivative_row, key
                    );
                    unmatched_derivative.push(UnmatchedRow {
                        row: derivative_row,
                        key: key.clone(),
                    });
                }
            }
        }

        let mut unmatched_origin = Vec::new();
        for (key, &origin_row) in &origin_rows {
            if derivative_rows.contains_key(key) {
                continue;
            }
            warn!(
                "Key on row {} of origin file does not exist in derivative: {}",
                origin_row, key
            );
            unmatched_origin.push(UnmatchedRow {
                row: origin_row,
                key: key.clone(),
            });
        }

        if matches.is_empty() {
            error!("No keys matched in origin and derivative files");
        } else {
            debug!("Aligned {} rows on {:?}", matches.len(), keys);
        }

        Ok(Self {
            keys,
            matches,
            unmatched_derivative,
            unmatched_origin,
            duplicates,
        })
    }

    /// Key columns the alignment was built on
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Matched rows, in derivative key order
    pub fn matches(&self) -> &[RowMatch] {
        &self.matches
    }

    /// Derivative rows dropped because origin has no such key
    pub fn unmatched_derivative(&self) -> &[UnmatchedRow] {
        &self.unmatched_derivative
    }

    /// Origin rows the derivative does not mention
    pub fn unmatched_origin(&self) -> &[UnmatchedRow] {
        &self.unmatched_origin
    }

    /// Repeated keys that were ignored
    pub fn duplicates(&self) -> &[DuplicateRow] {
        &self.duplicates
    }

    /// Number of matched rows
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no rows matched
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Origin row matched to a derivative row
    pub fn origin_row_for(&self, derivative_row: usize) -> Option<usize> {
        self.matches
            .iter()
            .find(|m| m.derivative_row == derivative_row)
            .map(|m| m.origin_row)
    }
}

/// Group the rows of one side by key, keeping the first row of each key
fn group_rows(
    file: &DataFile,
    keys: &[String],
    side: &'static str,
    policy: DuplicateKeyPolicy,
    duplicates: &mut Vec<DuplicateRow>,
) -> Result<IndexMap<RowKey, usize>> {
    let mut lengths = Vec::with_capacity(keys.len());
    for key in keys {
        lengths.push((key.clone(), file.get_column(key)?.len()));
    }
    let rows = lengths.first().map(|(_, len)| *len).unwrap_or(0);
    if lengths.iter().any(|(_, len)| *len != rows) {
        return Err(Error::ragged_key_columns(side, lengths));
    }

    let mut grouped = IndexMap::with_capacity(rows);
    for row in 0..rows {
        let key = file.row_key(row, keys);
        match grouped.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(row);
            }
            Entry::Occupied(entry) => {
                let first = *entry.get();
                match policy {
                    DuplicateKeyPolicy::Reject => {
                        return Err(Error::duplicate_key(
                            side,
                            entry.key().to_string(),
                            first,
                            row,
                        ));
                    }
                    DuplicateKeyPolicy::FirstWins => {
                        warn!(
                            "Duplicate key {} in {} at row {}; using row {}",
                            entry.key(),
                            side,
                            row,
                            first
                        );
                        duplicates.push(DuplicateRow {
                            side,
                            key: entry.key().clone(),
                            first,
                            ignored: row,
                        });
                    }
                }
            }
        }
    }
    Ok(grouped)
}
