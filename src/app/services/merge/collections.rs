//! Merging and comparing whole collections of cast files
//!
//! Files are paired by their EXPOCODE, STNNBR and CASTNO globals before the
//! per-file merge runs. Only origin files are ever output.

use crate::app::models::{DataFile, DataFileCollection, RowKey, Value};
use crate::app::services::merge::{
    CollectionMergeReport, ColumnDifferences, FileMergeFailure, Merger,
};
use crate::config::MergeConfig;
use crate::constants::DATAFILE_KEY_COLUMNS;
use crate::Result;
use indexmap::IndexMap;
use tracing::{error, info, warn};

/// An origin file and its derivative counterpart, if any
#[derive(Debug, Clone, Copy)]
pub struct FilePair<'a> {
    pub origin: &'a DataFile,
    pub derivative: Option<&'a DataFile>,
    pub key: &'a RowKey,
}

/// Pairing of two collections by file key
#[derive(Debug, Clone, Default)]
pub struct CollectionMap<'a> {
    origin: Vec<(RowKey, &'a DataFile)>,
    derivative: IndexMap<RowKey, &'a DataFile>,
    unmatched_derivative: Vec<RowKey>,
}

impl<'a> CollectionMap<'a> {
    /// Pairs in origin order
    pub fn pairs(&self) -> impl Iterator<Item = FilePair<'_>> {
        self.origin.iter().map(|(key, origin)| FilePair {
            origin: *origin,
            derivative: self.derivative.get(key).copied(),
            key,
        })
    }

    /// Keys of origin files with no derivative counterpart
    pub fn unmatched_origin(&self) -> Vec<RowKey> {
        self.origin
            .iter()
            .filter(|(key, _)| !self.derivative.contains_key(key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Keys of derivative files with no origin counterpart
    pub fn unmatched_derivative(&self) -> &[RowKey] {
        &self.unmatched_derivative
    }
}

/// Identity of a file: its key globals, or the first cell of a same-named column
pub fn file_key(file: &DataFile) -> RowKey {
    RowKey(
        DATAFILE_KEY_COLUMNS
            .iter()
            .map(|name| {
                file.global(name)
                    .or_else(|| file.column(name).and_then(|c| c.get(0)))
                    .map(Value::key_part)
                    .unwrap_or_default()
            })
            .collect(),
    )
}

/// Pair the files of two collections by file key
///
/// Origin files without a counterpart and derivative files without an origin
/// are both logged. Repeated derivative keys keep the first file.
pub fn map_collections<'a>(
    origin: &'a DataFileCollection,
    derivative: &'a DataFileCollection,
) -> CollectionMap<'a> {
    let mut derivative_files = IndexMap::new();
    for file in derivative.iter() {
        derivative_files.entry(file_key(file)).or_insert(file);
    }

    let origin_files: Vec<(RowKey, &DataFile)> =
        origin.iter().map(|file| (file_key(file), file)).collect();

    for (key, _) in &origin_files {
        if !derivative_files.contains_key(key) {
            warn!("Origin file key {} is not present in derivative collection", key);
        }
    }

    let unmatched_derivative: Vec<RowKey> = derivative_files
        .keys()
        .filter(|key| !origin_files.iter().any(|(k, _)| k == *key))
        .cloned()
        .collect();
    for key in &unmatched_derivative {
        warn!("Derivative file key {} is not present in origin collection", key);
    }

    CollectionMap {
        origin: origin_files,
        derivative: derivative_files,
        unmatched_derivative,
    }
}

/// Merge requested columns file by file, aligning rows on bottle keys
///
/// Origin files without a counterpart are copied unchanged and derivative-only
/// files are dropped. A failed file merge keeps that origin file unchanged and
/// records the error; the other files still merge.
///
/// Rows align on `config.key_columns`. CTD casts keyed on pressure go through
/// [`merge_collections_with`] and [`Merger::for_ctd`].
pub fn merge_collections<S: AsRef<str>>(
    origin: &DataFileCollection,
    derivative: &DataFileCollection,
    requested: &[S],
    config: &MergeConfig,
) -> (DataFileCollection, CollectionMergeReport) {
    merge_collections_with(origin, derivative, requested, |origin, derivative| {
        Merger::new(origin, derivative, config)
    })
}

/// Merge requested columns file by file with a caller-built [`Merger`] per pair
///
/// ```rust,no_run
/// use cruise_curator::app::services::merge::{Merger, merge_collections_with};
/// use cruise_curator::config::MergeConfig;
/// use cruise_curator::constants::PRESSURE_PARAMETERS;
/// # use cruise_curator::DataFileCollection;
/// # let (origin, derivative) = (DataFileCollection::new(), DataFileCollection::new());
///
/// let config = MergeConfig::default();
/// let (merged, report) = merge_collections_with(&origin, &derivative, &["TRANSM"], |o, d| {
///     Merger::for_ctd(o, d, PRESSURE_PARAMETERS, &config)
/// });
/// ```
pub fn merge_collections_with<S, F>(
    origin: &DataFileCollection,
    derivative: &DataFileCollection,
    requested: &[S],
    build_merger: F,
) -> (DataFileCollection, CollectionMergeReport)
where
    S: AsRef<str>,
    F: for<'a> Fn(&'a DataFile, &'a DataFile) -> Result<Merger<'a>>,
{
    let map = map_collections(origin, derivative);
    let mut merged = DataFileCollection::new();
    let mut report = CollectionMergeReport {
        unmatched_origin: map.unmatched_origin(),
        unmatched_derivative: map.unmatched_derivative().to_vec(),
        ..Default::default()
    };

    for pair in map.pairs() {
        let Some(derivative_file) = pair.derivative else {
            merged.append(pair.origin.clone());
            continue;
        };

        info!("Merging files for key {}", pair.key);
        let outcome =
            build_merger(pair.origin, derivative_file).and_then(|merger| merger.merge(requested));
        match outcome {
            Ok(outcome) => {
                merged.append(outcome.merged);
                report.files.push((pair.key.clone(), outcome.report));
            }
            Err(e) => {
                error!("Unable to merge datafiles for {}: {}", pair.key, e);
                merged.append(pair.origin.clone());
                report.failures.push(FileMergeFailure {
                    key: pair.key.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    (merged, report)
}

/// Union of the column classifications of every paired file
///
/// Origin files without a counterpart take no part in the comparison.
pub fn different_columns_for_collections(
    origin: &DataFileCollection,
    derivative: &DataFileCollection,
    config: &MergeConfig,
) -> Result<ColumnDifferences> {
    let map = map_collections(origin, derivative);
    let mut differences = ColumnDifferences::default();
    for pair in map.pairs() {
        let Some(derivative_file) = pair.derivative else {
            continue;
        };
        let merger = Merger::new(pair.origin, derivative_file, config)?;
        differences.absorb(merger.differences().clone());
    }
    Ok(differences)
}
