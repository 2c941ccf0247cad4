//! Collections of data files
//!
//! CTD cruises arrive as one file per station/cast. A [`DataFileCollection`]
//! keeps them together and can flatten them into a single [`DataFile`] where
//! each file's globals become repeated columns.

use crate::app::models::{Column, DataFile};
use crate::constants::{HEADER_GLOBAL, STAMP_GLOBAL};
use crate::Result;
use polars::prelude::DataFrame;
use tracing::debug;

/// Ordered set of data files from one cruise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFileCollection {
    pub(crate) files: Vec<DataFile>,
}

impl DataFileCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at the end
    pub fn append(&mut self, file: DataFile) {
        self.files.push(file);
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the collection holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File by position
    pub fn get(&self, index: usize) -> Option<&DataFile> {
        self.files.get(index)
    }

    /// Mutable file by position
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DataFile> {
        self.files.get_mut(index)
    }

    /// Files in order
    pub fn iter(&self) -> std::slice::Iter<'_, DataFile> {
        self.files.iter()
    }

    /// Mutable files in order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DataFile> {
        self.files.iter_mut()
    }

    /// Files, consuming the collection
    pub fn into_files(self) -> Vec<DataFile> {
        self.files
    }

    /// Processing stamp of every file
    pub fn stamps(&self) -> Vec<String> {
        self.files.iter().map(DataFile::stamp).collect()
    }

    /// Flatten into one file
    ///
    /// Rows are concatenated in file order. Globals other than `stamp` and
    /// `header` become columns repeated on each row of their file; `stamp`
    /// and `header` are taken from the first file. Cells and flags are copied
    /// as they are, and every column is padded to the total row count.
    pub fn to_data_file(&self) -> DataFile {
        let mut flat = DataFile::new();
        if let Some(first) = self.files.first() {
            for name in [STAMP_GLOBAL, HEADER_GLOBAL] {
                if let Some(value) = first.global(name) {
                    flat.set_global(name, value.clone());
                }
            }
        }

        let mut offset = 0;
        for file in &self.files {
            let rows = file.len();

            for (name, value) in file.globals() {
                if name == STAMP_GLOBAL || name == HEADER_GLOBAL {
                    continue;
                }
                let column = flat.ensure_column(name);
                for row in 0..rows {
                    column.put_raw(offset + row, Some(value.clone()), None, None);
                }
            }

            for column in file.sorted_columns() {
                let name = column.parameter().mnemonic_woce().to_string();
                let target = flat
                    .columns
                    .entry(name)
                    .or_insert_with(|| Column::new(column.parameter().clone()));
                for row in 0..rows {
                    target.put_raw(
                        offset + row,
                        column.values().get(row).cloned().flatten(),
                        column.flag_woce(row),
                        column.flag_igoss(row),
                    );
                }
            }

            offset += rows;
        }

        for column in flat.columns.values_mut() {
            column.set_length(offset);
        }
        debug!(
            "Flattened {} files into {} rows and {} columns",
            self.files.len(),
            offset,
            flat.column_count()
        );
        flat
    }

    /// Flatten the collection and export it as a polars DataFrame
    pub fn to_frame(&self) -> Result<DataFrame> {
        self.to_data_file().to_frame()
    }
}

impl From<Vec<DataFile>> for DataFileCollection {
    fn from(files: Vec<DataFile>) -> Self {
        Self { files }
    }
}

impl<'a> IntoIterator for &'a DataFileCollection {
    type Item = &'a DataFile;
    type IntoIter = std::slice::Iter<'a, DataFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
