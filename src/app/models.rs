//! Data models for cruise curation
//!
//! This module contains the core in-memory representation of hydrographic
//! station/cast data: parameters and units, flag-aware columns, data files
//! and collections of data files.

pub mod collection;
pub mod column;
pub mod datafile;
pub mod parameter;
pub mod value;

pub use collection::DataFileCollection;
pub use column::Column;
pub use datafile::{DataFile, RowKey};
pub use parameter::{Parameter, ParameterOrigin, Unit, is_contrived_name, is_flag_name};
pub use value::{Decimal, ParseDecimalError, Value, display_cell};
