//! Key negotiation between the two files of a merge
//!
//! Bottle files are aligned on whichever sample identifiers both files carry;
//! CTD files are aligned on a pressure column.

use crate::app::models::DataFile;
use crate::{Error, Result};
use tracing::warn;

/// Key columns chosen for an alignment, with what each side offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySelection {
    /// Key columns used, in key order
    pub keys: Vec<String>,

    /// Candidate key columns present in the origin
    pub origin: Vec<String>,

    /// Candidate key columns present in the derivative
    pub derivative: Vec<String>,
}

impl KeySelection {
    /// Key selection from an explicit list, as if both sides offered it
    pub fn explicit(keys: Vec<String>) -> Self {
        Self {
            origin: keys.clone(),
            derivative: keys.clone(),
            keys,
        }
    }

    /// Whether the two sides offered different key columns
    pub fn is_mismatched(&self) -> bool {
        self.origin != self.derivative
    }
}

/// Key columns available in both files, in candidate order
///
/// When the two files offer different key sets the intersection is used and
/// a warning is logged. An empty intersection is an error.
pub fn determine_bottle_keys<S: AsRef<str>>(
    origin: &DataFile,
    derivative: &DataFile,
    candidates: &[S],
) -> Result<KeySelection> {
    let origin_keys = origin.available_keys(candidates);
    let derivative_keys = derivative.available_keys(candidates);

    let keys: Vec<String> = origin_keys
        .iter()
        .filter(|key| derivative_keys.contains(key))
        .cloned()
        .collect();

    if origin_keys != derivative_keys {
        warn!(
            "Mismatched key composition to merge on: origin {:?}, derivative {:?}. Using common subset {:?}",
            origin_keys, derivative_keys, keys
        );
    }

    if keys.is_empty() {
        let origin_refs: Vec<&str> = origin_keys.iter().map(String::as_str).collect();
        let derivative_refs: Vec<&str> = derivative_keys.iter().map(String::as_str).collect();
        return Err(Error::no_common_keys(&origin_refs, &derivative_refs));
    }

    Ok(KeySelection {
        keys,
        origin: origin_keys,
        derivative: derivative_keys,
    })
}

/// First pressure column present in both files
pub fn determine_ctd_keys<S: AsRef<str>>(
    origin: &DataFile,
    derivative: &DataFile,
    pressure_parameters: &[S],
) -> Result<KeySelection> {
    let origin_keys = origin.available_keys(pressure_parameters);
    let derivative_keys = derivative.available_keys(pressure_parameters);

    match origin_keys.iter().find(|key| derivative_keys.contains(key)) {
        Some(key) => Ok(KeySelection {
            keys: vec![key.clone()],
            origin: origin_keys,
            derivative: derivative_keys,
        }),
        None => {
            let origin_refs: Vec<&str> = origin_keys.iter().map(String::as_str).collect();
            let derivative_refs: Vec<&str> = derivative_keys.iter().map(String::as_str).collect();
            Err(Error::no_common_keys(&origin_refs, &derivative_refs))
        }
    }
}
