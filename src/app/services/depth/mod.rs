//! Depth derivation service
//!
//! Derives a depth series for a cast from whatever the file offers. The
//! strategies are tried in order and the first that succeeds wins:
//!
//! 1. a measured depth column, returned unchanged
//! 2. Sverdrup integration of EOS-80 in-situ density
//! 3. the UNESCO 1983 pressure/latitude polynomial
//!
//! A strategy that is inapplicable or fails records why, and when none
//! succeeds the reasons are returned together in [`Error::DepthUnavailable`].

use crate::app::models::{Column, DataFile, Value};
use crate::config::DepthConfig;
use crate::constants::LATITUDE_GLOBAL;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub mod eos80;
pub mod gravity;
pub mod sverdrup;
pub mod unesco;

#[cfg(test)]
pub mod tests;

pub use eos80::{density, secant_bulk_modulus, sigma};
pub use gravity::surface_gravity;
pub use sverdrup::integrate_depth;
pub use unesco::depth_unesco;

/// How a depth series was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthMethod {
    /// Measured depth column
    Actual,
    /// Integration of in-situ density
    Sverdrup,
    /// Saunders & Fofonoff polynomial
    Unesco1983,
}

impl fmt::Display for DepthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DepthMethod::Actual => "actual",
            DepthMethod::Sverdrup => "sverdrup",
            DepthMethod::Unesco1983 => "unesco1983",
        };
        write!(f, "{}", name)
    }
}

/// Depth per row and the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSeries {
    /// Strategy that succeeded
    pub method: DepthMethod,

    /// Depth in meters per row; `None` where it could not be derived
    pub depths: Vec<Option<f64>>,

    /// Strategies tried, in order, including the successful one
    pub attempted: Vec<DepthMethod>,
}

impl DataFile {
    /// Derive a depth series for this cast
    ///
    /// `latitude` overrides the file's `LATITUDE` global (or the first
    /// value of a `LATITUDE` column).
    pub fn calculate_depths(
        &self,
        config: &DepthConfig,
        latitude: Option<f64>,
    ) -> Result<DepthSeries> {
        let latitude = latitude.or_else(|| self.latitude());
        let mut attempted = Vec::new();
        let mut reasons = Vec::new();

        let strategies: [(DepthMethod, StrategyFn); 3] = [
            (DepthMethod::Actual, actual_depths),
            (DepthMethod::Sverdrup, sverdrup_depths),
            (DepthMethod::Unesco1983, unesco_depths),
        ];

        for (method, strategy) in strategies {
            attempted.push(method);
            match strategy(self, config, latitude) {
                Ok(depths) => {
                    info!("Calculated {} depths using {}", depths.len(), method);
                    return Ok(DepthSeries {
                        method,
                        depths,
                        attempted,
                    });
                }
                Err(reason) => {
                    debug!("Depth strategy {} not used: {}", method, reason);
                    reasons.push(format!("{}: {}", method, reason));
                }
            }
        }

        warn!("No depth strategy succeeded: {}", reasons.join("; "));
        Err(Error::depth_unavailable(reasons.join("; ")))
    }

    /// Latitude of the cast from the global, or the first row of a latitude column
    pub fn latitude(&self) -> Option<f64> {
        if let Some(value) = self.global(LATITUDE_GLOBAL) {
            if let Some(latitude) = numeric(value) {
                return Some(latitude);
            }
        }
        self.column(LATITUDE_GLOBAL)
            .and_then(|column| column.values().iter().flatten().find_map(numeric))
    }
}

/// A strategy yields depths or the reason it could not
type StrategyFn =
    fn(&DataFile, &DepthConfig, Option<f64>) -> std::result::Result<Vec<Option<f64>>, String>;

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Text(text) => text.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// First configured column present in the file
fn first_present<'a>(file: &'a DataFile, names: &[String]) -> Option<&'a Column> {
    names.iter().find_map(|name| file.column(name))
}

fn actual_depths(
    file: &DataFile,
    config: &DepthConfig,
    _latitude: Option<f64>,
) -> std::result::Result<Vec<Option<f64>>, String> {
    let column = first_present(file, &config.direct_depth_parameters)
        .ok_or_else(|| "no measured depth column".to_string())?;
    Ok(column
        .values()
        .iter()
        .map(|cell| cell.as_ref().and_then(Value::as_f64))
        .collect())
}

fn sverdrup_depths(
    file: &DataFile,
    config: &DepthConfig,
    latitude: Option<f64>,
) -> std::result::Result<Vec<Option<f64>>, String> {
    let pressure = first_present(file, &config.pressure_parameters)
        .ok_or_else(|| "no pressure column".to_string())?;
    let salinity = first_present(file, &config.salinity_parameters)
        .ok_or_else(|| "no salinity column".to_string())?;
    let temperature = first_present(file, &config.temperature_parameters)
        .ok_or_else(|| "no temperature column".to_string())?;
    let latitude = latitude.ok_or_else(|| "no latitude".to_string())?;

    let levels = pressure.len();
    if levels == 0 {
        return Err("no samples".to_string());
    }

    let mut pressures = Vec::with_capacity(levels);
    let mut densities = Vec::with_capacity(levels);
    for row in 0..levels {
        let p = pressure.get(row).and_then(Value::as_f64);
        let s = salinity.get(row).and_then(Value::as_f64);
        let t = temperature.get(row).and_then(Value::as_f64);
        let (Some(p), Some(s), Some(t)) = (p, s, t) else {
            return Err(format!("missing pressure, salinity or temperature at row {}", row));
        };
        let rho = density(s, t, p);
        if !rho.is_finite() {
            return Err(format!("density is not finite at row {}", row));
        }
        pressures.push(p);
        densities.push(rho);
    }

    let gravity = surface_gravity(latitude).map_err(|e| e.to_string())?;
    let depths = integrate_depth(gravity, &pressures, &densities, config.shallow_start_dbar);
    if let Some(row) = depths.iter().position(|d| !d.is_finite()) {
        return Err(format!("integrated depth is not finite at row {}", row));
    }
    Ok(depths.into_iter().map(Some).collect())
}

fn unesco_depths(
    file: &DataFile,
    config: &DepthConfig,
    latitude: Option<f64>,
) -> std::result::Result<Vec<Option<f64>>, String> {
    let pressure = first_present(file, &config.pressure_parameters)
        .ok_or_else(|| "no pressure column".to_string())?;
    let latitude = latitude.ok_or_else(|| "no latitude".to_string())?;

    pressure
        .values()
        .iter()
        .map(|cell| match cell.as_ref().and_then(Value::as_f64) {
            Some(p) => depth_unesco(p, latitude).map(Some).map_err(|e| e.to_string()),
            None => Ok(None),
        })
        .collect()
}
