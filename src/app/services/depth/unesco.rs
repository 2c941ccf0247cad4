//! Depth from pressure by Saunders & Fofonoff's polynomial (UNESCO 1983)
//!
//! Refitted for the 1980 equation of state for a standard ocean
//! (T = 0 deg C, S = 35). Check value: 9712.653 m at 10000 dbar, 30 deg.

use crate::constants::{DEGREES_PER_RADIAN, GRAVITY_EQUATOR};
use crate::{Error, Result};

/// Depth (m) for a pressure (dbar) at a latitude (degrees)
pub fn depth_unesco(pressure: f64, latitude: f64) -> Result<f64> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::invalid_latitude(latitude));
    }

    let x = (latitude / DEGREES_PER_RADIAN).sin().powi(2);
    let gravity = GRAVITY_EQUATOR * (1.0 + (5.2788e-3 + 2.36e-5 * x) * x) + 1.092e-6 * pressure;
    let p = pressure;
    Ok(((((-1.82e-15 * p + 2.279e-10) * p - 2.2512e-5) * p + 9.72659) * p) / gravity)
}
