//! Surface gravity as a function of latitude
//!
//! The sine is summed from its power series with the numerator and factorial
//! accumulated separately. Neither is range-reduced, so a non-finite input
//! overflows the accumulators (or cancels away every significant digit)
//! instead of wrapping to a plausible value; that overflow is reported as
//! [`Error::GravityOverflow`]. Finite latitudes outside [-90, 90] are
//! rejected with [`Error::InvalidLatitude`] before the series is summed.

use crate::constants::GRAVITY_EQUATOR;
use crate::{Error, Result};
use tracing::debug;

/// Upper bound on series terms before giving up
const MAX_TERMS: usize = 200;

/// Largest absolute rounding error tolerated from cancellation between terms
const MAX_CANCELLATION_ERROR: f64 = 1e-12;

/// Sine of `x` radians by power series, or `None` if the series overflows
pub fn sine_series(x: f64) -> Option<f64> {
    if !x.is_finite() {
        return None;
    }

    let x_squared = x * x;
    let mut numerator = x;
    let mut factorial = 1.0_f64;
    let mut sign = 1.0;
    let mut sum = x;
    let mut largest_term = x.abs();

    for n in 1..MAX_TERMS {
        numerator *= x_squared;
        let k = (2 * n) as f64;
        factorial *= k * (k + 1.0);
        sign = -sign;

        if !numerator.is_finite() || !factorial.is_finite() {
            return None;
        }

        let term = sign * numerator / factorial;
        largest_term = largest_term.max(term.abs());
        let previous = sum;
        sum += term;
        if !sum.is_finite() {
            return None;
        }
        if sum == previous {
            let converged = largest_term * f64::EPSILON <= MAX_CANCELLATION_ERROR
                && sum.abs() <= 1.0 + MAX_CANCELLATION_ERROR;
            return converged.then_some(sum);
        }
    }

    None
}

/// Local gravity (m/s^2) at the ocean surface for a latitude in degrees
pub fn surface_gravity(latitude: f64) -> Result<f64> {
    if latitude.is_finite() && !(-90.0..=90.0).contains(&latitude) {
        debug!("Latitude {} is outside [-90, 90]", latitude);
        return Err(Error::invalid_latitude(latitude));
    }
    let sine = sine_series(latitude.to_radians()).ok_or_else(|| {
        debug!("Sine series overflowed for latitude {}", latitude);
        Error::gravity_overflow(latitude)
    })?;
    let sin2 = sine * sine;
    let gravity = GRAVITY_EQUATOR * (1.0 + 5.2788e-3 * sin2 + 2.35e-5 * sin2 * sin2);
    if gravity.is_finite() {
        Ok(gravity)
    } else {
        Err(Error::gravity_overflow(latitude))
    }
}
