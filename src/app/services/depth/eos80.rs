//! EOS-80 equation of state for sea water
//!
//! Density from practical salinity (PSS-78), temperature (deg C) and pressure
//! (dbar) through the secant bulk modulus, following Fofonoff & Millard
//! (UNESCO technical papers in marine science 44, 1983).

// Pure water secant bulk modulus at zero pressure
const E: [f64; 5] = [19652.21, 148.4206, -2.327105, 1.360477e-2, -5.155288e-5];
const F: [f64; 4] = [54.6746, -0.603459, 1.09987e-2, -6.1670e-5];
const G: [f64; 3] = [7.944e-2, 1.6483e-2, -5.3009e-4];

// Pressure terms
const H: [f64; 4] = [3.239908, 1.43713e-3, 1.16092e-4, -5.77905e-7];
const I: [f64; 3] = [2.2838e-3, -1.0981e-5, -1.6078e-6];
const J0: f64 = 1.91075e-4;
const K: [f64; 3] = [8.50935e-5, -6.12293e-6, 5.2787e-8];
const M: [f64; 3] = [-9.9348e-7, 2.0816e-8, 9.1697e-10];

// One atmosphere density
const A: [f64; 6] = [
    999.842594,
    6.793952e-2,
    -9.095290e-3,
    1.001685e-4,
    -1.120083e-6,
    6.536332e-9,
];
const B: [f64; 5] = [8.24493e-1, -4.0899e-3, 7.6438e-5, -8.2467e-7, 5.3875e-9];
const C: [f64; 3] = [-5.72466e-3, 1.0227e-4, -1.6546e-6];
const D0: f64 = 4.8314e-4;

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...`
pub fn polynomial(x: f64, coefficients: &[f64]) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * x + coefficient)
}

/// Secant bulk modulus K(S, t, p) in bars; `pressure` is in bars
pub fn secant_bulk_modulus(salinity: f64, temperature: f64, pressure: f64) -> f64 {
    let s = salinity;
    let t = temperature;
    let s15 = s * s.sqrt();

    let k0 = polynomial(t, &E) + polynomial(t, &F) * s + polynomial(t, &G) * s15;
    if pressure == 0.0 {
        return k0;
    }

    let a = polynomial(t, &H) + polynomial(t, &I) * s + J0 * s15;
    let b = polynomial(t, &K) + polynomial(t, &M) * s;
    polynomial(pressure, &[k0, a, b])
}

/// In-situ density (kg/m^3); `pressure` is in decibars
///
/// Negative salinity yields NaN, which callers treat as a missing density.
pub fn density(salinity: f64, temperature: f64, pressure: f64) -> f64 {
    let s = salinity;
    let t = temperature;

    let surface = polynomial(t, &A)
        + polynomial(t, &B) * s
        + polynomial(t, &C) * s * s.sqrt()
        + D0 * s * s;
    if pressure == 0.0 {
        return surface;
    }

    let bars = pressure / 10.0;
    surface / (1.0 - bars / secant_bulk_modulus(s, t, bars))
}

/// Density anomaly sigma (density - 1000) at the given pressure
pub fn sigma(salinity: f64, temperature: f64, pressure: f64) -> f64 {
    density(salinity, temperature, pressure) - 1000.0
}
