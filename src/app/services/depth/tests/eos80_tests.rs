//! Tests for the EOS-80 equation of state against the UNESCO 1983 check values

use super::*;
use crate::app::services::depth::eos80::{density, polynomial, secant_bulk_modulus, sigma};

#[test]
fn test_polynomial_ascending_coefficients() {
    assert_eq!(polynomial(2.0, &[1.0, 2.0, 3.0]), 1.0 + 4.0 + 12.0);
    assert_eq!(polynomial(5.0, &[]), 0.0);
}

#[test]
fn test_surface_density_check_values() {
    assert_close(density(0.0, 5.0, 0.0), 999.96675, 1e-5);
    assert_close(density(35.0, 5.0, 0.0), 1027.67547, 1e-5);
    assert_close(density(35.0, 25.0, 0.0), 1023.34306, 1e-5);
}

#[test]
fn test_in_situ_density_check_values() {
    // 10000 dbar is 1000 bar
    assert_close(density(0.0, 5.0, 10000.0), 1044.12802, 1e-4);
    assert_close(density(35.0, 5.0, 10000.0), 1069.48914, 1e-4);
    assert_close(density(35.0, 25.0, 10000.0), 1062.53817, 1e-4);
}

#[test]
fn test_secant_bulk_modulus_check_values() {
    assert_close(secant_bulk_modulus(0.0, 5.0, 0.0), 20337.80375, 1e-4);
    assert_close(secant_bulk_modulus(35.0, 5.0, 1000.0), 25577.49819, 1e-4);
    assert_close(secant_bulk_modulus(35.0, 25.0, 1000.0), 27108.94504, 1e-4);
}

#[test]
fn test_negative_salinity_is_not_finite() {
    assert!(!density(-1.0, 5.0, 100.0).is_finite());
}

#[test]
fn test_sigma_is_density_anomaly() {
    assert_close(sigma(35.0, 5.0, 0.0), 27.67547, 1e-5);
}
