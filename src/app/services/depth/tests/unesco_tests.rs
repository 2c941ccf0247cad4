//! Tests for the UNESCO 1983 pressure to depth polynomial

use super::*;
use crate::Error;
use crate::app::services::depth::unesco::depth_unesco;

#[test]
fn test_check_value() {
    assert_close(depth_unesco(10000.0, 30.0).unwrap(), 9712.653, 1e-3);
}

#[test]
fn test_surface_is_zero() {
    assert_eq!(depth_unesco(0.0, 45.0).unwrap(), 0.0);
}

#[test]
fn test_equator_reference() {
    assert_close(depth_unesco(1000.0, 0.0).unwrap(), 992.117, 1e-3);
}

#[test]
fn test_latitude_out_of_range_rejected() {
    assert!(matches!(
        depth_unesco(100.0, 90.5),
        Err(Error::InvalidLatitude { .. })
    ));
    assert!(depth_unesco(100.0, f64::NAN).is_err());
    assert!(depth_unesco(100.0, -90.0).is_ok());
}
