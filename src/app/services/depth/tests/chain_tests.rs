//! Tests for the ordered depth strategy chain on data files

use super::*;
use crate::Error;
use crate::app::models::Column;
use crate::app::services::depth::DepthMethod;
use crate::config::DepthConfig;

fn full_cast(latitude: Option<f64>) -> DataFile {
    create_test_cast(
        &[
            ("0.0", "35.0", "10.0"),
            ("10.0", "35.0", "10.0"),
            ("50.0", "35.0", "10.0"),
            ("100.0", "35.0", "10.0"),
            ("500.0", "35.0", "10.0"),
        ],
        latitude,
    )
}

#[test]
fn test_actual_depth_column_wins() {
    let mut file = full_cast(Some(30.0));
    let mut actual = Column::declared("_ACTUAL_DEPTH", Some("METERS"));
    for depth in ["1.0", "2.5", "3.0", "", "5.0"] {
        let value = (!depth.is_empty()).then(|| Value::parse(depth));
        actual.append(value, None, None).unwrap();
    }
    file.insert_column(actual);

    let series = file.calculate_depths(&DepthConfig::default(), None).unwrap();
    assert_eq!(series.method, DepthMethod::Actual);
    assert_eq!(series.attempted, vec![DepthMethod::Actual]);
    assert_eq!(
        series.depths,
        vec![Some(1.0), Some(2.5), Some(3.0), None, Some(5.0)]
    );
}

#[test]
fn test_sverdrup_when_density_available() {
    let file = full_cast(Some(30.0));
    let series = file.calculate_depths(&DepthConfig::default(), None).unwrap();

    assert_eq!(series.method, DepthMethod::Sverdrup);
    assert_eq!(
        series.attempted,
        vec![DepthMethod::Actual, DepthMethod::Sverdrup]
    );
    let depths: Vec<f64> = series.depths.iter().map(|d| d.unwrap()).collect();
    assert_eq!(depths[0], 0.0);
    assert_close(depths[1], 9.94289, 1e-4);
    assert_close(depths[4], 496.5663, 1e-3);
}

#[test]
fn test_missing_salinity_falls_back_to_unesco() {
    let file = create_test_cast(
        &[("10.0", "35.0", "10.0"), ("20.0", "", "10.0"), ("", "35.0", "9.0")],
        Some(0.0),
    );
    let series = file.calculate_depths(&DepthConfig::default(), None).unwrap();

    assert_eq!(series.method, DepthMethod::Unesco1983);
    assert_eq!(series.attempted.len(), 3);
    assert!(series.depths[0].is_some());
    assert!(series.depths[1].is_some());
    assert_eq!(series.depths[2], None);
}

#[test]
fn test_empty_cast_at_equator_gives_empty_unesco_series() {
    let file = create_test_cast(&[], Some(0.0));
    let series = file.calculate_depths(&DepthConfig::default(), None).unwrap();
    assert_eq!(series.method, DepthMethod::Unesco1983);
    assert!(series.depths.is_empty());
}

#[test]
fn test_latitude_argument_overrides_global() {
    let file = full_cast(None);
    assert!(file.calculate_depths(&DepthConfig::default(), None).is_err());

    let series = file
        .calculate_depths(&DepthConfig::default(), Some(30.0))
        .unwrap();
    assert_eq!(series.method, DepthMethod::Sverdrup);
}

#[test]
fn test_text_latitude_global_is_parsed() {
    let mut file = full_cast(None);
    file.set_global("LATITUDE", " 30.0000");
    assert_eq!(file.latitude(), Some(30.0));
}

#[test]
fn test_no_strategy_reports_every_reason() {
    let file = full_cast(None);
    let error = file
        .calculate_depths(&DepthConfig::default(), None)
        .unwrap_err();
    let Error::DepthUnavailable { reasons } = error else {
        panic!("expected DepthUnavailable, got {:?}", error);
    };
    assert!(reasons.contains("actual: no measured depth column"));
    assert!(reasons.contains("sverdrup: no latitude"));
    assert!(reasons.contains("unesco1983: no latitude"));
}

#[test]
fn test_impossible_latitude_never_yields_depth() {
    for latitude in [200.0, 400.0, -91.0, 1.0e5] {
        let file = full_cast(Some(latitude));
        let error = file
            .calculate_depths(&DepthConfig::default(), None)
            .unwrap_err();
        let Error::DepthUnavailable { reasons } = error else {
            panic!("expected DepthUnavailable for {}, got {:?}", latitude, error);
        };
        assert!(reasons.contains("sverdrup: Invalid latitude"), "{}", reasons);
        assert!(reasons.contains("unesco1983: Invalid latitude"), "{}", reasons);
    }
}

#[test]
fn test_non_finite_latitude_overflows_gravity() {
    let file = full_cast(None);
    let error = file
        .calculate_depths(&DepthConfig::default(), Some(f64::NAN))
        .unwrap_err();
    let Error::DepthUnavailable { reasons } = error else {
        panic!("expected DepthUnavailable, got {:?}", error);
    };
    assert!(reasons.contains("Surface gravity overflowed"));
}
