use assert_float_eq::*;
use chrono::{NaiveDate, NaiveDateTime};
use navtrace::gps_processor::{
    decode_and_validate, decode_raw_coordinate, validate_position, FixProcessor, RawRecord,
    RejectReason,
};

fn time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 7)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn record(raw_longitude: f64, raw_latitude: f64) -> RawRecord {
    RawRecord {
        time: time(),
        raw_longitude,
        raw_latitude,
        altitude_m: 58.2,
        heading_deg: 231.5,
        satellites: Some(9),
    }
}

#[test]
fn decode_large_magnitude() {
    // the recorded raw value observed in real captures
    let decoded = decode_raw_coordinate(15129673.819989);
    assert_float_absolute_eq!(decoded, 151.29673819989, 1e-9);
    assert_eq!(decoded, 15129673.819989 / 100000.0);
}

#[test]
fn decode_small_magnitude() {
    assert_eq!(decode_raw_coordinate(338526.0), 33.8526);
    assert_eq!(decode_raw_coordinate(338526.0), 338526.0 / 10000.0);
}

#[test]
fn accepted_fix_passes_fields_through() {
    let fix = decode_and_validate(&record(15129673.819989, -3385240.5)).unwrap();
    assert_float_absolute_eq!(fix.longitude, 151.29673819989, 1e-9);
    assert_float_absolute_eq!(fix.latitude, -33.852405, 1e-9);
    // altitude and heading are already decimal; no scaling
    assert_eq!(fix.altitude_m, 58.2);
    assert_eq!(fix.heading_deg, 231.5);
    assert_eq!(fix.satellites, Some(9));
    assert_eq!(fix.time, time());
}

#[test]
fn zero_pair_is_the_no_fix_sentinel() {
    assert_eq!(
        decode_and_validate(&record(0.0, 0.0)),
        Err(RejectReason::NoFixSentinel)
    );
    // one zero coordinate alone is not the sentinel; a latitude of exactly
    // zero is a legitimate position on the equator
    assert!(decode_and_validate(&record(1512967.0, 0.0)).is_ok());
}

#[test]
fn near_origin_artifacts_are_rejected() {
    // 5.0 decodes to 0.0005 on the small-magnitude branch
    assert_eq!(
        decode_and_validate(&record(5.0, 5.0)),
        Err(RejectReason::NearOrigin)
    );
    assert_eq!(
        decode_and_validate(&record(-9.9, 9.9)),
        Err(RejectReason::NearOrigin)
    );
}

#[test]
fn out_of_range_positions_are_rejected() {
    // 950000 -> 95.0 latitude
    assert_eq!(
        decode_and_validate(&record(1512967.0, 950000.0)),
        Err(RejectReason::OutOfRange)
    );
    // 99999999 -> 999.99 longitude
    assert_eq!(
        decode_and_validate(&record(99999999.0, -3385240.5)),
        Err(RejectReason::OutOfRange)
    );
}

#[test]
fn range_bounds_are_inclusive() {
    assert!(validate_position(90.0, 180.0).is_ok());
    assert!(validate_position(-90.0, -180.0).is_ok());
    assert_eq!(
        validate_position(90.001, 0.0),
        Err(RejectReason::OutOfRange)
    );
    assert_eq!(
        validate_position(0.0, -180.001),
        Err(RejectReason::OutOfRange)
    );
}

#[test]
fn sentinel_amid_valid_data_counts_exactly_once() {
    let mut processor = FixProcessor::new();
    let fixes: Vec<_> = [
        record(15129673.819989, -3385240.5),
        record(0.0, 0.0),
        record(15129680.1, -3385250.9),
    ]
    .iter()
    .filter_map(|r| processor.process(r))
    .collect();

    assert_eq!(fixes.len(), 2);
    let stats = processor.stats();
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.no_fix_sentinel, 1);
    assert_eq!(stats.near_origin, 0);
    assert_eq!(stats.out_of_range, 0);
    assert_eq!(stats.rejected(), 1);
}

#[test]
fn rejections_are_counted_by_class() {
    let mut processor = FixProcessor::new();
    for r in [
        record(0.0, 0.0),
        record(5.0, 5.0),
        record(1512967.0, 950000.0),
        record(15129673.819989, -3385240.5),
    ] {
        processor.process(&r);
    }
    let stats = processor.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.no_fix_sentinel, 1);
    assert_eq!(stats.near_origin, 1);
    assert_eq!(stats.out_of_range, 1);
}
