use assert_float_eq::*;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use navtrace::config::TrackConfig;
use navtrace::gps_processor::GpsFix;
use navtrace::trip_builder::build_trips;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 7)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn fix(time: NaiveDateTime) -> GpsFix {
    fix_at(time, -33.852405, 151.296738)
}

fn fix_at(time: NaiveDateTime, latitude: f64, longitude: f64) -> GpsFix {
    GpsFix {
        time,
        latitude,
        longitude,
        altitude_m: 58.2,
        heading_deg: 231.5,
        satellites: None,
    }
}

#[test]
fn splits_on_qualifying_gap() {
    let fixes = vec![
        fix(at(10, 0, 0)),
        fix(at(10, 1, 0)),
        fix(at(10, 1, 30)),
        fix(at(10, 10, 0)),
        fix(at(10, 10, 30)),
        fix(at(10, 11, 0)),
    ];
    let (trips, stats) = build_trips(fixes, &TrackConfig::default());
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].point_count(), 3);
    assert_eq!(trips[1].point_count(), 3);
    assert_eq!(trips[0].start, at(10, 0, 0));
    assert_eq!(trips[0].end, at(10, 1, 30));
    assert_eq!(trips[1].start, at(10, 10, 0));
    assert_eq!(stats.trips_emitted, 2);
    assert_eq!(stats.trips_dropped, 0);
}

#[test]
fn trailing_undersized_run_is_dropped() {
    let fixes = vec![
        fix(at(10, 0, 0)),
        fix(at(10, 1, 0)),
        fix(at(10, 1, 30)),
        // qualifying gap, then only two points before end-of-stream
        fix(at(10, 20, 0)),
        fix(at(10, 20, 30)),
    ];
    let (trips, stats) = build_trips(fixes, &TrackConfig::default());
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].point_count(), 3);
    assert_eq!(stats.trips_dropped, 1);
    assert_eq!(stats.fixes_dropped, 2);
}

#[test]
fn every_fix_lands_in_exactly_one_run() {
    let mut fixes = Vec::new();
    for minute in [0u32, 1, 2, 10, 11, 20, 30, 31, 32, 33] {
        fixes.push(fix(at(9, minute, 0)));
    }
    let total = fixes.len() as u64;
    let (trips, stats) = build_trips(fixes, &TrackConfig::default());
    let emitted: u64 = trips.iter().map(|t| t.point_count() as u64).sum();
    assert_eq!(emitted + stats.fixes_dropped, total);
}

#[test]
fn gap_equal_to_threshold_starts_a_trip() {
    let config = TrackConfig {
        min_points_per_trip: 1,
        ..Default::default()
    };
    let fixes = vec![fix(at(10, 0, 0)), fix(at(10, 2, 0))];
    let (trips, _) = build_trips(fixes, &config);
    assert_eq!(trips.len(), 2);

    // one second under the threshold stays in the same trip
    let fixes = vec![fix(at(10, 0, 0)), fix(at(10, 1, 59))];
    let (trips, _) = build_trips(fixes, &config);
    assert_eq!(trips.len(), 1);
}

#[test]
fn input_is_sorted_before_segmentation() {
    let fixes = vec![
        fix(at(10, 1, 30)),
        fix(at(10, 0, 0)),
        fix(at(10, 1, 0)),
    ];
    let (trips, _) = build_trips(fixes, &TrackConfig::default());
    assert_eq!(trips.len(), 1);
    let times: Vec<_> = trips[0].fixes().iter().map(|f| f.time).collect();
    assert_eq!(times, vec![at(10, 0, 0), at(10, 1, 0), at(10, 1, 30)]);
}

#[test]
fn timestamp_ties_keep_input_order() {
    let config = TrackConfig {
        min_points_per_trip: 1,
        ..Default::default()
    };
    let mut first = fix(at(10, 0, 0));
    first.altitude_m = 1.0;
    let mut second = fix(at(10, 0, 0));
    second.altitude_m = 2.0;
    let (trips, _) = build_trips(vec![first, second], &config);
    let altitudes: Vec<_> = trips[0].fixes().iter().map(|f| f.altitude_m).collect();
    assert_eq!(altitudes, vec![1.0, 2.0]);
}

#[test]
fn trip_statistics() {
    // two fixes one degree of latitude apart, one minute apart
    let fixes = vec![
        fix_at(at(10, 0, 0), -33.0, 151.0),
        fix_at(at(10, 1, 0), -34.0, 151.0),
    ];
    let config = TrackConfig {
        min_points_per_trip: 2,
        ..Default::default()
    };
    let (trips, _) = build_trips(fixes, &config);
    let trip = &trips[0];
    assert_float_relative_eq!(trip.distance_m, 111_195.0, 0.005);
    assert_eq!(trip.duration_s, 60.0);
    assert_float_absolute_eq!(
        trip.avg_speed_kmh,
        (trip.distance_m / 1000.0) / (60.0 / 3600.0),
        1e-9
    );
}

#[test]
fn zero_duration_trip_has_zero_speed() {
    let fixes = vec![fix(at(10, 0, 0)), fix(at(10, 0, 0)), fix(at(10, 0, 0))];
    let (trips, _) = build_trips(fixes, &TrackConfig::default());
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].duration_s, 0.0);
    assert_eq!(trips[0].avg_speed_kmh, 0.0);
}

#[test]
fn custom_gap_threshold() {
    let config = TrackConfig {
        time_gap: Duration::seconds(30),
        min_points_per_trip: 1,
        ..Default::default()
    };
    let fixes = vec![fix(at(10, 0, 0)), fix(at(10, 0, 30)), fix(at(10, 0, 45))];
    let (trips, _) = build_trips(fixes, &config);
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].point_count(), 1);
    assert_eq!(trips[1].point_count(), 2);
}
