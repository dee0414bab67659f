/* Trips are rebuilt from scratch on every run: all surviving fixes are
sorted chronologically (stable, so ties keep file order) and a single linear
pass opens a new trip at every qualifying time gap. A fix is never assigned
to more than one trip, and an undersized run is dropped whole, never merged
into its neighbour. */
use crate::config::TrackConfig;
use crate::geo_utils::{self, Point};
use crate::gps_processor::GpsFix;
use chrono::NaiveDateTime;

/// One reconstructed trip. Owns its fixes exclusively; immutable after
/// creation, with the summary statistics computed up front.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    fixes: Vec<GpsFix>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub distance_m: f64,
    pub duration_s: f64,
    pub avg_speed_kmh: f64,
}

impl Trip {
    fn from_fixes(fixes: Vec<GpsFix>) -> Option<Trip> {
        let start = fixes.first()?.time;
        let end = fixes.last()?.time;
        let points: Vec<Point> = fixes.iter().map(|f| f.point()).collect();
        let distance_m = geo_utils::path_length_m(&points);
        let duration_s = (end - start).num_milliseconds() as f64 / 1000.0;
        // zero-duration trips get zero speed, not a division error
        let avg_speed_kmh = if duration_s > 0.0 {
            (distance_m / 1000.0) / (duration_s / 3600.0)
        } else {
            0.0
        };
        Some(Trip {
            fixes,
            start,
            end,
            distance_m,
            duration_s,
            avg_speed_kmh,
        })
    }

    pub fn fixes(&self) -> &[GpsFix] {
        &self.fixes
    }

    pub fn point_count(&self) -> usize {
        self.fixes.len()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_s / 60.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentStats {
    pub trips_emitted: u64,
    pub trips_dropped: u64,
    pub fixes_dropped: u64,
}

/// Partition `fixes` into trips. A new trip starts at the very first fix
/// and whenever the gap to the previous fix is at least `config.time_gap`;
/// a trip is emitted iff it has at least `config.min_points_per_trip` fixes.
pub fn build_trips(mut fixes: Vec<GpsFix>, config: &TrackConfig) -> (Vec<Trip>, SegmentStats) {
    fixes.sort_by_key(|f| f.time);

    let mut trips = Vec::new();
    let mut stats = SegmentStats::default();
    let mut current: Vec<GpsFix> = Vec::new();
    for fix in fixes {
        let gap_reached = current
            .last()
            .is_some_and(|prev| fix.time - prev.time >= config.time_gap);
        if gap_reached {
            flush(&mut current, config.min_points_per_trip, &mut trips, &mut stats);
        }
        current.push(fix);
    }
    // the trailing run is held to the same minimum
    flush(&mut current, config.min_points_per_trip, &mut trips, &mut stats);

    info!(
        "segmented {} trip(s), dropped {} undersized run(s) ({} fixes)",
        stats.trips_emitted, stats.trips_dropped, stats.fixes_dropped
    );
    (trips, stats)
}

fn flush(
    current: &mut Vec<GpsFix>,
    min_points: usize,
    trips: &mut Vec<Trip>,
    stats: &mut SegmentStats,
) {
    if current.is_empty() {
        return;
    }
    let run = std::mem::take(current);
    if run.len() >= min_points {
        if let Some(trip) = Trip::from_fixes(run) {
            stats.trips_emitted += 1;
            trips.push(trip);
        }
    } else {
        stats.trips_dropped += 1;
        stats.fixes_dropped += run.len() as u64;
    }
}
