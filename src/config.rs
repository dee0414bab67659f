use anyhow::Result;
use chrono::Duration;

/// Analysis thresholds for one run. Replaces the scattered constants of the
/// early capture scripts with named, validated fields passed into each
/// component at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackConfig {
    /// A gap of at least this long between consecutive fixes starts a new trip.
    pub time_gap: Duration,
    /// Trips with fewer fixes than this are dropped, not emitted.
    pub min_points_per_trip: usize,
    /// Radius of a location cluster around its seed point.
    pub cluster_radius_meters: f64,
    /// When set, restrict search-log extraction to this calendar year.
    pub year_filter: Option<i32>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            time_gap: Duration::minutes(2),
            min_points_per_trip: 3,
            cluster_radius_meters: 100.0,
            year_filter: None,
        }
    }
}

impl TrackConfig {
    /// Fatal on invalid thresholds. Must be called before any processing so
    /// a bad configuration never produces a partial run.
    pub fn validate(&self) -> Result<()> {
        if self.time_gap <= Duration::zero() {
            bail!("trip time gap must be positive, got {}", self.time_gap);
        }
        if self.min_points_per_trip == 0 {
            bail!("minimum points per trip must be at least 1");
        }
        if !(self.cluster_radius_meters > 0.0) {
            bail!(
                "cluster radius must be positive, got {}m",
                self.cluster_radius_meters
            );
        }
        Ok(())
    }
}
