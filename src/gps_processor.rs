use crate::geo_utils::Point;
use chrono::NaiveDateTime;

/// A positional record exactly as extracted from a log line, before the
/// coordinate encoding has been decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub time: NaiveDateTime,
    pub raw_longitude: f64,
    pub raw_latitude: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub satellites: Option<u32>,
}

/// A decoded, validated fix. Immutable once produced; every fix that
/// survives validation has a non-degenerate, in-range position.
#[derive(Clone, Debug, PartialEq)]
pub struct GpsFix {
    pub time: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub satellites: Option<u32>,
}

impl GpsFix {
    pub fn point(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Raw pair exactly (0, 0): the head unit's explicit "no fix" value.
    NoFixSentinel,
    /// Decoded position within 0.001 degrees of the origin. These show up in
    /// the South Atlantic when the receiver had no signal; never a real
    /// position for a road vehicle log.
    NearOrigin,
    /// Decoded latitude outside [-90, 90] or longitude outside [-180, 180].
    OutOfRange,
}

/// Adaptive-precision decode of a raw coordinate. The encoding switches
/// fractional precision by magnitude; the 1,000,000 breakpoint is empirical
/// and must not change, or historical captures decode to the wrong place.
pub fn decode_raw_coordinate(raw: f64) -> f64 {
    if raw.abs() > 1_000_000.0 {
        raw / 100_000.0
    } else {
        raw / 10_000.0
    }
}

/// Range and degenerate-position checks on an already-decoded pair. Shared
/// by the nav-log flow (after decoding) and the search-log flow (whose
/// coordinates arrive in decimal degrees).
pub fn validate_position(latitude: f64, longitude: f64) -> Result<(), RejectReason> {
    if latitude.abs() < 0.001 && longitude.abs() < 0.001 {
        return Err(RejectReason::NearOrigin);
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(RejectReason::OutOfRange);
    }
    Ok(())
}

/// Decode a raw record into a fix, or say why it was rejected. Pure; the
/// stat-keeping wrapper is `FixProcessor`.
pub fn decode_and_validate(record: &RawRecord) -> Result<GpsFix, RejectReason> {
    if record.raw_longitude == 0.0 && record.raw_latitude == 0.0 {
        return Err(RejectReason::NoFixSentinel);
    }
    let longitude = decode_raw_coordinate(record.raw_longitude);
    let latitude = decode_raw_coordinate(record.raw_latitude);
    validate_position(latitude, longitude)?;
    Ok(GpsFix {
        time: record.time,
        latitude,
        longitude,
        altitude_m: record.altitude_m,
        heading_deg: record.heading_deg,
        satellites: record.satellites,
    })
}

/// Accepted/rejected counts, by rejection class. An analyst must be able to
/// see how much of a capture was discarded and why.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub accepted: u64,
    pub no_fix_sentinel: u64,
    pub near_origin: u64,
    pub out_of_range: u64,
}

impl ValidationStats {
    pub fn rejected(&self) -> u64 {
        self.no_fix_sentinel + self.near_origin + self.out_of_range
    }

    pub fn record_reject(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::NoFixSentinel => self.no_fix_sentinel += 1,
            RejectReason::NearOrigin => self.near_origin += 1,
            RejectReason::OutOfRange => self.out_of_range += 1,
        }
    }
}

/// Decodes and validates raw records while keeping running counts across
/// all files of a run.
pub struct FixProcessor {
    stats: ValidationStats,
}

impl FixProcessor {
    pub fn new() -> Self {
        FixProcessor {
            stats: ValidationStats::default(),
        }
    }

    pub fn process(&mut self, record: &RawRecord) -> Option<GpsFix> {
        match decode_and_validate(record) {
            Ok(fix) => {
                self.stats.accepted += 1;
                Some(fix)
            }
            Err(reason) => {
                self.stats.record_reject(reason);
                None
            }
        }
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }
}
