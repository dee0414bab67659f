/* The diagnostic captures interleave many unrelated entry types; extraction
is a line-oriented scan where anything that does not carry a positional
signature is skipped (and counted for diagnostics), never an error. Input is
decoded per line with lossy UTF-8 substitution because the captures are known
to contain mojibake. */
use crate::geo_utils::Point;
use crate::gps_processor::{validate_position, RawRecord, ValidationStats};
use crate::location_clusterer::LocatedPoint;
use anyhow::Result;
use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The two historical nav-log dialects. The timestamp format is determined
/// by the dialect, never by locale: a tagged line must not be fed to the
/// loose parser even though the loose pattern would textually match it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogDialect {
    /// Slash-delimited header with the coordinate block inside an `<SD2>`
    /// tag. Day-first timestamps.
    Tagged,
    /// Loosely delimited free text with a bare `MM Output:` block and an
    /// optional satellite count. Month-first timestamps.
    Loose,
}

lazy_static! {
    static ref TAGGED_RE: Regex = Regex::new(
        r"^(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2}\.\d{3})/\d+/\d+/NAV_FRAMEWORK_IF/SendGPSCanData/.*?\[MM Output:\s*<SD2>Lon:([-\d.]+)\s+Lat:([-\d.]+)\s+Alt:([-\d.]+)\s+Hd:([-\d.]+)</SD2>\]"
    )
    .unwrap();
    static ref LOOSE_TS_RE: Regex =
        Regex::new(r"^(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}\.\d{3})").unwrap();
    static ref LOOSE_MM_RE: Regex = Regex::new(
        r"MM Output:.*?Lon:([-\d.]+)\s+Lat:([-\d.]+)\s+Alt:([-\d.]+)\s+Hd:([-\d.]+)"
    )
    .unwrap();
    static ref SAT_RE: Regex = Regex::new(r"SatInView:(\d+)").unwrap();
}

/// Which dialect a line belongs to, or `None` for unrelated entries.
pub fn detect_dialect(line: &str) -> Option<LogDialect> {
    if !line.contains("SendGPSCanData") || !line.contains("MM Output") {
        return None;
    }
    if line.contains("<SD2>") {
        Some(LogDialect::Tagged)
    } else {
        Some(LogDialect::Loose)
    }
}

/// Parse one positional line in whichever dialect it is written in.
pub fn parse_nav_line(line: &str) -> Option<RawRecord> {
    match detect_dialect(line)? {
        LogDialect::Tagged => parse_tagged_line(line),
        LogDialect::Loose => parse_loose_line(line),
    }
}

fn parse_tagged_line(line: &str) -> Option<RawRecord> {
    let caps = TAGGED_RE.captures(line)?;
    let time = NaiveDateTime::parse_from_str(&caps[1], "%d/%m/%Y %H:%M:%S%.3f").ok()?;
    Some(RawRecord {
        time,
        raw_longitude: caps[2].parse().ok()?,
        raw_latitude: caps[3].parse().ok()?,
        altitude_m: caps[4].parse().ok()?,
        heading_deg: caps[5].parse().ok()?,
        // the tagged dialect never carries a satellite count
        satellites: None,
    })
}

fn parse_loose_line(line: &str) -> Option<RawRecord> {
    let ts = LOOSE_TS_RE.captures(line)?;
    let time = NaiveDateTime::parse_from_str(&ts[1], "%m/%d/%Y %H:%M:%S%.3f").ok()?;
    let caps = LOOSE_MM_RE.captures(line)?;
    let satellites = SAT_RE
        .captures(line)
        .and_then(|c| c[1].parse::<u32>().ok());
    Some(RawRecord {
        time,
        raw_longitude: caps[1].parse().ok()?,
        raw_latitude: caps[2].parse().ok()?,
        altitude_m: caps[3].parse().ok()?,
        heading_deg: caps[4].parse().ok()?,
        satellites,
    })
}

/// Per-file extraction counts. `lines - matched` were unrelated entries;
/// `matched - parsed` carried a positional signature but had mangled fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub lines: u64,
    pub matched: u64,
    pub parsed: u64,
}

impl ExtractStats {
    pub fn skipped(&self) -> u64 {
        self.lines - self.matched
    }

    pub fn malformed(&self) -> u64 {
        self.matched - self.parsed
    }

    pub fn merge(&mut self, other: &ExtractStats) {
        self.lines += other.lines;
        self.matched += other.matched;
        self.parsed += other.parsed;
    }
}

/// Scan one nav log, yielding every parseable positional record in file
/// order. Undecodable bytes are substituted, not fatal.
pub fn load_nav_log(path: &Path) -> Result<(Vec<RawRecord>, ExtractStats)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut stats = ExtractStats::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;
        let line = String::from_utf8_lossy(&buf);
        if detect_dialect(&line).is_none() {
            continue;
        }
        stats.matched += 1;
        match parse_nav_line(&line) {
            Some(record) => {
                stats.parsed += 1;
                records.push(record);
            }
            None => debug!(
                "unparsable positional line {} in {}",
                stats.lines,
                path.display()
            ),
        }
    }
    debug!(
        "{}: {} lines, {} positional, {} parsed",
        path.display(),
        stats.lines,
        stats.matched,
        stats.parsed
    );
    Ok((records, stats))
}

lazy_static! {
    static ref SEARCH_TS_RE: Regex =
        Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").unwrap();
    static ref RGC_RE: Regex =
        Regex::new(r"rgc=&current_location=(-?\d+\.\d+),(-?\d+\.\d+)&lang=").unwrap();
}

/// Search-log extraction counts. Rejections use the same classes as the
/// nav-log validator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLogStats {
    pub lines: u64,
    pub matched: u64,
    pub missing_timestamp: u64,
    pub outside_year: u64,
    pub validation: ValidationStats,
}

/// Extract reverse-geocode positions from the unified search log. Entries
/// are delimited by `System:QNX` lines; a timestamp line sets the context
/// for the `current_location` parameters that follow it. Coordinates here
/// are already decimal degrees, so there is no adaptive decode.
pub fn load_search_log(
    path: &Path,
    year_filter: Option<i32>,
) -> Result<(Vec<LocatedPoint>, SearchLogStats)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut points = Vec::new();
    let mut stats = SearchLogStats::default();
    let mut current_time: Option<NaiveDateTime> = None;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;
        let line = String::from_utf8_lossy(&buf);

        // entry boundary: the timestamp context does not survive it
        if line.starts_with("System:QNX") {
            current_time = None;
            continue;
        }
        if let Some(caps) = SEARCH_TS_RE.captures(&line) {
            current_time =
                NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%d %H:%M:%S").ok();
            continue;
        }
        let Some(caps) = RGC_RE.captures(&line) else {
            continue;
        };
        stats.matched += 1;
        let Some(time) = current_time else {
            stats.missing_timestamp += 1;
            continue;
        };
        if let Some(year) = year_filter {
            if time.year() != year {
                stats.outside_year += 1;
                continue;
            }
        }
        let (Ok(latitude), Ok(longitude)) =
            (caps[1].parse::<f64>(), caps[2].parse::<f64>())
        else {
            continue;
        };
        match validate_position(latitude, longitude) {
            Ok(()) => {
                stats.validation.accepted += 1;
                points.push(LocatedPoint {
                    time,
                    point: Point::new(latitude, longitude),
                });
            }
            Err(reason) => stats.validation.record_reject(reason),
        }
    }
    info!(
        "{}: {} location entries, {} usable",
        path.display(),
        stats.matched,
        stats.validation.accepted
    );
    Ok((points, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    const TAGGED: &str = "07/03/2025 09:41:00.123/322/4411/NAV_FRAMEWORK_IF/SendGPSCanData/0922/=[GPS Data OK], [Fix:3D], [MM Output: <SD2>Lon:15129673.819989 Lat:-3385240.5 Alt:58.2 Hd:231.5</SD2>]";
    const LOOSE: &str = "03/07/2025 10:00:00.000 0322 4411 II NAV_FRAMEWORK_IF SendGPSCanData 0922 Fix:3D SatInView:9 MM Output: Lon:15129673.819989 Lat:-3385240.500000 Alt:58.200000 Hd:231.500000 Spd:12.3";

    #[test]
    fn tagged_timestamps_are_day_first() {
        assert_eq!(detect_dialect(TAGGED), Some(LogDialect::Tagged));
        let record = parse_nav_line(TAGGED).unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_milli_opt(9, 41, 0, 123)
            .unwrap();
        assert_eq!(record.time, expected);
        assert_eq!(record.raw_longitude, 15_129_673.819989);
        assert_eq!(record.raw_latitude, -3_385_240.5);
        assert_eq!(record.altitude_m, 58.2);
        assert_eq!(record.heading_deg, 231.5);
        assert_eq!(record.satellites, None);
    }

    #[test]
    fn loose_timestamps_are_month_first() {
        assert_eq!(detect_dialect(LOOSE), Some(LogDialect::Loose));
        let record = parse_nav_line(LOOSE).unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(record.time, expected);
        assert_eq!(record.satellites, Some(9));
    }

    #[test]
    fn dialects_are_not_conflated() {
        // A tagged line written on the 25th would silently gain a bogus
        // month if it ever reached the loose parser.
        let line = TAGGED.replace("07/03/2025", "25/12/2025");
        let record = parse_nav_line(&line).unwrap();
        assert_eq!(record.time.date().month(), 12);
        assert_eq!(record.time.date().day(), 25);
        assert_eq!(record.time.hour(), 9);
    }

    #[test]
    fn unrelated_lines_do_not_match() {
        assert_eq!(detect_dialect("03/07/2025 10:00:00.000 HVAC SetTemp 21"), None);
        assert_eq!(parse_nav_line("not a gps line"), None);
    }
}
