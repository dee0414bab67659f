/* One run = a set of already-discovered input files (discovery and CLI live
outside this crate) processed independently: a file that cannot be read is
recorded and skipped, never fatal. The only fatal conditions are an invalid
configuration and a run that yields no valid fix at all. */
use crate::cluster_report;
use crate::config::TrackConfig;
use crate::export_data;
use crate::gps_processor::{FixProcessor, ValidationStats};
use crate::import_data::{self, ExtractStats, SearchLogStats};
use crate::location_clusterer::{self, Cluster};
use crate::trip_builder::{self, SegmentStats};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file outcome. `error` is set when the file could not be read; the
/// rest of the run is unaffected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub records: u64,
    pub accepted: u64,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TripSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub distance_m: f64,
    pub duration_s: f64,
    pub avg_speed_kmh: f64,
    pub points: usize,
    pub kml_path: PathBuf,
    pub gpx_path: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub extract: ExtractStats,
    pub validation: ValidationStats,
    pub segments: SegmentStats,
    pub trips: Vec<TripSummary>,
    /// Pipe-delimited dump of every extracted raw record, for cross-checking
    /// a run against its source capture.
    pub record_dump_path: PathBuf,
}

/// Full nav-log flow: extract → decode/validate → sort → segment → export.
/// `files` must already be in the intended order; rotated logs sort with
/// `utils::natural_sort_key`.
pub fn run_track_extraction(
    files: &[PathBuf],
    config: &TrackConfig,
    output_dir: &Path,
) -> Result<RunSummary> {
    config.validate()?;
    fs::create_dir_all(output_dir)?;

    let mut processor = FixProcessor::new();
    let mut all_records = Vec::new();
    let mut all_fixes = Vec::new();
    let mut extract = ExtractStats::default();
    let mut reports = Vec::new();
    for path in files {
        match import_data::load_nav_log(path) {
            Ok((records, stats)) => {
                let accepted_before = processor.stats().accepted;
                for record in &records {
                    if let Some(fix) = processor.process(record) {
                        all_fixes.push(fix);
                    }
                }
                let accepted = processor.stats().accepted - accepted_before;
                info!(
                    "{}: {} positional record(s), {} valid fix(es)",
                    path.display(),
                    stats.parsed,
                    accepted
                );
                extract.merge(&stats);
                reports.push(FileReport {
                    path: path.clone(),
                    records: stats.parsed,
                    accepted,
                    error: None,
                });
                all_records.extend(records);
            }
            Err(err) => {
                warn!("skipping unreadable log {}: {err:#}", path.display());
                reports.push(FileReport {
                    path: path.clone(),
                    records: 0,
                    accepted: 0,
                    error: Some(format!("{err:#}")),
                });
            }
        }
    }

    let validation = processor.stats().clone();
    if all_fixes.is_empty() {
        bail!(
            "no valid GPS fix in any of the {} input file(s) ({} record(s) rejected)",
            files.len(),
            validation.rejected()
        );
    }
    info!(
        "{} valid fix(es) total, {} rejected ({} no-fix, {} near-origin, {} out-of-range)",
        validation.accepted,
        validation.rejected(),
        validation.no_fix_sentinel,
        validation.near_origin,
        validation.out_of_range
    );

    let record_dump_path = output_dir.join("extracted_records.log");
    export_data::write_record_dump(&all_records, &record_dump_path)?;

    let (trips, segments) = trip_builder::build_trips(all_fixes, config);
    let mut summaries = Vec::new();
    for trip in &trips {
        let kml_path = export_data::write_trip_kml(trip, output_dir)?;
        let gpx_path = export_data::write_trip_gpx(trip, output_dir)?;
        info!(
            "{}: {} -> {}, {:.2} km, {} point(s)",
            kml_path.display(),
            trip.start.format("%Y-%m-%d %H:%M:%S"),
            trip.end.format("%H:%M:%S"),
            trip.distance_km(),
            trip.point_count()
        );
        summaries.push(TripSummary {
            start: trip.start,
            end: trip.end,
            distance_m: trip.distance_m,
            duration_s: trip.duration_s,
            avg_speed_kmh: trip.avg_speed_kmh,
            points: trip.point_count(),
            kml_path,
            gpx_path,
        });
    }

    Ok(RunSummary {
        files: reports,
        extract,
        validation,
        segments,
        trips: summaries,
        record_dump_path,
    })
}

#[derive(Debug)]
pub struct ScanSummary {
    pub stats: SearchLogStats,
    pub total_points: usize,
    pub clusters: Vec<Cluster>,
    pub report_path: PathBuf,
    pub point_dump_path: PathBuf,
}

/// Independent location-frequency flow over the search log: no trip
/// structure, same validator, ranked clusters plus the analyst report.
pub fn run_location_scan(
    search_log: &Path,
    config: &TrackConfig,
    output_dir: &Path,
) -> Result<ScanSummary> {
    config.validate()?;
    fs::create_dir_all(output_dir)?;

    let (points, stats) = import_data::load_search_log(search_log, config.year_filter)?;
    if points.is_empty() {
        bail!("no usable location entry in {}", search_log.display());
    }
    let clusters = location_clusterer::cluster_points(&points, config.cluster_radius_meters);

    let report = cluster_report::render_report(
        &clusters,
        points.len(),
        config.year_filter,
        Local::now().naive_local(),
    );
    let report_path = output_dir.join("location_analysis.txt");
    fs::write(&report_path, report)?;
    let point_dump_path = output_dir.join("location_points.log");
    export_data::write_point_dump(&points, &point_dump_path)?;
    info!(
        "{} location(s) from {} point(s), report at {}",
        clusters.len(),
        points.len(),
        report_path.display()
    );

    Ok(ScanSummary {
        stats,
        total_points: points.len(),
        clusters,
        report_path,
        point_dump_path,
    })
}
