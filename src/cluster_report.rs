/* Renders the ranked-location summary an analyst reads first: top clusters
with centroid, visit counts, visit window, and a mapping-service link per
location. Pure string rendering over `Cluster` values; the caller decides
where it goes. */
use crate::geo_utils::Point;
use crate::location_clusterer::Cluster;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::fmt::Write;

const RULE: &str = "--------------------------------------------------------------------------------";
const DOUBLE_RULE: &str =
    "================================================================================";

pub fn maps_link(point: &Point) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        point.latitude, point.longitude
    )
}

/// `-33.852405, 151.296738` rendered as `33.852405°S, 151.296738°E`.
pub fn format_coordinate(point: &Point) -> String {
    let lat_dir = if point.latitude >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if point.longitude >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.6}°{}, {:.6}°{}",
        point.latitude.abs(),
        lat_dir,
        point.longitude.abs(),
        lon_dir
    )
}

fn render_location(rank: usize, cluster: &Cluster, total_points: usize) -> String {
    let percentage = if total_points > 0 {
        cluster.count as f64 / total_points as f64 * 100.0
    } else {
        0.0
    };
    let mut out = String::new();
    let _ = writeln!(out, "LOCATION #{rank}");
    let _ = writeln!(out, "  Coordinates: {}", format_coordinate(&cluster.centroid));
    let _ = writeln!(
        out,
        "  Clustered around: [{:.6}, {:.6}]",
        cluster.centroid.latitude, cluster.centroid.longitude
    );
    let _ = writeln!(
        out,
        "  Total Points: {} ({percentage:.1}% of all points)",
        cluster.count
    );
    let _ = writeln!(
        out,
        "  First Visit: {}",
        cluster.first_seen.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "  Last Visit: {}",
        cluster.last_seen.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "  Map: {}", maps_link(&cluster.centroid));
    out
}

/// Human-readable analysis report over ranked clusters. `generated_at` is
/// passed in so the rendering stays deterministic under test.
pub fn render_report(
    clusters: &[Cluster],
    total_points: usize,
    year_filter: Option<i32>,
    generated_at: NaiveDateTime,
) -> String {
    let title = match year_filter {
        Some(year) => format!("GPS LOCATION ANALYSIS REPORT - {year}"),
        None => "GPS LOCATION ANALYSIS REPORT".to_string(),
    };

    let top: Vec<&Cluster> = clusters.iter().take(3).collect();
    let top_total: usize = top.iter().map(|c| c.count).sum();
    let other_points = total_points.saturating_sub(top_total);
    let percent = |count: usize| {
        if total_points > 0 {
            count as f64 / total_points as f64 * 100.0
        } else {
            0.0
        }
    };

    let locations = top
        .iter()
        .enumerate()
        .map(|(idx, cluster)| render_location(idx + 1, cluster, total_points))
        .join("\n");

    let mut report = String::new();
    let _ = writeln!(report, "{DOUBLE_RULE}");
    let _ = writeln!(report, "{title}");
    let _ = writeln!(report, "{DOUBLE_RULE}");
    let _ = writeln!(
        report,
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(report, "SUMMARY");
    let _ = writeln!(report, "{RULE}");
    let _ = writeln!(report, "Total GPS Points: {total_points}");
    let _ = writeln!(report, "Unique Locations (clustered): {}\n", clusters.len());
    let _ = writeln!(report, "TOP {} MOST COMMON LOCATIONS", top.len());
    let _ = writeln!(report, "{RULE}\n");
    let _ = writeln!(report, "{locations}");
    let _ = writeln!(report, "COMBINED STATISTICS");
    let _ = writeln!(report, "{RULE}");
    let _ = writeln!(
        report,
        "Top {} locations combined: {} points ({:.1}%)",
        top.len(),
        top_total,
        percent(top_total)
    );
    let _ = writeln!(
        report,
        "Other locations: {} points ({:.1}%)\n",
        other_points,
        percent(other_points)
    );
    if let (Some(first), Some(last)) = (
        clusters.iter().map(|c| c.first_seen).min(),
        clusters.iter().map(|c| c.last_seen).max(),
    ) {
        let _ = writeln!(report, "ADDITIONAL DETAILS");
        let _ = writeln!(report, "{RULE}");
        let _ = writeln!(
            report,
            "Date range: {} to {}",
            first.format("%Y-%m-%d %H:%M:%S"),
            last.format("%Y-%m-%d %H:%M:%S")
        );
    }
    let _ = writeln!(report, "{DOUBLE_RULE}");
    report
}
