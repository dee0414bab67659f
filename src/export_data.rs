/* Track export. The primary output is a time-enabled KML document per trip
(gx:Track with paired when/coord children) that geospatial viewers can play
back on the time slider; a GPX rendition is written alongside for tools
without gx extension support. Document identity is the trip start timestamp
at second precision, which is unique across trips within one run. */
use crate::gps_processor::{GpsFix, RawRecord};
use crate::location_clusterer::LocatedPoint;
use crate::trip_builder::Trip;
use anyhow::Result;
use chrono::NaiveDateTime;
use gpx::{Gpx, GpxVersion, Metadata, Track, TrackSegment, Waypoint};
use kml::types::{
    AltitudeMode, Coord, Element, Geometry, Icon, IconStyle, KmlDocument, KmlVersion, LineStyle,
    Placemark, Point as KmlPoint, Style,
};
use kml::{Kml, KmlWriter};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const KML_NS: &str = "http://www.opengis.net/kml/2.2";
const GX_NS: &str = "http://www.google.com/kml/ext/2.2";

fn element(name: &str, content: impl Into<String>) -> Element {
    Element {
        name: name.to_string(),
        attrs: HashMap::new(),
        content: Some(content.into()),
        children: Vec::new(),
    }
}

fn kml_time(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn summary_html(trip: &Trip) -> String {
    format!(
        "<b>Start:</b> {}<br/><b>End:</b> {}<br/><b>Duration:</b> {:.1} minutes<br/><b>Distance:</b> {:.2} km<br/><b>Avg Speed:</b> {:.1} km/h<br/><b>Points:</b> {}",
        trip.start.format("%Y-%m-%d %H:%M:%S"),
        trip.end.format("%Y-%m-%d %H:%M:%S"),
        trip.duration_minutes(),
        trip.distance_km(),
        trip.avg_speed_kmh,
        trip.point_count()
    )
}

fn marker_placemark(name: &str, style: &str, text: String, fix: &GpsFix) -> Placemark {
    Placemark {
        name: Some(name.to_string()),
        description: Some(text),
        geometry: Some(Geometry::Point(KmlPoint {
            coord: Coord {
                x: fix.longitude,
                y: fix.latitude,
                z: Some(fix.altitude_m),
            },
            extrude: false,
            altitude_mode: AltitudeMode::Absolute,
            attrs: HashMap::new(),
        })),
        children: vec![element("styleUrl", style)],
        ..Default::default()
    }
}

fn track_placemark(trip: &Trip) -> Placemark {
    let mut children = vec![element("altitudeMode", "absolute")];
    for fix in trip.fixes() {
        children.push(element("when", kml_time(fix.time)));
    }
    for fix in trip.fixes() {
        children.push(element(
            "gx:coord",
            format!("{} {} {}", fix.longitude, fix.latitude, fix.altitude_m),
        ));
    }
    let track = Element {
        name: "gx:Track".to_string(),
        attrs: HashMap::new(),
        content: None,
        children,
    };
    Placemark {
        name: Some("GPS Track with Time".to_string()),
        description: Some(format!(
            "Time-enabled track; use the viewer's time slider to play back the route.<br/>Distance: {:.2} km<br/>Avg Speed: {:.1} km/h",
            trip.distance_km(),
            trip.avg_speed_kmh
        )),
        children: vec![element("styleUrl", "#track-style"), track],
        ..Default::default()
    }
}

fn track_style() -> Style {
    Style {
        id: Some("track-style".to_string()),
        icon: Some(IconStyle {
            scale: 0.5,
            icon: Icon {
                href: "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png"
                    .to_string(),
                ..Default::default()
            },
            ..Default::default()
        }),
        line: Some(LineStyle {
            color: "ff0000ff".to_string(),
            width: 3.0,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn marker_style(id: &str, color: &str, href: &str) -> Style {
    Style {
        id: Some(id.to_string()),
        icon: Some(IconStyle {
            scale: 1.1,
            color: color.to_string(),
            icon: Icon {
                href: href.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Build the complete KML document for one trip.
pub fn trip_to_kml(trip: &Trip) -> Kml {
    let fixes = trip.fixes();
    let mut elements: Vec<Kml> = vec![
        Kml::Element(element(
            "name",
            format!("GPS Track - {}", trip.start.format("%Y-%m-%d %H:%M:%S")),
        )),
        Kml::Element(element("description", summary_html(trip))),
        Kml::Style(track_style()),
        Kml::Style(marker_style(
            "startIcon",
            "ff00ff00",
            "http://maps.google.com/mapfiles/kml/paddle/grn-circle.png",
        )),
        Kml::Style(marker_style(
            "endIcon",
            "ff0000ff",
            "http://maps.google.com/mapfiles/kml/paddle/red-circle.png",
        )),
    ];
    if let (Some(first), Some(last)) = (fixes.first(), fixes.last()) {
        elements.push(Kml::Placemark(marker_placemark(
            "Start",
            "#startIcon",
            format!("Trip started at {}", trip.start.format("%H:%M:%S")),
            first,
        )));
        elements.push(Kml::Placemark(marker_placemark(
            "End",
            "#endIcon",
            format!("Trip ended at {}", trip.end.format("%H:%M:%S")),
            last,
        )));
    }
    elements.push(Kml::Placemark(track_placemark(trip)));

    let mut attrs = HashMap::new();
    attrs.insert("xmlns".to_string(), KML_NS.to_string());
    attrs.insert("xmlns:gx".to_string(), GX_NS.to_string());
    Kml::KmlDocument(KmlDocument {
        version: KmlVersion::V22,
        attrs,
        elements: vec![Kml::Document {
            attrs: HashMap::new(),
            elements,
        }],
    })
}

/// Filename stem shared by the per-trip artifacts, keyed by start time at
/// second precision.
pub fn trip_file_stem(trip: &Trip) -> String {
    format!("trip_{}", trip.start.format("%Y-%m-%d-%H%M%S"))
}

pub fn write_trip_kml(trip: &Trip, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.kml", trip_file_stem(trip)));
    let mut file = BufWriter::new(File::create(&path)?);
    file.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    let mut writer = KmlWriter::<_, f64>::from_writer(&mut file);
    writer.write(&trip_to_kml(trip))?;
    drop(writer);
    file.flush()?;
    Ok(path)
}

fn gpx_time(time: NaiveDateTime) -> Result<gpx::Time> {
    let instant = OffsetDateTime::from_unix_timestamp(time.and_utc().timestamp())?;
    Ok(gpx::Time::from(instant))
}

/// GPX 1.1 rendition of a trip with per-point timestamps and start/end
/// waypoints.
pub fn trip_to_gpx(trip: &Trip) -> Result<Gpx> {
    let mut points = Vec::new();
    for fix in trip.fixes() {
        let mut waypoint = Waypoint::new(geo_types::Point::new(fix.longitude, fix.latitude));
        waypoint.elevation = Some(fix.altitude_m);
        waypoint.time = Some(gpx_time(fix.time)?);
        points.push(waypoint);
    }

    let mut waypoints = Vec::new();
    if let (Some(first), Some(last)) = (trip.fixes().first(), trip.fixes().last()) {
        for (name, fix) in [("Start", first), ("End", last)] {
            let mut marker =
                Waypoint::new(geo_types::Point::new(fix.longitude, fix.latitude));
            marker.name = Some(name.to_string());
            marker.time = Some(gpx_time(fix.time)?);
            waypoints.push(marker);
        }
    }

    let track = Track {
        name: Some(format!(
            "GPS Track - {}",
            trip.start.format("%Y-%m-%d %H:%M:%S")
        )),
        description: Some(format!(
            "Distance: {:.2} km, Duration: {:.1} minutes, Avg Speed: {:.1} km/h, Points: {}",
            trip.distance_km(),
            trip.duration_minutes(),
            trip.avg_speed_kmh,
            trip.point_count()
        )),
        segments: vec![TrackSegment { points }],
        ..Default::default()
    };
    Ok(Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("navtrace".to_string()),
        metadata: Some(Metadata {
            name: Some(trip_file_stem(trip)),
            time: Some(gpx_time(trip.start)?),
            ..Default::default()
        }),
        waypoints,
        tracks: vec![track],
        ..Default::default()
    })
}

pub fn write_trip_gpx(trip: &Trip, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.gpx", trip_file_stem(trip)));
    let mut writer = BufWriter::new(File::create(&path)?);
    gpx::write(&trip_to_gpx(trip)?, &mut writer)?;
    writer.flush()?;
    Ok(path)
}

/// The intermediate extraction format kept around for cross-checking a run
/// against its source capture: one pipe-delimited raw record per line.
pub fn write_record_dump(records: &[RawRecord], path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# Extracted GPS records")?;
    writeln!(file, "# Format: Timestamp | Longitude | Latitude | Altitude | Heading")?;
    for record in records {
        writeln!(
            file,
            "{} | Lon:{} | Lat:{} | Alt:{} | Hd:{}",
            record.time.format("%d/%m/%Y %H:%M:%S%.3f"),
            record.raw_longitude,
            record.raw_latitude,
            record.altitude_m,
            record.heading_deg
        )?;
    }
    file.flush()?;
    Ok(())
}

/// Flat dump of the search-log positions feeding the clusterer.
pub fn write_point_dump(points: &[LocatedPoint], path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# Format: Timestamp | Latitude | Longitude")?;
    for located in points {
        writeln!(
            file,
            "{} | {:.6} | {:.6}",
            located.time.format("%Y-%m-%d %H:%M:%S"),
            located.point.latitude,
            located.point.longitude
        )?;
    }
    file.flush()?;
    Ok(())
}
