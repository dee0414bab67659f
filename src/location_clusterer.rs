/* Groups repeated positions into clusters to surface the places a vehicle
kept returning to. The greedy pass is seed-centered on purpose: membership
is decided by distance to the seed only, so traversal order matters and a
dense corridor of points can chain into an elongated cluster. Prior analysis
outputs depend on these semantics; do not "fix" this to complete linkage. */
use crate::geo_utils::{self, Point};
use chrono::NaiveDateTime;

/// A decoded, validated position with the time it was observed. Input to
/// the clusterer; carries no trip structure.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedPoint {
    pub time: NaiveDateTime,
    pub point: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Arithmetic mean of the member coordinates. An approximation that is
    /// only valid at sub-kilometer cluster radii.
    pub centroid: Point,
    pub count: usize,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
}

/// Greedy single-pass clustering: the first unassigned point seeds a
/// cluster and every remaining unassigned point within `radius_meters` of
/// that seed joins it. O(n²) in point count, which is fine for
/// single-vehicle log extracts. Every input point lands in exactly one
/// cluster. Output is ranked by member count descending, ties broken by
/// earliest first visit.
pub fn cluster_points(points: &[LocatedPoint], radius_meters: f64) -> Vec<Cluster> {
    let mut assigned = vec![false; points.len()];
    let mut clusters = Vec::new();

    for i in 0..points.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let seed = &points[i];
        let mut members = vec![seed];
        for (j, candidate) in points.iter().enumerate().skip(i + 1) {
            if assigned[j] {
                continue;
            }
            if seed.point.haversine_distance(&candidate.point) <= radius_meters {
                assigned[j] = true;
                members.push(candidate);
            }
        }

        let coords: Vec<Point> = members.iter().map(|m| m.point).collect();
        let centroid = geo_utils::centroid(&coords).unwrap_or(seed.point);
        let first_seen = members.iter().map(|m| m.time).min().unwrap_or(seed.time);
        let last_seen = members.iter().map(|m| m.time).max().unwrap_or(seed.time);
        clusters.push(Cluster {
            centroid,
            count: members.len(),
            first_seen,
            last_seen,
        });
    }

    clusters.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    debug!(
        "clustered {} point(s) into {} location(s)",
        points.len(),
        clusters.len()
    );
    clusters
}
