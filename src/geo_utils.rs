pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Point {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters (spherical haversine).
    /// Accurate to a few meters over the ranges we care about, which is
    /// well below the positioning noise in the captures.
    pub fn haversine_distance(&self, other: &Point) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * a.sqrt().asin() * EARTH_RADIUS_M
    }
}

/// Cumulative length of the path through `points`, in meters. Zero for
/// empty and single-point inputs.
pub fn path_length_m(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].haversine_distance(&w[1]))
        .sum()
}

/// Arithmetic mean of the coordinates. Only meaningful for point sets
/// spanning well under a kilometer; anything larger needs a spherical mean.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let lat_sum: f64 = points.iter().map(|p| p.latitude).sum();
    let lon_sum: f64 = points.iter().map(|p| p.longitude).sum();
    Some(Point::new(lat_sum / n, lon_sum / n))
}
