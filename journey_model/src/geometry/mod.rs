//! Geographic primitives: coordinates, great-circle distance and bearing.

mod path;

pub use path::*;

use serde::{Deserialize, Serialize};

/// Mean earth radius (kilometers) used for all great-circle measurements.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Create a coordinate from longitude and latitude in degrees.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Linear interpolation in degree space.
    ///
    /// Route segments are short enough that this stays within rounding of the
    /// great-circle path.
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        Coordinate {
            lon: self.lon + (other.lon - self.lon) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }

    /// Initial bearing towards `other`, degrees clockwise from north in `[0, 360)`.
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        initial_bearing_deg(self, other)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Coordinate::new(value[0], value[1])
    }
}

/// Haversine distance between two coordinates in kilometers.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Initial great-circle bearing from `a` to `b`, degrees in `[0, 360)`.
pub fn initial_bearing_deg(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let deg = y.atan2(x).to_degrees();
    let normalized = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn test_haversine_one_degree_of_longitude_at_equator() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        assert_close(haversine_km(&a, &b), 111.195, 0.01);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let a = Coordinate::new(-3.7, 40.4);
        assert_eq!(haversine_km(&a, &a), 0.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert_close(origin.bearing_to(&Coordinate::new(0.0, 1.0)), 0.0, 1e-9);
        assert_close(origin.bearing_to(&Coordinate::new(1.0, 0.0)), 90.0, 1e-9);
        assert_close(origin.bearing_to(&Coordinate::new(0.0, -1.0)), 180.0, 1e-9);
        assert_close(origin.bearing_to(&Coordinate::new(-1.0, 0.0)), 270.0, 1e-9);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(12.0, 24.0);
        assert_eq!(a.lerp(&b, 0.5), Coordinate::new(11.0, 22.0));
    }

    #[test]
    fn test_coordinate_from_pair() {
        let c: Coordinate = [2.35, 48.85].into();
        assert_eq!(c.lon, 2.35);
        assert_eq!(c.lat, 48.85);
        assert!(c.is_finite());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_finite());
    }
}
