//! Route polyline with arc-length queries.

use serde::{Deserialize, Serialize};

use super::Coordinate;
use crate::error::JourneyError;

/// One straight piece of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start: Coordinate,
    pub end: Coordinate,
    /// Arc length from the path start to `start` (km).
    pub start_distance: f64,
    /// Great-circle length of this segment (km).
    pub length: f64,
}

/// The ordered route a journey follows.
///
/// Cumulative lengths are computed once at construction so every
/// "point at distance" query is a binary search plus one interpolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct PathGeometry {
    vertices: Vec<Coordinate>,
    /// `cumulative[i]` = distance from vertex 0 to vertex `i`.
    cumulative: Vec<f64>,
}

impl PathGeometry {
    /// Build a path from its vertices.
    ///
    /// Fails on an empty vertex list or a non-finite vertex. A single vertex
    /// is a valid zero-length path.
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, JourneyError> {
        if vertices.is_empty() {
            return Err(JourneyError::EmptyPath);
        }
        if let Some(index) = vertices.iter().position(|c| !c.is_finite()) {
            return Err(JourneyError::NonFiniteVertex { index });
        }

        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in vertices.windows(2) {
            total += pair[0].distance_km(&pair[1]);
            cumulative.push(total);
        }

        Ok(Self {
            vertices,
            cumulative,
        })
    }

    /// Total arc length (km).
    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Route vertices in travel order.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// First vertex.
    pub fn start(&self) -> Coordinate {
        self.vertices[0]
    }

    /// Last vertex.
    pub fn end(&self) -> Coordinate {
        self.vertices[self.vertices.len() - 1]
    }

    /// Number of segments (vertices - 1).
    pub fn segment_count(&self) -> usize {
        self.vertices.len() - 1
    }

    /// True when every query collapses onto a single point.
    pub fn is_degenerate(&self) -> bool {
        self.total_length() <= 0.0
    }

    /// Iterate segments in route order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices
            .windows(2)
            .enumerate()
            .map(move |(index, pair)| Segment {
                index,
                start: pair[0],
                end: pair[1],
                start_distance: self.cumulative[index],
                length: self.cumulative[index + 1] - self.cumulative[index],
            })
    }

    /// The point at arc length `distance` from the start, clamped to the path.
    pub fn point_at(&self, distance: f64) -> Coordinate {
        if self.vertices.len() == 1 || self.is_degenerate() {
            return self.start();
        }
        let d = if distance.is_nan() {
            0.0
        } else {
            distance.clamp(0.0, self.total_length())
        };

        // First vertex strictly beyond d; the segment ending there contains d.
        let upper = self.cumulative.partition_point(|&c| c <= d);
        if upper >= self.vertices.len() {
            return self.end();
        }
        let lower = upper - 1;
        let seg_len = self.cumulative[upper] - self.cumulative[lower];
        if seg_len <= 0.0 {
            return self.vertices[lower];
        }
        let t = (d - self.cumulative[lower]) / seg_len;
        self.vertices[lower].lerp(&self.vertices[upper], t)
    }
}

impl TryFrom<Vec<Coordinate>> for PathGeometry {
    type Error = JourneyError;

    fn try_from(vertices: Vec<Coordinate>) -> Result<Self, Self::Error> {
        PathGeometry::new(vertices)
    }
}

impl From<PathGeometry> for Vec<Coordinate> {
    fn from(path: PathGeometry) -> Self {
        path.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equator_path() -> PathGeometry {
        PathGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(2.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            PathGeometry::new(vec![]),
            Err(JourneyError::EmptyPath)
        ));
    }

    #[test]
    fn test_non_finite_vertex_rejected() {
        let err = PathGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(f64::INFINITY, 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, JourneyError::NonFiniteVertex { index: 1 }));
    }

    #[test]
    fn test_total_length_sums_segments() {
        let path = equator_path();
        let one_degree = Coordinate::new(0.0, 0.0).distance_km(&Coordinate::new(1.0, 0.0));
        assert!((path.total_length() - 2.0 * one_degree).abs() < 1e-9);
        assert_eq!(path.segment_count(), 2);
    }

    #[test]
    fn test_point_at_interpolates_and_clamps() {
        let path = equator_path();
        let half = path.total_length() / 2.0;

        let mid = path.point_at(half);
        assert!((mid.lon - 1.0).abs() < 1e-9);

        let quarter = path.point_at(half / 2.0);
        assert!((quarter.lon - 0.5).abs() < 1e-9);

        assert_eq!(path.point_at(-5.0), path.start());
        assert_eq!(path.point_at(path.total_length() + 10.0), path.end());
    }

    #[test]
    fn test_single_vertex_path_is_degenerate() {
        let only = Coordinate::new(5.0, 5.0);
        let path = PathGeometry::new(vec![only]).unwrap();
        assert!(path.is_degenerate());
        assert_eq!(path.total_length(), 0.0);
        assert_eq!(path.point_at(123.0), only);
        assert_eq!(path.segments().count(), 0);
    }

    #[test]
    fn test_repeated_vertices_are_zero_length_segments() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let path = PathGeometry::new(vec![a, a, b]).unwrap();
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments[0].length, 0.0);
        assert!(segments[1].length > 0.0);
        assert_eq!(path.point_at(0.0), a);
    }

    #[test]
    fn test_path_deserializes_from_coordinate_list() {
        let json = r#"[{"lon":0.0,"lat":0.0},{"lon":1.0,"lat":0.0}]"#;
        let path: PathGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(path.vertices().len(), 2);

        let bad: Result<PathGeometry, _> = serde_json::from_str("[]");
        assert!(bad.is_err());
    }
}
