//! Position resolution: scroll offset -> distance -> coordinate and heading.

use journey_model::{Coordinate, MotionConfig, PathGeometry};
use serde::Serialize;

use super::ScrollMapping;

/// Where the journey is at one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPosition {
    /// The offset after clamping to the mapping's range.
    pub offset: f64,
    pub distance: f64,
    pub coordinate: Coordinate,
    /// Degrees clockwise from north, `[0, 360)`.
    pub heading: f64,
}

/// Pure queries over an immutable mapping and route.
#[derive(Debug, Clone, Copy)]
pub struct PositionResolver<'a> {
    mapping: &'a ScrollMapping,
    path: &'a PathGeometry,
    heading_window: f64,
}

impl<'a> PositionResolver<'a> {
    /// Resolver over one journey's mapping and route.
    pub fn new(mapping: &'a ScrollMapping, path: &'a PathGeometry, config: &MotionConfig) -> Self {
        Self {
            mapping,
            path,
            heading_window: config.heading_window,
        }
    }

    /// Route distance for a scroll offset.
    pub fn distance_for_offset(&self, px: f64) -> f64 {
        self.mapping.distance_for_offset(px)
    }

    /// Point on the route at `distance` km, clamped to its ends.
    pub fn coordinate_for_distance(&self, distance: f64) -> Coordinate {
        self.path.point_at(distance)
    }

    /// Bearing of the route around `distance`.
    ///
    /// Sampled across a window of `heading_window` km centred on `distance`.
    /// Near either end the window slides inward instead of shrinking, so the
    /// heading changes continuously all the way to the endpoints.
    pub fn heading_at_distance(&self, distance: f64) -> f64 {
        let length = self.path.total_length();
        if length <= 0.0 {
            return 0.0;
        }

        let width = self.heading_window.min(length);
        let half = width / 2.0;
        let d = if distance.is_nan() {
            0.0
        } else {
            distance.clamp(0.0, length)
        };

        let (from, to) = if d - half < 0.0 {
            (0.0, width)
        } else if d + half > length {
            (length - width, length)
        } else {
            (d - half, d + half)
        };

        let a = self.path.point_at(from);
        let b = self.path.point_at(to);
        if a == b {
            return 0.0;
        }
        a.bearing_to(&b)
    }

    /// Resolve everything the map viewport needs for one offset.
    pub fn resolve(&self, offset: f64) -> ResolvedPosition {
        let offset = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.mapping.total_pixel_range())
        };
        let distance = self.distance_for_offset(offset);
        ResolvedPosition {
            offset,
            distance,
            coordinate: self.coordinate_for_distance(distance),
            heading: self.heading_at_distance(distance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ScrollMappingBuilder;
    use journey_model::Waypoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// East along the equator for one degree, then north for one degree.
    fn l_route() -> PathGeometry {
        PathGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ])
        .unwrap()
    }

    fn mapping_for(path: &PathGeometry) -> ScrollMapping {
        let waypoints = vec![
            Waypoint::at_distance("Start", 0.0),
            Waypoint::at_distance("End", path.total_length()),
        ];
        ScrollMappingBuilder::new(10.0, 5.0, 2.0)
            .build(&waypoints)
            .unwrap()
    }

    #[test]
    fn test_heading_follows_each_leg() {
        let path = l_route();
        let mapping = mapping_for(&path);
        let resolver = PositionResolver::new(&mapping, &path, &MotionConfig::default());
        let leg = path.total_length() / 2.0;

        assert_close(resolver.heading_at_distance(leg / 2.0), 90.0, 1e-6);
        assert_close(resolver.heading_at_distance(leg * 1.5), 0.0, 1e-6);
    }

    #[test]
    fn test_heading_continuous_at_endpoints() {
        let path = l_route();
        let mapping = mapping_for(&path);
        let resolver = PositionResolver::new(&mapping, &path, &MotionConfig::default());
        let len = path.total_length();

        let at_start = resolver.heading_at_distance(0.0);
        let near_start = resolver.heading_at_distance(0.1);
        assert_close(at_start, near_start, 1e-6);
        assert_close(at_start, 90.0, 1e-6);

        let at_end = resolver.heading_at_distance(len);
        let near_end = resolver.heading_at_distance(len - 0.1);
        assert_close(at_end, near_end, 1e-6);
        assert_close(resolver.heading_at_distance(len + 50.0), at_end, 1e-12);
    }

    #[test]
    fn test_resolve_chains_offset_to_coordinate() {
        let path = l_route();
        let mapping = mapping_for(&path);
        let resolver = PositionResolver::new(&mapping, &path, &MotionConfig::default());

        let start = resolver.resolve(0.0);
        assert_eq!(start.distance, 0.0);
        assert_eq!(start.coordinate, path.start());

        let end = resolver.resolve(mapping.total_pixel_range() + 100.0);
        assert_eq!(end.offset, mapping.total_pixel_range());
        assert_close(end.distance, path.total_length(), 1e-9);
        assert_close(end.coordinate.lat, 1.0, 1e-9);

        let mid_px = mapping.pixel_for_distance(path.total_length() / 2.0);
        let mid = resolver.resolve(mid_px);
        assert_close(mid.coordinate.lon, 1.0, 1e-6);
        assert_close(mid.coordinate.lat, 0.0, 1e-6);
    }

    #[test]
    fn test_degenerate_path_and_mapping() {
        let only = Coordinate::new(7.0, 45.0);
        let path = PathGeometry::new(vec![only]).unwrap();
        let mapping = ScrollMapping::trivial(0.0);
        let resolver = PositionResolver::new(&mapping, &path, &MotionConfig::default());

        let resolved = resolver.resolve(999.0);
        assert_eq!(resolved.offset, 0.0);
        assert_eq!(resolved.distance, 0.0);
        assert_eq!(resolved.coordinate, only);
        assert_eq!(resolved.heading, 0.0);
    }

    #[test]
    fn test_resolve_is_pure() {
        let path = l_route();
        let mapping = mapping_for(&path);
        let resolver = PositionResolver::new(&mapping, &path, &MotionConfig::default());
        assert_eq!(resolver.resolve(1234.5), resolver.resolve(1234.5));
    }
}
