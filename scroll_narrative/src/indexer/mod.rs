//! Path Indexer - places narrative points on the route.
//!
//! Each point is projected onto every segment of the route and the nearest
//! projection wins. The result is measured as arc length from the route
//! start, which is the coordinate every other component works in.

use journey_model::{Coordinate, NarrativePoint, PathGeometry, Segment, Waypoint, WaypointId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single narrative point could not be placed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexError {
    #[error("coordinate ({lon}, {lat}) is not finite")]
    NonFiniteCoordinate { lon: f64, lat: f64 },
    #[error("projection onto the route produced no finite distance")]
    Unprojectable,
    #[error("waypoint id {0} is already used by an earlier point")]
    DuplicateId(WaypointId),
}

/// Result of snapping one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub coordinate: Coordinate,
    /// Arc length from the route start (km).
    pub distance_along_path: f64,
    /// Great-circle distance from the source point to `coordinate` (km).
    pub offset_km: f64,
    pub segment_index: usize,
}

/// A point that was left out of the journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedPoint {
    /// Position in the input list.
    pub input_index: usize,
    pub section_name: String,
    pub reason: IndexError,
}

/// Waypoints ready for the rest of the engine.
#[derive(Debug, Clone, Default)]
pub struct IndexedJourney {
    /// Sorted ascending by `distance_along_path`.
    pub waypoints: Vec<Waypoint>,
    pub dropped: Vec<DroppedPoint>,
}

/// Snaps narrative points onto a route.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathIndexer;

impl PathIndexer {
    /// Indexer with the default projection settings.
    pub fn new() -> Self {
        Self
    }

    /// Project `point` onto the nearest location of `path`.
    ///
    /// Ties between equally distant segments go to the earliest segment.
    pub fn snap(&self, point: Coordinate, path: &PathGeometry) -> Result<Snap, IndexError> {
        if !point.is_finite() {
            return Err(IndexError::NonFiniteCoordinate {
                lon: point.lon,
                lat: point.lat,
            });
        }

        let mut best: Option<Snap> = None;
        for segment in path.segments() {
            let candidate = project_onto_segment(point, &segment);
            if !candidate.offset_km.is_finite() {
                continue;
            }
            // strict comparison keeps the earliest segment on ties
            if best.map_or(true, |b| candidate.offset_km < b.offset_km) {
                best = Some(candidate);
            }
        }

        match best {
            Some(snap) if snap.distance_along_path.is_finite() => Ok(snap),
            Some(_) => Err(IndexError::Unprojectable),
            // Single-vertex route: everything lands on that vertex.
            None if path.segment_count() == 0 => Ok(Snap {
                coordinate: path.start(),
                distance_along_path: 0.0,
                offset_km: point.distance_km(&path.start()),
                segment_index: 0,
            }),
            None => Err(IndexError::Unprojectable),
        }
    }

    /// Snap every point and return the valid subset ordered along the route.
    ///
    /// Points that cannot be placed are dropped with a warning; they never
    /// abort the journey.
    pub fn index(&self, points: &[NarrativePoint], path: &PathGeometry) -> IndexedJourney {
        let mut journey = IndexedJourney::default();
        let mut seen_ids = HashSet::new();

        for (input_index, point) in points.iter().enumerate() {
            let placed = self.snap(point.coordinate, path).and_then(|snap| {
                let waypoint =
                    Waypoint::from_point(point, snap.coordinate, snap.distance_along_path);
                if seen_ids.insert(waypoint.id) {
                    Ok(waypoint)
                } else {
                    Err(IndexError::DuplicateId(waypoint.id))
                }
            });

            match placed {
                Ok(waypoint) => journey.waypoints.push(waypoint),
                Err(reason) => {
                    warn!(
                        input_index,
                        section = %point.section_name,
                        %reason,
                        "dropping narrative point"
                    );
                    journey.dropped.push(DroppedPoint {
                        input_index,
                        section_name: point.section_name.clone(),
                        reason,
                    });
                }
            }
        }

        journey
            .waypoints
            .sort_by(|a, b| a.distance_along_path.total_cmp(&b.distance_along_path));

        debug!(
            placed = journey.waypoints.len(),
            dropped = journey.dropped.len(),
            route_km = path.total_length(),
            "indexed narrative points"
        );
        journey
    }
}

/// Perpendicular projection clamped to the segment.
///
/// The projection parameter is computed in a local equirectangular plane
/// around the segment; the resulting point is measured with great-circle
/// distance.
fn project_onto_segment(point: Coordinate, segment: &Segment) -> Snap {
    let mid_lat = ((segment.start.lat + segment.end.lat) / 2.0).to_radians();
    let kx = mid_lat.cos();

    let abx = (segment.end.lon - segment.start.lon) * kx;
    let aby = segment.end.lat - segment.start.lat;
    let apx = (point.lon - segment.start.lon) * kx;
    let apy = point.lat - segment.start.lat;

    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let coordinate = segment.start.lerp(&segment.end, t);
    Snap {
        coordinate,
        distance_along_path: segment.start_distance + t * segment.length,
        offset_km: point.distance_km(&coordinate),
        segment_index: segment.index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// An L-shaped route: east along the equator, then north.
    fn l_route() -> PathGeometry {
        PathGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_snap_projects_perpendicular() {
        let path = l_route();
        let snap = PathIndexer::new()
            .snap(Coordinate::new(0.25, 0.1), &path)
            .unwrap();

        assert_eq!(snap.segment_index, 0);
        assert_close(snap.coordinate.lon, 0.25, 1e-9);
        assert_close(snap.coordinate.lat, 0.0, 1e-9);
        let expected = Coordinate::new(0.0, 0.0).distance_km(&Coordinate::new(0.25, 0.0));
        assert_close(snap.distance_along_path, expected, 1e-6);
    }

    #[test]
    fn test_snap_second_segment_adds_prior_length() {
        let path = l_route();
        let snap = PathIndexer::new()
            .snap(Coordinate::new(1.2, 0.5), &path)
            .unwrap();

        assert_eq!(snap.segment_index, 1);
        let first_leg = path.segments().next().unwrap().length;
        assert!(snap.distance_along_path > first_leg);
        assert_close(snap.coordinate.lon, 1.0, 1e-9);
        assert_close(snap.coordinate.lat, 0.5, 1e-9);
    }

    #[test]
    fn test_snap_clamps_to_endpoints() {
        let path = l_route();
        let indexer = PathIndexer::new();

        let before = indexer.snap(Coordinate::new(-0.5, -0.2), &path).unwrap();
        assert_eq!(before.coordinate, path.start());
        assert_eq!(before.distance_along_path, 0.0);

        let after = indexer.snap(Coordinate::new(1.0, 2.0), &path).unwrap();
        assert_eq!(after.coordinate, path.end());
        assert_close(after.distance_along_path, path.total_length(), 1e-9);
    }

    #[test]
    fn test_snap_tie_prefers_earliest_segment() {
        // The corner vertex is equidistant from both legs.
        let path = l_route();
        let snap = PathIndexer::new()
            .snap(Coordinate::new(1.0, 0.0), &path)
            .unwrap();
        assert_eq!(snap.segment_index, 0);
    }

    #[test]
    fn test_snap_on_single_vertex_route() {
        let only = Coordinate::new(3.0, 3.0);
        let path = PathGeometry::new(vec![only]).unwrap();
        let snap = PathIndexer::new()
            .snap(Coordinate::new(4.0, 3.0), &path)
            .unwrap();
        assert_eq!(snap.coordinate, only);
        assert_eq!(snap.distance_along_path, 0.0);
    }

    #[test]
    fn test_index_sorts_by_distance() {
        let path = l_route();
        let points = vec![
            NarrativePoint::new("North", Coordinate::new(1.1, 0.8)),
            NarrativePoint::new("Start", Coordinate::new(0.0, 0.0)),
            NarrativePoint::new("Corner", Coordinate::new(0.9, 0.05)),
        ];

        let journey = PathIndexer::new().index(&points, &path);
        let sections: Vec<_> = journey
            .waypoints
            .iter()
            .map(|w| w.section_name.as_str())
            .collect();
        assert_eq!(sections, ["Start", "Corner", "North"]);
        assert!(journey.dropped.is_empty());
        assert!(journey
            .waypoints
            .windows(2)
            .all(|w| w[0].distance_along_path <= w[1].distance_along_path));
    }

    #[traced_test]
    #[test]
    fn test_index_drops_non_finite_points_with_warning() {
        let path = l_route();
        let points = vec![
            NarrativePoint::new("Good", Coordinate::new(0.5, 0.0)),
            NarrativePoint::new("Broken", Coordinate::new(f64::NAN, 0.0)),
        ];

        let journey = PathIndexer::new().index(&points, &path);
        assert_eq!(journey.waypoints.len(), 1);
        assert_eq!(journey.dropped.len(), 1);
        assert_eq!(journey.dropped[0].input_index, 1);
        assert!(matches!(
            journey.dropped[0].reason,
            IndexError::NonFiniteCoordinate { .. }
        ));
        assert!(logs_contain("dropping narrative point"));
    }

    #[test]
    fn test_index_drops_duplicate_ids() {
        let path = l_route();
        let id = WaypointId::new();
        let points = vec![
            NarrativePoint::new("A", Coordinate::new(0.2, 0.0)).with_id(id),
            NarrativePoint::new("B", Coordinate::new(0.6, 0.0)).with_id(id),
        ];

        let journey = PathIndexer::new().index(&points, &path);
        assert_eq!(journey.waypoints.len(), 1);
        assert_eq!(journey.waypoints[0].section_name, "A");
        assert_eq!(journey.dropped[0].reason, IndexError::DuplicateId(id));
    }
}
