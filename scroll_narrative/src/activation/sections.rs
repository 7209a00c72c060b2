//! Section ranges: merged dwell zones of consecutive same-section waypoints.

use journey_model::Waypoint;
use serde::Serialize;

/// A distance interval during which a section header is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRange {
    pub section_name: String,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl SectionRange {
    /// Closed-interval containment.
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }
}

/// Merge runs of consecutive waypoints sharing a section name.
///
/// Only adjacent waypoints merge, so a section revisited later in the
/// journey produces a second range.
pub fn build_section_ranges(eligible: &[Waypoint], dwell_window: f64) -> Vec<SectionRange> {
    let mut ranges: Vec<SectionRange> = Vec::new();
    for waypoint in eligible {
        let d = waypoint.distance_along_path;
        match ranges.last_mut() {
            Some(current) if current.section_name == waypoint.section_name => {
                current.max_distance = d + dwell_window;
            }
            _ => ranges.push(SectionRange {
                section_name: waypoint.section_name.clone(),
                min_distance: d - dwell_window,
                max_distance: d + dwell_window,
            }),
        }
    }
    ranges
}
