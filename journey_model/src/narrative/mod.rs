//! Narrative points and the waypoints they become once placed on the route.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::geometry::Coordinate;

/// Unique identifier for waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(pub Uuid);

impl WaypointId {
    /// Create a new random waypoint ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a waypoint ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for WaypointId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A story beat as supplied by the data-loading stage, before snapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativePoint {
    /// Stable id from the source data; generated when absent.
    #[serde(default)]
    pub id: Option<WaypointId>,
    pub section_name: String,
    #[serde(default)]
    pub subsection_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub coordinate: Coordinate,

    /// Source fields the engine does not interpret, passed through to renderers.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl NarrativePoint {
    /// Create a narrative point in the given section.
    pub fn new(section_name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: None,
            section_name: section_name.into(),
            subsection_name: String::new(),
            text: String::new(),
            image_ref: None,
            coordinate,
            extra: HashMap::new(),
        }
    }

    /// Keep this id through indexing instead of generating one.
    pub fn with_id(mut self, id: WaypointId) -> Self {
        self.id = Some(id);
        self
    }

    /// Name the subsection; it becomes a navigation sub-item.
    pub fn with_subsection(mut self, name: impl Into<String>) -> Self {
        self.subsection_name = name.into();
        self
    }

    /// Set the panel body text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the panel image reference (URL or asset key).
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// A narrative point snapped onto the route.
///
/// Immutable once built; a journey's waypoints are kept sorted by
/// `distance_along_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub section_name: String,
    pub subsection_name: String,
    pub text: String,
    pub image_ref: Option<String>,
    /// The snapped position on the route.
    pub coordinate: Coordinate,
    /// Arc length from the route start (km).
    pub distance_along_path: f64,
}

impl Waypoint {
    /// Build a waypoint from its source point and snapping result.
    pub fn from_point(point: &NarrativePoint, coordinate: Coordinate, distance: f64) -> Self {
        Self {
            id: point.id.unwrap_or_default(),
            section_name: point.section_name.clone(),
            subsection_name: point.subsection_name.clone(),
            text: point.text.clone(),
            image_ref: point.image_ref.clone(),
            coordinate,
            distance_along_path: distance,
        }
    }

    /// Minimal waypoint placed directly at a distance, without a source point.
    pub fn at_distance(section_name: impl Into<String>, distance: f64) -> Self {
        Self {
            id: WaypointId::new(),
            section_name: section_name.into(),
            subsection_name: String::new(),
            text: String::new(),
            image_ref: None,
            coordinate: Coordinate::new(0.0, 0.0),
            distance_along_path: distance,
        }
    }

    /// Name the subsection; it becomes a navigation sub-item.
    pub fn with_subsection(mut self, name: impl Into<String>) -> Self {
        self.subsection_name = name.into();
        self
    }

    /// Whether a non-empty subsection name is set.
    pub fn has_subsection(&self) -> bool {
        !self.subsection_name.trim().is_empty()
    }
}

/// Which waypoints may become active or appear in navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// The first and last waypoints only mark the route ends.
    #[default]
    ExcludeEndpoints,
    /// Every waypoint participates.
    All,
}

impl EligibilityPolicy {
    /// The eligible sub-slice of an ordered waypoint set.
    pub fn eligible<'a>(&self, waypoints: &'a [Waypoint]) -> &'a [Waypoint] {
        match self {
            EligibilityPolicy::All => waypoints,
            EligibilityPolicy::ExcludeEndpoints if waypoints.len() > 2 => {
                &waypoints[1..waypoints.len() - 1]
            }
            EligibilityPolicy::ExcludeEndpoints => &[],
        }
    }
}
