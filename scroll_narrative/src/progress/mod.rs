//! Progress Index - the navigable list of sections, sub-items and anchors.
//!
//! Narrative entries are positioned through the scroll mapping. Trailing
//! entries (credits, galleries, anything laid out after the journey) are
//! positioned by the host once it has measured them; until then they are
//! unreachable and can never become active.

mod navigation;

pub use navigation::*;

use journey_model::{EligibilityPolicy, NavigationConfig, Waypoint, WaypointId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::mapping::ScrollMapping;

/// Identifier of an externally measured page region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub String);

impl AnchorId {
    /// Anchor id from the host's element name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavItemId {
    Section(String),
    Waypoint(WaypointId),
    Anchor(AnchorId),
}

/// Where an entry sits on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemAnchor {
    /// Derived from the scroll mapping.
    Mapped { pixel: f64 },
    /// Supplied by layout measurement.
    External(AnchorId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationItem {
    pub id: NavItemId,
    pub label: String,
    pub is_header: bool,
    pub parent_id: Option<NavItemId>,
    pub anchor: ItemAnchor,
}

/// A trailing entry the host appends after the narrative ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingAnchor {
    pub id: AnchorId,
    pub label: String,
    #[serde(default = "default_true")]
    pub is_header: bool,
}

fn default_true() -> bool {
    true
}

impl TrailingAnchor {
    /// A header entry bound to anchor `id`.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: AnchorId::new(id),
            label: label.into(),
            is_header: true,
        }
    }
}

/// Scroller geometry reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// The scroller cannot move further down.
    pub fn at_bottom(&self, tolerance: f64) -> bool {
        self.scroll_height > 0.0
            && self.scroll_top + self.client_height >= self.scroll_height - tolerance
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("no navigation item at index {0}")]
    UnknownItem(usize),
    #[error("anchor `{0}` has not been measured yet")]
    AnchorUnmeasured(AnchorId),
}

/// Navigation entries plus the live anchor measurements.
#[derive(Debug, Clone)]
pub struct ProgressIndex {
    items: Vec<NavigationItem>,
    anchor_positions: HashMap<AnchorId, f64>,
    config: NavigationConfig,
}

impl ProgressIndex {
    /// Build the entry list.
    ///
    /// Order: for each eligible waypoint in route order, a header on the
    /// first occurrence of its section, then a sub-item if it names a
    /// subsection; trailing anchors last.
    pub fn build(
        waypoints: &[Waypoint],
        mapping: &ScrollMapping,
        policy: EligibilityPolicy,
        trailing: &[TrailingAnchor],
        config: &NavigationConfig,
    ) -> Self {
        let mut items = Vec::new();
        let mut seen_sections: HashMap<&str, NavItemId> = HashMap::new();

        for waypoint in policy.eligible(waypoints) {
            let pixel = mapping.pixel_for_distance(waypoint.distance_along_path);
            let header_id = seen_sections
                .entry(waypoint.section_name.as_str())
                .or_insert_with(|| {
                    let id = NavItemId::Section(waypoint.section_name.clone());
                    items.push(NavigationItem {
                        id: id.clone(),
                        label: waypoint.section_name.clone(),
                        is_header: true,
                        parent_id: None,
                        anchor: ItemAnchor::Mapped { pixel },
                    });
                    id
                })
                .clone();

            if waypoint.has_subsection() {
                items.push(NavigationItem {
                    id: NavItemId::Waypoint(waypoint.id),
                    label: waypoint.subsection_name.clone(),
                    is_header: false,
                    parent_id: Some(header_id),
                    anchor: ItemAnchor::Mapped { pixel },
                });
            }
        }

        for anchor in trailing {
            items.push(NavigationItem {
                id: NavItemId::Anchor(anchor.id.clone()),
                label: anchor.label.clone(),
                is_header: anchor.is_header,
                parent_id: None,
                anchor: ItemAnchor::External(anchor.id.clone()),
            });
        }

        debug!(items = items.len(), trailing = trailing.len(), "built progress index");
        Self {
            items,
            anchor_positions: HashMap::new(),
            config: config.clone(),
        }
    }

    /// All entries in display order.
    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// Number of entries, trailing anchors included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record the measured offset of an anchor-bound entry.
    ///
    /// Returns false when no entry uses this anchor.
    pub fn measure_anchor(&mut self, id: &AnchorId, pixel: f64) -> bool {
        let known = self
            .items
            .iter()
            .any(|item| item.anchor == ItemAnchor::External(id.clone()));
        if known && pixel.is_finite() {
            self.anchor_positions.insert(id.clone(), pixel);
            true
        } else {
            false
        }
    }

    /// Forget a measurement, e.g. after the host's layout reflows.
    pub fn clear_anchor(&mut self, id: &AnchorId) {
        self.anchor_positions.remove(id);
    }

    /// Position used for activation; unmeasured anchors are at infinity.
    pub fn effective_position(&self, index: usize) -> Option<f64> {
        self.items.get(index).map(|item| match &item.anchor {
            ItemAnchor::Mapped { pixel } => *pixel,
            ItemAnchor::External(id) => self
                .anchor_positions
                .get(id)
                .copied()
                .unwrap_or(f64::INFINITY),
        })
    }

    /// Offset to scroll to for an entry.
    pub fn offset_for_item(&self, index: usize) -> Result<f64, ProgressError> {
        let item = self
            .items
            .get(index)
            .ok_or(ProgressError::UnknownItem(index))?;
        match &item.anchor {
            ItemAnchor::Mapped { pixel } => Ok(*pixel),
            ItemAnchor::External(id) => self
                .anchor_positions
                .get(id)
                .copied()
                .ok_or_else(|| ProgressError::AnchorUnmeasured(id.clone())),
        }
    }

    /// The entry the reader is currently at.
    ///
    /// The last entry whose position is at most `offset + epsilon`; when the
    /// scroller reports it is at the bottom, the final entry regardless.
    pub fn active_index(&self, offset: f64, metrics: Option<&ScrollMetrics>) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        if metrics.is_some_and(|m| m.at_bottom(self.config.bottom_tolerance_px)) {
            return Some(self.items.len() - 1);
        }

        let reach = offset + self.config.epsilon_px;
        (0..self.items.len())
            .filter(|&i| self.effective_position(i).is_some_and(|p| p <= reach))
            .last()
    }

    /// Plan an animated jump to entry `target`.
    pub fn navigate(
        &self,
        target: usize,
        current_offset: f64,
        metrics: Option<&ScrollMetrics>,
        now: Duration,
    ) -> Result<NavigationPlan, ProgressError> {
        let to_offset = self.offset_for_item(target)?;
        let current = self.active_index(current_offset, metrics).unwrap_or(0);
        let index_distance = target.abs_diff(current);
        let duration = self.config.timing.duration_for(index_distance);

        debug!(
            target,
            current,
            from = current_offset,
            to = to_offset,
            duration_ms = duration.as_millis() as u64,
            "navigation planned"
        );
        Ok(NavigationPlan {
            target_index: target,
            from_offset: current_offset,
            to_offset,
            started_at: now,
            duration,
            index_distance,
        })
    }
}
