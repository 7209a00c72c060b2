//! Scroll Engine - the single entry point a host drives.
//!
//! The host reports scroll events as they arrive and runs one frame per
//! display refresh. Bursts of scroll events between frames collapse into the
//! latest offset, and each frame resolves position, panel state and
//! navigation in that order exactly once.
//!
//! A running jump-navigation is aborted as soon as a scroll event reports an
//! offset the animation did not write: the reader's own input always wins.

mod init;

pub use init::*;

use journey_model::{EngineConfig, JourneyError, NarrativePoint, PathGeometry, Waypoint};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::activation::{ActivationState, ActivationTracker, ContentSwap, CrossFadePhase};
use crate::indexer::{DroppedPoint, PathIndexer};
use crate::mapping::{PositionResolver, ResolvedPosition, ScrollMapping, ScrollMappingBuilder};
use crate::progress::{
    AnchorId, NavigationItem, NavigationPlan, ProgressError, ProgressIndex, ScrollMetrics,
    TrailingAnchor,
};

/// Whether the host must schedule a frame after reporting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameRequest {
    /// No frame is pending; schedule one.
    Schedule,
    /// A frame is already scheduled and will pick up the latest input.
    AlreadyPending,
}

/// Output of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedState {
    pub position: ResolvedPosition,
    pub panel: ActivationState,
    pub active_nav_index: Option<usize>,
    /// Offset the host must write to its scroller (navigation in progress).
    pub scroll_to: Option<f64>,
    /// Set on the frame where the panel content was replaced.
    pub content_swap: Option<ContentSwap>,
    /// An animation or swap timer is still running; keep frames coming.
    pub keep_animating: bool,
}

#[derive(Debug, Clone)]
struct ActiveNavigation {
    plan: NavigationPlan,
    last_written: f64,
}

/// One mounted journey.
#[derive(Debug)]
pub struct ScrollEngine {
    config: EngineConfig,
    path: PathGeometry,
    waypoints: Vec<Waypoint>,
    dropped: Vec<DroppedPoint>,
    mapping: ScrollMapping,
    tracker: ActivationTracker,
    progress: ProgressIndex,

    offset: f64,
    metrics: Option<ScrollMetrics>,
    pending_offset: Option<f64>,
    frame_pending: bool,
    navigation: Option<ActiveNavigation>,
}

impl ScrollEngine {
    /// Index the narrative onto the route and build every derived table.
    pub fn new(
        path: PathGeometry,
        points: &[NarrativePoint],
        trailing: &[TrailingAnchor],
        config: EngineConfig,
    ) -> Result<Self, JourneyError> {
        config.validate()?;

        let indexed = PathIndexer::new().index(points, &path);
        let mapping = ScrollMappingBuilder::from_config(&config.mapping)
            .build(&indexed.waypoints)?;
        let tracker = ActivationTracker::new(
            &indexed.waypoints,
            config.mapping.dwell_window,
            &config.activation,
        );
        let progress = ProgressIndex::build(
            &indexed.waypoints,
            &mapping,
            config.activation.eligibility,
            trailing,
            &config.navigation,
        );

        debug!(
            waypoints = indexed.waypoints.len(),
            total_px = mapping.total_pixel_range(),
            nav_items = progress.len(),
            "journey mounted"
        );

        Ok(Self {
            config,
            path,
            waypoints: indexed.waypoints,
            dropped: indexed.dropped,
            mapping,
            tracker,
            progress,
            offset: 0.0,
            metrics: None,
            pending_offset: None,
            frame_pending: false,
            navigation: None,
        })
    }

    /// Snapped waypoints, sorted by distance along the route.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Narrative points that could not be placed on the route.
    pub fn dropped(&self) -> &[DroppedPoint] {
        &self.dropped
    }

    /// The route this journey was mounted on.
    pub fn path(&self) -> &PathGeometry {
        &self.path
    }

    /// Scroll-to-distance table built at mount.
    pub fn mapping(&self) -> &ScrollMapping {
        &self.mapping
    }

    /// Height of the scroll track the host should lay out.
    pub fn total_pixel_range(&self) -> f64 {
        self.mapping.total_pixel_range()
    }

    /// Entries for the progress navigation, in display order.
    pub fn nav_items(&self) -> &[NavigationItem] {
        self.progress.items()
    }

    /// The jump animation currently running, if any.
    pub fn navigation(&self) -> Option<&NavigationPlan> {
        self.navigation.as_ref().map(|nav| &nav.plan)
    }

    /// Stateless position lookups over this journey.
    pub fn resolver(&self) -> PositionResolver<'_> {
        PositionResolver::new(&self.mapping, &self.path, &self.config.motion)
    }

    /// Report a scroll event. Only the latest offset per frame is kept.
    pub fn on_scroll(&mut self, offset: f64, metrics: Option<ScrollMetrics>) -> FrameRequest {
        if let Some(nav) = &self.navigation {
            let drift = (offset - nav.last_written).abs();
            if drift > self.config.navigation.abort_tolerance_px {
                debug!(
                    offset,
                    expected = nav.last_written,
                    target = nav.plan.target_index,
                    "navigation aborted by user scroll"
                );
                self.navigation = None;
            }
        }

        self.pending_offset = Some(offset);
        if metrics.is_some() {
            self.metrics = metrics;
        }
        self.request_frame()
    }

    /// Record a measured anchor position; the active entry may change.
    pub fn measure_anchor(&mut self, id: &AnchorId, pixel: f64) -> FrameRequest {
        self.progress.measure_anchor(id, pixel);
        self.request_frame()
    }

    /// Forget an anchor measurement after a reflow.
    pub fn clear_anchor(&mut self, id: &AnchorId) -> FrameRequest {
        self.progress.clear_anchor(id);
        self.request_frame()
    }

    /// Start an animated jump to navigation entry `index`.
    ///
    /// Replaces any navigation already running.
    pub fn navigate_to(
        &mut self,
        index: usize,
        now: Duration,
    ) -> Result<FrameRequest, ProgressError> {
        let from = self.pending_offset.unwrap_or(self.offset);
        let plan = self
            .progress
            .navigate(index, from, self.metrics.as_ref(), now)?;
        self.navigation = Some(ActiveNavigation {
            plan,
            last_written: from,
        });
        Ok(self.request_frame())
    }

    /// Run the frame: navigation step, then resolve, activation and progress.
    pub fn on_frame(&mut self, now: Duration) -> DerivedState {
        self.frame_pending = false;

        let mut scroll_to = None;
        let pending = self.pending_offset.take();
        if let Some(nav) = &mut self.navigation {
            let sample = nav.plan.sample(now);
            nav.last_written = sample.offset;
            scroll_to = Some(sample.offset);
            self.offset = sample.offset;
            if sample.finished {
                self.navigation = None;
            }
        } else if let Some(offset) = pending {
            self.offset = offset;
        }

        let content_swap = self.tracker.advance(now);
        let position = self.resolver().resolve(self.offset);
        let panel = self.tracker.update(position.distance, now);
        let active_nav_index = self.progress.active_index(self.offset, self.metrics.as_ref());

        // A swapping panel needs one more frame to settle.
        let keep_animating = self.navigation.is_some()
            || panel.pending_swap.is_some()
            || panel.phase == CrossFadePhase::Swapping;

        DerivedState {
            position,
            panel,
            active_nav_index,
            scroll_to,
            content_swap,
            keep_animating,
        }
    }

    /// Cancel timers and animations before the journey is discarded.
    pub fn unmount(&mut self) {
        self.tracker.cancel_pending();
        self.navigation = None;
        self.pending_offset = None;
        self.frame_pending = false;
    }

    fn request_frame(&mut self) -> FrameRequest {
        if self.frame_pending {
            FrameRequest::AlreadyPending
        } else {
            self.frame_pending = true;
            FrameRequest::Schedule
        }
    }
}
