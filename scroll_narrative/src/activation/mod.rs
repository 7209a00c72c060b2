//! Activation Tracker - decides which story beat is live and drives the panel.
//!
//! Per resolved distance:
//! 1. **Active waypoint**: the first eligible waypoint whose dwell window
//!    contains the distance
//! 2. **Section**: whether the distance falls inside a merged section range
//! 3. **Cross-fade**: when the active waypoint changes, hide the panel and
//!    arm a swap timer; the last change before the timer fires wins

mod sections;
mod state;

pub use sections::*;
pub use state::*;

use journey_model::{ActivationConfig, Waypoint, WaypointId};
use serde::Serialize;
use std::time::Duration;
use tracing::trace;

use crate::timer::TimerSlot;

/// A content swap performed when the debounce timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentSwap {
    pub from: Option<WaypointId>,
    pub to: WaypointId,
}

/// Owns the mutable panel state for one mounted journey.
#[derive(Debug, Clone)]
pub struct ActivationTracker {
    /// Eligible waypoints in route order: (id, distance).
    eligible: Vec<(WaypointId, f64)>,
    sections: Vec<SectionRange>,
    dwell_window: f64,
    swap_delay: Duration,

    active_waypoint_id: Option<WaypointId>,
    section_visible: bool,
    current_section_name: Option<String>,
    panel: PanelState,
    swap_timer: TimerSlot<WaypointId>,
    /// Frame time of the last fired swap.
    swapped_at: Option<Duration>,
}

impl ActivationTracker {
    /// Create a tracker over waypoints sorted by distance.
    pub fn new(waypoints: &[Waypoint], dwell_window: f64, config: &ActivationConfig) -> Self {
        let eligible_waypoints = config.eligibility.eligible(waypoints);
        Self {
            eligible: eligible_waypoints
                .iter()
                .map(|w| (w.id, w.distance_along_path))
                .collect(),
            sections: build_section_ranges(eligible_waypoints, dwell_window),
            dwell_window,
            swap_delay: config.swap_delay(),
            active_waypoint_id: None,
            section_visible: false,
            current_section_name: None,
            panel: PanelState::default(),
            swap_timer: TimerSlot::new(),
            swapped_at: None,
        }
    }

    /// The first eligible waypoint whose closed dwell window contains `distance`.
    pub fn active_waypoint_at(&self, distance: f64) -> Option<WaypointId> {
        self.eligible
            .iter()
            .find(|(_, d)| (distance - d).abs() <= self.dwell_window)
            .map(|(id, _)| *id)
    }

    /// The section range containing `distance`, if any.
    pub fn section_at(&self, distance: f64) -> Option<&SectionRange> {
        self.sections.iter().find(|range| range.contains(distance))
    }

    /// Merged section ranges in route order.
    pub fn sections(&self) -> &[SectionRange] {
        &self.sections
    }

    /// Feed a newly resolved distance.
    pub fn update(&mut self, distance: f64, now: Duration) -> ActivationState {
        // Section header tracks the distance directly, independent of the fade.
        match self.section_at(distance).map(|r| r.section_name.clone()) {
            Some(name) => {
                self.section_visible = true;
                self.current_section_name = Some(name);
            }
            None => self.section_visible = false,
        }

        let active = self.active_waypoint_at(distance);
        let input = if active == self.active_waypoint_id {
            // Swapping stays visible for the whole frame the timer fired in.
            if self.swapped_at == Some(now) {
                return self.state();
            }
            CrossFadeInput::Settle
        } else {
            self.active_waypoint_id = active;
            CrossFadeInput::ActiveChanged(active)
        };
        self.apply(input, now);
        self.state()
    }

    /// Fire the swap timer if it is due.
    pub fn advance(&mut self, now: Duration) -> Option<ContentSwap> {
        let target = self.swap_timer.poll(now)?;
        let from = self.panel.displayed_waypoint_id;
        self.apply(CrossFadeInput::SwapTimerFired(target), now);
        self.swapped_at = Some(now);
        Some(ContentSwap { from, to: target })
    }

    /// Drop any pending swap, e.g. when the journey unmounts.
    pub fn cancel_pending(&mut self) {
        self.swap_timer.cancel();
    }

    /// Snapshot for the panel renderer.
    pub fn state(&self) -> ActivationState {
        ActivationState {
            active_waypoint_id: self.active_waypoint_id,
            displayed_waypoint_id: self.panel.displayed_waypoint_id,
            content_visible: self.panel.content_visible,
            section_visible: self.section_visible,
            current_section_name: self.current_section_name.clone(),
            phase: self.panel.phase,
            pending_swap: self.swap_timer.pending().map(|timer| PendingSwap {
                target: timer.payload,
                due_at: timer.due_at,
            }),
        }
    }

    fn apply(&mut self, input: CrossFadeInput, now: Duration) {
        let (next, command) = transition(&self.panel, input);
        if next != self.panel {
            trace!(from = ?self.panel.phase, to = ?next.phase, ?input, "cross-fade");
        }
        self.panel = next;
        match command {
            TimerCommand::Keep => {}
            TimerCommand::Cancel => {
                self.swap_timer.cancel();
            }
            TimerCommand::Arm(target) => {
                self.swap_timer.arm(now, self.swap_delay, target);
            }
        }
    }
}
