//! Panel state and the cross-fade transition function.

use journey_model::WaypointId;
use serde::Serialize;
use std::time::Duration;

/// Where the narrative panel is in its hide / swap / show cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CrossFadePhase {
    /// No waypoint is active; content is hidden.
    #[default]
    Hidden,
    /// Old content is fading out while a swap is pending.
    FadingOut,
    /// The displayed waypoint was just replaced and is fading in.
    Swapping,
    /// The displayed waypoint is the active one and fully shown.
    Visible,
}

/// The content half of the panel, driven only by [`transition`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PanelState {
    pub displayed_waypoint_id: Option<WaypointId>,
    pub content_visible: bool,
    pub phase: CrossFadePhase,
}

/// Events that move the cross-fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossFadeInput {
    /// The active waypoint differs from the previous resolve.
    ActiveChanged(Option<WaypointId>),
    /// The pending swap timer elapsed.
    SwapTimerFired(WaypointId),
    /// A resolve found the active waypoint unchanged.
    Settle,
}

/// What the owner must do with its swap timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Keep,
    Cancel,
    /// Cancel any pending swap, then arm one for this waypoint.
    Arm(WaypointId),
}

/// Pure cross-fade step.
pub fn transition(panel: &PanelState, input: CrossFadeInput) -> (PanelState, TimerCommand) {
    let mut next = panel.clone();
    let command = match input {
        CrossFadeInput::ActiveChanged(Some(id)) if panel.displayed_waypoint_id == Some(id) => {
            next.content_visible = true;
            next.phase = CrossFadePhase::Visible;
            TimerCommand::Cancel
        }
        CrossFadeInput::ActiveChanged(Some(id)) => {
            next.content_visible = false;
            next.phase = CrossFadePhase::FadingOut;
            TimerCommand::Arm(id)
        }
        CrossFadeInput::ActiveChanged(None) => {
            // displayed content stays so the fade-out shows the last beat
            next.content_visible = false;
            next.phase = CrossFadePhase::Hidden;
            TimerCommand::Cancel
        }
        CrossFadeInput::SwapTimerFired(id) => {
            next.displayed_waypoint_id = Some(id);
            next.content_visible = true;
            next.phase = CrossFadePhase::Swapping;
            TimerCommand::Keep
        }
        CrossFadeInput::Settle => {
            if next.phase == CrossFadePhase::Swapping {
                next.phase = CrossFadePhase::Visible;
            }
            TimerCommand::Keep
        }
    };
    (next, command)
}

/// A swap waiting for its timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingSwap {
    pub target: WaypointId,
    pub due_at: Duration,
}

/// Everything the narrative panel renderer needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActivationState {
    pub active_waypoint_id: Option<WaypointId>,
    pub displayed_waypoint_id: Option<WaypointId>,
    pub content_visible: bool,
    pub section_visible: bool,
    pub current_section_name: Option<String>,
    pub phase: CrossFadePhase,
    pub pending_swap: Option<PendingSwap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(id: WaypointId) -> PanelState {
        PanelState {
            displayed_waypoint_id: Some(id),
            content_visible: true,
            phase: CrossFadePhase::Visible,
        }
    }

    #[test]
    fn test_change_to_new_waypoint_fades_out_and_arms() {
        let a = WaypointId::new();
        let b = WaypointId::new();
        let (next, cmd) = transition(&shown(a), CrossFadeInput::ActiveChanged(Some(b)));

        assert!(!next.content_visible);
        assert_eq!(next.phase, CrossFadePhase::FadingOut);
        assert_eq!(next.displayed_waypoint_id, Some(a));
        assert_eq!(cmd, TimerCommand::Arm(b));
    }

    #[test]
    fn test_return_to_displayed_cancels() {
        let a = WaypointId::new();
        let mut fading = shown(a);
        fading.content_visible = false;
        fading.phase = CrossFadePhase::FadingOut;

        let (next, cmd) = transition(&fading, CrossFadeInput::ActiveChanged(Some(a)));
        assert!(next.content_visible);
        assert_eq!(next.phase, CrossFadePhase::Visible);
        assert_eq!(cmd, TimerCommand::Cancel);
    }

    #[test]
    fn test_leaving_all_zones_hides_but_keeps_content() {
        let a = WaypointId::new();
        let (next, cmd) = transition(&shown(a), CrossFadeInput::ActiveChanged(None));
        assert!(!next.content_visible);
        assert_eq!(next.phase, CrossFadePhase::Hidden);
        assert_eq!(next.displayed_waypoint_id, Some(a));
        assert_eq!(cmd, TimerCommand::Cancel);
    }

    #[test]
    fn test_timer_fire_swaps_then_settles() {
        let a = WaypointId::new();
        let b = WaypointId::new();
        let (swapped, cmd) = transition(&shown(a), CrossFadeInput::SwapTimerFired(b));
        assert_eq!(swapped.displayed_waypoint_id, Some(b));
        assert!(swapped.content_visible);
        assert_eq!(swapped.phase, CrossFadePhase::Swapping);
        assert_eq!(cmd, TimerCommand::Keep);

        let (settled, _) = transition(&swapped, CrossFadeInput::Settle);
        assert_eq!(settled.phase, CrossFadePhase::Visible);
    }

    #[test]
    fn test_settle_leaves_other_phases_alone() {
        let hidden = PanelState::default();
        let (next, cmd) = transition(&hidden, CrossFadeInput::Settle);
        assert_eq!(next, hidden);
        assert_eq!(cmd, TimerCommand::Keep);
    }
}
