//! Timed jump-navigation between progress entries.

use serde::Serialize;
use std::time::Duration;

/// Ease-out cubic: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// A scroll animation from one offset to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationPlan {
    pub target_index: usize,
    pub from_offset: f64,
    pub to_offset: f64,
    pub started_at: Duration,
    pub duration: Duration,
    /// Number of entries between the current and target items.
    pub index_distance: usize,
}

/// One frame of a running navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationSample {
    pub offset: f64,
    pub finished: bool,
}

impl NavigationPlan {
    /// Scroll offset the host should write at `now`.
    pub fn sample(&self, now: Duration) -> NavigationSample {
        let elapsed = now.saturating_sub(self.started_at);
        if self.duration.is_zero() || elapsed >= self.duration {
            return NavigationSample {
                offset: self.to_offset,
                finished: true,
            };
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        NavigationSample {
            offset: self.from_offset + (self.to_offset - self.from_offset) * ease_out_cubic(t),
            finished: false,
        }
    }

    /// Frame time at which the animation lands on its target.
    pub fn ends_at(&self) -> Duration {
        self.started_at.saturating_add(self.duration)
    }
}
