//! Scroll Mapping - the table relating scroll pixels to route distance.
//!
//! Scrolling through a dwell zone costs more pixels per kilometer than
//! travelling between waypoints, so every story beat gets the same amount
//! of scroll regardless of how far apart the beats are on the map.
//!
//! The table is sampled at a fixed distance step:
//! 1. **Span**: from the first to the last waypoint's distance
//! 2. **Classify**: a step is "dwelling" if its midpoint is within the dwell
//!    window of any waypoint
//! 3. **Cost**: `step_length * base_rate * (dwell_factor or 1)`
//! 4. **Tail**: a fixed pixel run past the last sample so the final waypoint
//!    is not pinned to the very end of the page

mod resolver;

pub use resolver::*;

use journey_model::{JourneyError, MappingConfig, Waypoint};
use serde::Serialize;
use tracing::debug;

/// Parallel distance / pixel samples plus the total scrollable range.
///
/// `distance_samples` is strictly increasing and `cumulative_pixels` is
/// non-decreasing; both have the same, non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollMapping {
    distance_samples: Vec<f64>,
    cumulative_pixels: Vec<f64>,
    total_pixel_range: f64,
}

impl ScrollMapping {
    /// A mapping that resolves every offset to `distance`.
    pub fn trivial(distance: f64) -> Self {
        Self {
            distance_samples: vec![distance],
            cumulative_pixels: vec![0.0],
            total_pixel_range: 0.0,
        }
    }

    /// Sampled distances, strictly increasing.
    pub fn distance_samples(&self) -> &[f64] {
        &self.distance_samples
    }

    /// Pixel offset reached at each distance sample.
    pub fn cumulative_pixels(&self) -> &[f64] {
        &self.cumulative_pixels
    }

    /// Total scrollable pixels, tail included.
    pub fn total_pixel_range(&self) -> f64 {
        self.total_pixel_range
    }

    /// Only one sample: every query resolves to the start.
    pub fn is_degenerate(&self) -> bool {
        self.distance_samples.len() <= 1
    }

    /// Distance at offset zero.
    pub fn first_distance(&self) -> f64 {
        self.distance_samples[0]
    }

    /// Distance at the end of the table, before the tail.
    pub fn last_distance(&self) -> f64 {
        self.distance_samples[self.distance_samples.len() - 1]
    }

    /// Route distance at scroll offset `px`.
    ///
    /// Offsets are clamped to `[0, total_pixel_range]`; offsets inside the
    /// tail resolve to the last sampled distance.
    pub fn distance_for_offset(&self, px: f64) -> f64 {
        if self.is_degenerate() {
            return self.first_distance();
        }
        let px = if px.is_nan() {
            0.0
        } else {
            px.clamp(0.0, self.total_pixel_range)
        };
        interpolate(&self.cumulative_pixels, &self.distance_samples, px)
    }

    /// Scroll offset at which the route reaches `distance`.
    pub fn pixel_for_distance(&self, distance: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let d = if distance.is_nan() {
            self.first_distance()
        } else {
            distance.clamp(self.first_distance(), self.last_distance())
        };
        interpolate(&self.distance_samples, &self.cumulative_pixels, d)
    }
}

/// Look `x` up in the sorted `xs` and linearly interpolate the matching `ys`.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let upper = xs.partition_point(|&v| v < x);
    if upper == 0 {
        return ys[0];
    }
    if upper >= xs.len() {
        return ys[ys.len() - 1];
    }
    let lower = upper - 1;
    let span = xs[upper] - xs[lower];
    if span <= 0.0 {
        return ys[upper];
    }
    let t = (x - xs[lower]) / span;
    ys[lower] + (ys[upper] - ys[lower]) * t
}

/// Upper bound on samples in one table.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Builds [`ScrollMapping`] tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollMappingBuilder {
    pub base_rate: f64,
    pub dwell_window: f64,
    pub dwell_factor: f64,
    pub step: f64,
    pub tail_units: f64,
}

impl Default for ScrollMappingBuilder {
    fn default() -> Self {
        Self::from_config(&MappingConfig::default())
    }
}

impl ScrollMappingBuilder {
    /// Builder with the given rates and the default step and tail.
    pub fn new(base_rate: f64, dwell_window: f64, dwell_factor: f64) -> Self {
        Self {
            base_rate,
            dwell_window,
            dwell_factor,
            ..Self::default()
        }
    }

    /// Builder carrying every parameter of `config`.
    pub fn from_config(config: &MappingConfig) -> Self {
        Self {
            base_rate: config.base_rate,
            dwell_window: config.dwell_window,
            dwell_factor: config.dwell_factor,
            step: config.step,
            tail_units: config.tail_units,
        }
    }

    /// Sampling step in kilometers.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Scroll past the last waypoint, in kilometers at base rate.
    pub fn with_tail_units(mut self, tail_units: f64) -> Self {
        self.tail_units = tail_units;
        self
    }

    /// Pixels for the run past the last sample.
    pub fn tail_pixels(&self) -> f64 {
        self.tail_units * self.base_rate
    }

    /// The parameters as a config section.
    pub fn to_config(&self) -> MappingConfig {
        MappingConfig {
            base_rate: self.base_rate,
            dwell_window: self.dwell_window,
            dwell_factor: self.dwell_factor,
            step: self.step,
            tail_units: self.tail_units,
        }
    }

    /// Build the table for waypoints sorted by distance.
    ///
    /// Fails when a parameter could make the table shrink or when the step
    /// is too fine for the span (more than [`MAX_SAMPLES`] samples).
    pub fn build(&self, waypoints: &[Waypoint]) -> Result<ScrollMapping, JourneyError> {
        self.to_config().validate()?;

        let (first, last) = match waypoints {
            [] => return Ok(ScrollMapping::trivial(0.0)),
            [only] => return Ok(ScrollMapping::trivial(only.distance_along_path)),
            [first, .., last] => (first.distance_along_path, last.distance_along_path),
        };

        let span = last - first;
        if span <= 0.0 {
            return Ok(ScrollMapping::trivial(first));
        }

        let steps = ((span / self.step) - 1e-9).ceil().max(1.0);
        if steps >= MAX_SAMPLES as f64 {
            return Err(JourneyError::InvalidConfig {
                field: "mapping.step",
                reason: format!(
                    "step {} over a {span} km span exceeds {MAX_SAMPLES} samples",
                    self.step
                ),
            });
        }
        let step_count = steps as usize;

        let dwell_distances: Vec<f64> = waypoints.iter().map(|w| w.distance_along_path).collect();
        let in_dwell_zone = |d: f64| {
            dwell_distances
                .iter()
                .any(|w| (d - w).abs() <= self.dwell_window)
        };

        let mut distance_samples = Vec::with_capacity(step_count + 1);
        let mut cumulative_pixels = Vec::with_capacity(step_count + 1);
        distance_samples.push(first);
        cumulative_pixels.push(0.0);

        let mut prev = first;
        let mut pixels = 0.0;
        for i in 1..=step_count {
            let next = if i == step_count {
                last
            } else {
                (first + i as f64 * self.step).min(last)
            };
            if next <= prev {
                continue;
            }
            let length = next - prev;
            let rate = if in_dwell_zone((prev + next) / 2.0) {
                self.base_rate * self.dwell_factor
            } else {
                self.base_rate
            };
            pixels += length * rate;
            distance_samples.push(next);
            cumulative_pixels.push(pixels);
            prev = next;
        }

        let mapping = ScrollMapping {
            distance_samples,
            cumulative_pixels,
            total_pixel_range: pixels + self.tail_pixels(),
        };
        debug!(
            samples = mapping.distance_samples.len(),
            total_px = mapping.total_pixel_range,
            span_km = span,
            "built scroll mapping"
        );
        Ok(mapping)
    }
}
