//! Engine tuning, loadable from TOML.
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration:
//!
//! ```toml
//! [mapping]
//! base_rate = 100.0
//! dwell_window = 1.0
//! dwell_factor = 4.0
//!
//! [navigation.timing]
//! mode = "fixed"
//! duration_ms = 600
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::JourneyError;
use crate::narrative::EligibilityPolicy;

/// Scroll-to-distance table parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Pixels of scroll per kilometer of travel outside dwell zones.
    pub base_rate: f64,
    /// Half-width (km) of the zone around each waypoint.
    pub dwell_window: f64,
    /// Slow-down multiplier applied inside dwell zones.
    pub dwell_factor: f64,
    /// Sampling step (km).
    pub step: f64,
    /// Extra scroll after the last waypoint, in kilometers at base rate.
    pub tail_units: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            base_rate: 100.0,
            dwell_window: 1.0,
            dwell_factor: 4.0,
            step: 0.2,
            tail_units: 0.5,
        }
    }
}

impl MappingConfig {
    /// Rates and step must be positive and the dwell factor at least 1, so
    /// the pixel table can only grow.
    pub fn validate(&self) -> Result<(), JourneyError> {
        positive("mapping.base_rate", self.base_rate)?;
        positive("mapping.step", self.step)?;
        non_negative("mapping.dwell_window", self.dwell_window)?;
        non_negative("mapping.tail_units", self.tail_units)?;
        if !(self.dwell_factor.is_finite() && self.dwell_factor >= 1.0) {
            return Err(JourneyError::InvalidConfig {
                field: "mapping.dwell_factor",
                reason: format!("must be >= 1, got {}", self.dwell_factor),
            });
        }
        Ok(())
    }
}

/// Position and heading resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Width (km) of the window used to sample the heading.
    pub heading_window: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            heading_window: 0.5,
        }
    }
}

/// Narrative panel behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub eligibility: EligibilityPolicy,
    /// Delay between hiding old content and showing new content.
    pub swap_delay_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            eligibility: EligibilityPolicy::default(),
            swap_delay_ms: 280,
        }
    }
}

impl ActivationConfig {
    /// `swap_delay_ms` as a [`Duration`].
    pub fn swap_delay(&self) -> Duration {
        Duration::from_millis(self.swap_delay_ms)
    }
}

/// How long a jump between navigation entries animates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NavigationTiming {
    /// Same duration for every jump.
    Fixed { duration_ms: u64 },
    /// `base_ms + per_item_ms * index_distance`, capped at `max_ms`.
    Scaled {
        base_ms: u64,
        per_item_ms: u64,
        max_ms: u64,
    },
}

impl Default for NavigationTiming {
    fn default() -> Self {
        NavigationTiming::Scaled {
            base_ms: 400,
            per_item_ms: 150,
            max_ms: 1600,
        }
    }
}

impl NavigationTiming {
    /// Duration for a jump spanning `index_distance` entries.
    pub fn duration_for(&self, index_distance: usize) -> Duration {
        match *self {
            NavigationTiming::Fixed { duration_ms } => Duration::from_millis(duration_ms),
            NavigationTiming::Scaled {
                base_ms,
                per_item_ms,
                max_ms,
            } => {
                let steps = index_distance as u64;
                let ms = base_ms.saturating_add(per_item_ms.saturating_mul(steps));
                Duration::from_millis(ms.min(max_ms))
            }
        }
    }
}

/// Progress index and jump navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Slack (px) when comparing the scroll offset to an item position.
    pub epsilon_px: f64,
    /// Distance (px) from the scroller's end that counts as "at the bottom".
    pub bottom_tolerance_px: f64,
    /// Scroll writes that deviate further than this from the animation abort it.
    pub abort_tolerance_px: f64,
    pub timing: NavigationTiming,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            epsilon_px: 1.0,
            bottom_tolerance_px: 5.0,
            abort_tolerance_px: 2.0,
            timing: NavigationTiming::default(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mapping: MappingConfig,
    pub motion: MotionConfig,
    pub activation: ActivationConfig,
    pub navigation: NavigationConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, JourneyError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the mapping or animations meaningless.
    pub fn validate(&self) -> Result<(), JourneyError> {
        self.mapping.validate()?;
        positive("motion.heading_window", self.motion.heading_window)?;
        non_negative("navigation.epsilon_px", self.navigation.epsilon_px)?;
        non_negative(
            "navigation.bottom_tolerance_px",
            self.navigation.bottom_tolerance_px,
        )?;
        non_negative(
            "navigation.abort_tolerance_px",
            self.navigation.abort_tolerance_px,
        )?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), JourneyError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(JourneyError::InvalidConfig {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), JourneyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(JourneyError::InvalidConfig {
            field,
            reason: format!("must be zero or positive, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.activation.swap_delay(), Duration::from_millis(280));
        assert_eq!(config.mapping.step, 0.2);
    }

    #[test]
    fn test_partial_sections_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [mapping]
            dwell_window = 10.0
            dwell_factor = 2.0

            [activation]
            eligibility = "all"

            [navigation.timing]
            mode = "fixed"
            duration_ms = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.mapping.dwell_window, 10.0);
        assert_eq!(config.mapping.base_rate, 100.0);
        assert_eq!(config.activation.eligibility, EligibilityPolicy::All);
        assert_eq!(
            config.navigation.timing,
            NavigationTiming::Fixed { duration_ms: 600 }
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_toml_str("[mapping]\nbase_rate = 0.0").unwrap_err();
        assert!(matches!(
            err,
            JourneyError::InvalidConfig {
                field: "mapping.base_rate",
                ..
            }
        ));

        let err = EngineConfig::from_toml_str("[mapping]\ndwell_factor = 0.5").unwrap_err();
        assert!(err.to_string().contains("dwell_factor"));
    }

    #[test]
    fn test_mapping_section_validates_alone() {
        assert!(MappingConfig::default().validate().is_ok());

        let negative_rate = MappingConfig {
            base_rate: -5.0,
            ..Default::default()
        };
        assert!(negative_rate.validate().is_err());

        let nan_step = MappingConfig {
            step: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_step.validate(),
            Err(JourneyError::InvalidConfig {
                field: "mapping.step",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[mapping\nbase_rate = ").unwrap_err();
        assert!(matches!(err, JourneyError::ConfigParse(_)));
    }

    #[test]
    fn test_scaled_timing_caps() {
        let timing = NavigationTiming::default();
        assert_eq!(timing.duration_for(0), Duration::from_millis(400));
        assert_eq!(timing.duration_for(2), Duration::from_millis(700));
        assert_eq!(timing.duration_for(50), Duration::from_millis(1600));

        let fixed = NavigationTiming::Fixed { duration_ms: 500 };
        assert_eq!(fixed.duration_for(9), Duration::from_millis(500));
    }
}
