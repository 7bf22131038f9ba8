use std::sync::LazyLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projects::Content;

/// Milliseconds on the page clock.
pub type Millis = u64;

pub static GLOBAL_MOTION_CONFIG: LazyLock<MotionConfig> = LazyLock::new(MotionConfig::load);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Couldn't parse motion config: {0}")]
    Parse(String),
    #[error("Invalid motion config: {0}")]
    Invalid(&'static str),
}

/// Slide Navigator timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideTiming {
    /// Minimum gap between two accepted transitions.
    pub cooldown_ms: Millis,
    pub exit_ms: Millis,
    /// When the incoming slide takes over, measured from the start of the exit.
    pub swap_at_ms: Millis,
    pub entrance_ms: Millis,
    /// Buffer between the end of the entrance and re-enabling input.
    pub settle_ms: Millis,
    /// Input is inert for this long after mount.
    pub initial_hold_ms: Millis,
    /// Releasing the hold also starts a cooldown, delaying the first accepted input.
    pub hold_starts_cooldown: bool,
    pub swipe_threshold_px: f64,
}

impl Default for SlideTiming {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000,
            exit_ms: 1500,
            swap_at_ms: 500,
            entrance_ms: 1500,
            settle_ms: 100,
            initial_hold_ms: 1500,
            hold_starts_cooldown: false,
            swipe_threshold_px: 50.0,
        }
    }
}

/// Staggered text reveal of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub duration_ms: Millis,
    pub title_offset_ms: Millis,
    pub word_stagger_ms: Millis,
    pub line_stagger_ms: Millis,
    pub lines_overlap_ms: Millis,
    pub link_overlap_ms: Millis,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            title_offset_ms: 500,
            word_stagger_ms: 100,
            line_stagger_ms: 100,
            lines_overlap_ms: 750,
            link_overlap_ms: 1000,
        }
    }
}

/// Route change overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTiming {
    pub cover_ms: Millis,
    pub fade_ms: Millis,
    pub reveal_ms: Millis,
    pub buffer_ms: Millis,
    pub safety_timeout_ms: Millis,
}

impl Default for PageTiming {
    fn default() -> Self {
        Self {
            cover_ms: 500,
            fade_ms: 200,
            reveal_ms: 500,
            buffer_ms: 100,
            safety_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub slides: SlideTiming,
    pub reveal: RevealTiming,
    pub page: PageTiming,
}

impl MotionConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `motion.json` from the embedded content, falling back to defaults.
    pub fn load() -> Self {
        let Some(file) = Content::get("motion.json") else {
            return Self::default();
        };
        let parsed = std::str::from_utf8(&file.data)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .and_then(Self::from_json);
        match parsed {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}, using default motion config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.slides.swap_at_ms > self.slides.exit_ms {
            return Err(ConfigError::Invalid("swap_at_ms must not exceed exit_ms"));
        }
        if self.slides.swipe_threshold_px <= 0.0 {
            return Err(ConfigError::Invalid("swipe_threshold_px must be positive"));
        }
        Ok(())
    }
}

pub fn duration(ms: Millis) -> Duration {
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_timings() {
        let config = MotionConfig::default();
        assert_eq!(config.slides.cooldown_ms, 1000);
        assert_eq!(config.slides.initial_hold_ms, 1500);
        assert_eq!(config.slides.swap_at_ms * 3, config.slides.exit_ms);
        assert_eq!(config.page.safety_timeout_ms, 1000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MotionConfig::from_json(r#"{ "slides": { "cooldown_ms": 250 } }"#)
            .expect("partial config should parse");
        assert_eq!(config.slides.cooldown_ms, 250);
        assert_eq!(config.slides.exit_ms, 1500);
        assert_eq!(config.reveal, RevealTiming::default());
        assert!(!config.slides.hold_starts_cooldown);

        let delayed =
            MotionConfig::from_json(r#"{ "slides": { "hold_starts_cooldown": true } }"#)
                .expect("flag should parse");
        assert!(delayed.slides.hold_starts_cooldown);
        assert_eq!(delayed.slides.initial_hold_ms, 1500);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let late_swap = MotionConfig::from_json(r#"{ "slides": { "swap_at_ms": 2000 } }"#);
        assert!(matches!(late_swap, Err(ConfigError::Invalid(_))));

        let garbage = MotionConfig::from_json("{ nope");
        assert!(matches!(garbage, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_embedded_config_loads() {
        let config = MotionConfig::load();
        assert_eq!(config, MotionConfig::default());
    }
}
