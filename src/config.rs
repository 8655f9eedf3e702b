//! Journey timing configuration.
//!
//! The defaults reproduce the live site: a 100 ms tick advancing 0.125 units
//! (25 units, one phase, every 20 seconds) and a 5 second quiet period after a
//! checkpoint click before autoplay picks up again.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_TICK_PERIOD_MS: u32 = 100;
pub const DEFAULT_PROGRESS_PER_TICK: f64 = 0.125;
pub const DEFAULT_RESUME_DELAY_MS: u32 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// Period of the autoplay interval timer.
    pub tick_period_ms: u32,
    /// Progress units gained per full tick period.
    pub progress_per_tick: f64,
    /// Quiet period after a checkpoint click before autoplay resumes.
    pub resume_delay_ms: u32,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            progress_per_tick: DEFAULT_PROGRESS_PER_TICK,
            resume_delay_ms: DEFAULT_RESUME_DELAY_MS,
        }
    }
}

impl JourneyConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: JourneyConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_period_ms",
                reason: "must be greater than zero",
            });
        }
        if !self.progress_per_tick.is_finite() || self.progress_per_tick <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "progress_per_tick",
                reason: "must be a positive finite number",
            });
        }
        Ok(())
    }

    /// Progress gained over `dt_ms` of autoplay.
    pub fn advance_for(&self, dt_ms: f64) -> f64 {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return 0.0;
        }
        self.progress_per_tick * dt_ms / self.tick_period_ms as f64
    }

    /// Milliseconds of uninterrupted autoplay needed to cover one phase (25 units).
    pub fn phase_duration_ms(&self) -> f64 {
        25.0 / self.progress_per_tick * self.tick_period_ms as f64
    }
}
