//! Data-driven game balance
//!
//! Defaults match `consts`; any subset of fields can be overridden from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// Errors from loading or validating a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tuning field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Gameplay knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Leftward pipe/ground speed per frame
    pub speed: f32,
    /// Downward acceleration, units/s²
    pub gravity: f32,
    /// Upward velocity on tap
    pub flap: f32,
    /// Milliseconds between pipe pairs
    pub spawn_rate_ms: f32,
    /// Gap between paired pipes
    pub opening: f32,
    /// Fraction of scene height the gap centre may wander over
    pub center_jitter: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: consts::SPEED,
            gravity: consts::GRAVITY,
            flap: consts::FLAP,
            spawn_rate_ms: consts::SPAWN_RATE_MS,
            opening: consts::OPENING,
            center_jitter: consts::CENTER_JITTER,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("flap", self.flap),
            ("spawn_rate_ms", self.spawn_rate_ms),
            ("opening", self.opening),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let non_negative = [("speed", self.speed), ("center_jitter", self.center_jitter)];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        Ok(())
    }
}
