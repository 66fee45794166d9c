//! Gameplay tuning
//!
//! Defaults come from [`crate::consts`]. Hosts can override individual values
//! with a JSON document; missing fields keep their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tuning values read by the simulation core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play time after the countdown (ms)
    pub session_duration_ms: f32,
    /// Countdown length (ms)
    pub countdown_ms: f32,
    /// Per-tick spawn chance
    pub spawn_probability: f32,
    /// Share of good items among spawns
    pub good_item_ratio: f32,
    /// Elapsed play time before computers may spawn (ms)
    pub computer_unlock_ms: f32,
    /// Computer substitution chance within good spawns
    pub computer_chance: f32,
    /// Fall speed (units/ms)
    pub fall_rate: f32,
    /// Normalized item size
    pub entity_size: f32,
    /// Results screen delay after a bomb (ms)
    pub bomb_results_delay_ms: f32,
    /// Auto redirect delay after game over (ms)
    pub auto_redirect_ms: f32,
    /// Navigation target
    pub redirect_url: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_duration_ms: SESSION_DURATION_MS,
            countdown_ms: COUNTDOWN_MS,
            spawn_probability: SPAWN_PROBABILITY,
            good_item_ratio: GOOD_ITEM_RATIO,
            computer_unlock_ms: COMPUTER_UNLOCK_MS,
            computer_chance: COMPUTER_CHANCE,
            fall_rate: FALL_RATE,
            entity_size: ENTITY_SIZE,
            bomb_results_delay_ms: BOMB_RESULTS_DELAY_MS,
            auto_redirect_ms: AUTO_REDIRECT_MS,
            redirect_url: REDIRECT_URL.to_string(),
        }
    }
}

/// Why a configuration document was rejected
#[derive(Debug)]
pub enum ConfigError {
    /// Not valid JSON, or a field had the wrong type
    Parse(serde_json::Error),
    /// A probability outside `[0, 1]`
    ProbabilityOutOfRange { field: &'static str, value: f32 },
    /// A duration or rate that must be positive
    NonPositive { field: &'static str, value: f32 },
    /// Empty navigation target
    EmptyRedirectUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid config document: {e}"),
            Self::ProbabilityOutOfRange { field, value } => {
                write!(f, "{field} must be within [0, 1], got {value}")
            }
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be greater than zero, got {value}")
            }
            Self::EmptyRedirectUrl => write!(f, "redirect_url must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl GameConfig {
    /// Parse a (partial) JSON override and validate the result
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("spawn_probability", self.spawn_probability),
            ("good_item_ratio", self.good_item_ratio),
            ("computer_chance", self.computer_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }

        let positives = [
            ("session_duration_ms", self.session_duration_ms),
            ("countdown_ms", self.countdown_ms),
            ("fall_rate", self.fall_rate),
            ("entity_size", self.entity_size),
        ];
        for (field, value) in positives {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.computer_unlock_ms < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "computer_unlock_ms",
                value: self.computer_unlock_ms,
            });
        }
        if self.redirect_url.trim().is_empty() {
            return Err(ConfigError::EmptyRedirectUrl);
        }
        Ok(())
    }
}
