//! Session start-up configuration for the game mode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_decimal_serde, Fixed};

/// Which temporal model drives the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameModeKind {
    /// Continuous frame-driven time with a pause flag.
    #[default]
    RealTime,
    /// Discrete turns; one simulation tick per completed turn.
    TurnBased,
}

/// Game mode settings, read once when the session is built.
///
/// # Example RON
///
/// ```ron
/// GameModeConfig(
///     mode: TurnBased,
///     initial_time_scale: 1.0,
///     auto_advance_turns: true,
///     turn_duration: 30.0,
///     transition_delay: 0.5,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameModeConfig {
    /// Temporal model.
    #[serde(default)]
    pub mode: GameModeKind,

    /// Time scale the mode's time provider starts with.
    #[serde(default = "default_time_scale", with = "fixed_decimal_serde")]
    pub initial_time_scale: Fixed,

    /// Turn-based only: end the player's turn automatically once
    /// `turn_duration` seconds of frame time have passed.
    #[serde(default)]
    pub auto_advance_turns: bool,

    /// Seconds of frame time per turn when auto-advancing.
    #[serde(default = "default_turn_duration", with = "fixed_decimal_serde")]
    pub turn_duration: Fixed,

    /// Seconds spent in `Initialization` after the game is started before
    /// play begins.
    #[serde(default, with = "fixed_decimal_serde")]
    pub transition_delay: Fixed,
}

fn default_time_scale() -> Fixed {
    Fixed::ONE
}

fn default_turn_duration() -> Fixed {
    Fixed::from_num(30)
}

impl Default for GameModeConfig {
    fn default() -> Self {
        Self {
            mode: GameModeKind::RealTime,
            initial_time_scale: default_time_scale(),
            auto_advance_turns: false,
            turn_duration: default_turn_duration(),
            transition_delay: Fixed::ZERO,
        }
    }
}

impl GameModeConfig {
    /// Default settings for the given mode.
    #[must_use]
    pub fn for_mode(mode: GameModeKind) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a config from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_str(&source).map_err(|e| match e {
            GameError::DataParseError { message, .. } => GameError::DataParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Reject negative durations and scales.
    pub fn validate(&self) -> Result<()> {
        if self.initial_time_scale < Fixed::ZERO {
            return Err(GameError::InvalidState(
                "initial_time_scale must not be negative".to_string(),
            ));
        }
        if self.auto_advance_turns && self.turn_duration <= Fixed::ZERO {
            return Err(GameError::InvalidState(
                "turn_duration must be positive when auto_advance_turns is set".to_string(),
            ));
        }
        if self.transition_delay < Fixed::ZERO {
            return Err(GameError::InvalidState(
                "transition_delay must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
