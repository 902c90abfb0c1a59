//! Game modes: how time reaches the tick manager.
//!
//! A [`GameMode`] owns the session's time provider and reacts to
//! [`GamePhase`] changes. [`RealTimeMode`] turns every frame into a tick;
//! [`TurnBasedMode`] produces exactly one tick per completed turn.
//! [`GameModeManager`] owns whichever mode is active.

mod manager;
mod real_time;
mod turn_based;

pub use manager::GameModeManager;
pub use real_time::RealTimeMode;
pub use turn_based::{TurnBasedMode, TURN_TICK_AMOUNT};

use serde::{Deserialize, Serialize};

use crate::data::GameModeKind;
use crate::math::Fixed;
use crate::time::TimeProvider;
use crate::turn::TurnManager;

/// Lifecycle phase of a session.
///
/// ```text
/// Initialization ──► Playing ◄──► Paused
///                       │            │
///                       └──► GameOver ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session built, play not started.
    #[default]
    Initialization,
    /// Simulation running.
    Playing,
    /// Simulation suspended by the player.
    Paused,
    /// Terminal.
    GameOver,
}

impl GamePhase {
    /// Check if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initialization, Self::Playing)
                | (Self::Playing, Self::Paused)
                | (Self::Paused, Self::Playing)
                | (Self::Playing | Self::Paused, Self::GameOver)
        )
    }

    /// Check if no transition leaves this phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// A temporal model for the simulation.
pub trait GameMode: std::fmt::Debug {
    /// Which model this is.
    fn kind(&self) -> GameModeKind;

    /// The mode's time provider.
    fn time(&self) -> &dyn TimeProvider;

    /// Check if the player may issue commands.
    fn can_player_act(&self) -> bool;

    /// React to the session entering `phase`.
    fn on_phase_changed(&mut self, phase: GamePhase);

    /// Advance by one frame of raw time.
    fn update(&mut self, frame_delta: Fixed);

    /// Change the time scale. Negative values clamp to zero.
    fn set_time_scale(&mut self, scale: Fixed);

    /// Finish the player's turn. Modes without turns refuse.
    fn end_player_turn(&mut self) -> bool {
        tracing::warn!(mode = ?self.kind(), "Mode has no turns to end");
        false
    }

    /// Turn state, for modes that have turns.
    fn turns(&self) -> Option<&TurnManager> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transition_table() {
        use GamePhase::{GameOver, Initialization, Paused, Playing};

        assert!(Initialization.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Playing));
        assert!(Playing.can_transition_to(GameOver));
        assert!(Paused.can_transition_to(GameOver));

        assert!(!Initialization.can_transition_to(Paused));
        assert!(!Initialization.can_transition_to(GameOver));
        assert!(!Playing.can_transition_to(Playing));
        assert!(!GameOver.can_transition_to(Playing));
        assert!(!GameOver.can_transition_to(Initialization));
        assert!(GameOver.is_terminal());
    }
}
