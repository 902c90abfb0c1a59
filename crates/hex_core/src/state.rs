//! Session lifecycle: phase transitions on top of the active game mode.

use crate::data::GameModeKind;
use crate::error::{GameError, Result};
use crate::game_mode::{GameMode, GameModeManager, GamePhase};
use crate::math::Fixed;

/// A phase transition that took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase left.
    pub from: GamePhase,
    /// Phase entered.
    pub to: GamePhase,
}

/// Drives [`GamePhase`] transitions and forwards them to the game mode.
#[derive(Debug)]
pub struct GameStateManager {
    phase: GamePhase,
    modes: GameModeManager,
    start_countdown: Option<Fixed>,
    changes: Vec<PhaseChange>,
}

impl GameStateManager {
    /// Start in [`GamePhase::Initialization`].
    #[must_use]
    pub fn new(mut modes: GameModeManager) -> Self {
        modes.active_mut().on_phase_changed(GamePhase::Initialization);
        Self {
            phase: GamePhase::Initialization,
            modes,
            start_countdown: None,
            changes: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Mode manager.
    #[must_use]
    pub fn modes(&self) -> &GameModeManager {
        &self.modes
    }

    /// Mode manager, mutably.
    pub fn modes_mut(&mut self) -> &mut GameModeManager {
        &mut self.modes
    }

    /// The active game mode.
    #[must_use]
    pub fn mode(&self) -> &dyn GameMode {
        self.modes.active()
    }

    /// Check if the player may issue commands right now.
    #[must_use]
    pub fn can_player_act(&self) -> bool {
        self.modes.active().can_player_act()
    }

    /// Check if `start_game` is waiting out the transition delay.
    #[must_use]
    pub fn is_starting(&self) -> bool {
        self.start_countdown.is_some()
    }

    /// Move to `to`, notifying the game mode.
    pub fn transition_to(&mut self, to: GamePhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(GameError::InvalidTransition {
                from: format!("{:?}", self.phase),
                to: format!("{to:?}"),
            });
        }

        let from = self.phase;
        self.phase = to;
        self.start_countdown = None;
        self.modes.active_mut().on_phase_changed(to);
        self.changes.push(PhaseChange { from, to });
        tracing::info!(?from, ?to, "Game phase changed");
        Ok(())
    }

    /// Begin play, after the configured transition delay.
    ///
    /// With no delay the session enters `Playing` immediately; otherwise it
    /// does so from [`update`](Self::update) once the delay has elapsed.
    pub fn start_game(&mut self) -> bool {
        if self.phase != GamePhase::Initialization || self.start_countdown.is_some() {
            tracing::warn!(phase = ?self.phase, "Game already started");
            return false;
        }

        let delay = self.modes.config().transition_delay;
        if delay > Fixed::ZERO {
            tracing::debug!(%delay, "Game starting after transition delay");
            self.start_countdown = Some(delay);
            return true;
        }
        self.apply(GamePhase::Playing)
    }

    /// Pause a running game.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            tracing::warn!(phase = ?self.phase, "Cannot pause: game not running");
            return false;
        }
        self.apply(GamePhase::Paused)
    }

    /// Resume a paused game.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            tracing::warn!(phase = ?self.phase, "Cannot resume: game not paused");
            return false;
        }
        self.apply(GamePhase::Playing)
    }

    /// End the game. Terminal.
    pub fn end_game(&mut self) -> bool {
        self.apply(GamePhase::GameOver)
    }

    /// Finish the player's turn in the active mode.
    pub fn end_player_turn(&mut self) -> bool {
        self.modes.active_mut().end_player_turn()
    }

    /// Swap the active mode, keeping the current phase.
    pub fn switch_mode(&mut self, kind: GameModeKind) -> bool {
        let phase = self.phase;
        self.modes.switch_mode(kind, phase)
    }

    /// Advance one frame: count down a pending start, then update the mode.
    pub fn update(&mut self, frame_delta: Fixed) {
        if let Some(remaining) = self.start_countdown {
            let remaining = remaining.saturating_sub(frame_delta.max(Fixed::ZERO));
            if remaining <= Fixed::ZERO {
                self.apply(GamePhase::Playing);
            } else {
                self.start_countdown = Some(remaining);
            }
        }
        self.modes.update(frame_delta);
    }

    /// Take the phase changes recorded since the last call.
    pub fn drain_phase_changes(&mut self) -> Vec<PhaseChange> {
        std::mem::take(&mut self.changes)
    }

    fn apply(&mut self, to: GamePhase) -> bool {
        match self.transition_to(to) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "Phase transition refused");
                false
            }
        }
    }
}
