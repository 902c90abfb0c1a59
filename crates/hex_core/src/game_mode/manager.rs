use std::rc::Rc;

use super::{GameMode, GamePhase, RealTimeMode, TurnBasedMode};
use crate::data::{GameModeConfig, GameModeKind};
use crate::math::Fixed;
use crate::tick::TickManager;

/// Owner of the active [`GameMode`].
#[derive(Debug)]
pub struct GameModeManager {
    config: GameModeConfig,
    ticks: Rc<TickManager>,
    active: Box<dyn GameMode>,
}

impl GameModeManager {
    /// Build the mode selected by `config`.
    #[must_use]
    pub fn new(config: GameModeConfig, ticks: Rc<TickManager>) -> Self {
        let active = build_mode(config.mode, &config, Rc::clone(&ticks));
        tracing::info!(mode = ?config.mode, scale = %config.initial_time_scale, "Game mode initialised");
        Self {
            config,
            ticks,
            active,
        }
    }

    /// Settings the session was started with.
    #[must_use]
    pub fn config(&self) -> &GameModeConfig {
        &self.config
    }

    /// The active mode.
    #[must_use]
    pub fn active(&self) -> &dyn GameMode {
        self.active.as_ref()
    }

    /// The active mode, mutably.
    pub fn active_mut(&mut self) -> &mut dyn GameMode {
        self.active.as_mut()
    }

    /// Kind of the active mode.
    #[must_use]
    pub fn kind(&self) -> GameModeKind {
        self.active.kind()
    }

    /// Replace the active mode with a fresh `kind` mode.
    ///
    /// The current time scale carries over and the new mode is put into
    /// `phase`. Turn state does not carry over. Returns `false` if `kind`
    /// is already active.
    pub fn switch_mode(&mut self, kind: GameModeKind, phase: GamePhase) -> bool {
        if self.active.kind() == kind {
            return false;
        }

        let config = GameModeConfig {
            mode: kind,
            initial_time_scale: self.active.time().time_scale(),
            ..self.config
        };
        let mut next = build_mode(kind, &config, Rc::clone(&self.ticks));
        next.on_phase_changed(phase);
        tracing::info!(from = ?self.active.kind(), to = ?kind, ?phase, "Switching game mode");
        self.active = next;
        true
    }

    /// Advance the active mode by one frame.
    pub fn update(&mut self, frame_delta: Fixed) {
        self.active.update(frame_delta);
    }
}

fn build_mode(kind: GameModeKind, config: &GameModeConfig, ticks: Rc<TickManager>) -> Box<dyn GameMode> {
    match kind {
        GameModeKind::RealTime => Box::new(RealTimeMode::new(config, ticks)),
        GameModeKind::TurnBased => Box::new(TurnBasedMode::new(config, ticks)),
    }
}
