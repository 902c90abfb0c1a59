use std::rc::Rc;

use super::{GameMode, GamePhase};
use crate::data::{GameModeConfig, GameModeKind};
use crate::math::Fixed;
use crate::tick::TickManager;
use crate::time::{RealTimeProvider, TimeProvider};

/// Continuous play: each unpaused frame becomes one tick.
#[derive(Debug)]
pub struct RealTimeMode {
    time: RealTimeProvider,
    ticks: Rc<TickManager>,
    can_act: bool,
}

impl RealTimeMode {
    /// Create the mode paused, as in `Initialization`.
    #[must_use]
    pub fn new(config: &GameModeConfig, ticks: Rc<TickManager>) -> Self {
        let mut time = RealTimeProvider::new(config.initial_time_scale);
        time.set_paused(true);
        Self {
            time,
            ticks,
            can_act: false,
        }
    }

    /// The concrete time provider.
    #[must_use]
    pub fn real_time(&self) -> &RealTimeProvider {
        &self.time
    }
}

impl GameMode for RealTimeMode {
    fn kind(&self) -> GameModeKind {
        GameModeKind::RealTime
    }

    fn time(&self) -> &dyn TimeProvider {
        &self.time
    }

    fn can_player_act(&self) -> bool {
        self.can_act
    }

    fn on_phase_changed(&mut self, phase: GamePhase) {
        let running = phase == GamePhase::Playing;
        self.time.set_paused(!running);
        self.can_act = running;
        tracing::debug!(?phase, running, "Real-time mode phase changed");
    }

    fn update(&mut self, frame_delta: Fixed) {
        let delta = self.time.advance(frame_delta);
        if delta > Fixed::ZERO {
            self.ticks.process_tick(delta);
        }
    }

    fn set_time_scale(&mut self, scale: Fixed) {
        self.time.set_time_scale(scale);
    }
}
