use std::rc::Rc;

use super::{GameMode, GamePhase};
use crate::data::{GameModeConfig, GameModeKind};
use crate::math::Fixed;
use crate::tick::TickManager;
use crate::time::{TimeProvider, TurnTimeProvider};
use crate::turn::TurnManager;

/// Raw time produced by one completed turn, before scaling.
pub const TURN_TICK_AMOUNT: Fixed = Fixed::ONE;

/// Discrete play: the simulation ticks once each time a turn ends.
///
/// There is a single player and no turn rotation: ending the player's
/// turn immediately starts the next one.
#[derive(Debug)]
pub struct TurnBasedMode {
    time: TurnTimeProvider,
    turns: TurnManager,
    ticks: Rc<TickManager>,
    can_act: bool,
    auto_advance: bool,
    turn_duration: Fixed,
    turn_elapsed: Fixed,
}

impl TurnBasedMode {
    /// Create the mode before turn 1.
    #[must_use]
    pub fn new(config: &GameModeConfig, ticks: Rc<TickManager>) -> Self {
        Self {
            time: TurnTimeProvider::new(config.initial_time_scale),
            turns: TurnManager::new(),
            ticks,
            can_act: false,
            auto_advance: config.auto_advance_turns,
            turn_duration: config.turn_duration,
            turn_elapsed: Fixed::ZERO,
        }
    }

    /// The concrete time provider.
    #[must_use]
    pub fn turn_time(&self) -> &TurnTimeProvider {
        &self.time
    }

    /// Turn counter and listener registry.
    #[must_use]
    pub fn turn_manager(&self) -> &TurnManager {
        &self.turns
    }

    /// Frame time accumulated towards auto-advance.
    #[must_use]
    pub fn turn_elapsed(&self) -> Fixed {
        self.turn_elapsed
    }

    /// Start the next turn. See [`TurnManager::start_turn`].
    pub fn start_turn(&mut self) -> bool {
        let started = self.turns.start_turn();
        if started {
            self.turn_elapsed = Fixed::ZERO;
        }
        started
    }

    /// End the turn in progress and run its simulation tick.
    ///
    /// Turn listeners hear about the end first; then the turn clock is
    /// pulsed with [`TURN_TICK_AMOUNT`] and that delta is dispatched to
    /// every tickable.
    pub fn end_turn(&mut self) -> bool {
        if !self.turns.end_turn() {
            return false;
        }
        let delta = self.time.execute_turn_tick(TURN_TICK_AMOUNT);
        tracing::debug!(turn = self.turns.current_turn(), %delta, "Executing turn tick");
        self.ticks.process_tick(delta);
        true
    }
}

impl GameMode for TurnBasedMode {
    fn kind(&self) -> GameModeKind {
        GameModeKind::TurnBased
    }

    fn time(&self) -> &dyn TimeProvider {
        &self.time
    }

    fn can_player_act(&self) -> bool {
        self.can_act
    }

    fn on_phase_changed(&mut self, phase: GamePhase) {
        match phase {
            GamePhase::Playing => {
                if !self.turns.is_turn_in_progress() {
                    self.start_turn();
                }
                self.can_act = true;
            }
            GamePhase::Initialization | GamePhase::Paused | GamePhase::GameOver => {
                self.can_act = false;
            }
        }
        tracing::debug!(?phase, turn = self.turns.current_turn(), "Turn-based mode phase changed");
    }

    fn update(&mut self, frame_delta: Fixed) {
        if self.auto_advance && self.can_act && frame_delta > Fixed::ZERO {
            self.turn_elapsed = self.turn_elapsed.saturating_add(frame_delta);
            if self.turn_elapsed >= self.turn_duration {
                tracing::debug!(turn = self.turns.current_turn(), "Turn time elapsed; advancing");
                self.end_player_turn();
            }
        }
        self.time.reset_delta_time();
    }

    fn set_time_scale(&mut self, scale: Fixed) {
        self.time.set_time_scale(scale);
    }

    fn end_player_turn(&mut self) -> bool {
        if !self.can_act {
            tracing::warn!(turn = self.turns.current_turn(), "Player cannot act; end turn ignored");
            return false;
        }

        self.can_act = false;
        self.end_turn();
        self.start_turn();
        self.can_act = true;
        true
    }

    fn turns(&self) -> Option<&TurnManager> {
        Some(&self.turns)
    }
}
