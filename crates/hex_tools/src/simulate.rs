//! Headless session runner.
//!
//! Builds a [`GameSession`] over a generated map, registers a tick
//! counter and plays a number of turns (or simulated seconds in real-time
//! mode) without any renderer.

use std::cell::RefCell;
use std::rc::Rc;

use hex_core::data::{GameModeConfig, GameModeKind};
use hex_core::error::{GameError, Result};
use hex_core::grid::HexGrid;
use hex_core::hex::HexLayout;
use hex_core::math::Fixed;
use hex_core::session::GameSession;
use hex_core::tick::Tickable;
use hex_core::turn::TurnListener;
use serde::Serialize;

/// Frames per simulated second in real-time mode.
pub const FRAMES_PER_SECOND: u32 = 60;

/// What to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulateOptions {
    /// Temporal model.
    pub mode: GameModeKind,
    /// Turns to play; seconds of play in real-time mode.
    pub turns: u32,
    /// Map width.
    pub width: u32,
    /// Map height.
    pub height: u32,
    /// Time scale.
    pub time_scale: Fixed,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            mode: GameModeKind::TurnBased,
            turns: 10,
            width: 16,
            height: 16,
            time_scale: Fixed::ONE,
        }
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Mode that ran.
    pub mode: GameModeKind,
    /// Tiles on the map.
    pub tiles: usize,
    /// Ticks dispatched by the tick manager.
    pub ticks: u64,
    /// Turns completed (turn-based only).
    pub turns_completed: u32,
    /// Scaled game time delivered to tickables, as a decimal string.
    pub total_time: String,
}

#[derive(Default)]
struct TickCounter {
    ticks: u64,
    elapsed: Fixed,
}

impl Tickable for TickCounter {
    fn priority(&self) -> i32 {
        0
    }

    fn tick(&mut self, delta: Fixed) -> Result<()> {
        self.ticks += 1;
        self.elapsed = self.elapsed.saturating_add(delta);
        Ok(())
    }
}

#[derive(Default)]
struct TurnCounter {
    completed: u32,
}

impl TurnListener for TurnCounter {
    fn on_turn_start(&mut self, turn: u32) -> Result<()> {
        tracing::debug!(turn, "Turn started");
        Ok(())
    }

    fn on_turn_end(&mut self, turn: u32) -> Result<()> {
        self.completed += 1;
        tracing::debug!(turn, "Turn ended");
        Ok(())
    }
}

/// Run a headless session.
///
/// # Errors
///
/// Returns an error if the options are invalid or the session refuses to
/// start.
pub fn run_simulation(options: &SimulateOptions) -> Result<SimulationReport> {
    if options.width == 0 || options.height == 0 {
        return Err(GameError::InvalidState("map must be at least 1x1".to_string()));
    }

    let config = GameModeConfig {
        initial_time_scale: options.time_scale,
        ..GameModeConfig::for_mode(options.mode)
    };
    config.validate()?;

    let mut session = GameSession::new(config)
        .with_grid(HexGrid::generate(options.width, options.height, HexLayout::default()));

    let ticks = Rc::new(RefCell::new(TickCounter::default()));
    session.ticks().register(&ticks);
    let turns = Rc::new(RefCell::new(TurnCounter::default()));
    if let Some(manager) = session.state().mode().turns() {
        manager.add_listener(&turns);
    }

    if !session.start_game() {
        return Err(GameError::InvalidState("session did not start".to_string()));
    }
    tracing::info!(mode = ?options.mode, turns = options.turns, "Simulation started");

    let frame = Fixed::ONE / Fixed::from_num(FRAMES_PER_SECOND);
    match options.mode {
        GameModeKind::TurnBased => {
            for _ in 0..options.turns {
                session.update(frame);
                if !session.end_player_turn() {
                    return Err(GameError::InvalidState("turn could not be ended".to_string()));
                }
            }
        }
        GameModeKind::RealTime => {
            for _ in 0..options.turns.saturating_mul(FRAMES_PER_SECOND) {
                session.update(frame);
            }
        }
    }

    let counter = ticks.borrow();
    let report = SimulationReport {
        mode: options.mode,
        tiles: session.map().grid().map_or(0, HexGrid::len),
        ticks: counter.ticks,
        turns_completed: turns.borrow().completed,
        total_time: counter.elapsed.to_string(),
    };
    tracing::info!(ticks = report.ticks, total_time = %report.total_time, "Simulation finished");
    Ok(report)
}
