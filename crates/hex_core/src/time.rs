//! Time sources for the simulation.
//!
//! Game logic never reads the frame clock directly. It reads the active
//! [`TimeProvider`]: a continuous, pausable clock in real-time mode, or a
//! clock that only moves when a turn ends in turn-based mode.

use crate::math::Fixed;

/// Scaled, pausable game time.
pub trait TimeProvider {
    /// Scaled time elapsed during the current tick.
    fn delta_time(&self) -> Fixed;

    /// Check if time is not advancing.
    fn is_paused(&self) -> bool;

    /// Multiplier applied to raw time. Never negative.
    fn time_scale(&self) -> Fixed;

    /// Set the multiplier. Negative values clamp to zero.
    fn set_time_scale(&mut self, scale: Fixed);

    /// Sum of every scaled delta produced so far.
    fn total_time(&self) -> Fixed;
}

fn clamp_scale(scale: Fixed) -> Fixed {
    if scale < Fixed::ZERO {
        tracing::warn!(%scale, "Negative time scale clamped to zero");
        Fixed::ZERO
    } else {
        scale
    }
}

/// Continuous clock driven by frame time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealTimeProvider {
    delta: Fixed,
    paused: bool,
    scale: Fixed,
    total: Fixed,
}

impl Default for RealTimeProvider {
    fn default() -> Self {
        Self::new(Fixed::ONE)
    }
}

impl RealTimeProvider {
    /// Create an unpaused clock with the given scale.
    #[must_use]
    pub fn new(scale: Fixed) -> Self {
        Self {
            delta: Fixed::ZERO,
            paused: false,
            scale: clamp_scale(scale),
            total: Fixed::ZERO,
        }
    }

    /// Pause or resume.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.delta = Fixed::ZERO;
        }
    }

    /// Advance by one frame of raw time and return the scaled delta.
    ///
    /// While paused the delta is zero and the total does not move.
    pub fn advance(&mut self, frame_delta: Fixed) -> Fixed {
        if self.paused || frame_delta <= Fixed::ZERO {
            self.delta = Fixed::ZERO;
        } else {
            self.delta = frame_delta.saturating_mul(self.scale);
            self.total = self.total.saturating_add(self.delta);
        }
        self.delta
    }
}

impl TimeProvider for RealTimeProvider {
    fn delta_time(&self) -> Fixed {
        self.delta
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn time_scale(&self) -> Fixed {
        self.scale
    }

    fn set_time_scale(&mut self, scale: Fixed) {
        self.scale = clamp_scale(scale);
    }

    fn total_time(&self) -> Fixed {
        self.total
    }
}

/// Clock that only advances when a turn is executed.
///
/// It reads as paused whenever its current delta is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTimeProvider {
    delta: Fixed,
    scale: Fixed,
    total: Fixed,
}

impl Default for TurnTimeProvider {
    fn default() -> Self {
        Self::new(Fixed::ONE)
    }
}

impl TurnTimeProvider {
    /// Create a clock with the given scale.
    #[must_use]
    pub fn new(scale: Fixed) -> Self {
        Self {
            delta: Fixed::ZERO,
            scale: clamp_scale(scale),
            total: Fixed::ZERO,
        }
    }

    /// Produce one turn's worth of time: `amount × scale`.
    pub fn execute_turn_tick(&mut self, amount: Fixed) -> Fixed {
        self.delta = amount.saturating_mul(self.scale);
        self.total = self.total.saturating_add(self.delta);
        self.delta
    }

    /// Zero the delta once the turn's tick has been dispatched.
    pub fn reset_delta_time(&mut self) {
        self.delta = Fixed::ZERO;
    }
}

impl TimeProvider for TurnTimeProvider {
    fn delta_time(&self) -> Fixed {
        self.delta
    }

    fn is_paused(&self) -> bool {
        self.delta <= Fixed::ZERO
    }

    fn time_scale(&self) -> Fixed {
        self.scale
    }

    fn set_time_scale(&mut self, scale: Fixed) {
        self.scale = clamp_scale(scale);
    }

    fn total_time(&self) -> Fixed {
        self.total
    }
}
