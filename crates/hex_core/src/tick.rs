//! Priority-ordered dispatch of simulation ticks.
//!
//! Anything that advances with game time implements [`Tickable`] and
//! registers with the shared [`TickManager`]. Each tick calls active
//! tickables in ascending priority order; equal priorities run in
//! registration order.
//!
//! The manager holds tickables weakly. Registering or unregistering from
//! inside a tick is allowed and takes effect after the current dispatch.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::math::Fixed;
use crate::observer::{DispatchReport, ObserverList};

/// Priority used when a tickable does not choose one.
pub const DEFAULT_TICK_PRIORITY: i32 = 100;

/// A participant in the simulation tick.
pub trait Tickable {
    /// Dispatch order; lower runs first. Read once at registration.
    fn priority(&self) -> i32 {
        DEFAULT_TICK_PRIORITY
    }

    /// Inactive tickables stay registered but are not called.
    fn is_active(&self) -> bool {
        true
    }

    /// Advance by `delta` scaled game time.
    fn tick(&mut self, delta: Fixed) -> Result<()>;
}

fn tick_priority(tickable: &(dyn Tickable + 'static)) -> i32 {
    tickable.priority()
}

/// Registry and dispatcher of [`Tickable`]s.
///
/// Methods take `&self` so the manager can be shared as
/// `Rc<TickManager>` between game modes and tickables.
#[derive(Debug)]
pub struct TickManager {
    tickables: ObserverList<dyn Tickable>,
    ticks_processed: Cell<u64>,
}

impl Default for TickManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TickManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tickables: ObserverList::new("tickables", tick_priority),
            ticks_processed: Cell::new(0),
        }
    }

    /// Create an empty manager ready for sharing.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Register a tickable. Registering twice has no effect.
    pub fn register<T: Tickable + 'static>(&self, tickable: &Rc<RefCell<T>>) -> bool {
        let handle = Rc::downgrade(tickable);
        let handle: Weak<RefCell<dyn Tickable>> = handle;
        self.register_handle(handle)
    }

    /// Register an already type-erased tickable.
    pub fn register_handle(&self, tickable: Weak<RefCell<dyn Tickable>>) -> bool {
        self.tickables.add(tickable)
    }

    /// Unregister a tickable. Unknown tickables are ignored.
    pub fn unregister<T: Tickable + 'static>(&self, tickable: &Rc<RefCell<T>>) -> bool {
        let handle = Rc::downgrade(tickable);
        let handle: Weak<RefCell<dyn Tickable>> = handle;
        self.tickables.remove(&handle)
    }

    /// Number of registered tickables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickables.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickables.is_empty()
    }

    /// Check if a tick is being dispatched.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.tickables.is_dispatching()
    }

    /// Number of ticks dispatched so far.
    #[must_use]
    pub fn ticks_processed(&self) -> u64 {
        self.ticks_processed.get()
    }

    /// Call every active tickable with `delta`.
    ///
    /// A tickable returning an error is logged and the rest still run.
    /// Calling this from inside a tick is refused.
    pub fn process_tick(&self, delta: Fixed) -> DispatchReport {
        if self.is_processing() {
            tracing::warn!(%delta, "Nested tick refused");
            return DispatchReport::default();
        }

        self.ticks_processed.set(self.ticks_processed.get() + 1);
        let report = self
            .tickables
            .dispatch_where(|tickable| tickable.is_active(), |tickable| tickable.tick(delta));
        tracing::trace!(
            %delta,
            notified = report.notified,
            failed = report.failed,
            "Tick processed"
        );
        report
    }
}
