//! Turn counter and turn lifecycle notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::observer::ObserverList;

/// Observer of turn boundaries.
pub trait TurnListener {
    /// A turn has begun. `turn` is its 1-based number.
    fn on_turn_start(&mut self, turn: u32) -> Result<()>;

    /// A turn is ending. Called before the turn stops being in progress.
    fn on_turn_end(&mut self, turn: u32) -> Result<()>;
}

fn listener_order(_listener: &(dyn TurnListener + 'static)) -> i32 {
    0
}

/// Shared handle to the listener list of a [`TurnManager`].
///
/// Listeners may keep one to register or unregister from inside a
/// notification; such changes apply once the notification finishes.
pub type TurnListeners = Rc<ObserverList<dyn TurnListener>>;

/// Tracks the current turn and notifies listeners at its boundaries.
#[derive(Debug)]
pub struct TurnManager {
    current_turn: u32,
    turn_in_progress: bool,
    listeners: TurnListeners,
}

impl Default for TurnManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnManager {
    /// Create a manager before turn 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_turn: 0,
            turn_in_progress: false,
            listeners: Rc::new(ObserverList::new("turn_listeners", listener_order)),
        }
    }

    /// Number of the latest turn started; 0 before the first.
    #[must_use]
    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Check if a turn has started and not yet ended.
    #[must_use]
    pub fn is_turn_in_progress(&self) -> bool {
        self.turn_in_progress
    }

    /// Shared handle to the listener list.
    #[must_use]
    pub fn listeners(&self) -> TurnListeners {
        Rc::clone(&self.listeners)
    }

    /// Register a listener; notified in registration order.
    pub fn add_listener<L: TurnListener + 'static>(&self, listener: &Rc<RefCell<L>>) -> bool {
        let handle = Rc::downgrade(listener);
        let handle: Weak<RefCell<dyn TurnListener>> = handle;
        self.listeners.add(handle)
    }

    /// Unregister a listener.
    pub fn remove_listener<L: TurnListener + 'static>(&self, listener: &Rc<RefCell<L>>) -> bool {
        let handle = Rc::downgrade(listener);
        let handle: Weak<RefCell<dyn TurnListener>> = handle;
        self.listeners.remove(&handle)
    }

    /// Begin the next turn.
    ///
    /// Returns `false` and changes nothing if a turn is already in
    /// progress.
    pub fn start_turn(&mut self) -> bool {
        if self.turn_in_progress {
            tracing::warn!(turn = self.current_turn, "Cannot start turn: turn already in progress");
            return false;
        }

        self.current_turn += 1;
        self.turn_in_progress = true;
        let turn = self.current_turn;
        tracing::debug!(turn, "Turn started");
        self.listeners.dispatch(|listener| listener.on_turn_start(turn));
        true
    }

    /// End the turn in progress.
    ///
    /// Listeners are notified first; the turn stops being in progress
    /// afterwards. Returns `false` if no turn is in progress.
    pub fn end_turn(&mut self) -> bool {
        if !self.turn_in_progress {
            tracing::warn!(turn = self.current_turn, "Cannot end turn: no turn in progress");
            return false;
        }

        let turn = self.current_turn;
        self.listeners.dispatch(|listener| listener.on_turn_end(turn));
        self.turn_in_progress = false;
        tracing::debug!(turn, "Turn ended");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        fail_on_end: bool,
    }

    impl TurnListener for Recorder {
        fn on_turn_start(&mut self, turn: u32) -> Result<()> {
            self.events.push(format!("start {turn}"));
            Ok(())
        }

        fn on_turn_end(&mut self, turn: u32) -> Result<()> {
            self.events.push(format!("end {turn}"));
            if self.fail_on_end {
                return Err(GameError::ListenerFailed("recorder".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_turn_state_machine() {
        let mut turns = TurnManager::new();
        assert_eq!(turns.current_turn(), 0);
        assert!(!turns.is_turn_in_progress());

        assert!(turns.start_turn());
        assert_eq!(turns.current_turn(), 1);
        assert!(turns.is_turn_in_progress());

        assert!(!turns.start_turn());
        assert_eq!(turns.current_turn(), 1);

        assert!(turns.end_turn());
        assert!(!turns.is_turn_in_progress());
        assert!(!turns.end_turn());

        assert!(turns.start_turn());
        assert_eq!(turns.current_turn(), 2);
    }

    #[test]
    fn test_listeners_notified_in_order() {
        let mut turns = TurnManager::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        turns.add_listener(&recorder);

        turns.start_turn();
        turns.end_turn();
        assert_eq!(recorder.borrow().events, vec!["start 1", "end 1"]);
    }

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let mut turns = TurnManager::new();
        let failing = Rc::new(RefCell::new(Recorder {
            fail_on_end: true,
            ..Recorder::default()
        }));
        let healthy = Rc::new(RefCell::new(Recorder::default()));
        turns.add_listener(&failing);
        turns.add_listener(&healthy);

        turns.start_turn();
        assert!(turns.end_turn());
        assert_eq!(healthy.borrow().events, vec!["start 1", "end 1"]);
        assert!(!turns.is_turn_in_progress());
    }

    struct SelfRemover {
        listeners: TurnListeners,
        me: Option<Weak<RefCell<dyn TurnListener>>>,
        starts: u32,
    }

    impl TurnListener for SelfRemover {
        fn on_turn_start(&mut self, _turn: u32) -> Result<()> {
            self.starts += 1;
            if let Some(me) = &self.me {
                self.listeners.remove(me);
            }
            Ok(())
        }

        fn on_turn_end(&mut self, _turn: u32) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_listener_may_unregister_itself() {
        let mut turns = TurnManager::new();
        let remover = Rc::new(RefCell::new(SelfRemover {
            listeners: turns.listeners(),
            me: None,
            starts: 0,
        }));
        let handle = Rc::downgrade(&remover);
        let handle: Weak<RefCell<dyn TurnListener>> = handle;
        remover.borrow_mut().me = Some(handle);
        turns.add_listener(&remover);

        turns.start_turn();
        turns.end_turn();
        turns.start_turn();
        assert_eq!(remover.borrow().starts, 1);
        assert!(turns.listeners().is_empty());
    }
}
