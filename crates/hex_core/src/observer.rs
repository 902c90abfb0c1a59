//! Non-owning subscriber lists with re-entrancy-safe dispatch.
//!
//! # Ordering
//!
//! Subscribers are notified in ascending `order` (see
//! [`ObserverList::new`]); equal orders keep registration order. The order
//! key is read once, when a registration takes effect.
//!
//! # Re-entrancy
//!
//! Adding or removing a subscriber while a dispatch is running is allowed.
//! The request is queued and applied, in request order, after the
//! outermost dispatch finishes. A subscriber removed mid-dispatch is still
//! notified in that dispatch; one added mid-dispatch is not.
//!
//! # Failures
//!
//! A subscriber returning `Err` is logged and skipped; the rest of the
//! list is still notified. Subscribers that have been dropped are pruned.

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use crate::error::Result;

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Subscribers that ran and returned `Ok`.
    pub notified: usize,
    /// Subscribers that returned `Err`.
    pub failed: usize,
    /// Subscribers skipped: dropped, already borrowed or filtered out.
    pub skipped: usize,
}

struct Entry<T: ?Sized> {
    observer: Weak<RefCell<T>>,
    order: i32,
}

enum PendingChange<T: ?Sized> {
    Add(Weak<RefCell<T>>),
    Remove(Weak<RefCell<T>>),
}

/// Ordered list of weakly held subscribers.
pub struct ObserverList<T: ?Sized> {
    name: &'static str,
    order_of: fn(&T) -> i32,
    entries: RefCell<Vec<Entry<T>>>,
    pending: RefCell<Vec<PendingChange<T>>>,
    depth: Cell<u32>,
}

impl<T: ?Sized> std::fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("name", &self.name)
            .field("len", &self.entries.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

impl<T: ?Sized> ObserverList<T> {
    /// Create an empty list. `name` labels log lines; `order_of` gives
    /// each subscriber's sort key.
    #[must_use]
    pub fn new(name: &'static str, order_of: fn(&T) -> i32) -> Self {
        Self {
            name,
            order_of,
            entries: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            depth: Cell::new(0),
        }
    }

    /// Check if a dispatch is running.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of live registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.observer.strong_count() > 0)
            .count()
    }

    /// Check if no live subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued add/remove requests.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Check if `observer` is registered (queued requests not counted).
    #[must_use]
    pub fn contains(&self, observer: &Weak<RefCell<T>>) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| Weak::ptr_eq(&e.observer, observer))
    }

    /// Register a subscriber.
    ///
    /// Outside a dispatch, returns `false` if it was already registered.
    /// During a dispatch the request is queued and `true` is returned.
    pub fn add(&self, observer: Weak<RefCell<T>>) -> bool {
        if self.is_dispatching() {
            self.pending.borrow_mut().push(PendingChange::Add(observer));
            return true;
        }
        self.insert(observer)
    }

    /// Unregister a subscriber.
    ///
    /// Outside a dispatch, returns `false` if it was not registered.
    /// During a dispatch the request is queued and `true` is returned.
    pub fn remove(&self, observer: &Weak<RefCell<T>>) -> bool {
        if self.is_dispatching() {
            self.pending
                .borrow_mut()
                .push(PendingChange::Remove(observer.clone()));
            return true;
        }
        self.erase(observer)
    }

    /// Notify every registered subscriber with `notify`.
    pub fn dispatch<F>(&self, notify: F) -> DispatchReport
    where
        F: FnMut(&mut T) -> Result<()>,
    {
        self.dispatch_where(|_| true, notify)
    }

    /// Notify the subscribers accepted by `wanted`.
    ///
    /// Rejected subscribers are counted as skipped.
    pub fn dispatch_where<P, F>(&self, wanted: P, mut notify: F) -> DispatchReport
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T) -> Result<()>,
    {
        let mut report = DispatchReport::default();
        self.depth.set(self.depth.get() + 1);

        {
            let entries = self.entries.borrow();
            for entry in entries.iter() {
                let Some(observer) = entry.observer.upgrade() else {
                    report.skipped += 1;
                    continue;
                };
                let Ok(mut guard) = observer.try_borrow_mut() else {
                    tracing::warn!(list = self.name, "Subscriber is already borrowed; skipped");
                    report.skipped += 1;
                    continue;
                };
                if !wanted(&*guard) {
                    report.skipped += 1;
                    continue;
                }
                match notify(&mut *guard) {
                    Ok(()) => report.notified += 1,
                    Err(error) => {
                        tracing::error!(list = self.name, %error, "Subscriber failed during dispatch");
                        report.failed += 1;
                    }
                }
            }
        }

        self.depth.set(self.depth.get() - 1);
        if !self.is_dispatching() {
            self.apply_pending();
        }
        report
    }

    /// Drop entries whose subscriber no longer exists.
    pub fn prune(&self) {
        if self.is_dispatching() {
            return;
        }
        self.entries
            .borrow_mut()
            .retain(|e| e.observer.strong_count() > 0);
    }

    fn apply_pending(&self) {
        let changes = std::mem::take(&mut *self.pending.borrow_mut());
        for change in changes {
            match change {
                PendingChange::Add(observer) => {
                    self.insert(observer);
                }
                PendingChange::Remove(observer) => {
                    self.erase(&observer);
                }
            }
        }
        self.prune();
    }

    fn insert(&self, observer: Weak<RefCell<T>>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        let Some(strong) = observer.upgrade() else {
            return false;
        };
        let order = match strong.try_borrow() {
            Ok(subscriber) => (self.order_of)(&*subscriber),
            Err(_) => {
                tracing::warn!(list = self.name, "Subscriber borrowed during registration; using order 0");
                0
            }
        };

        let mut entries = self.entries.borrow_mut();
        let index = entries.partition_point(|e| e.order <= order);
        entries.insert(index, Entry { observer, order });
        true
    }

    fn erase(&self, observer: &Weak<RefCell<T>>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| !Weak::ptr_eq(&e.observer, observer));
        entries.len() != before
    }
}
