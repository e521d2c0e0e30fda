//! Subscriber registry (the dispatch primitive).
//!
//! An ordered list of [`Subscription`]s for one event. Insertion order is
//! dispatch order; duplicates are allowed.
//!
//! ## Enumeration
//!
//! [`SubscriberRegistry::enumerate`] never shrinks the list while a callable
//! is running:
//!
//! 1. Snapshot the slots under the lock, then release it.
//! 2. Walk the snapshot in order. Each slot carries an atomic state; dead
//!    targets are marked dead, one-shots are claimed (active -> spent) before
//!    they run, removed slots are skipped.
//! 3. Drop every non-active slot in a single compacting pass.
//!
//! Step 3 runs from a drop guard, so it also happens when a callable panics
//! and the panic unwinds out of `enumerate`.
//!
//! No callable ever runs under the lock. A callable may therefore add to,
//! remove from, or dispatch the same registry. Slots added during a pass are
//! not part of that pass; slots removed during a pass are not invoked by it.

use std::any::Any;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tether_core::{SubscriptionId, TargetId, WeakHandle};

use crate::report::EnumerateStats;
use crate::subscription::{Callable, Delivery, Subscription};

const ACTIVE: u8 = 0;
const SPENT: u8 = 1;
const REMOVED: u8 = 2;
const DEAD: u8 = 3;

struct Slot<A: ?Sized> {
    id: SubscriptionId,
    subscription: Subscription<A>,
    state: AtomicU8,
}

impl<A: ?Sized> Slot<A> {
    fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    /// Move an active slot into `state`. Returns `false` if it already left.
    fn retire(&self, state: u8) -> bool {
        self.state
            .compare_exchange(ACTIVE, state, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether this pass may invoke the slot. Consumes one-shots.
    fn claim(&self) -> bool {
        if self.subscription.is_once() {
            self.retire(SPENT)
        } else {
            self.is_active()
        }
    }

    fn is_retained(&self) -> bool {
        self.is_active() && self.subscription.target().is_alive()
    }
}

/// Ordered collection of subscriptions for one event.
pub struct SubscriberRegistry<A: ?Sized> {
    slots: Mutex<Vec<Arc<Slot<A>>>>,
    next_id: AtomicU64,
}

impl<A: ?Sized> Default for SubscriberRegistry<A> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<A: ?Sized + 'static> SubscriberRegistry<A> {
    /// Append a subscription that fires on every enumeration.
    pub fn add_persistent<T: Any + Send + Sync>(
        &self,
        target: &Arc<T>,
        callable: Callable<A>,
    ) -> SubscriptionId {
        self.insert(Subscription::new(
            WeakHandle::new(target),
            callable,
            false,
        ))
    }

    /// Append a subscription that fires on the next enumeration only.
    pub fn add_once<T: Any + Send + Sync>(
        &self,
        target: &Arc<T>,
        callable: Callable<A>,
    ) -> SubscriptionId {
        self.insert(Subscription::new(
            WeakHandle::new(target),
            callable,
            true,
        ))
    }
}

impl<A: ?Sized> SubscriberRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Slot<A>>>> {
        // Callables never run under this lock; a poisoned guard still holds a
        // consistent list.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a prepared subscription.
    pub fn insert(&self, subscription: Subscription<A>) -> SubscriptionId {
        let id = SubscriptionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(
            subscription = %id,
            target_id = %subscription.target().id(),
            once = subscription.is_once(),
            "subscriber added"
        );
        self.lock().push(Arc::new(Slot {
            id,
            subscription,
            state: AtomicU8::new(ACTIVE),
        }));
        id
    }

    /// Remove every subscription of `target`, live or dead.
    ///
    /// Returns how many were removed. Unknown targets are a no-op.
    pub fn remove<T: ?Sized>(&self, target: &Arc<T>) -> usize {
        self.remove_target(TargetId::of(target))
    }

    /// Like [`remove`](Self::remove), by identity (works after the target died).
    pub fn remove_target(&self, target: TargetId) -> usize {
        let removed = self.remove_where(|slot| slot.subscription.target().id() == target);
        if removed > 0 {
            tracing::debug!(target_id = %target, removed, "subscriber removed");
        }
        removed
    }

    /// Remove a single registration.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.remove_where(|slot| slot.id == id) > 0
    }

    /// Drop every subscription.
    pub fn remove_all(&self) {
        let removed = self.remove_where(|_| true);
        tracing::debug!(removed, "registry cleared");
    }

    fn remove_where(&self, mut pred: impl FnMut(&Slot<A>) -> bool) -> usize {
        let mut removed = 0;
        self.lock().retain(|slot| {
            if pred(slot) {
                slot.retire(REMOVED);
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop entries whose target has died without dispatching anything.
    pub fn prune(&self) -> usize {
        let mut pruned = 0;
        self.lock().retain(|slot| {
            if slot.subscription.target().is_alive() {
                true
            } else {
                slot.retire(DEAD);
                pruned += 1;
                false
            }
        });
        pruned
    }

    /// Number of entries, including dead ones not yet pruned.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of entries whose target is still alive.
    pub fn live_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|slot| slot.subscription.target().is_alive())
            .count()
    }

    pub fn contains<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        let id = TargetId::of(target);
        self.lock()
            .iter()
            .any(|slot| slot.subscription.target().id() == id)
    }

    /// Invoke every live subscription with `args`, in insertion order.
    ///
    /// Dead entries are skipped and pruned; one-shots are removed after they
    /// fire. A panicking callable propagates to the caller; the registry is
    /// compacted on the way out.
    pub fn enumerate(&self, args: &A) -> EnumerateStats {
        let snapshot: Vec<Arc<Slot<A>>> = self.lock().clone();
        let _compact = Compaction { registry: self };
        let mut stats = EnumerateStats::default();

        for slot in &snapshot {
            if !slot.subscription.target().is_alive() {
                if slot.retire(DEAD) {
                    tracing::trace!(subscription = %slot.id, "dead subscriber pruned");
                    stats.pruned += 1;
                }
                continue;
            }
            if !slot.claim() {
                continue;
            }

            tracing::trace!(subscription = %slot.id, "invoking subscriber");
            match slot.subscription.fire(args) {
                Delivery::Invoked => {
                    stats.invoked += 1;
                    if slot.subscription.is_once() {
                        stats.spent += 1;
                    }
                }
                Delivery::TargetGone => {
                    // Target died between the liveness check and the call.
                    slot.state.store(DEAD, Ordering::Release);
                    stats.pruned += 1;
                }
                Delivery::Declined => {
                    // Can never run; drop it rather than retry on every pass.
                    slot.state.store(REMOVED, Ordering::Release);
                }
            }
        }

        stats
    }

    fn compact(&self) {
        self.lock().retain(|slot| slot.is_retained());
    }
}

struct Compaction<'a, A: ?Sized> {
    registry: &'a SubscriberRegistry<A>,
}

impl<A: ?Sized> Drop for Compaction<'_, A> {
    fn drop(&mut self) {
        self.registry.compact();
    }
}

impl<A: ?Sized> core::fmt::Debug for SubscriberRegistry<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("len", &self.len())
            .finish()
    }
}
