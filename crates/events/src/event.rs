//! Event nodes and the forwarding graph.
//!
//! An [`Event`] owns one [`SubscriberRegistry`] and a set of forwarding edges
//! to other events. Dispatch runs the local registry, then every forwarded
//! event, depth-first in edge order. The walk uses an explicit work stack, so
//! arbitrarily long forwarding chains do not grow the call stack.
//!
//! ```text
//! dispatch(A)
//!   ├─ A.registry.enumerate(args)
//!   ├─ B (A -> B) ── B.registry, then B's edges
//!   └─ C (A -> C) ── C.registry, then C's edges
//! ```
//!
//! Forwarding edges are weak: an event never keeps the events it forwards to
//! alive, and a dead edge is skipped and pruned on the next dispatch. Edges
//! may form cycles; a visited set threaded through one dispatch call makes
//! sure every node runs at most once per call.

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tether_core::{EventId, SubscriptionId};

use crate::registry::SubscriberRegistry;
use crate::report::DispatchReport;
use crate::subscription::{Callable, Subscription};

/// Construction options for an [`Event`].
#[derive(Debug, Clone, Default)]
pub struct EventConfig {
    /// Label attached to dispatch spans.
    pub name: Option<String>,
}

impl EventConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

struct EventNode<A: ?Sized> {
    id: EventId,
    name: Option<String>,
    registry: SubscriberRegistry<A>,
    forwarding: Mutex<Vec<Weak<EventNode<A>>>>,
}

impl<A: ?Sized> EventNode<A> {
    fn forwarding(&self) -> MutexGuard<'_, Vec<Weak<EventNode<A>>>> {
        self.forwarding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the local registry inside this node's dispatch span.
    fn notify_local(&self, args: &A, report: &mut DispatchReport) {
        let _span = tracing::trace_span!(
            "dispatch",
            event = %self.id,
            name = self.name.as_deref()
        )
        .entered();

        report.events_visited += 1;
        report.absorb(self.registry.enumerate(args));
    }

    /// Upgrade the forwarding edges, dropping the dead ones.
    fn live_forwards(&self, report: &mut DispatchReport) -> Vec<Arc<EventNode<A>>> {
        let mut edges = self.forwarding();
        let mut live = Vec::with_capacity(edges.len());
        edges.retain(|edge| match edge.upgrade() {
            Some(node) => {
                live.push(node);
                true
            }
            None => {
                tracing::trace!(event = %self.id, "dead forwarding edge pruned");
                report.forwarding_pruned += 1;
                false
            }
        });
        live
    }
}

/// A dispatch point other code can subscribe to or forward from.
///
/// `Event` is a cheap handle; clones refer to the same node. The node is
/// destroyed when the last handle is dropped, taking its registry and
/// forwarding set with it.
///
/// `A` is the argument type handed (by reference) to every subscriber.
pub struct Event<A: ?Sized = ()> {
    node: Arc<EventNode<A>>,
}

impl<A: ?Sized> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<A: ?Sized> Default for Event<A> {
    fn default() -> Self {
        Self::with_config(EventConfig::default())
    }
}

impl<A: ?Sized> Event<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(EventConfig::default().with_name(name))
    }

    pub fn with_config(config: EventConfig) -> Self {
        Self {
            node: Arc::new(EventNode {
                id: EventId::new(),
                name: config.name,
                registry: SubscriberRegistry::new(),
                forwarding: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> EventId {
        self.node.id
    }

    pub fn name(&self) -> Option<&str> {
        self.node.name.as_deref()
    }

    /// The local subscriber registry.
    pub fn registry(&self) -> &SubscriberRegistry<A> {
        &self.node.registry
    }

    /// Unsubscribe every registration of `target` from this event.
    ///
    /// Local only: events this one forwards to keep their own subscriptions.
    pub fn remove<T: ?Sized>(&self, target: &Arc<T>) -> usize {
        self.node.registry.remove(target)
    }

    /// Remove a single registration by the id `add`/`once` returned.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.node.registry.unsubscribe(id)
    }

    /// Forward every dispatch of this event to `other`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_forwarding(&self, other: &Event<A>) -> bool {
        let mut edges = self.node.forwarding();
        edges.retain(|edge| edge.strong_count() > 0);
        if edges.iter().any(|edge| Self::is_edge_to(edge, other)) {
            return false;
        }
        edges.push(Arc::downgrade(&other.node));
        tracing::debug!(from = %self.id(), to = %other.id(), "forwarding added");
        true
    }

    /// Stop forwarding to `other`. Unknown edges are a no-op.
    pub fn remove_forwarding(&self, other: &Event<A>) -> bool {
        let mut edges = self.node.forwarding();
        let before = edges.len();
        edges.retain(|edge| !Self::is_edge_to(edge, other));
        let removed = edges.len() != before;
        if removed {
            tracing::debug!(from = %self.id(), to = %other.id(), "forwarding removed");
        }
        removed
    }

    /// Reset the event: no subscribers, no forwarding edges.
    pub fn remove_all_targets_and_forwarding(&self) {
        self.node.registry.remove_all();
        self.node.forwarding().clear();
    }

    /// Registrations held locally, including dead ones not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.node.registry.len()
    }

    /// Forwarding edges whose downstream event is still alive.
    pub fn forwarding_count(&self) -> usize {
        self.node
            .forwarding()
            .iter()
            .filter(|edge| edge.strong_count() > 0)
            .count()
    }

    pub fn is_subscribed<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        self.node.registry.contains(target)
    }

    pub fn forwards_to(&self, other: &Event<A>) -> bool {
        self.node
            .forwarding()
            .iter()
            .any(|edge| Self::is_edge_to(edge, other))
    }

    /// Whether both handles refer to the same event node.
    pub fn ptr_eq(&self, other: &Event<A>) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub fn downgrade(&self) -> WeakEvent<A> {
        WeakEvent {
            node: Arc::downgrade(&self.node),
        }
    }

    /// Notify the local subscribers, then every forwarded event.
    ///
    /// Each event node in the graph runs at most once per call, whatever the
    /// shape of the graph. A panicking subscriber aborts the rest of the call
    /// and propagates.
    pub fn dispatch(&self, args: &A) -> DispatchReport {
        let mut visited: HashSet<EventId> = HashSet::new();
        let mut report = DispatchReport::default();
        // Explicit work stack: graph depth must not grow the call stack.
        let mut pending = vec![Arc::clone(&self.node)];

        while let Some(node) = pending.pop() {
            if !visited.insert(node.id) {
                continue;
            }
            node.notify_local(args, &mut report);
            // Reversed so the first edge is visited next (depth-first, edge order).
            pending.extend(node.live_forwards(&mut report).into_iter().rev());
        }

        report
    }

    fn is_edge_to(edge: &Weak<EventNode<A>>, other: &Event<A>) -> bool {
        std::ptr::eq(edge.as_ptr(), Arc::as_ptr(&other.node))
    }
}

impl<A: ?Sized + 'static> Event<A> {
    /// Subscribe `callback` to every notification, for as long as `target` lives.
    pub fn add<T, F>(&self, target: &Arc<T>, callback: F) -> SubscriptionId
    where
        T: Any + Send + Sync,
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.node
            .registry
            .add_persistent(target, Callable::closure(callback))
    }

    /// Subscribe a method of `target` to every notification.
    pub fn add_method<T: Any + Send + Sync>(
        &self,
        target: &Arc<T>,
        method: fn(&T, &A),
    ) -> SubscriptionId {
        self.node
            .registry
            .add_persistent(target, Callable::method(method))
    }

    /// Subscribe `callback` to the next notification only.
    pub fn once<T, F>(&self, target: &Arc<T>, callback: F) -> SubscriptionId
    where
        T: Any + Send + Sync,
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.node
            .registry
            .add_once(target, Callable::closure(callback))
    }

    /// Subscribe a method of `target` to the next notification only.
    pub fn once_method<T: Any + Send + Sync>(
        &self,
        target: &Arc<T>,
        method: fn(&T, &A),
    ) -> SubscriptionId {
        self.node.registry.add_once(target, Callable::method(method))
    }

    /// Register a prepared subscription.
    pub fn subscribe(&self, subscription: Subscription<A>) -> SubscriptionId {
        self.node.registry.insert(subscription)
    }
}

impl<A: ?Sized> core::fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("subscribers", &self.subscriber_count())
            .field("forwarding", &self.forwarding_count())
            .finish()
    }
}

/// Non-owning handle to an [`Event`].
///
/// Lets a subscriber refer back to an event without keeping it alive.
pub struct WeakEvent<A: ?Sized = ()> {
    node: Weak<EventNode<A>>,
}

impl<A: ?Sized> WeakEvent<A> {
    pub fn upgrade(&self) -> Option<Event<A>> {
        self.node.upgrade().map(|node| Event { node })
    }

    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }
}

impl<A: ?Sized> Clone for WeakEvent<A> {
    fn clone(&self) -> Self {
        Self {
            node: Weak::clone(&self.node),
        }
    }
}
