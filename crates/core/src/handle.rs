//! Non-owning observer handles.
//!
//! A [`WeakHandle`] answers one question: is the object it was created from
//! still alive? If so it can hand back a strong reference for the duration of a
//! call. It never contributes to the object's lifetime.
//!
//! Handles are type-erased so a single registry can observe targets of
//! unrelated types. [`WeakHandle::resolve_as`] recovers the concrete type.

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::id::TargetId;

/// Anything that can be observed by a [`WeakHandle`].
pub type Target = dyn Any + Send + Sync;

impl TargetId {
    /// Identity of the allocation behind `target`.
    pub fn of<T: ?Sized>(target: &Arc<T>) -> Self {
        Self::from_addr(Arc::as_ptr(target).cast::<()>() as usize)
    }
}

/// Weak (non-owning) reference to a subscription target.
#[derive(Clone)]
pub struct WeakHandle {
    inner: Weak<Target>,
    id: TargetId,
}

impl WeakHandle {
    /// Observe `target` without keeping it alive.
    pub fn new<T: Any + Send + Sync>(target: &Arc<T>) -> Self {
        let inner: Weak<T> = Arc::downgrade(target);
        let inner: Weak<Target> = inner;
        Self {
            inner,
            id: TargetId::of(target),
        }
    }

    /// `false` once every strong owner of the target has been dropped.
    ///
    /// Once a handle reports dead it stays dead.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Borrow the target for the duration of a call.
    ///
    /// Returns `None` once the target is gone.
    pub fn resolve(&self) -> Option<Arc<Target>> {
        self.inner.upgrade()
    }

    /// Like [`resolve`](Self::resolve), recovering the concrete type.
    ///
    /// Returns `None` if the target is gone or is not a `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.resolve()?.downcast::<T>().ok()
    }

    /// Identity of the observed allocation; stable after the target dies.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Whether this handle was created from `target` (alive or not).
    pub fn refers_to<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        self.id == TargetId::of(target)
    }
}

impl PartialEq for WeakHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WeakHandle {}

impl core::fmt::Debug for WeakHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeakHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
