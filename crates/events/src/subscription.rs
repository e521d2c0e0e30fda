//! One registration: who is listening, what to call, and how often.

use std::any::Any;
use std::sync::Arc;

use tether_core::{Target, WeakHandle};

/// Callback invoked with the resolved (erased) target.
///
/// Returns `false` if it declined the target (wrong type) and did not run.
pub type MethodFn<A> = dyn Fn(&Target, &A) -> bool + Send + Sync;

/// Callback invoked with the arguments only.
pub type ClosureFn<A> = dyn Fn(&A) + Send + Sync;

/// What a subscription calls when its event fires.
///
/// Both variants only run while the subscription's target is alive; they
/// differ in whether the target is handed to the callback.
pub enum Callable<A: ?Sized> {
    /// A method on the target: receives the live target plus the arguments.
    Method(Arc<MethodFn<A>>),
    /// A free-standing closure owned on behalf of the target.
    Closure(Arc<ClosureFn<A>>),
}

impl<A: ?Sized + 'static> Callable<A> {
    /// Wrap a typed method so it can be stored next to methods of other types.
    ///
    /// The wrapper declines a target that is not a `T`. The constructors on
    /// [`Subscription`] pair it with a `T` handle so that cannot happen.
    pub fn method<T: Any + Send + Sync>(method: fn(&T, &A)) -> Self {
        Self::Method(Arc::new(move |target: &Target, args: &A| {
            match target.downcast_ref::<T>() {
                Some(target) => {
                    method(target, args);
                    true
                }
                None => {
                    tracing::warn!(
                        expected = core::any::type_name::<T>(),
                        "method target type mismatch; skipped"
                    );
                    false
                }
            }
        }))
    }

    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }
}

impl<A: ?Sized> Callable<A> {
    /// Run the callable. Returns `false` if a method declined the target.
    pub fn invoke(&self, target: &Target, args: &A) -> bool {
        match self {
            Self::Method(f) => f(target, args),
            Self::Closure(f) => {
                f(args);
                true
            }
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

impl<A: ?Sized> Clone for Callable<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Method(f) => Self::Method(Arc::clone(f)),
            Self::Closure(f) => Self::Closure(Arc::clone(f)),
        }
    }
}

impl<A: ?Sized> core::fmt::Debug for Callable<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Callable::Method"),
            Self::Closure(_) => f.write_str("Callable::Closure"),
        }
    }
}

/// What happened when a [`Subscription`] was fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The callable ran.
    Invoked,
    /// The target was gone; nothing ran.
    TargetGone,
    /// The target was alive but a method callable declined it.
    Declined,
}

/// An immutable registration record.
///
/// Holds only a weak handle to its target. Whether it is kept, fired or
/// dropped is decided by the registry that owns it.
pub struct Subscription<A: ?Sized> {
    target: WeakHandle,
    callable: Callable<A>,
    once: bool,
}

impl<A: ?Sized + 'static> Subscription<A> {
    pub fn new(target: WeakHandle, callable: Callable<A>, once: bool) -> Self {
        Self {
            target,
            callable,
            once,
        }
    }

    /// Subscribe a method of `target`.
    pub fn method<T: Any + Send + Sync>(target: &Arc<T>, method: fn(&T, &A), once: bool) -> Self {
        Self::new(WeakHandle::new(target), Callable::method(method), once)
    }

    /// Subscribe a closure whose lifetime is tied to `target`.
    pub fn closure<T, F>(target: &Arc<T>, f: F, once: bool) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::new(WeakHandle::new(target), Callable::closure(f), once)
    }
}

impl<A: ?Sized> Subscription<A> {
    pub fn target(&self) -> &WeakHandle {
        &self.target
    }

    pub fn callable(&self) -> &Callable<A> {
        &self.callable
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Invoke the callable if the target is still alive.
    ///
    /// The target is kept alive for the duration of the call.
    pub fn fire(&self, args: &A) -> Delivery {
        match self.target.resolve() {
            Some(target) if self.callable.invoke(&*target, args) => Delivery::Invoked,
            Some(_) => Delivery::Declined,
            None => Delivery::TargetGone,
        }
    }
}

impl<A: ?Sized> core::fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .field("callable", &self.callable)
            .field("once", &self.once)
            .finish()
    }
}
