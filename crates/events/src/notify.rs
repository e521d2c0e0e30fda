//! Variable-arity notification entry point.
//!
//! `notify!` takes an event followed by zero to five positional arguments:
//!
//! - `notify!(event)` dispatches `&()`
//! - `notify!(event, a)` dispatches `&a`
//! - `notify!(event, a, b, ...)` dispatches the tuple `&(a, b, ...)`
//!
//! The event's argument type decides what is accepted; there is no arity check
//! beyond what the compiler enforces. Events typed over [`tether_core::Args`]
//! take a dynamically-sized list instead and leave arity to the subscribers.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tether_events::{notify, Event};
//!
//! let moved: Event<(i32, i32)> = Event::new();
//! let listener = Arc::new(AtomicU32::new(0));
//! moved.add(&listener, |&(x, y): &(i32, i32)| assert_eq!(x + y, 3));
//! moved.add_method(&listener, |l: &AtomicU32, _| {
//!     l.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! notify!(moved, 1, 2);
//! assert_eq!(listener.load(Ordering::SeqCst), 1);
//! ```

use crate::event::Event;
use crate::report::DispatchReport;

/// Function form of [`notify!`](crate::notify!) for a prepared argument value.
pub fn notify<A: ?Sized>(event: &Event<A>, args: &A) -> DispatchReport {
    event.dispatch(args)
}

/// Dispatch an event with zero to five positional arguments.
#[macro_export]
macro_rules! notify {
    ($event:expr $(,)?) => {
        $event.dispatch(&())
    };
    ($event:expr, $a1:expr $(,)?) => {
        $event.dispatch(&$a1)
    };
    ($event:expr, $a1:expr, $a2:expr $(,)?) => {
        $event.dispatch(&($a1, $a2))
    };
    ($event:expr, $a1:expr, $a2:expr, $a3:expr $(,)?) => {
        $event.dispatch(&($a1, $a2, $a3))
    };
    ($event:expr, $a1:expr, $a2:expr, $a3:expr, $a4:expr $(,)?) => {
        $event.dispatch(&($a1, $a2, $a3, $a4))
    };
    ($event:expr, $a1:expr, $a2:expr, $a3:expr, $a4:expr, $a5:expr $(,)?) => {
        $event.dispatch(&($a1, $a2, $a3, $a4, $a5))
    };
}
