//! `tether-events` — synchronous pub/sub with weakly-held subscribers.
//!
//! An [`Event`] keeps an ordered list of subscriptions. Each subscription
//! holds only a weak handle to the object it was registered for; once that
//! object is dropped the subscription is skipped and pruned. Events can forward
//! their notifications to other events, building a fan-out graph that is safe
//! against cycles.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tether_events::{notify, Event};
//!
//! let saved: Event = Event::named("document.saved");
//! let autosave = Event::new();
//! saved.add_forwarding(&autosave);
//!
//! let view = Arc::new(AtomicUsize::new(0));
//! autosave.add_method(&view, |v: &AtomicUsize, _| {
//!     v.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! notify!(saved);
//! drop(view);
//! let report = notify!(saved);
//! assert_eq!(report.pruned, 1);
//! ```

pub mod event;
pub mod notify;
pub mod registry;
pub mod report;
pub mod subscription;

pub use event::{Event, EventConfig, WeakEvent};
pub use notify::notify;
pub use registry::SubscriberRegistry;
pub use report::{DispatchReport, EnumerateStats};
pub use subscription::{Callable, Delivery, Subscription};

pub use tether_core::{Args, EventId, SubscriptionId, TargetId, TetherError, TetherResult, args};
