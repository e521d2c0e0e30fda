//! `tether-core` — leaf primitives for weak-subscriber events.
//!
//! This crate contains no dispatch logic: only the non-owning handle used to
//! track subscriber liveness, identifiers, dynamic argument lists and the
//! shared error type.

pub mod args;
pub mod error;
pub mod handle;
pub mod id;

pub use args::Args;
pub use error::{TetherError, TetherResult};
pub use handle::{Target, WeakHandle};
pub use id::{EventId, SubscriptionId, TargetId};
