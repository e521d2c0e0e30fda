//! Error model shared by the tether crates.

use thiserror::Error;

/// Result type used across the tether crates.
pub type TetherResult<T> = Result<T, TetherError>;

/// Tether-level error.
///
/// Dead subscribers and removals of unknown targets are *not* errors; they are
/// silently pruned or ignored. What remains are caller mistakes that can be
/// surfaced as values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TetherError {
    /// A positional argument was requested past the end of the argument list.
    #[error("missing argument {index} (only {len} supplied)")]
    MissingArgument { index: usize, len: usize },

    /// A positional argument exists but holds a different type.
    #[error("argument {index} is not a `{expected}`")]
    ArgumentType {
        index: usize,
        expected: &'static str,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl TetherError {
    pub fn missing_argument(index: usize, len: usize) -> Self {
        Self::MissingArgument { index, len }
    }

    pub fn argument_type<T: ?Sized>(index: usize) -> Self {
        Self::ArgumentType {
            index,
            expected: core::any::type_name::<T>(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
