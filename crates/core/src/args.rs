//! Dynamically-typed argument lists.
//!
//! Most events carry a concrete argument type. [`Args`] is for events whose
//! payload shape is decided by the caller at notify time: an ordered sequence
//! of opaque values, read back positionally by type.
//!
//! ```
//! use tether_core::{args, Args};
//!
//! let a: Args = args![42u32, String::from("hello")];
//! assert_eq!(*a.get::<u32>(0).unwrap(), 42);
//! assert_eq!(a.get::<String>(1).unwrap(), "hello");
//! assert!(a.get::<u32>(2).is_err());
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::{TetherError, TetherResult};

type Value = Arc<dyn Any + Send + Sync>;

/// Ordered list of opaque argument values.
///
/// Cloning is cheap; values are shared.
#[derive(Clone, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read the value at `index` as a `T`.
    pub fn get<T: Any>(&self, index: usize) -> TetherResult<&T> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| TetherError::missing_argument(index, self.len()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| TetherError::argument_type::<T>(index))
    }

    /// Whether the value at `index` exists and is a `T`.
    pub fn is<T: Any>(&self, index: usize) -> bool {
        self.get::<T>(index).is_ok()
    }
}

impl core::fmt::Debug for Args {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Args").field("len", &self.len()).finish()
    }
}

/// Build an [`Args`] from a list of values.
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new()$(.with($value))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn reads_values_positionally() {
        let a = args![1u8, "two", 3.0f64];
        assert_eq!(a.len(), 3);
        assert_eq!(*a.get::<u8>(0).unwrap(), 1);
        assert_eq!(*a.get::<&'static str>(1).unwrap(), "two");
        assert_eq!(*a.get::<f64>(2).unwrap(), 3.0);
    }

    #[test]
    fn reports_arity_mismatch() {
        let a = args![1u8];
        assert_eq!(
            a.get::<u8>(1).unwrap_err(),
            TetherError::MissingArgument { index: 1, len: 1 }
        );
    }

    #[test]
    fn reports_type_mismatch() {
        let a = args![1u8];
        let err = a.get::<String>(0).unwrap_err();
        assert!(matches!(err, TetherError::ArgumentType { index: 0, .. }));
        assert!(!a.is::<String>(0));
        assert!(a.is::<u8>(0));
    }

    #[test]
    fn empty_macro_builds_empty_list() {
        let a: Args = args![];
        assert!(a.is_empty());
    }

    #[test]
    fn clones_share_values() {
        let a = args![String::from("shared")];
        let b = a.clone();
        assert!(std::ptr::eq(
            a.get::<String>(0).unwrap(),
            b.get::<String>(0).unwrap()
        ));
    }
}
