//! CallValue - type-erased argument and return values
//!
//! Arguments and return values cross the weaving boundary type-erased so
//! one wrapper implementation can serve every method of an interface.
//! Cloning is cheap (the payload is shared), and the distinguished void
//! value stands in wherever no value exists: void returns, suppressed
//! failures, unset outcome slots.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased value flowing through a woven call.
#[derive(Clone)]
pub struct CallValue {
    payload: Option<Arc<dyn Any + Send + Sync>>,
    type_name: &'static str,
}

impl CallValue {
    /// Erase a concrete value.
    pub fn of<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            payload: Some(Arc::new(value)),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The absent value: void returns and empty outcome slots.
    pub fn void() -> Self {
        Self {
            payload: None,
            type_name: "()",
        }
    }

    /// True if this is the void value.
    pub fn is_void(&self) -> bool {
        self.payload.is_none()
    }

    /// Borrow the payload as `T`, if this value holds a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    /// Take a shared handle to the payload as `T`, if this value holds a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let payload = self.payload.as_ref()?.clone();
        payload.downcast::<T>().ok()
    }

    /// Name of the erased type, as captured at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Default for CallValue {
    fn default() -> Self {
        Self::void()
    }
}

impl fmt::Debug for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            write!(f, "CallValue::Void")
        } else {
            write!(f, "CallValue({})", self.type_name)
        }
    }
}
