//! Fault - a call failure carried through the weaving runtime
//!
//! A failure raised by a target method is data to the engine: it is
//! recorded in the call context, shown to Exception-point aspects, and
//! re-raised to the caller unless an aspect marks the call handled. The
//! original error travels boxed, by identity; [`Fault::recover`] takes
//! the concrete error back out at the facade boundary.

use std::error::Error as StdError;
use std::fmt;

use crate::error::WeaveError;

/// A type-erased failure from a woven call.
pub struct Fault {
    source: Box<dyn StdError + Send + Sync>,
    defect: bool,
}

impl Fault {
    /// Wrap a failure raised by the target method.
    pub fn of<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self {
            source: Box::new(error),
            defect: false,
        }
    }

    /// Wrap a failure raised by the weaving machinery itself.
    ///
    /// Defect faults signal a configuration or facade mismatch, not a
    /// target failure; correct bindings never produce one at call time.
    pub fn defect(error: WeaveError) -> Self {
        Self {
            source: Box::new(error),
            defect: true,
        }
    }

    /// True if this fault was raised by the engine rather than the target.
    pub fn is_defect(&self) -> bool {
        self.defect
    }

    /// Borrow the underlying error.
    pub fn source(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Take the concrete error back out.
    ///
    /// Returns the fault unchanged when it does not hold an `E`, so the
    /// caller can fall back to a message-level rendering.
    pub fn recover<E: StdError + Send + Sync + 'static>(self) -> Result<E, Fault> {
        let defect = self.defect;
        match self.source.downcast::<E>() {
            Ok(error) => Ok(*error),
            Err(source) => Err(Fault { source, defect }),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("source", &self.source)
            .field("defect", &self.defect)
            .finish()
    }
}
