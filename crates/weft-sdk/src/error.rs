//! Configuration-shape errors raised by the weaving engine
//!
//! All of these describe a defect in bindings, declarations, or facade
//! wiring. They surface at declaration, synthesis, or wrap time wherever
//! possible; the call-time variants never fire from a validated dispatch
//! plan.

use thiserror::Error;

/// Errors raised while declaring, resolving, or wiring woven interfaces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeaveError {
    /// An observer-only aspect was declared as outcome-replacing
    #[error("aspect '{aspect}' cannot replace outcomes")]
    NotOutcomeCapable {
        /// Aspect type name
        aspect: &'static str,
    },

    /// An Intercept binding that does not declare outcome replacement
    #[error("aspect '{aspect}' is bound as Intercept but does not replace outcomes")]
    InterceptNotReplacing {
        /// Aspect type name
        aspect: &'static str,
    },

    /// An inherited declaration was built against a different facade type
    #[error("interface '{interface}' extends '{parent}' declared for a different facade type")]
    FacadeMismatch {
        /// Interface being resolved
        interface: &'static str,
        /// Offending parent interface
        parent: &'static str,
    },

    /// The same member name reached the flattened member set twice
    #[error("interface '{interface}' resolves member '{member}' more than once")]
    DuplicateMember {
        /// Interface being resolved
        interface: &'static str,
        /// Duplicated member name
        member: String,
    },

    /// Two parameters with the same name added to one call context
    #[error("context for '{member}' already contains parameter '{name}'")]
    DuplicateParameter {
        /// Member the context was built for
        member: String,
        /// Duplicated parameter name
        name: String,
    },

    /// More than one Intercept binding on a single method
    #[error("method '{method}' has more than one intercepting aspect")]
    MultipleInterceptors {
        /// Fully qualified method name
        method: String,
    },

    /// The target handle does not hold the declared facade type
    #[error("target for interface '{interface}' is not a '{facade}' handle")]
    TargetMismatch {
        /// Interface the wrapper was requested for
        interface: &'static str,
        /// Declared facade type name
        facade: &'static str,
    },

    /// A facade asked for a method the dispatch plan does not know
    #[error("interface '{interface}' has no method '{method}'")]
    UnknownMethod {
        /// Interface name
        interface: &'static str,
        /// Requested method name
        method: String,
    },

    /// Argument count does not match the declared parameter list
    #[error("method '{method}' takes {expected} argument(s), got {actual}")]
    ParameterCount {
        /// Fully qualified method name
        method: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// An argument did not hold the type the invoker expected
    #[error("method '{method}' argument {index} is not a '{expected}'")]
    ParameterType {
        /// Fully qualified method name
        method: String,
        /// Zero-based argument position
        index: usize,
        /// Expected payload type name
        expected: &'static str,
    },

    /// `proceed` called on a context without an intercept delegate
    #[error("context for '{member}' has no intercept delegate")]
    NoDelegate {
        /// Member the context was built for
        member: String,
    },
}
