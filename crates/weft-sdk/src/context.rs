//! CallContext - the per-invocation record shared with aspects
//!
//! One context is built per woven call and dropped when the call returns.
//! Aspects read the method identity and the captured arguments, annotate
//! the handled flag, and (at the Intercept point) drive the target through
//! [`CallContext::proceed`]. The context is never shared across calls, so
//! it needs no synchronization of its own.

use std::fmt;
use std::time::Instant;

use crate::error::WeaveError;
use crate::fault::Fault;
use crate::value::CallValue;

/// Reserved parameter name holding a non-void outcome during the Epilog
/// pass.
pub const RETURN_VALUE_NAME: &str = "weft:return-value";

/// A named argument captured for one invocation.
#[derive(Clone, Debug)]
pub struct CallParameter {
    name: &'static str,
    value: CallValue,
}

impl CallParameter {
    /// Parameter name as declared on the interface.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The captured value.
    pub fn value(&self) -> &CallValue {
        &self.value
    }
}

/// Zero-argument callable that performs the real target invocation.
///
/// Installed only when an Intercept binding exists; the intercepting
/// aspect owns whether, when, and how many times it runs.
pub type InterceptDelegate = Box<dyn FnMut() -> Result<CallValue, Fault> + Send>;

/// The per-invocation record handed to every aspect.
pub struct CallContext {
    member_name: String,
    declaring_interface: &'static str,
    target_type: &'static str,
    has_return: bool,
    started_at: Instant,
    parameters: Vec<CallParameter>,
    outcome: Option<CallValue>,
    fault: Option<Fault>,
    handled: bool,
    manipulated: bool,
    delegate: Option<InterceptDelegate>,
}

impl CallContext {
    /// Build an empty context for one invocation of `member_name`.
    pub fn new(
        member_name: impl Into<String>,
        declaring_interface: &'static str,
        target_type: &'static str,
        has_return: bool,
    ) -> Self {
        Self {
            member_name: member_name.into(),
            declaring_interface,
            target_type,
            has_return,
            started_at: Instant::now(),
            parameters: Vec::new(),
            outcome: None,
            fault: None,
            handled: false,
            manipulated: false,
            delegate: None,
        }
    }

    /// Fully qualified member name, `Interface.method`.
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Name of the interface declaring the member.
    pub fn declaring_interface(&self) -> &'static str {
        self.declaring_interface
    }

    /// Type name of the concrete target behind the wrapper.
    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    /// True for methods declared without a return value.
    pub fn is_void(&self) -> bool {
        !self.has_return
    }

    /// Instant the context was constructed, before any aspect ran.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Append a named argument. Names are unique per context.
    pub fn add_parameter(&mut self, name: &'static str, value: CallValue) -> Result<(), WeaveError> {
        if self.parameters.iter().any(|p| p.name == name) {
            return Err(WeaveError::DuplicateParameter {
                member: self.member_name.clone(),
                name: name.to_string(),
            });
        }
        self.parameters.push(CallParameter { name, value });
        Ok(())
    }

    /// Look a parameter up by name.
    pub fn parameter(&self, name: &str) -> Option<&CallValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// All parameters, in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = &CallParameter> {
        self.parameters.iter()
    }

    /// Record the outcome under the reserved return-value parameter.
    pub fn record_return_value(&mut self, value: CallValue) -> Result<(), WeaveError> {
        if self.parameters.iter().any(|p| p.name == RETURN_VALUE_NAME) {
            return Err(WeaveError::DuplicateParameter {
                member: self.member_name.clone(),
                name: RETURN_VALUE_NAME.to_string(),
            });
        }
        self.parameters.push(CallParameter {
            name: RETURN_VALUE_NAME,
            value,
        });
        Ok(())
    }

    /// The recorded return value, if the Epilog pass has one.
    pub fn return_value(&self) -> Option<&CallValue> {
        self.parameter(RETURN_VALUE_NAME)
    }

    /// True when the method returns a value and one has been recorded.
    /// Always false for void methods.
    pub fn has_return_value(&self) -> bool {
        self.has_return && self.return_value().map_or(false, |v| !v.is_void())
    }

    // ========================================================================
    // Outcome and fault slots
    // ========================================================================

    /// The current outcome value, when dispatch (or a replacement) set one.
    pub fn outcome(&self) -> Option<&CallValue> {
        self.outcome.as_ref()
    }

    /// Record the outcome value. Used by the weaving runtime and by
    /// outcome replacement.
    pub fn set_outcome(&mut self, value: CallValue) {
        self.outcome = Some(value);
    }

    /// Detach the outcome value.
    pub fn take_outcome(&mut self) -> Option<CallValue> {
        self.outcome.take()
    }

    /// The recorded failure, present during the Exception pass.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Record a failure. Used by the weaving runtime.
    pub fn set_fault(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    /// Detach the recorded failure for propagation. Used by the weaving
    /// runtime after the Exception pass.
    pub fn take_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    // ========================================================================
    // Flags
    // ========================================================================

    /// True once an Exception-point aspect has claimed the failure.
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Mark the recorded failure handled; the call then completes instead
    /// of re-raising.
    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }

    /// True once an outcome-replacing aspect has supplied the outcome.
    pub fn is_manipulated(&self) -> bool {
        self.manipulated
    }

    /// Flag outcome replacement. Set by the engine whenever
    /// `replace_outcome` succeeds.
    pub fn set_manipulated(&mut self, manipulated: bool) {
        self.manipulated = manipulated;
    }

    // ========================================================================
    // Intercept delegate
    // ========================================================================

    /// Install the target-invocation delegate. Present only on calls with
    /// an Intercept binding.
    pub fn set_intercept_delegate(&mut self, delegate: InterceptDelegate) {
        self.delegate = Some(delegate);
    }

    /// True when an intercept delegate is installed.
    pub fn can_proceed(&self) -> bool {
        self.delegate.is_some()
    }

    /// Run the real target invocation with the originally captured
    /// arguments. May be called any number of times, including zero.
    pub fn proceed(&mut self) -> Result<CallValue, Fault> {
        match self.delegate.as_mut() {
            Some(delegate) => delegate(),
            None => Err(Fault::defect(WeaveError::NoDelegate {
                member: self.member_name.clone(),
            })),
        }
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("member_name", &self.member_name)
            .field("target_type", &self.target_type)
            .field("parameters", &self.parameters)
            .field("outcome", &self.outcome)
            .field("fault", &self.fault)
            .field("handled", &self.handled)
            .field("manipulated", &self.manipulated)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}
