//! Woven: one wrapper instance around one target
//!
//! A `Woven` pairs a cached dispatch plan with a concrete target handle
//! and this wrapper's own instance-scoped aspect slots. Typed facades
//! hold one and forward every trait method into [`Woven::invoke`].

use std::sync::Arc;

use weft_sdk::{AspectHandle, CallValue, Fault, WeaveError};

use crate::factory::WovenFactory;
use crate::interface::TargetHandle;
use crate::runtime;

/// A wrapper instance: target, shared aspect slots, dispatch plan.
pub struct Woven {
    factory: Arc<WovenFactory>,
    target: TargetHandle,
    target_type: &'static str,
    instance_aspects: Box<[AspectHandle]>,
}

impl Woven {
    /// Wire a target handle to a synthesized factory.
    ///
    /// The handle must hold exactly the facade type the interface was
    /// declared for; anything else is a binding error, not a silent
    /// pass-through.
    pub(crate) fn new(
        factory: Arc<WovenFactory>,
        target: TargetHandle,
        target_type: &'static str,
    ) -> Result<Self, WeaveError> {
        if (*target).type_id() != factory.facade_type() {
            return Err(WeaveError::TargetMismatch {
                interface: factory.interface(),
                facade: factory.facade_type_name(),
            });
        }
        let instance_aspects = factory.instantiate_instance_aspects();
        Ok(Self {
            factory,
            target,
            target_type,
            instance_aspects,
        })
    }

    /// Interface this wrapper implements.
    pub fn interface(&self) -> &'static str {
        self.factory.interface()
    }

    /// Type name recorded for the concrete target.
    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    /// Dispatch one call by method name.
    ///
    /// Bound methods run the weaving protocol; unbound methods forward
    /// straight to the target with no context construction.
    pub fn invoke(&self, method: &str, args: &[CallValue]) -> Result<CallValue, Fault> {
        let plan = self.factory.plan(method).ok_or_else(|| {
            Fault::defect(WeaveError::UnknownMethod {
                interface: self.factory.interface(),
                method: method.to_string(),
            })
        })?;

        if !plan.is_bound() {
            return (plan.invoker)(&self.target, args);
        }

        runtime::execute(
            plan,
            &self.target,
            self.target_type,
            &self.instance_aspects,
            args,
        )
    }
}
