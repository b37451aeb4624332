//! Interface declarations: the declarative binding surface
//!
//! An [`InterfaceDecl`] is the erased description of one interface: its
//! methods (name, ordered parameter names, return shape, target invoker,
//! bindings), its properties and events (which synthesize accessor
//! methods at resolution time), and the interfaces it extends.
//!
//! Properties and events own their bindings; the accessor methods
//! generated for them carry none of their own and inherit the owner's
//! list during resolution.

use std::any::{Any, TypeId};
use std::sync::Arc;

use weft_sdk::{CallValue, Fault, WeaveError};

use crate::binding::AspectBinding;

/// Erased handle to the wrapped target. Holds the facade value declared
/// by the interface, for example an `Arc<dyn Sessions>`.
pub type TargetHandle = Arc<dyn Any + Send + Sync>;

/// Closure performing the real target call for one method: downcast the
/// handle, extract the arguments, call the trait method, erase the
/// result.
pub type MethodInvoker =
    Arc<dyn Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault> + Send + Sync>;

/// Borrow the declared facade value out of a target handle.
///
/// Invokers use this as their first step; the handle type was already
/// checked when the wrapper was constructed, so a failure here means the
/// declaration and the wrapper disagree.
pub fn target_facade<'a, F: Send + Sync + 'static>(
    target: &'a TargetHandle,
    interface: &'static str,
) -> Result<&'a F, Fault> {
    target.downcast_ref::<F>().ok_or_else(|| {
        Fault::defect(WeaveError::TargetMismatch {
            interface,
            facade: std::any::type_name::<F>(),
        })
    })
}

/// Borrow argument `index` as a `T`, faulting on a missing or mistyped
/// slot.
pub fn arg<'a, T: Any>(
    args: &'a [CallValue],
    index: usize,
    method: &str,
) -> Result<&'a T, Fault> {
    args.get(index)
        .and_then(|value| value.downcast_ref::<T>())
        .ok_or_else(|| {
            Fault::defect(WeaveError::ParameterType {
                method: method.to_string(),
                index,
                expected: std::any::type_name::<T>(),
            })
        })
}

/// Declaration of one interface method.
pub struct MethodDecl {
    pub(crate) name: &'static str,
    pub(crate) param_names: Vec<&'static str>,
    pub(crate) has_return: bool,
    pub(crate) invoker: MethodInvoker,
    pub(crate) bindings: Vec<AspectBinding>,
}

impl MethodDecl {
    /// Declare a value-returning method. Use [`MethodDecl::void`] for
    /// methods without a return value.
    pub fn new(
        name: &'static str,
        param_names: &[&'static str],
        invoker: impl Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name,
            param_names: param_names.to_vec(),
            has_return: true,
            invoker: Arc::new(invoker),
            bindings: Vec::new(),
        }
    }

    /// Mark the method as returning nothing.
    pub fn void(mut self) -> Self {
        self.has_return = false;
        self
    }

    /// Attach a binding. Declaration order is invocation order.
    pub fn bind(mut self, binding: AspectBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// Declaration of a property: a getter, an optional setter, and the
/// bindings both accessors inherit.
pub struct PropertyDecl {
    pub(crate) name: &'static str,
    pub(crate) getter: MethodInvoker,
    pub(crate) setter: Option<MethodInvoker>,
    pub(crate) bindings: Vec<AspectBinding>,
}

impl PropertyDecl {
    /// Declare a readable property.
    pub fn new(
        name: &'static str,
        getter: impl Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name,
            getter: Arc::new(getter),
            setter: None,
            bindings: Vec::new(),
        }
    }

    /// Add a setter accessor.
    pub fn with_setter(
        mut self,
        setter: impl Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Attach a binding, inherited by both accessors.
    pub fn bind(mut self, binding: AspectBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// Declaration of an event: subscribe/unsubscribe accessors and the
/// bindings both inherit.
pub struct EventDecl {
    pub(crate) name: &'static str,
    pub(crate) subscribe: MethodInvoker,
    pub(crate) unsubscribe: Option<MethodInvoker>,
    pub(crate) bindings: Vec<AspectBinding>,
}

impl EventDecl {
    /// Declare an event with its subscribe accessor.
    pub fn new(
        name: &'static str,
        subscribe: impl Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name,
            subscribe: Arc::new(subscribe),
            unsubscribe: None,
            bindings: Vec::new(),
        }
    }

    /// Add an unsubscribe accessor.
    pub fn with_unsubscribe(
        mut self,
        unsubscribe: impl Fn(&TargetHandle, &[CallValue]) -> Result<CallValue, Fault>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.unsubscribe = Some(Arc::new(unsubscribe));
        self
    }

    /// Attach a binding, inherited by both accessors.
    pub fn bind(mut self, binding: AspectBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// One declared interface member.
pub enum MemberDecl {
    /// A plain method
    Method(MethodDecl),
    /// A property with accessor methods
    Property(PropertyDecl),
    /// An event with accessor methods
    Event(EventDecl),
}

/// The erased description of one interface and its binding topology.
pub struct InterfaceDecl {
    pub(crate) name: &'static str,
    pub(crate) facade_type: TypeId,
    pub(crate) facade_type_name: &'static str,
    pub(crate) members: Vec<MemberDecl>,
    pub(crate) extends: Vec<InterfaceDecl>,
}

impl InterfaceDecl {
    /// Start a declaration for an interface whose wrappers hand out a
    /// facade of type `F` (typically `Arc<dyn Trait>`).
    pub fn new<F: Send + Sync + 'static>(name: &'static str) -> Self {
        Self {
            name,
            facade_type: TypeId::of::<F>(),
            facade_type_name: std::any::type_name::<F>(),
            members: Vec::new(),
            extends: Vec::new(),
        }
    }

    /// Declare a method.
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.members.push(MemberDecl::Method(method));
        self
    }

    /// Declare a property.
    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.members.push(MemberDecl::Property(property));
        self
    }

    /// Declare an event.
    pub fn event(mut self, event: EventDecl) -> Self {
        self.members.push(MemberDecl::Event(event));
        self
    }

    /// Fold in an inherited interface. The parent declaration must be
    /// built against the same facade type; resolution rejects mismatches.
    pub fn extends(mut self, parent: InterfaceDecl) -> Self {
        self.extends.push(parent);
        self
    }

    /// Interface name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}
