//! Weft aspect-weaving engine
//!
//! Takes interface contracts declared with aspect bindings and produces
//! wrappers that run the bound aspects around every call to an underlying
//! target. The target never learns the wrapper exists.
//!
//! The pipeline, setup to call:
//!
//! 1. [`InterfaceDecl`] describes an interface: members, accessor pairs,
//!    inherited interfaces, and per-member [`AspectBinding`]s.
//! 2. [`resolver::resolve`] flattens the declaration into per-method
//!    binding lists and the instance-scoped aspect slot layout.
//! 3. [`Weaver`] synthesizes one cached [`factory::WovenFactory`] per
//!    contract and hands out [`Woven`] wrapper instances.
//! 4. Each call on a bound method runs the weaving protocol: prolog,
//!    dispatch or intercept, exception pass, epilog.
//!
//! Typed facades connect user traits to the erased dispatcher through the
//! [`Contract`] trait; see the integration tests for complete examples.

mod binding;
mod interface;
mod runtime;
mod woven;

pub mod factory;
pub mod resolver;
mod weaver;

pub use binding::AspectBinding;
pub use interface::{
    arg, target_facade, EventDecl, InterfaceDecl, MemberDecl, MethodDecl, MethodInvoker,
    PropertyDecl, TargetHandle,
};
pub use weaver::{Contract, Weaver};
pub use woven::Woven;

pub use weft_sdk::{
    Aspect, AspectFactory, AspectHandle, AspectKind, AspectLifetime, CallContext, CallParameter,
    CallValue, Fault, InterceptPoint, InterceptPoints, OutcomeAspect, WeaveError,
};
