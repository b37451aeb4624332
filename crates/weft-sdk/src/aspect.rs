//! The aspect invocation contract
//!
//! Two capability levels: [`Aspect`] observes a call through its context,
//! [`OutcomeAspect`] can additionally supply the call's outcome. Which
//! level an implementation has is carried by the [`AspectFactory`] built
//! for it, so a binding that claims outcome replacement over an
//! observer-only aspect is rejected before any call runs.

use std::any::{Any, TypeId};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::context::CallContext;
use crate::error::WeaveError;
use crate::fault::Fault;
use crate::value::CallValue;

/// A single interception point in the weaving protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptPoint {
    /// Before the target runs
    Prolog,
    /// After a non-propagated outcome
    Epilog,
    /// When the target raised a failure
    Exception,
    /// Instead of normal dispatch
    Intercept,
}

impl InterceptPoint {
    fn bit(self) -> u8 {
        match self {
            InterceptPoint::Prolog => 1,
            InterceptPoint::Epilog => 1 << 1,
            InterceptPoint::Exception => 1 << 2,
            InterceptPoint::Intercept => 1 << 3,
        }
    }
}

/// A set of interception points a binding subscribes to.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InterceptPoints(u8);

impl InterceptPoints {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// Only Prolog.
    pub const PROLOG: Self = Self(1);
    /// Only Epilog.
    pub const EPILOG: Self = Self(1 << 1);
    /// Only Exception.
    pub const EXCEPTION: Self = Self(1 << 2);
    /// Only Intercept.
    pub const INTERCEPT: Self = Self(1 << 3);

    /// True if `point` is in the set.
    pub fn contains(self, point: InterceptPoint) -> bool {
        self.0 & point.bit() != 0
    }

    /// True for the empty set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InterceptPoints {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<InterceptPoint> for InterceptPoints {
    fn from(point: InterceptPoint) -> Self {
        Self(point.bit())
    }
}

impl fmt::Debug for InterceptPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for point in [
            InterceptPoint::Prolog,
            InterceptPoint::Epilog,
            InterceptPoint::Exception,
            InterceptPoint::Intercept,
        ] {
            if self.contains(point) {
                set.entry(&point);
            }
        }
        set.finish()
    }
}

/// Aspect instance lifetime relative to the wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectLifetime {
    /// A fresh instance per invocation
    PerCall,
    /// One instance per wrapper, shared by every call through it
    PerInstance,
}

/// Identity of an aspect implementation. Grouping key for instance slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectKind {
    id: TypeId,
    name: &'static str,
}

impl AspectKind {
    /// The kind of aspect type `A`.
    pub fn of<A: Any>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    /// Type name of the aspect implementation.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AspectKind({})", self.name)
    }
}

/// Observer capability: read and annotate the call context.
///
/// Implementations are invoked with the current [`InterceptPoint`] and may
/// mark the context handled, but do not change the eventual outcome value.
///
/// # Thread safety
///
/// PerInstance aspects are shared by every call made through one wrapper,
/// potentially from many threads at once; the engine adds no locking
/// around aspect invocation. Implementations with mutable state carry
/// their own synchronization.
pub trait Aspect: Send + Sync {
    /// Observe the call at `point`.
    fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint);
}

/// Outcome-replacing capability.
///
/// `replace_outcome` is the source of the call's outcome wherever it is
/// invoked: its `Ok` value becomes the return value (suppressing a
/// recorded failure once the context is also marked handled), and its
/// `Err` replaces the recorded failure.
pub trait OutcomeAspect: Aspect {
    /// Supply the call's outcome at `point`.
    fn replace_outcome(
        &self,
        ctx: &mut CallContext,
        point: InterceptPoint,
    ) -> Result<CallValue, Fault>;
}

enum MakeFn {
    Observer(fn() -> Arc<dyn Aspect>),
    Replacing(fn() -> Arc<dyn OutcomeAspect>),
}

impl Clone for MakeFn {
    fn clone(&self) -> Self {
        match self {
            MakeFn::Observer(make) => MakeFn::Observer(*make),
            MakeFn::Replacing(make) => MakeFn::Replacing(*make),
        }
    }
}

/// Constructor for aspect instances, carrying the capability level.
///
/// The typed constructors are the capability check: only a type
/// implementing [`OutcomeAspect`] can produce a replacing factory.
#[derive(Clone)]
pub struct AspectFactory {
    kind: AspectKind,
    make: MakeFn,
}

impl AspectFactory {
    /// Factory for an observer-capability aspect.
    pub fn observer<A: Aspect + Default + 'static>() -> Self {
        Self {
            kind: AspectKind::of::<A>(),
            make: MakeFn::Observer(|| Arc::new(A::default()) as Arc<dyn Aspect>),
        }
    }

    /// Factory for an outcome-replacing aspect.
    pub fn replacing<A: OutcomeAspect + Default + 'static>() -> Self {
        Self {
            kind: AspectKind::of::<A>(),
            make: MakeFn::Replacing(|| Arc::new(A::default()) as Arc<dyn OutcomeAspect>),
        }
    }

    /// Identity of the aspect implementation this factory constructs.
    pub fn kind(&self) -> AspectKind {
        self.kind
    }

    /// True if constructed instances can replace call outcomes.
    pub fn can_replace_outcome(&self) -> bool {
        matches!(self.make, MakeFn::Replacing(_))
    }

    /// Construct a fresh instance.
    pub fn instantiate(&self) -> AspectHandle {
        match self.make {
            MakeFn::Observer(make) => AspectHandle::Observer(make()),
            MakeFn::Replacing(make) => AspectHandle::Replacing(make()),
        }
    }
}

impl fmt::Debug for AspectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectFactory")
            .field("kind", &self.kind)
            .field("replacing", &self.can_replace_outcome())
            .finish()
    }
}

/// An instantiated aspect at either capability level.
#[derive(Clone)]
pub enum AspectHandle {
    /// Observer capability only
    Observer(Arc<dyn Aspect>),
    /// Observer plus outcome replacement
    Replacing(Arc<dyn OutcomeAspect>),
}

impl AspectHandle {
    /// Invoke the observer entry point.
    pub fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint) {
        match self {
            AspectHandle::Observer(aspect) => aspect.invoke(ctx, point),
            AspectHandle::Replacing(aspect) => aspect.invoke(ctx, point),
        }
    }

    /// Invoke outcome replacement, flagging the context manipulated on
    /// success. A defect for observer-only handles; the engine never
    /// routes one here.
    pub fn replace_outcome(
        &self,
        ctx: &mut CallContext,
        point: InterceptPoint,
    ) -> Result<CallValue, Fault> {
        match self {
            AspectHandle::Observer(_) => Err(Fault::defect(WeaveError::NotOutcomeCapable {
                aspect: "<observer handle>",
            })),
            AspectHandle::Replacing(aspect) => {
                let value = aspect.replace_outcome(ctx, point)?;
                ctx.set_manipulated(true);
                Ok(value)
            }
        }
    }
}
