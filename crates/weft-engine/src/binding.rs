//! Aspect bindings: which aspect runs, at which points, for how long
//!
//! A binding is validated when it is built, not when a call runs. The
//! general [`AspectBinding::new`] re-checks the capability pairing for
//! hand-assembled bindings; the convenience constructors are valid by
//! construction and mirror the common declaration shapes.

use weft_sdk::{
    Aspect, AspectFactory, AspectKind, AspectLifetime, InterceptPoint, InterceptPoints,
    OutcomeAspect, WeaveError,
};

/// Immutable descriptor tying one aspect to one interface member.
#[derive(Clone, Debug)]
pub struct AspectBinding {
    factory: AspectFactory,
    points: InterceptPoints,
    lifetime: AspectLifetime,
    replaces_outcome: bool,
}

impl AspectBinding {
    /// Build a binding from its parts, validating the capability pairing:
    /// outcome replacement (and therefore Intercept) requires a replacing
    /// factory.
    pub fn new(
        factory: AspectFactory,
        points: InterceptPoints,
        lifetime: AspectLifetime,
        replaces_outcome: bool,
    ) -> Result<Self, WeaveError> {
        if replaces_outcome && !factory.can_replace_outcome() {
            return Err(WeaveError::NotOutcomeCapable {
                aspect: factory.kind().name(),
            });
        }
        if points.contains(InterceptPoint::Intercept) && !replaces_outcome {
            return Err(WeaveError::InterceptNotReplacing {
                aspect: factory.kind().name(),
            });
        }
        Ok(Self {
            factory,
            points,
            lifetime,
            replaces_outcome,
        })
    }

    /// Observer binding for an arbitrary point set. Rejects Intercept,
    /// which needs outcome replacement.
    pub fn observer<A: Aspect + Default + 'static>(
        points: InterceptPoints,
        lifetime: AspectLifetime,
    ) -> Result<Self, WeaveError> {
        Self::new(AspectFactory::observer::<A>(), points, lifetime, false)
    }

    /// Outcome-replacing binding for an arbitrary point set.
    pub fn replacing<A: OutcomeAspect + Default + 'static>(
        points: InterceptPoints,
        lifetime: AspectLifetime,
    ) -> Self {
        Self {
            factory: AspectFactory::replacing::<A>(),
            points,
            lifetime,
            replaces_outcome: true,
        }
    }

    /// Observer invoked before the target runs.
    pub fn prolog<A: Aspect + Default + 'static>(lifetime: AspectLifetime) -> Self {
        Self {
            factory: AspectFactory::observer::<A>(),
            points: InterceptPoints::PROLOG,
            lifetime,
            replaces_outcome: false,
        }
    }

    /// Observer invoked after a non-propagated outcome.
    pub fn epilog<A: Aspect + Default + 'static>(lifetime: AspectLifetime) -> Self {
        Self {
            factory: AspectFactory::observer::<A>(),
            points: InterceptPoints::EPILOG,
            lifetime,
            replaces_outcome: false,
        }
    }

    /// Observer invoked when the target raises a failure.
    pub fn exception<A: Aspect + Default + 'static>(lifetime: AspectLifetime) -> Self {
        Self {
            factory: AspectFactory::observer::<A>(),
            points: InterceptPoints::EXCEPTION,
            lifetime,
            replaces_outcome: false,
        }
    }

    /// Outcome-replacing binding that takes over dispatch entirely.
    pub fn intercept<A: OutcomeAspect + Default + 'static>(lifetime: AspectLifetime) -> Self {
        Self {
            factory: AspectFactory::replacing::<A>(),
            points: InterceptPoints::INTERCEPT,
            lifetime,
            replaces_outcome: true,
        }
    }

    /// Identity of the bound aspect implementation.
    pub fn kind(&self) -> AspectKind {
        self.factory.kind()
    }

    /// Constructor for instances of the bound aspect.
    pub fn factory(&self) -> &AspectFactory {
        &self.factory
    }

    /// Interception points this binding subscribes to.
    pub fn points(&self) -> InterceptPoints {
        self.points
    }

    /// Instance lifetime relative to the wrapper.
    pub fn lifetime(&self) -> AspectLifetime {
        self.lifetime
    }

    /// True when the bound aspect supplies the call's outcome.
    pub fn replaces_outcome(&self) -> bool {
        self.replaces_outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_sdk::{CallContext, CallValue, Fault};

    #[derive(Default)]
    struct Watcher;

    impl Aspect for Watcher {
        fn invoke(&self, _ctx: &mut CallContext, _point: InterceptPoint) {}
    }

    #[derive(Default)]
    struct Supplier;

    impl Aspect for Supplier {
        fn invoke(&self, _ctx: &mut CallContext, _point: InterceptPoint) {}
    }

    impl OutcomeAspect for Supplier {
        fn replace_outcome(
            &self,
            _ctx: &mut CallContext,
            _point: InterceptPoint,
        ) -> Result<CallValue, Fault> {
            Ok(CallValue::void())
        }
    }

    #[test]
    fn test_observer_cannot_claim_outcome_replacement() {
        let err = AspectBinding::new(
            AspectFactory::observer::<Watcher>(),
            InterceptPoints::EXCEPTION,
            AspectLifetime::PerCall,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, WeaveError::NotOutcomeCapable { .. }));
    }

    #[test]
    fn test_intercept_requires_outcome_replacement() {
        let err = AspectBinding::new(
            AspectFactory::replacing::<Supplier>(),
            InterceptPoints::INTERCEPT,
            AspectLifetime::PerCall,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, WeaveError::InterceptNotReplacing { .. }));

        let err = AspectBinding::observer::<Watcher>(
            InterceptPoints::INTERCEPT,
            AspectLifetime::PerCall,
        )
        .unwrap_err();
        assert!(matches!(err, WeaveError::InterceptNotReplacing { .. }));
    }

    #[test]
    fn test_valid_shapes() {
        let prolog = AspectBinding::prolog::<Watcher>(AspectLifetime::PerCall);
        assert!(prolog.points().contains(InterceptPoint::Prolog));
        assert!(!prolog.replaces_outcome());

        let replacing = AspectBinding::replacing::<Supplier>(
            InterceptPoints::EXCEPTION,
            AspectLifetime::PerInstance,
        );
        assert!(replacing.replaces_outcome());
        assert_eq!(replacing.lifetime(), AspectLifetime::PerInstance);

        let intercept = AspectBinding::intercept::<Supplier>(AspectLifetime::PerCall);
        assert!(intercept.points().contains(InterceptPoint::Intercept));

        let observed = AspectBinding::new(
            AspectFactory::replacing::<Supplier>(),
            InterceptPoints::PROLOG | InterceptPoints::EPILOG,
            AspectLifetime::PerCall,
            false,
        )
        .unwrap();
        assert!(!observed.replaces_outcome());
    }
}
