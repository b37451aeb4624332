//! Outcome replacement on failure

use tracing::warn;

use weft_sdk::{Aspect, CallContext, CallValue, Fault, InterceptPoint, OutcomeAspect};

/// Replaces a failed call's outcome with the void value.
///
/// Bound at the Exception point, it marks the fault handled and hands
/// back nothing: the caller of a void method sees a normal return, the
/// caller of a value-returning method sees its facade's empty value.
#[derive(Debug, Default)]
pub struct VoidOnFault;

impl Aspect for VoidOnFault {
    fn invoke(&self, ctx: &mut CallContext, _point: InterceptPoint) {
        warn!(member = ctx.member_name(), "observing only, outcome left in place");
    }
}

impl OutcomeAspect for VoidOnFault {
    fn replace_outcome(
        &self,
        ctx: &mut CallContext,
        _point: InterceptPoint,
    ) -> Result<CallValue, Fault> {
        let message = ctx
            .fault()
            .map(|fault| fault.to_string())
            .unwrap_or_default();
        warn!(member = ctx.member_name(), %message, "suppressing failure");
        ctx.set_handled(true);
        Ok(CallValue::void())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_sdk::{WeaveError, RETURN_VALUE_NAME};

    #[test]
    fn test_replacement_is_void_and_handled() {
        let mut ctx = CallContext::new("Store.fetch", "Store", "MemoryStore", true);
        ctx.set_fault(Fault::defect(WeaveError::NoDelegate {
            member: "Store.fetch".into(),
        }));

        let value = VoidOnFault
            .replace_outcome(&mut ctx, InterceptPoint::Exception)
            .unwrap();
        assert!(value.is_void());
        assert!(ctx.is_handled());
        assert!(ctx.parameter(RETURN_VALUE_NAME).is_none());
    }
}
