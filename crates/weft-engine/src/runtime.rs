//! The per-call weaving protocol
//!
//! One function, one call: build the context, instantiate call-scoped
//! aspects, run the prolog pass, dispatch (or hand control to the
//! intercepting aspect), run the exception pass on failure, run the
//! epilog pass on a non-propagated outcome, return.
//!
//! An unhandled failure propagates to the caller by identity and skips
//! the epilog pass entirely.

use weft_sdk::{AspectHandle, CallContext, CallValue, Fault, InterceptPoint, WeaveError};

use crate::factory::{AspectSlot, MethodPlan};
use crate::interface::TargetHandle;

fn aspect_at<'a>(
    slot: AspectSlot,
    locals: &'a [AspectHandle],
    shared: &'a [AspectHandle],
) -> &'a AspectHandle {
    match slot {
        AspectSlot::PerCall(index) => &locals[index],
        AspectSlot::PerInstance(index) => &shared[index],
    }
}

/// Run one bound call through the weaving protocol.
pub(crate) fn execute(
    plan: &MethodPlan,
    target: &TargetHandle,
    target_type: &'static str,
    shared: &[AspectHandle],
    args: &[CallValue],
) -> Result<CallValue, Fault> {
    if args.len() != plan.param_names.len() {
        return Err(Fault::defect(WeaveError::ParameterCount {
            method: plan.member_name.clone(),
            expected: plan.param_names.len(),
            actual: args.len(),
        }));
    }

    // Step 1: context construction.
    let mut ctx = CallContext::new(
        plan.member_name.clone(),
        plan.owner,
        target_type,
        plan.has_return,
    );
    for (name, value) in plan.param_names.iter().copied().zip(args) {
        ctx.add_parameter(name, value.clone()).map_err(Fault::defect)?;
    }

    // Step 2: call-scoped aspect instances, one per kind.
    let locals: Vec<AspectHandle> = plan
        .per_call_slots
        .iter()
        .map(|factory| factory.instantiate())
        .collect();

    // Step 3: prolog pass.
    for &index in &plan.prolog {
        aspect_at(plan.bindings[index].slot, &locals, shared)
            .invoke(&mut ctx, InterceptPoint::Prolog);
    }

    // Step 4: core dispatch.
    let dispatched = match plan.intercept {
        None => (plan.invoker)(target, args),
        Some(index) => {
            let invoker = plan.invoker.clone();
            let target = target.clone();
            let args = args.to_vec();
            ctx.set_intercept_delegate(Box::new(move || invoker(&target, &args)));
            aspect_at(plan.bindings[index].slot, &locals, shared)
                .replace_outcome(&mut ctx, InterceptPoint::Intercept)
        }
    };

    let value = match dispatched {
        Ok(value) => {
            ctx.set_outcome(value.clone());
            value
        }
        // Step 5: failure path.
        Err(fault) => {
            ctx.set_fault(fault);
            for &index in &plan.exception {
                let binding = &plan.bindings[index];
                let aspect = aspect_at(binding.slot, &locals, shared);
                if binding.replaces_outcome {
                    match aspect.replace_outcome(&mut ctx, InterceptPoint::Exception) {
                        Ok(value) => ctx.set_outcome(value),
                        Err(fault) => ctx.set_fault(fault),
                    }
                } else {
                    aspect.invoke(&mut ctx, InterceptPoint::Exception);
                }
            }
            if !ctx.is_handled() {
                // Propagate the original failure; the epilog pass does
                // not run on this path.
                if let Some(fault) = ctx.take_fault() {
                    return Err(fault);
                }
            }
            ctx.take_outcome().unwrap_or_else(CallValue::void)
        }
    };

    // Step 6: epilog pass.
    if plan.has_return && !value.is_void() {
        ctx.record_return_value(value.clone()).map_err(Fault::defect)?;
    }
    for &index in &plan.epilog {
        aspect_at(plan.bindings[index].slot, &locals, shared)
            .invoke(&mut ctx, InterceptPoint::Epilog);
    }

    // Step 7: return the (possibly replaced) value.
    Ok(value)
}
