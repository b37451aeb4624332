//! Call logging aspects
//!
//! `CallLogger` traces entry and completion of woven calls.
//! `AbsorbingCallLogger` additionally claims failures: it logs the fault
//! and marks the call handled, so the caller sees a completed call
//! instead of the failure.

use tracing::{error, info};

use weft_sdk::{Aspect, CallContext, InterceptPoint};

use crate::render;

fn log_prolog(ctx: &CallContext) {
    let mut parameters = String::new();
    for param in ctx.parameters() {
        if !parameters.is_empty() {
            parameters.push_str(", ");
        }
        parameters.push_str(param.name());
        parameters.push_str(": ");
        parameters.push_str(&render::value(param.value()));
    }
    info!(
        member = ctx.member_name(),
        target = ctx.target_type(),
        %parameters,
        "call entered",
    );
}

fn log_epilog(ctx: &CallContext) {
    if ctx.has_return_value() {
        let value = ctx.return_value().map(render::value).unwrap_or_default();
        info!(member = ctx.member_name(), %value, "call returned");
    } else {
        info!(member = ctx.member_name(), "call returned");
    }
}

/// Logs call entry at Prolog and completion at Epilog.
///
/// Parameter values are rendered best-effort; the reserved return-value
/// slot is reported separately and skipped in the parameter list.
#[derive(Debug, Default)]
pub struct CallLogger;

impl Aspect for CallLogger {
    fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint) {
        match point {
            InterceptPoint::Prolog => log_prolog(ctx),
            InterceptPoint::Epilog => log_epilog(ctx),
            _ => {}
        }
    }
}

/// `CallLogger` plus failure absorption: at the Exception point the fault
/// is logged and the call is marked handled.
///
/// Callers of non-void methods then receive the void outcome; bind an
/// outcome-replacing aspect instead when a real fallback value is needed.
#[derive(Debug, Default)]
pub struct AbsorbingCallLogger;

impl Aspect for AbsorbingCallLogger {
    fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint) {
        match point {
            InterceptPoint::Prolog => log_prolog(ctx),
            InterceptPoint::Epilog => log_epilog(ctx),
            InterceptPoint::Exception => {
                let message = ctx
                    .fault()
                    .map(|fault| fault.to_string())
                    .unwrap_or_default();
                error!(member = ctx.member_name(), %message, "call failed, absorbing");
                ctx.set_handled(true);
            }
            InterceptPoint::Intercept => {}
        }
    }
}
