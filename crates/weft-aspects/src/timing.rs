//! Slow-call detection

use std::time::Duration;

use tracing::warn;

use weft_sdk::{Aspect, CallContext, InterceptPoint};

/// Warns when a call outlives a threshold.
///
/// Measures from context construction, so prolog aspects count toward
/// the elapsed time. Bind at the Epilog point; failed calls that skip
/// the epilog pass are not reported.
#[derive(Debug)]
pub struct SlowCallWarning {
    threshold: Duration,
}

impl SlowCallWarning {
    /// Default reporting threshold.
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(250);

    /// Warn for calls slower than `threshold`.
    pub fn with_threshold(threshold: Duration) -> Self {
        Self { threshold }
    }
}

impl Default for SlowCallWarning {
    fn default() -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD)
    }
}

impl Aspect for SlowCallWarning {
    fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint) {
        if point != InterceptPoint::Epilog {
            return;
        }
        let elapsed = ctx.started_at().elapsed();
        if elapsed > self.threshold {
            warn!(
                member = ctx.member_name(),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.threshold.as_millis() as u64,
                "slow call",
            );
        }
    }
}
