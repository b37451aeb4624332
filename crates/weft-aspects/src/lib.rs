//! Stock aspects for the weft weaving engine
//!
//! Ready-made cross-cutting behaviors: call logging at the prolog and
//! epilog points, fault-absorbing logging, outcome replacement that turns
//! failures into the void value, and a slow-call warning. All of them log
//! through `tracing` and carry no configuration beyond their defaults, so
//! they can be bound with any lifetime.

mod logging;
mod outcome;
mod timing;

pub use logging::{AbsorbingCallLogger, CallLogger};
pub use outcome::VoidOnFault;
pub use timing::SlowCallWarning;

pub(crate) mod render {
    use weft_sdk::CallValue;

    /// Best-effort display of an erased value for log lines.
    pub(crate) fn value(value: &CallValue) -> String {
        if value.is_void() {
            return "()".to_string();
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return s.clone();
        }
        if let Some(s) = value.downcast_ref::<&str>() {
            return (*s).to_string();
        }
        if let Some(n) = value.downcast_ref::<i32>() {
            return n.to_string();
        }
        if let Some(n) = value.downcast_ref::<i64>() {
            return n.to_string();
        }
        if let Some(n) = value.downcast_ref::<u32>() {
            return n.to_string();
        }
        if let Some(n) = value.downcast_ref::<u64>() {
            return n.to_string();
        }
        if let Some(n) = value.downcast_ref::<usize>() {
            return n.to_string();
        }
        if let Some(n) = value.downcast_ref::<f64>() {
            return n.to_string();
        }
        if let Some(b) = value.downcast_ref::<bool>() {
            return b.to_string();
        }
        format!("<{}>", value.type_name())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_common_types_render_plainly() {
            assert_eq!(value(&CallValue::of(String::from("x"))), "x");
            assert_eq!(value(&CallValue::of(42i32)), "42");
            assert_eq!(value(&CallValue::of(true)), "true");
            assert_eq!(value(&CallValue::void()), "()");
        }

        #[test]
        fn test_opaque_types_render_their_name() {
            struct Opaque;
            let rendered = value(&CallValue::of(std::sync::Arc::new(Opaque)));
            assert!(rendered.starts_with('<'));
        }
    }
}
