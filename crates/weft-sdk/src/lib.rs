//! Weft SDK - contract types for writing aspects
//!
//! This crate provides the minimal types and traits needed to implement
//! aspects without depending on the weaving engine. An aspect sees one
//! call at a time through a [`CallContext`]; the engine owns everything
//! else (binding resolution, wrapper synthesis, dispatch).
//!
//! # Example
//!
//! ```
//! use weft_sdk::{Aspect, CallContext, InterceptPoint};
//!
//! struct EntryLogger;
//!
//! impl Aspect for EntryLogger {
//!     fn invoke(&self, ctx: &mut CallContext, point: InterceptPoint) {
//!         if point == InterceptPoint::Prolog {
//!             eprintln!("entering {}", ctx.member_name());
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod aspect;
mod context;
mod error;
mod fault;
mod value;

pub use aspect::{
    Aspect, AspectFactory, AspectHandle, AspectKind, AspectLifetime, InterceptPoint,
    InterceptPoints, OutcomeAspect,
};
pub use context::{CallContext, CallParameter, InterceptDelegate, RETURN_VALUE_NAME};
pub use error::WeaveError;
pub use fault::Fault;
pub use value::CallValue;
