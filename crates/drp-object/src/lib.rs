// Path: crates/drp-object/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! The `Drp` trait and the `DRPObject` runtime that drives a replicated
//! object's hash graph, replay, and merge pipeline.

mod error;
mod events;
mod object;
mod traits;

pub use error::{DrpError, PipelineError};
pub use events::ObjectEvent;
pub use object::DRPObject;
pub use traits::{AclView, Drp, OpContext};
