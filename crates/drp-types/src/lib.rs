// Path: crates/drp-types/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Core identifiers, the `Vertex`/`Operation` data model, and the
//! shared `ErrorCode` trait every other DRP kernel crate's error enum
//! implements.

mod error;
mod ids;
mod operation;
mod vertex;

pub use error::{ErrorCode, TypesError};
pub use ids::{validate_hash, ObjectId, PeerId};
pub use operation::{DrpType, Operation};
pub use vertex::Vertex;

/// A DRP's serialized state, as captured for replay from a
/// least-common-ancestor snapshot. An opaque value tree: only the
/// owning `Drp` implementation knows how to interpret its shape.
pub type State = drp_codec::Value;
