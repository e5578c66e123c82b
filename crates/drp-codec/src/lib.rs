// Path: crates/drp-codec/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Deterministic content-hashing and the typed value tree carried
//! through hash-graph vertices.
//!
//! This crate has no dependency on `drp-types` on purpose: a vertex's
//! hash is computed from plain field values (strings, a timestamp, a
//! list of dependency hashes, a list of [`Value`]s), so the hashing
//! function doesn't need to know what a `Vertex` struct looks like.
//! `drp-types` depends on this crate, not the other way around.

mod error;
mod hash;
mod value;

pub use error::CodecError;
pub use hash::{compute_vertex_hash, ROOT_HASH};
pub use value::Value;
