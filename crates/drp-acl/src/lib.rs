// Path: crates/drp-acl/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing))]

//! The built-in access-control `Drp`.
//!
//! `drp-object` is generic over any `Drp`; this crate supplies the one
//! every object gets for free, governing who may write to it, who may
//! administer those permissions, and who may sign finality
//! attestations on its behalf.

mod acl;
mod group;
mod view;

pub use acl::ObjectAcl;
pub use group::Group;
pub use view::AclView;
