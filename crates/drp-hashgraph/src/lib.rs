// Path: crates/drp-hashgraph/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! The causal hash graph: a DAG of signed vertices with topological
//! sort, lowest-common-ancestor, and conflict-resolved linearization.

mod error;
mod graph;
mod resolver;
mod validate;

pub use error::HashGraphError;
pub use graph::HashGraph;
pub use resolver::{
    apply_many_action, fold_pairwise, ConflictResolver, ManyAction, PairAction, Semantics, TimestampResolver,
};
pub use validate::{validate_vertex, ValidationConfig};
