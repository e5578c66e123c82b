// Path: crates/drp-object/src/traits.rs
//! The seam every replicated data type implements.
//!
//! Every mutating call is dispatched through an explicit `(op_type,
//! args)` pair rather than intercepting method calls on a live
//! object; a reference to "the object's current state" is an owned
//! [`drp_types::State`] snapshot passed by value rather than a handle
//! back into the runtime.

use std::collections::BTreeMap;

use drp_codec::Value;
use drp_hashgraph::{ConflictResolver, ManyAction, PairAction, Semantics, TimestampResolver};
use drp_types::{PeerId, State, Vertex};

use crate::error::DrpError;

/// The context an operation or query is evaluated under.
#[derive(Clone, Debug)]
pub struct OpContext {
    /// The peer that authored the operation.
    pub caller: PeerId,
    /// When the operation was authored, in milliseconds since the
    /// Unix epoch.
    pub timestamp: u64,
}

/// A replicated data type: the unit of conflict resolution and state
/// that a [`crate::DRPObject`] drives through the hash graph.
///
/// Implementations are expected to be cheap to clone — `DRPObject`
/// clones the initial instance once to seed replay-from-scratch on
/// every merge, and clones it again whenever it needs to hand a
/// lightweight conflict resolver to `HashGraph` that only inspects
/// vertex metadata, never live state.
pub trait Drp: Clone + Send + Sync + 'static {
    /// Applies `op_type(args)` authored by `ctx.caller` at
    /// `ctx.timestamp`, mutating local state.
    ///
    /// Writer permission is enforced by `DRPObject`'s own pipeline
    /// before this is ever called for a business (non-ACL) operation,
    /// so implementations don't need to re-check it themselves. Any
    /// rejection an implementation does decide on its own (malformed
    /// arguments aside) should still return `Ok(())` and have no
    /// effect rather than error — replay must never abort partway
    /// through because one historical vertex is no longer authorized.
    fn apply(&mut self, ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError>;

    /// Answers a read-only query against the current state.
    fn query(&self, query_type: &str, args: &[Value]) -> Result<Value, DrpError>;

    /// Whether concurrent vertices should be resolved one pair at a
    /// time or as a batch. Defaults to [`Semantics::Multiple`], which
    /// most last-writer-wins style CRDTs want.
    fn semantics_type(&self) -> Semantics {
        Semantics::Multiple
    }

    /// Orders exactly two concurrent vertices. Only called when
    /// [`Drp::semantics_type`] returns [`Semantics::Pair`].
    fn resolve_pair(&self, a: &Vertex, b: &Vertex) -> PairAction {
        TimestampResolver.resolve_pair(a, b)
    }

    /// Orders a batch of mutually concurrent vertices. Only called
    /// when [`Drp::semantics_type`] returns [`Semantics::Multiple`].
    fn resolve_many(&self, concurrent: &[Vertex]) -> ManyAction {
        TimestampResolver.resolve_many(concurrent)
    }

    /// Captures the current state as an opaque snapshot, for a peer
    /// responding to `FETCH_STATE`.
    fn state(&self) -> State;

    /// Replaces the current state with a previously captured snapshot.
    fn load_state(&mut self, state: &State) -> Result<(), DrpError>;
}

/// Exposes read-only ACL membership to callers that hold some
/// composed [`Drp`] without knowing its concrete shape — chiefly
/// `drp-node`, which needs a business object's current finality
/// signer set to re-seed a `FinalityStore` on reconnect without
/// depending on that object's type.
///
/// `drp-acl`'s `ObjectAcl` implements this directly; it lives here
/// rather than in `drp-acl` so that [`crate::DRPObject`]'s own `A`
/// type parameter can carry the same bound without this crate
/// depending on `drp-acl` (which itself depends on `drp-object`).
pub trait AclView {
    /// The current `Finality` group membership paired with each
    /// member's registered BLS key.
    fn finality_signer_keys(&self) -> BTreeMap<PeerId, Vec<u8>>;

    /// True if `peer_id` currently holds write access.
    fn is_writer(&self, peer_id: &str) -> bool;
}
