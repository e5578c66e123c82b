// Path: crates/drp-object/src/object.rs
use std::collections::HashMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use drp_crypto::Keychain;
use drp_hashgraph::{
    apply_many_action, fold_pairwise, ConflictResolver, HashGraph, HashGraphError, ManyAction, PairAction,
    Semantics, ValidationConfig,
};
use drp_types::{DrpType, ObjectId, Operation, PeerId, State, Vertex};

use crate::error::PipelineError;
use crate::events::ObjectEvent;
use crate::traits::{AclView, Drp, OpContext};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orders a concurrent batch drawn from a graph that interleaves two
/// causal histories — ACL and business DRP — by partitioning it on
/// [`DrpType`], ordering each partition through that layer's own
/// resolver, and placing the ACL order ahead of the DRP order so
/// permission changes are always visible to the DRP vertices they're
/// concurrent with.
///
/// `HashGraph` only ever calls these methods with vertex metadata, so
/// it's correct to drive them off a clone of each layer's `Drp` rather
/// than the object's live, mutating instances.
struct DualResolver<A: Drp, D: Drp> {
    acl: A,
    drp: D,
}

fn is_acl_vertex(vertex: &Vertex) -> bool {
    vertex
        .operation
        .as_ref()
        .map(|op| op.drp_type == DrpType::Acl)
        .unwrap_or(false)
}

fn order_subset<X: Drp>(x: &X, vertices: &[Vertex]) -> Vec<String> {
    if vertices.is_empty() {
        return Vec::new();
    }
    match x.semantics_type() {
        Semantics::Pair => fold_pairwise(|a, b| x.resolve_pair(a, b), vertices),
        Semantics::Multiple => apply_many_action(x.resolve_many(vertices), vertices),
    }
}

impl<A: Drp, D: Drp> ConflictResolver for DualResolver<A, D> {
    fn semantics(&self) -> Semantics {
        Semantics::Multiple
    }

    fn resolve_pair(&self, a: &Vertex, b: &Vertex) -> PairAction {
        // `HashGraph` never calls this directly since `semantics()`
        // above is always `Multiple`; implemented for completeness by
        // delegating to the same two-layer split `resolve_many` uses.
        match self.resolve_many(&[a.clone(), b.clone()]) {
            ManyAction::Order(order) => {
                if order.first().map(|h| h == &a.hash).unwrap_or(true) {
                    PairAction::Nop
                } else {
                    PairAction::Swap
                }
            }
            ManyAction::Drop(hashes) => {
                let drop_a = hashes.contains(&a.hash);
                let drop_b = hashes.contains(&b.hash);
                match (drop_a, drop_b) {
                    (true, true) => PairAction::Drop(hashes),
                    (true, false) => PairAction::DropLeft,
                    (false, true) => PairAction::DropRight,
                    (false, false) => PairAction::Nop,
                }
            }
        }
    }

    fn resolve_many(&self, concurrent: &[Vertex]) -> ManyAction {
        let (acl_vertices, drp_vertices): (Vec<Vertex>, Vec<Vertex>) =
            concurrent.iter().cloned().partition(is_acl_vertex);
        let mut order = order_subset(&self.acl, &acl_vertices);
        order.extend(order_subset(&self.drp, &drp_vertices));
        ManyAction::Order(order)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Drives a single replicated object: its hash graph, its live ACL
/// (`A`) and business (`D`) state, and the event stream observers can
/// subscribe to.
///
/// A single hash graph carries both layers' vertices, tagged by
/// [`DrpType`]. The state at any vertex is memoized forever once
/// computed — `ancestors(hash)` never changes once a vertex is
/// inserted (dependencies are never removed), so "the state after
/// replaying exactly `ancestors(hash)` in resolved order" is a pure
/// function of `hash` alone. Every merge only needs to replay forward
/// from the lowest common ancestor of the new frontier, not from
/// scratch.
pub struct DRPObject<A: Drp, D: Drp> {
    id: ObjectId,
    graph: HashGraph<DualResolver<A, D>>,
    original_acl: A,
    original_drp: D,
    acl: A,
    drp: D,
    acl_states: HashMap<String, A>,
    drp_states: HashMap<String, D>,
    validation: ValidationConfig,
    events: broadcast::Sender<ObjectEvent>,
}

impl<A: Drp + AclView, D: Drp> DRPObject<A, D> {
    /// Creates a new object with `initial_acl`/`initial_drp` as both
    /// its pristine replay base and its current state.
    pub fn new(id: ObjectId, initial_acl: A, initial_drp: D, validation: ValidationConfig) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let resolver = DualResolver {
            acl: initial_acl.clone(),
            drp: initial_drp.clone(),
        };
        let mut acl_states = HashMap::new();
        let mut drp_states = HashMap::new();
        acl_states.insert(drp_codec::ROOT_HASH.to_string(), initial_acl.clone());
        drp_states.insert(drp_codec::ROOT_HASH.to_string(), initial_drp.clone());
        Self {
            id,
            graph: HashGraph::new(resolver, validation.max_skew_ms),
            original_acl: initial_acl.clone(),
            original_drp: initial_drp.clone(),
            acl: initial_acl,
            drp: initial_drp,
            acl_states,
            drp_states,
            validation,
            events,
        }
    }

    /// This object's id.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// The live ACL instance, reflecting every vertex merged so far.
    pub fn acl(&self) -> &A {
        &self.acl
    }

    /// The live business `Drp` instance, reflecting every vertex
    /// merged so far.
    pub fn drp(&self) -> &D {
        &self.drp
    }

    /// Subscribes to this object's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ObjectEvent> {
        self.events.subscribe()
    }

    /// The current frontier (hash-graph tips).
    pub fn frontier(&self) -> Vec<String> {
        self.graph.frontier()
    }

    /// Looks up a vertex already accepted into this object's graph.
    pub fn get_vertex(&self, hash: &str) -> Option<&Vertex> {
        self.graph.get_vertex(hash)
    }

    /// Creates, signs, applies, and stores a new vertex authored by
    /// this peer via `keychain`. Rejects the call outright, before any
    /// vertex is constructed, if it targets the business DRP and the
    /// caller doesn't currently hold write access.
    pub fn call_local(
        &mut self,
        keychain: &dyn Keychain,
        drp_type: DrpType,
        op_type: &str,
        args: Vec<drp_codec::Value>,
    ) -> Result<Vertex, PipelineError> {
        let peer_id = keychain.peer_id();
        if drp_type == DrpType::Drp && !self.acl.is_writer(peer_id.as_str()) {
            return Err(PipelineError::NotAWriter {
                peer: peer_id.to_string(),
            });
        }

        let deps = self.graph.frontier();
        let timestamp = now_ms();
        let operation = Operation::new(drp_type, op_type, args);
        let mut vertex = Vertex::new(peer_id.as_str(), operation, deps, timestamp);
        vertex.signature = keychain
            .sign_vertex(&vertex.hash)
            .map_err(|e| PipelineError::Signing(e.to_string()))?;

        if let Err(e) = drp_hashgraph::validate_vertex(&vertex, timestamp, &self.validation) {
            drp_telemetry::graph_metrics().inc_vertices_rejected("local_validation");
            return Err(e.into());
        }
        self.graph.add_vertex(vertex.clone())?;
        drp_telemetry::graph_metrics().inc_vertices_applied(self.id.as_str());
        self.replay()?;
        drp_telemetry::graph_metrics().set_frontier_size(self.id.as_str(), self.graph.frontier().len() as u64);

        let _ = self.events.send(ObjectEvent::Applied {
            vertex_hash: vertex.hash.clone(),
        });
        debug!(object_id = %self.id, vertex = %vertex.hash, "applied local vertex");
        Ok(vertex)
    }

    /// Merges remote vertices into this object, validating and
    /// inserting everything that can be inserted and reporting the
    /// rest as missing a dependency this object doesn't have yet.
    ///
    /// A DRP vertex authored by a peer that turns out not to be a
    /// writer (as replayed up to that point) is still accepted into
    /// the graph — later history may still depend on its hash — but
    /// its effect on the live `drp` state is silently dropped rather
    /// than failing the whole batch.
    pub fn merge(&mut self, vertices: Vec<Vertex>) -> Result<(Vec<String>, Vec<String>), PipelineError> {
        let mut accepted = Vec::new();
        let mut missing = Vec::new();
        let now = now_ms();

        // Dependencies can arrive out of order within one batch; keep
        // retrying until a full pass makes no progress.
        let mut pending = vertices;
        loop {
            let mut progressed = false;
            let mut still_pending = Vec::new();
            for vertex in pending {
                if self.graph.get_vertex(&vertex.hash).is_some() {
                    continue;
                }
                if drp_hashgraph::validate_vertex(&vertex, now, &self.validation).is_err() {
                    warn!(vertex = %vertex.hash, "rejected vertex failing local validation");
                    drp_telemetry::graph_metrics().inc_vertices_rejected("remote_validation");
                    continue;
                }
                match self.graph.add_vertex(vertex.clone()) {
                    Ok(()) => {
                        accepted.push(vertex.hash.clone());
                        progressed = true;
                        drp_telemetry::graph_metrics().inc_vertices_applied(self.id.as_str());
                    }
                    Err(HashGraphError::MissingDependency { .. }) => {
                        still_pending.push(vertex);
                    }
                    Err(e) => {
                        warn!(vertex = %vertex.hash, error = %e, "rejected vertex");
                        drp_telemetry::graph_metrics().inc_vertices_rejected("graph_rejected");
                    }
                }
            }
            pending = still_pending;
            if !progressed || pending.is_empty() {
                break;
            }
        }
        missing.extend(pending.into_iter().map(|v| v.hash));

        if !accepted.is_empty() {
            let started = Instant::now();
            self.replay()?;
            drp_telemetry::graph_metrics().observe_replay_duration(self.id.as_str(), started.elapsed().as_secs_f64());
            drp_telemetry::graph_metrics().set_frontier_size(self.id.as_str(), self.graph.frontier().len() as u64);
        }

        let _ = self.events.send(ObjectEvent::Merged {
            accepted: accepted.clone(),
            missing: missing.clone(),
        });
        Ok((accepted, missing))
    }

    /// Re-derives the live `acl`/`drp` by finding the lowest common
    /// ancestor of the current frontier, fetching (or computing and
    /// memoizing) the state at that ancestor, then folding forward
    /// through the conflict-resolved vertices between it and the
    /// frontier.
    fn replay(&mut self) -> Result<(), PipelineError> {
        let frontier = self.graph.frontier();
        let (lca, between) = self.graph.lowest_common_ancestor(&frontier)?;
        let (mut acl, mut drp) = self.state_at(&lca)?;
        for hash in &between {
            let Some(vertex) = self.graph.get_vertex(hash).cloned() else {
                continue;
            };
            self.apply_vertex_to(&mut acl, &mut drp, &vertex);
            self.acl_states.insert(hash.clone(), acl.clone());
            self.drp_states.insert(hash.clone(), drp.clone());
        }
        self.acl = acl;
        self.drp = drp;
        Ok(())
    }

    /// The ACL/DRP state after replaying exactly `ancestors(hash)` in
    /// resolved order, memoized forever once computed: a vertex's
    /// dependency set can never change once it's inserted, so this is
    /// a pure function of `hash`.
    fn state_at(&mut self, hash: &str) -> Result<(A, D), PipelineError> {
        if let (Some(acl), Some(drp)) = (self.acl_states.get(hash), self.drp_states.get(hash)) {
            return Ok((acl.clone(), drp.clone()));
        }
        let order = self.graph.linearize_vertices(&[hash.to_string()])?;
        let mut acl = self.original_acl.clone();
        let mut drp = self.original_drp.clone();
        for h in &order {
            if self.acl_states.contains_key(h) {
                acl = self.acl_states.get(h).map(A::clone).unwrap_or(acl);
                drp = self.drp_states.get(h).map(D::clone).unwrap_or(drp);
                continue;
            }
            let Some(vertex) = self.graph.get_vertex(h).cloned() else {
                continue;
            };
            self.apply_vertex_to(&mut acl, &mut drp, &vertex);
            self.acl_states.insert(h.clone(), acl.clone());
            self.drp_states.insert(h.clone(), drp.clone());
        }
        Ok((acl, drp))
    }

    /// Applies one vertex's operation to the given working ACL/DRP
    /// pair, enforcing writer permission for DRP vertices against the
    /// ACL state as folded so far (not a stale snapshot). ACL vertices
    /// get no such check — the ACL implementation gates its own
    /// admin-only operations.
    fn apply_vertex_to(&self, acl: &mut A, drp: &mut D, vertex: &Vertex) {
        let Some(operation) = &vertex.operation else {
            return; // the synthetic root carries no operation
        };
        let Ok(caller) = PeerId::new(vertex.peer_id.clone()) else {
            return;
        };
        let ctx = OpContext {
            caller,
            timestamp: vertex.timestamp,
        };
        match operation.drp_type {
            DrpType::Acl => {
                if let Err(e) = acl.apply(&ctx, &operation.op_type, &operation.value) {
                    warn!(vertex = %vertex.hash, error = %e, "ACL operation rejected during replay");
                }
            }
            DrpType::Drp => {
                if !acl.is_writer(vertex.peer_id.as_str()) {
                    warn!(vertex = %vertex.hash, peer = %vertex.peer_id, "dropping vertex from a non-writer");
                    return;
                }
                if let Err(e) = drp.apply(&ctx, &operation.op_type, &operation.value) {
                    warn!(vertex = %vertex.hash, error = %e, "operation rejected during replay");
                }
            }
        }
    }

    /// Captures the current ACL and business state for a
    /// `FETCH_STATE_RESPONSE`.
    pub fn state(&self) -> (State, State) {
        (self.acl.state(), self.drp.state())
    }

    /// The vertices in this object's graph that a peer whose frontier is
    /// `their_frontier` doesn't have yet, in a valid dependency order —
    /// the payload of a `SYNC_ACCEPT` reply to that peer's `SYNC`.
    pub fn vertices_missing_from(&self, their_frontier: &[String]) -> Result<Vec<Vertex>, PipelineError> {
        let mine = self.graph.linearize_vertices(&self.graph.frontier())?;
        let mut missing = Vec::new();
        for hash in mine {
            let already_known = their_frontier
                .iter()
                .any(|tip| self.graph.is_ancestor_of(&hash, tip).unwrap_or(false));
            if !already_known {
                if let Some(vertex) = self.graph.get_vertex(&hash) {
                    missing.push(vertex.clone());
                }
            }
        }
        Ok(missing)
    }

    /// Replaces both the replay base and the live state from a peer's
    /// `FETCH_STATE_RESPONSE` snapshot.
    ///
    /// Meant for a peer bootstrapping an object it holds no vertices
    /// for yet: calling this once local history already exists would
    /// silently discard it on the next replay, since the root's
    /// memoized state is always where replay-from-scratch starts.
    /// Callers should only reach for this while `frontier()` is still
    /// just the root.
    pub fn adopt_remote_state(&mut self, acl_state: &State, drp_state: &State) -> Result<(), PipelineError> {
        let mut acl_snapshot = self.original_acl.clone();
        acl_snapshot.load_state(acl_state)?;
        let mut drp_snapshot = self.original_drp.clone();
        drp_snapshot.load_state(drp_state)?;

        self.original_acl = acl_snapshot.clone();
        self.original_drp = drp_snapshot.clone();
        self.acl = acl_snapshot.clone();
        self.drp = drp_snapshot.clone();
        self.acl_states.insert(drp_codec::ROOT_HASH.to_string(), acl_snapshot);
        self.drp_states.insert(drp_codec::ROOT_HASH.to_string(), drp_snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet};

    use drp_codec::Value;
    use drp_crypto::SoftKeychain;
    use drp_types::ErrorCode;

    use crate::error::DrpError;

    /// A minimal ACL fixture: anyone named in `writers` may write,
    /// `grant`/`revoke` mutate that set unconditionally (no admin
    /// gating — out of scope for these pipeline-focused tests).
    #[derive(Clone, Default)]
    struct TestAcl {
        writers: HashSet<String>,
    }

    impl TestAcl {
        fn seeded_with(admin: &str) -> Self {
            let mut writers = HashSet::new();
            writers.insert(admin.to_string());
            Self { writers }
        }
    }

    impl Drp for TestAcl {
        fn apply(&mut self, _ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError> {
            let Some(Value::Str(peer)) = args.first() else {
                return Err(DrpError::MalformedArguments {
                    operation: op_type.into(),
                    reason: "expected one Str argument".into(),
                });
            };
            match op_type {
                "grant" => {
                    self.writers.insert(peer.clone());
                    Ok(())
                }
                "revoke" => {
                    self.writers.remove(peer);
                    Ok(())
                }
                other => Err(DrpError::UnknownOperation(other.into())),
            }
        }

        fn query(&self, query_type: &str, args: &[Value]) -> Result<Value, DrpError> {
            let Some(Value::Str(peer)) = args.first() else {
                return Err(DrpError::MalformedArguments {
                    operation: query_type.into(),
                    reason: "expected one Str argument".into(),
                });
            };
            match query_type {
                "query_is_writer" => Ok(Value::Bool(self.writers.contains(peer))),
                other => Err(DrpError::UnknownOperation(other.into())),
            }
        }

        fn state(&self) -> State {
            Value::Set(self.writers.iter().cloned().map(Value::Str).collect())
        }

        fn load_state(&mut self, state: &State) -> Result<(), DrpError> {
            match state {
                Value::Set(items) => {
                    self.writers = items
                        .iter()
                        .filter_map(|v| if let Value::Str(s) = v { Some(s.clone()) } else { None })
                        .collect();
                    Ok(())
                }
                other => Err(DrpError::InvalidState(format!("{other:?}"))),
            }
        }
    }

    impl AclView for TestAcl {
        fn finality_signer_keys(&self) -> BTreeMap<PeerId, Vec<u8>> {
            BTreeMap::new()
        }

        fn is_writer(&self, peer_id: &str) -> bool {
            self.writers.contains(peer_id)
        }
    }

    /// A minimal last-writer-wins register, used only to exercise the
    /// pipeline in isolation from any specific production `Drp`.
    #[derive(Clone, Default)]
    struct RegisterDrp {
        value: Option<i64>,
    }

    impl Drp for RegisterDrp {
        fn apply(&mut self, _ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError> {
            match op_type {
                "set" => {
                    if let Some(Value::Int(v)) = args.first() {
                        self.value = Some(*v);
                        Ok(())
                    } else {
                        Err(DrpError::MalformedArguments {
                            operation: "set".into(),
                            reason: "expected one Int argument".into(),
                        })
                    }
                }
                other => Err(DrpError::UnknownOperation(other.into())),
            }
        }

        fn query(&self, query_type: &str, _args: &[Value]) -> Result<Value, DrpError> {
            match query_type {
                "get" => Ok(self.value.map(Value::Int).unwrap_or(Value::Null)),
                other => Err(DrpError::UnknownOperation(other.into())),
            }
        }

        fn state(&self) -> State {
            self.value.map(Value::Int).unwrap_or(Value::Null)
        }

        fn load_state(&mut self, state: &State) -> Result<(), DrpError> {
            self.value = match state {
                Value::Int(v) => Some(*v),
                Value::Null => None,
                other => return Err(DrpError::InvalidState(format!("{other:?}"))),
            };
            Ok(())
        }
    }

    fn new_object(admin_peer_id: &str) -> DRPObject<TestAcl, RegisterDrp> {
        DRPObject::new(
            ObjectId::new("obj-1").unwrap(),
            TestAcl::seeded_with(admin_peer_id),
            RegisterDrp::default(),
            ValidationConfig::default(),
        )
    }

    #[test]
    fn call_local_applies_immediately() {
        let keychain = SoftKeychain::generate().unwrap();
        let mut object = new_object(keychain.peer_id().as_str());
        object
            .call_local(&keychain, DrpType::Drp, "set", vec![Value::Int(42)])
            .unwrap();
        assert_eq!(object.drp().value, Some(42));
    }

    #[test]
    fn call_local_rejects_a_write_from_a_non_writer() {
        let admin = SoftKeychain::generate().unwrap();
        let outsider = SoftKeychain::generate().unwrap();
        let mut object = new_object(admin.peer_id().as_str());
        let result = object.call_local(&outsider, DrpType::Drp, "set", vec![Value::Int(1)]);
        assert!(matches!(result, Err(PipelineError::NotAWriter { .. })));
        assert_eq!(object.drp().value, None);
    }

    #[test]
    fn granting_write_access_locally_lets_the_new_writer_call_in() {
        let admin = SoftKeychain::generate().unwrap();
        let writer = SoftKeychain::generate().unwrap();
        let mut object = new_object(admin.peer_id().as_str());
        object
            .call_local(
                &admin,
                DrpType::Acl,
                "grant",
                vec![Value::Str(writer.peer_id().to_string())],
            )
            .unwrap();
        object
            .call_local(&writer, DrpType::Drp, "set", vec![Value::Int(7)])
            .unwrap();
        assert_eq!(object.drp().value, Some(7));
    }

    #[test]
    fn merge_replays_remote_vertices() {
        let keychain_a = SoftKeychain::generate().unwrap();
        let mut writer = new_object(keychain_a.peer_id().as_str());
        writer
            .call_local(&keychain_a, DrpType::Drp, "set", vec![Value::Int(7)])
            .unwrap();
        let remote_vertices: Vec<Vertex> = writer
            .frontier()
            .iter()
            .filter_map(|h| writer.get_vertex(h).cloned())
            .collect();

        let mut reader = new_object(keychain_a.peer_id().as_str());
        let (accepted, missing) = reader.merge(remote_vertices).unwrap();
        assert_eq!(accepted.len(), 1);
        assert!(missing.is_empty());
        assert_eq!(reader.drp().value, Some(7));
    }

    #[test]
    fn merge_reports_missing_dependencies() {
        let keychain = SoftKeychain::generate().unwrap();
        let mut writer = new_object(keychain.peer_id().as_str());
        writer
            .call_local(&keychain, DrpType::Drp, "set", vec![Value::Int(1)])
            .unwrap();
        let mut orphan = Vertex::new(
            keychain.peer_id().as_str(),
            Operation::new(DrpType::Drp, "set", vec![Value::Int(2)]),
            vec!["not-in-any-graph".repeat(4)],
            now_ms(),
        );
        orphan.signature = keychain.sign_vertex(&orphan.hash).unwrap();

        let mut reader = new_object(keychain.peer_id().as_str());
        let (accepted, missing) = reader.merge(vec![orphan]).unwrap();
        assert!(accepted.is_empty());
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn a_non_writers_merged_vertex_is_accepted_but_not_applied() {
        let admin = SoftKeychain::generate().unwrap();
        let outsider = SoftKeychain::generate().unwrap();
        let mut object = new_object(admin.peer_id().as_str());

        let mut rogue = Vertex::new(
            outsider.peer_id().as_str(),
            Operation::new(DrpType::Drp, "set", vec![Value::Int(99)]),
            object.frontier(),
            now_ms(),
        );
        rogue.signature = outsider.sign_vertex(&rogue.hash).unwrap();

        let (accepted, missing) = object.merge(vec![rogue]).unwrap();
        assert_eq!(accepted.len(), 1, "the vertex still enters the graph");
        assert!(missing.is_empty());
        assert_eq!(object.drp().value, None, "but its effect never applies");
    }

    #[test]
    fn vertices_missing_from_excludes_what_the_peer_already_has() {
        let keychain = SoftKeychain::generate().unwrap();
        let mut writer = new_object(keychain.peer_id().as_str());
        writer.call_local(&keychain, DrpType::Drp, "set", vec![Value::Int(1)]).unwrap();
        let their_frontier = writer.frontier();
        writer.call_local(&keychain, DrpType::Drp, "set", vec![Value::Int(2)]).unwrap();

        let missing = writer.vertices_missing_from(&their_frontier).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].operation.as_ref().unwrap().value, vec![Value::Int(2)]);
    }

    #[test]
    fn adopt_remote_state_seeds_a_fresh_object() {
        let keychain = SoftKeychain::generate().unwrap();
        let mut fresh = new_object(keychain.peer_id().as_str());
        fresh
            .adopt_remote_state(&fresh.acl().state(), &Value::Int(99))
            .unwrap();
        assert_eq!(fresh.drp().value, Some(99));
        assert_eq!(fresh.state().1, Value::Int(99));
    }

    #[test]
    fn error_codes_are_distinguishable() {
        let err = DrpError::UnknownOperation("bogus".into());
        assert_eq!(err.code(), "UNKNOWN_OPERATION");
        let not_a_writer = PipelineError::NotAWriter { peer: "p1".into() };
        assert_eq!(not_a_writer.code(), "NOT_A_WRITER");
    }
}
