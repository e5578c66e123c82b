// Path: crates/drp-acl/src/acl.rs
use std::collections::{BTreeMap, HashMap, HashSet};

use drp_codec::Value;
use drp_hashgraph::{PairAction, Semantics};
use drp_object::{Drp, DrpError, OpContext};
use drp_types::{PeerId, State, Vertex};

use crate::group::Group;

/// The built-in access-control `Drp`: three permission groups
/// (`Admin`, `Writer`, `Finality`) plus a peer-to-BLS-key registry,
/// mutated by `grant`, `revoke`, and `setKey` operations.
///
/// Concurrent `grant`/`revoke` of the same `(peer, group)` pair always
/// resolve with the revoke winning, regardless of which was timestamped
/// first — see [`Drp::resolve_pair`] below. Every other pair of
/// operations (including unrelated grants/revokes) falls back to
/// timestamp order.
#[derive(Clone, Default)]
pub struct ObjectAcl {
    admins: HashSet<String>,
    writers: HashSet<String>,
    finality: HashSet<String>,
    bls_keys: HashMap<String, Vec<u8>>,
}

impl ObjectAcl {
    /// Creates a new ACL with `admin_peer_id` as its sole initial
    /// member of every group, mirroring the creator of an object
    /// starting out able to write to and administer it.
    pub fn new(admin_peer_id: impl Into<String>) -> Self {
        let peer = admin_peer_id.into();
        let mut acl = Self::default();
        acl.admins.insert(peer.clone());
        acl.writers.insert(peer);
        acl
    }

    /// True if `peer_id` is in the `Admin` group.
    pub fn is_admin(&self, peer_id: &str) -> bool {
        self.admins.contains(peer_id)
    }

    /// True if `peer_id` is in the `Writer` group.
    pub fn is_writer(&self, peer_id: &str) -> bool {
        self.writers.contains(peer_id)
    }

    /// True if `peer_id` is in the `Finality` group.
    pub fn is_finality_signer(&self, peer_id: &str) -> bool {
        self.finality.contains(peer_id)
    }

    /// The BLS public key `peer_id` registered via `setKey`, if any.
    pub fn bls_key(&self, peer_id: &str) -> Option<&[u8]> {
        self.bls_keys.get(peer_id).map(|v| v.as_slice())
    }

    /// The current `Finality` group membership, for seeding a
    /// `FinalityStore`'s signer set.
    pub fn finality_signers(&self) -> Vec<String> {
        let mut signers: Vec<String> = self.finality.iter().cloned().collect();
        signers.sort();
        signers
    }

    /// The current `Finality` group membership paired with each
    /// member's registered BLS key, for `FinalityStore::initialize_state`.
    /// A finality signer that hasn't called `setKey` yet is omitted —
    /// it simply can't attest until it registers a key.
    pub fn finality_signer_keys(&self) -> BTreeMap<PeerId, Vec<u8>> {
        self.finality
            .iter()
            .filter_map(|peer| {
                let key = self.bls_keys.get(peer)?;
                let peer_id = PeerId::new(peer.clone()).ok()?;
                Some((peer_id, key.clone()))
            })
            .collect()
    }

    fn group_set_mut(&mut self, group: Group) -> &mut HashSet<String> {
        match group {
            Group::Admin => &mut self.admins,
            Group::Writer => &mut self.writers,
            Group::Finality => &mut self.finality,
        }
    }

    fn parse_grant_args(args: &[Value]) -> Option<(String, Group)> {
        let Value::Str(peer) = args.first()? else { return None };
        let Value::Str(group) = args.get(1)? else { return None };
        Some((peer.clone(), Group::parse(group)?))
    }

    /// Identifies a vertex as a `grant`/`revoke` targeting a specific
    /// `(peer, group)` pair, for the revoke-wins resolver.
    fn grant_target(vertex: &Vertex) -> Option<(&'static str, String, Group)> {
        let op = vertex.operation.as_ref()?;
        let (peer, group) = Self::parse_grant_args(&op.value)?;
        match op.op_type.as_str() {
            "grant" => Some(("grant", peer, group)),
            "revoke" => Some(("revoke", peer, group)),
            _ => None,
        }
    }
}

impl Drp for ObjectAcl {
    fn apply(&mut self, ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError> {
        match op_type {
            "grant" => {
                let (peer, group) = Self::parse_grant_args(args).ok_or_else(|| {
                    DrpError::MalformedArguments {
                        operation: "grant".into(),
                        reason: "expected (peer_id: Str, group: Str)".into(),
                    }
                })?;
                if self.is_admin(ctx.caller.as_str()) {
                    self.group_set_mut(group).insert(peer);
                }
                Ok(())
            }
            "revoke" => {
                let (peer, group) = Self::parse_grant_args(args).ok_or_else(|| {
                    DrpError::MalformedArguments {
                        operation: "revoke".into(),
                        reason: "expected (peer_id: Str, group: Str)".into(),
                    }
                })?;
                // Cannot revoke any permission from a peer that is
                // currently admin, regardless of which group is named.
                if self.is_admin(ctx.caller.as_str()) && !self.is_admin(&peer) {
                    self.group_set_mut(group).remove(&peer);
                }
                Ok(())
            }
            "set_key" => {
                let Some(Value::Bytes(key)) = args.first() else {
                    return Err(DrpError::MalformedArguments {
                        operation: "set_key".into(),
                        reason: "expected (bls_public_key: Bytes)".into(),
                    });
                };
                // A peer may register its own BLS key before it is
                // ever granted Finality; the key only becomes
                // effective for signing once membership is granted.
                self.bls_keys.insert(ctx.caller.to_string(), key.clone());
                Ok(())
            }
            other => Err(DrpError::UnknownOperation(other.into())),
        }
    }

    fn query(&self, query_type: &str, args: &[Value]) -> Result<Value, DrpError> {
        let peer = || -> Result<&str, DrpError> {
            match args.first() {
                Some(Value::Str(p)) => Ok(p.as_str()),
                _ => Err(DrpError::MalformedArguments {
                    operation: query_type.into(),
                    reason: "expected a peer_id: Str argument".into(),
                }),
            }
        };
        match query_type {
            "query_is_admin" => Ok(Value::Bool(self.is_admin(peer()?))),
            "query_is_writer" => Ok(Value::Bool(self.is_writer(peer()?))),
            "query_is_finality_signer" => Ok(Value::Bool(self.is_finality_signer(peer()?))),
            "query_get_peer_key" => Ok(self
                .bls_key(peer()?)
                .map(|k| Value::Bytes(k.to_vec()))
                .unwrap_or(Value::Null)),
            "query_get_finality_signers" => Ok(Value::Map(
                self.finality
                    .iter()
                    .map(|p| {
                        let key = self
                            .bls_keys
                            .get(p)
                            .map(|k| Value::Bytes(k.clone()))
                            .unwrap_or(Value::Null);
                        (Value::Str(p.clone()), key)
                    })
                    .collect(),
            )),
            other => Err(DrpError::UnknownOperation(other.into())),
        }
    }

    fn semantics_type(&self) -> Semantics {
        Semantics::Pair
    }

    fn resolve_pair(&self, a: &Vertex, b: &Vertex) -> PairAction {
        if let (Some((kind_a, peer_a, group_a)), Some((kind_b, peer_b, group_b))) =
            (Self::grant_target(a), Self::grant_target(b))
        {
            if peer_a == peer_b && group_a == group_b && kind_a != kind_b {
                return if kind_a == "grant" {
                    PairAction::DropLeft // a is the grant; the revoke wins
                } else {
                    PairAction::DropRight // b is the grant; the revoke wins
                };
            }
        }
        PairAction::Nop
    }

    fn state(&self) -> State {
        Value::Map(vec![
            (
                Value::Str("admin".into()),
                Value::Set(self.admins.iter().cloned().map(Value::Str).collect()),
            ),
            (
                Value::Str("writer".into()),
                Value::Set(self.writers.iter().cloned().map(Value::Str).collect()),
            ),
            (
                Value::Str("finality".into()),
                Value::Set(self.finality.iter().cloned().map(Value::Str).collect()),
            ),
            (
                Value::Str("blsKeys".into()),
                Value::Map(
                    self.bls_keys
                        .iter()
                        .map(|(peer, key)| (Value::Str(peer.clone()), Value::Bytes(key.clone())))
                        .collect(),
                ),
            ),
        ])
    }

    fn load_state(&mut self, state: &State) -> Result<(), DrpError> {
        let Value::Map(entries) = state else {
            return Err(DrpError::InvalidState("expected a Map".into()));
        };
        let field = |name: &str| -> Option<&Value> {
            entries.iter().find_map(|(k, v)| match k {
                Value::Str(s) if s == name => Some(v),
                _ => None,
            })
        };
        let as_peer_set = |v: &Value| -> HashSet<String> {
            match v {
                Value::Set(items) => items
                    .iter()
                    .filter_map(|i| if let Value::Str(s) = i { Some(s.clone()) } else { None })
                    .collect(),
                _ => HashSet::new(),
            }
        };
        self.admins = field("admin").map(as_peer_set).unwrap_or_default();
        self.writers = field("writer").map(as_peer_set).unwrap_or_default();
        self.finality = field("finality").map(as_peer_set).unwrap_or_default();
        self.bls_keys = field("blsKeys")
            .map(|v| match v {
                Value::Map(entries) => entries
                    .iter()
                    .filter_map(|(k, v)| match (k, v) {
                        (Value::Str(peer), Value::Bytes(key)) => Some((peer.clone(), key.clone())),
                        _ => None,
                    })
                    .collect(),
                _ => HashMap::new(),
            })
            .unwrap_or_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drp_types::{DrpType, Operation};

    fn grant_vertex(peer: &str, group: &str, ts: u64) -> Vertex {
        Vertex::new(
            "p1",
            Operation::new(DrpType::Acl, "grant", vec![Value::Str(peer.into()), Value::Str(group.into())]),
            vec![],
            ts,
        )
    }

    fn revoke_vertex(peer: &str, group: &str, ts: u64) -> Vertex {
        Vertex::new(
            "p1",
            Operation::new(DrpType::Acl, "revoke", vec![Value::Str(peer.into()), Value::Str(group.into())]),
            vec![],
            ts,
        )
    }

    #[test]
    fn revoke_outranks_a_later_grant_of_the_same_peer_and_group() {
        let acl = ObjectAcl::new("p1");
        let grant = grant_vertex("p2", "writer", 300);
        let revoke = revoke_vertex("p2", "writer", 100);
        // Even though the grant is timestamped later, it must be
        // excised from history entirely so the revoke's effect sticks.
        assert_eq!(acl.resolve_pair(&grant, &revoke), PairAction::DropLeft);
        assert_eq!(acl.resolve_pair(&revoke, &grant), PairAction::DropRight);
    }

    #[test]
    fn unrelated_grants_are_left_to_the_default_timestamp_tiebreak() {
        let acl = ObjectAcl::new("p1");
        let a = grant_vertex("p2", "writer", 100);
        let b = grant_vertex("p3", "writer", 200);
        assert_eq!(acl.resolve_pair(&a, &b), PairAction::Nop);
    }

    #[test]
    fn admin_cannot_be_stripped_of_any_group_via_revoke() {
        let mut acl = ObjectAcl::new("p1");
        let ctx = OpContext { caller: drp_types::PeerId::new("p1").unwrap(), timestamp: 0 };
        acl.apply(&ctx, "revoke", &[Value::Str("p1".into()), Value::Str("writer".into())]).unwrap();
        assert!(acl.is_writer("p1"));
    }

    #[test]
    fn set_key_is_stored_before_finality_membership_is_granted() {
        let mut acl = ObjectAcl::new("p1");
        let ctx = OpContext { caller: drp_types::PeerId::new("p2").unwrap(), timestamp: 0 };
        acl.apply(&ctx, "set_key", &[Value::Bytes(vec![1, 2, 3])]).unwrap();
        assert!(!acl.is_finality_signer("p2"));
        assert_eq!(acl.bls_key("p2"), Some([1u8, 2, 3].as_slice()));
    }

    #[test]
    fn state_round_trips_through_load_state() {
        let mut acl = ObjectAcl::new("p1");
        let ctx = OpContext { caller: drp_types::PeerId::new("p1").unwrap(), timestamp: 0 };
        acl.apply(&ctx, "grant", &[Value::Str("p2".into()), Value::Str("writer".into())]).unwrap();
        acl.apply(&ctx, "set_key", &[Value::Bytes(vec![9])]).unwrap();

        let mut restored = ObjectAcl::default();
        restored.load_state(&acl.state()).unwrap();
        assert!(restored.is_writer("p2"));
        assert_eq!(restored.bls_key("p1"), Some([9u8].as_slice()));
    }
}
