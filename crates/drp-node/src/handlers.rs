// Path: crates/drp-node/src/handlers.rs
//! The message and local-write handlers a per-object actor dispatches
//! to. Each takes its state and dependencies as explicit parameters so
//! it can be exercised against a fake [`NetworkAdapter`] without a
//! running node.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use drp_codec::{Value, ROOT_HASH};
use drp_network::{Message, MessageType};
use drp_object::{AclView, Drp};
use drp_types::{DrpType, PeerId};

use crate::context::DispatchCx;
use crate::error::NodeError;
use crate::object_handle::ObjectState;
use crate::wire::{
    AttestationUpdatePayload, FetchStatePayload, FetchStateResponsePayload, SyncAcceptPayload, SyncPayload,
    UpdatePayload,
};

fn is_bootstrapping(frontier: &[String]) -> bool {
    frontier.len() == 1 && frontier.first().map(String::as_str) == Some(ROOT_HASH)
}

fn reply(cx: &DispatchCx, object_id: &str, message_type: MessageType, data: Vec<u8>) -> Message {
    Message::new(cx.keychain.peer_id().as_str(), message_type, object_id, data)
}

/// Dispatches one inbound network message to the handler matching its
/// `message_type`.
pub async fn handle_object_message<A: Drp + AclView, D: Drp>(
    state: &mut ObjectState<A, D>,
    cx: &DispatchCx,
    message: Message,
) -> Result<(), NodeError> {
    match message.message_type {
        MessageType::FetchState => handle_fetch_state(state, cx, &message).await,
        MessageType::FetchStateResponse => handle_fetch_state_response(state, &message),
        MessageType::Update => handle_update(state, &message),
        MessageType::Sync => handle_sync(state, cx, &message).await,
        MessageType::SyncAccept => handle_sync_accept(state, &message),
        MessageType::SyncReject => handle_sync_reject(&message),
        MessageType::AttestationUpdate => handle_attestation_update(state, &message),
        MessageType::DrpDiscovery | MessageType::DrpDiscoveryResponse => {
            debug!(object_id = %message.object_id, "discovery message routed to a per-object actor, ignoring");
            Ok(())
        }
        MessageType::Unspecified | MessageType::Custom => {
            debug!(message_type = ?message.message_type, "no handler for this message type");
            Ok(())
        }
    }
}

/// `FETCH_STATE`: a peer asked for our current state. Reply with a
/// snapshot of both layers and the finality signer set.
pub async fn handle_fetch_state<A: Drp + AclView, D: Drp>(
    state: &ObjectState<A, D>,
    cx: &DispatchCx,
    message: &Message,
) -> Result<(), NodeError> {
    let request = FetchStatePayload::decode(&message.data)?;
    let signers: Vec<(String, Vec<u8>)> = state
        .object
        .acl()
        .finality_signer_keys()
        .into_iter()
        .map(|(peer, key)| (peer.to_string(), key))
        .collect();
    let (acl_state, drp_state) = state.object.state();
    let payload = FetchStateResponsePayload {
        vertex_hash: request.vertex_hash,
        acl_state: acl_state.encode(),
        drp_state: drp_state.encode(),
        finality_signers: signers,
    };
    cx.network
        .broadcast(reply(cx, message.object_id.as_str(), MessageType::FetchStateResponse, payload.encode()))
        .await?;
    Ok(())
}

/// `FETCH_STATE_RESPONSE`: adopt the snapshot if we're still
/// bootstrapping this object, and always seed finality tracking for
/// its vertex.
pub fn handle_fetch_state_response<A: Drp + AclView, D: Drp>(
    state: &mut ObjectState<A, D>,
    message: &Message,
) -> Result<(), NodeError> {
    let payload = FetchStateResponsePayload::decode(&message.data)?;
    let (acl_state, drp_state) = payload.decode_states()?;

    if is_bootstrapping(&state.object.frontier()) {
        state.object.adopt_remote_state(&acl_state, &drp_state)?;
        info!(object_id = %state.object.id(), "adopted remote state while bootstrapping");
    }

    let signers: BTreeMap<PeerId, Vec<u8>> = payload
        .finality_signers
        .into_iter()
        .filter_map(|(peer, key)| PeerId::new(peer).ok().map(|p| (p, key)))
        .collect();
    state.finality.initialize_state(payload.vertex_hash, signers);
    Ok(())
}

/// `UPDATE`: merge newly announced vertices into our graph.
pub fn handle_update<A: Drp + AclView, D: Drp>(state: &mut ObjectState<A, D>, message: &Message) -> Result<(), NodeError> {
    let payload = UpdatePayload::decode(&message.data)?;
    let (accepted, missing) = state.object.merge(payload.vertices)?;
    if !missing.is_empty() {
        debug!(object_id = %state.object.id(), missing = missing.len(), "update left dependencies unresolved");
    }
    info!(object_id = %state.object.id(), accepted = accepted.len(), "merged update");
    Ok(())
}

/// `SYNC`: a peer's frontier is behind ours; send back what it's
/// missing.
pub async fn handle_sync<A: Drp + AclView, D: Drp>(
    state: &ObjectState<A, D>,
    cx: &DispatchCx,
    message: &Message,
) -> Result<(), NodeError> {
    let request = SyncPayload::decode(&message.data)?;
    let missing = state.object.vertices_missing_from(&request.frontier)?;
    let payload = SyncAcceptPayload { vertices: missing };
    cx.network
        .broadcast(reply(cx, message.object_id.as_str(), MessageType::SyncAccept, payload.encode()))
        .await?;
    Ok(())
}

/// `SYNC_ACCEPT`: a peer answered our `SYNC` with the vertices we were
/// missing; merge them exactly like an `UPDATE`.
pub fn handle_sync_accept<A: Drp + AclView, D: Drp>(
    state: &mut ObjectState<A, D>,
    message: &Message,
) -> Result<(), NodeError> {
    let payload = SyncAcceptPayload::decode(&message.data)?;
    let (accepted, missing) = state.object.merge(payload.vertices)?;
    info!(object_id = %state.object.id(), accepted = accepted.len(), still_missing = missing.len(), "merged sync accept");
    Ok(())
}

/// `SYNC_REJECT`: reserved. We never send one ourselves today
/// (`handle_sync` always answers), so this only exists as a plug point
/// for a future decline policy, e.g. rate limiting noisy peers.
pub fn handle_sync_reject(message: &Message) -> Result<(), NodeError> {
    debug!(object_id = %message.object_id, sender = %message.sender, "sync reject received, no policy installed");
    Ok(())
}

/// `ATTESTATION_UPDATE`: merge finality attestations another peer has
/// already verified.
pub fn handle_attestation_update<A: Drp + AclView, D: Drp>(
    state: &mut ObjectState<A, D>,
    message: &Message,
) -> Result<(), NodeError> {
    let payload = AttestationUpdatePayload::decode(&message.data)?;
    let items: Vec<(PeerId, String, Vec<u8>)> = payload
        .attestations
        .into_iter()
        .filter_map(|(peer, vertex_hash, sig)| PeerId::new(peer).ok().map(|p| (p, vertex_hash, sig)))
        .collect();
    let merged = state.finality.merge_signatures(&items);
    if !merged.is_empty() {
        info!(object_id = %state.object.id(), count = merged.len(), "merged finality attestations");
    }
    Ok(())
}

/// A local write submitted through [`crate::Node::call_local`]: apply
/// it, start tracking its finality, and announce it to the rest of the
/// object's peers.
pub async fn handle_local_write<A: Drp + AclView, D: Drp>(
    state: &mut ObjectState<A, D>,
    cx: &DispatchCx,
    drp_type: DrpType,
    op_type: &str,
    args: Vec<Value>,
) -> Result<(), NodeError> {
    let vertex = state.object.call_local(cx.keychain.as_ref(), drp_type, op_type, args)?;
    state
        .finality
        .initialize_state(vertex.hash.clone(), state.object.acl().finality_signer_keys());

    let payload = UpdatePayload {
        vertices: vec![vertex],
    };
    if let Err(e) = cx
        .network
        .broadcast(reply(cx, state.object.id().as_str(), MessageType::Update, payload.encode()))
        .await
    {
        warn!(object_id = %state.object.id(), error = %e, "failed to announce local write");
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use drp_crypto::{Keychain, SoftKeychain};
    use drp_hashgraph::ValidationConfig;
    use drp_network::NetworkError;
    use drp_object::{DrpError, OpContext, DRPObject};
    use drp_types::{ObjectId, State};

    use super::*;
    use crate::object_handle::ObjectState;

    #[derive(Default)]
    struct FakeNetwork {
        sent: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl drp_network::NetworkAdapter for FakeNetwork {
        async fn start(&self) -> Result<(), NetworkError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), NetworkError> {
            Ok(())
        }
        fn local_peer_id(&self) -> String {
            "fake-peer".into()
        }
        async fn join_object(&self, _object_id: &ObjectId) -> Result<(), NetworkError> {
            Ok(())
        }
        async fn leave_object(&self, _object_id: &ObjectId) -> Result<(), NetworkError> {
            Ok(())
        }
        async fn broadcast(&self, message: Message) -> Result<(), NetworkError> {
            self.sent.lock().await.push(message);
            Ok(())
        }
        fn incoming(&self) -> Arc<drp_queue::MessageQueue<Message>> {
            Arc::new(drp_queue::MessageQueue::new(8))
        }
        fn listen_addrs(&self) -> Vec<String> {
            vec!["/ip4/127.0.0.1/tcp/0".into()]
        }
        async fn dial(&self, _addr: &str) -> Result<(), NetworkError> {
            Ok(())
        }
    }

    fn cx_with(network: Arc<FakeNetwork>, keychain: Arc<SoftKeychain>) -> DispatchCx {
        DispatchCx::new(keychain, network, ValidationConfig::default())
    }

    /// A trivial ACL fixture naming a fixed writer set, standing in for
    /// `drp-acl`'s `ObjectAcl` so these handler tests don't drag in its
    /// admin/group machinery.
    #[derive(Clone, Default)]
    struct WritersAcl {
        writers: HashSet<String>,
    }

    impl WritersAcl {
        fn new(admin: &str) -> Self {
            let mut writers = HashSet::new();
            writers.insert(admin.to_string());
            Self { writers }
        }
    }

    impl Drp for WritersAcl {
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

    impl AclView for WritersAcl {
        fn finality_signer_keys(&self) -> BTreeMap<PeerId, Vec<u8>> {
            BTreeMap::new()
        }

        fn is_writer(&self, peer_id: &str) -> bool {
            self.writers.contains(peer_id)
        }
    }

    /// A bare last-writer-wins register, so these tests exercise a
    /// second, genuinely independent layer rather than reusing the ACL
    /// as its own business DRP.
    #[derive(Clone, Default)]
    struct RegisterDrp {
        value: Option<i64>,
    }

    impl Drp for RegisterDrp {
        fn apply(&mut self, _ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError> {
            match op_type {
                "set" => {
                    let Some(Value::Int(v)) = args.first() else {
                        return Err(DrpError::MalformedArguments {
                            operation: "set".into(),
                            reason: "expected one Int argument".into(),
                        });
                    };
                    self.value = Some(*v);
                    Ok(())
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

    fn fresh_state(admin: &SoftKeychain) -> ObjectState<WritersAcl, RegisterDrp> {
        let object = DRPObject::new(
            ObjectId::new("obj-1").unwrap(),
            WritersAcl::new(admin.peer_id().as_str()),
            RegisterDrp::default(),
            ValidationConfig::default(),
        );
        ObjectState {
            object,
            finality: drp_finality::FinalityStore::new(drp_finality::FinalityConfig::default()),
        }
    }

    #[tokio::test]
    async fn fetch_state_replies_with_a_snapshot() {
        let admin = SoftKeychain::generate().unwrap();
        let state = fresh_state(&admin);
        let network = Arc::new(FakeNetwork::default());
        let cx = cx_with(network.clone(), Arc::new(SoftKeychain::generate().unwrap()));
        let request = Message::new("peer-b", MessageType::FetchState, "obj-1", FetchStatePayload {
            vertex_hash: "root".into(),
        }.encode());

        handle_fetch_state(&state, &cx, &request).await.unwrap();

        let sent = network.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message_type, MessageType::FetchStateResponse);
    }

    #[tokio::test]
    async fn local_write_broadcasts_an_update() {
        let admin = Arc::new(SoftKeychain::generate().unwrap());
        let mut state = fresh_state(&admin);
        let network = Arc::new(FakeNetwork::default());
        let cx = cx_with(network.clone(), admin.clone());

        handle_local_write(&mut state, &cx, DrpType::Drp, "set", vec![Value::Int(7)]).await.unwrap();

        let sent = network.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message_type, MessageType::Update);
        assert_eq!(state.object.frontier().len(), 1);
        assert_eq!(state.object.drp().query("get", &[]).unwrap(), Value::Int(7));
    }

    #[tokio::test]
    async fn a_non_writers_local_write_is_rejected_before_broadcasting() {
        let admin = Arc::new(SoftKeychain::generate().unwrap());
        let outsider = Arc::new(SoftKeychain::generate().unwrap());
        let mut state = fresh_state(&admin);
        let network = Arc::new(FakeNetwork::default());
        let cx = cx_with(network.clone(), outsider);

        let result = handle_local_write(&mut state, &cx, DrpType::Drp, "set", vec![Value::Int(7)]).await;
        assert!(result.is_err());
        assert!(network.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sync_replies_with_vertices_the_peer_is_missing() {
        let admin = Arc::new(SoftKeychain::generate().unwrap());
        let mut state = fresh_state(&admin);
        let network = Arc::new(FakeNetwork::default());
        let cx = cx_with(network.clone(), admin.clone());
        handle_local_write(&mut state, &cx, DrpType::Drp, "set", vec![Value::Int(1)]).await.unwrap();
        network.sent.lock().await.clear();

        let sync_request = Message::new("peer-b", MessageType::Sync, "obj-1", SyncPayload { frontier: vec![] }.encode());
        handle_sync(&state, &cx, &sync_request).await.unwrap();

        let sent = network.sent.lock().await;
        assert_eq!(sent.len(), 1);
        let payload = SyncAcceptPayload::decode(&sent[0].data).unwrap();
        assert_eq!(payload.vertices.len(), 1);
    }

    #[tokio::test]
    async fn sync_reject_is_a_harmless_no_op() {
        let message = Message::new("peer-b", MessageType::SyncReject, "obj-1", vec![]);
        assert!(handle_sync_reject(&message).is_ok());
    }

    #[tokio::test]
    async fn update_merges_a_remote_vertex() {
        let admin = Arc::new(SoftKeychain::generate().unwrap());
        let mut writer_state = fresh_state(&admin);
        let vertex = writer_state
            .object
            .call_local(admin.as_ref() as &dyn Keychain, DrpType::Drp, "set", vec![Value::Int(9)])
            .unwrap();

        let mut reader_state = fresh_state(&admin);
        let update = Message::new(
            "peer-a",
            MessageType::Update,
            "obj-1",
            UpdatePayload { vertices: vec![vertex] }.encode(),
        );
        handle_update(&mut reader_state, &update).unwrap();
        assert_eq!(reader_state.object.frontier().len(), 1);
        assert_eq!(reader_state.object.drp().query("get", &[]).unwrap(), Value::Int(9));
    }
}
