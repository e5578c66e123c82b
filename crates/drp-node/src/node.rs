// Path: crates/drp-node/src/node.rs
//! The node orchestrator: owns the network adapter, a per-object actor
//! per joined object, and the interval runners that keep peers synced.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use drp_codec::Value;
use drp_crypto::Keychain;
use drp_finality::FinalityConfig;
use drp_hashgraph::ValidationConfig;
use drp_network::{Message, MessageType, NetworkAdapter};
use drp_object::{AclView, Drp, DRPObject};
use drp_queue::MessageQueue;
use drp_types::{DrpType, ObjectId, PeerId};

use crate::context::DispatchCx;
use crate::error::NodeError;
use crate::object_handle::{ObjectHandle, ObjectQueueItem};
use crate::wire::{DiscoveryResponsePayload, FetchStatePayload, SyncPayload};

/// Orchestrates every object this node has joined, plus the Node-level
/// discovery directory shared across all of them.
///
/// Generic over one ACL type (`A`) and one business `Drp` type (`D`)
/// per process: every object a given node instance hosts shares the
/// same pair of shapes. Running several unrelated `Drp` shapes on one
/// node means running several `Node`s side by side.
pub struct Node<A: Drp + AclView, D: Drp> {
    keychain: Arc<dyn Keychain>,
    network: Arc<dyn NetworkAdapter>,
    objects: RwLock<HashMap<ObjectId, Arc<ObjectHandle<A, D>>>>,
    known_peers: RwLock<HashMap<String, Vec<String>>>,
    finality_config: FinalityConfig,
    validation: ValidationConfig,
}

impl<A: Drp + AclView, D: Drp> Node<A, D> {
    /// Builds a node around `keychain` and `network`. Nothing is
    /// subscribed or joined until [`Node::start`] runs.
    pub fn new(
        keychain: Arc<dyn Keychain>,
        network: Arc<dyn NetworkAdapter>,
        finality_config: FinalityConfig,
        validation: ValidationConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            keychain,
            network,
            objects: RwLock::new(HashMap::new()),
            known_peers: RwLock::new(HashMap::new()),
            finality_config,
            validation,
        })
    }

    fn cx(&self) -> DispatchCx {
        DispatchCx::new(self.keychain.clone(), self.network.clone(), self.validation)
    }

    /// This node's network identity.
    pub fn peer_id(&self) -> String {
        self.network.local_peer_id()
    }

    /// The peer id every outgoing message is authored as — the
    /// keychain's, not the transport's, since ACL and signature checks
    /// are all keyed off the keychain identity.
    fn identity(&self) -> String {
        self.keychain.peer_id().to_string()
    }

    /// Starts the network transport and installs the single dispatch
    /// subscriber on its incoming queue.
    pub async fn start(self: &Arc<Self>) -> Result<(), NodeError> {
        self.network.start().await?;
        let incoming: Arc<MessageQueue<Message>> = self.network.incoming();
        let node = self.clone();
        incoming
            .subscribe(Box::new(move |message: Message| {
                let node = node.clone();
                tokio::spawn(async move {
                    if let Err(e) = node.dispatch_message(message).await {
                        warn!(error = %e, "message dispatch failed");
                    }
                });
                Ok(())
            }))
            .await;
        Ok(())
    }

    /// Stops the network transport. Per-object actors are torn down
    /// individually via [`Node::leave_object`] or when the node itself
    /// is dropped.
    pub async fn stop(&self) -> Result<(), NodeError> {
        self.network.stop().await?;
        Ok(())
    }

    /// Joins `object_id`'s gossip topic and spawns its actor, seeded
    /// with `initial_acl`/`initial_drp` as the replay base.
    ///
    /// If the object is brand new to this node (no existing vertices),
    /// a `FETCH_STATE` is broadcast immediately so the object can
    /// bootstrap from a peer who already has it, per
    /// [`Node::resume_object`].
    pub async fn join_object(self: &Arc<Self>, object_id: ObjectId, initial_acl: A, initial_drp: D) -> Result<(), NodeError> {
        self.network.join_object(&object_id).await?;
        let object = DRPObject::new(object_id.clone(), initial_acl, initial_drp, self.validation);
        let handle = Arc::new(ObjectHandle::spawn(object, self.finality_config, self.cx()));
        self.objects.write().await.insert(object_id.clone(), handle);
        self.resume_object(&object_id).await
    }

    /// Leaves `object_id`'s gossip topic and tears down its actor.
    pub async fn leave_object(&self, object_id: &ObjectId) -> Result<(), NodeError> {
        self.network.leave_object(object_id).await?;
        self.objects.write().await.remove(object_id);
        Ok(())
    }

    /// Re-announces interest in `object_id` to the network: broadcasts
    /// a `FETCH_STATE` so any peer who already has history for it can
    /// answer, letting a freshly joined or just-reconnected node catch
    /// up without waiting for the next interval runner tick.
    pub async fn resume_object(&self, object_id: &ObjectId) -> Result<(), NodeError> {
        let objects = self.objects.read().await;
        let Some(handle) = objects.get(object_id) else {
            return Err(NodeError::UnknownObject(object_id.to_string()));
        };
        let frontier = handle.state.read().await.object.frontier();
        let payload = FetchStatePayload {
            vertex_hash: frontier.first().cloned().unwrap_or_default(),
        };
        self.network
            .broadcast(Message::new(
                self.identity(),
                MessageType::FetchState,
                object_id.as_str(),
                payload.encode(),
            ))
            .await?;
        Ok(())
    }

    /// Broadcasts a `SYNC` request for `object_id`, asking peers for
    /// any vertices past our current frontier.
    pub async fn request_sync(&self, object_id: &ObjectId) -> Result<(), NodeError> {
        let objects = self.objects.read().await;
        let Some(handle) = objects.get(object_id) else {
            return Err(NodeError::UnknownObject(object_id.to_string()));
        };
        let frontier = handle.state.read().await.object.frontier();
        let payload = SyncPayload { frontier };
        self.network
            .broadcast(Message::new(self.identity(), MessageType::Sync, object_id.as_str(), payload.encode()))
            .await?;
        Ok(())
    }

    /// Submits a locally-authored write to `object_id`'s actor. The
    /// new vertex's hash reaches observers through the object's own
    /// [`drp_object::ObjectEvent::Applied`] stream rather than this
    /// call's return value, since the actor's inbox carries no reply
    /// channel.
    pub async fn call_local(
        &self,
        object_id: &ObjectId,
        drp_type: DrpType,
        op_type: &str,
        args: Vec<Value>,
    ) -> Result<(), NodeError> {
        let objects = self.objects.read().await;
        let Some(handle) = objects.get(object_id) else {
            return Err(NodeError::UnknownObject(object_id.to_string()));
        };
        handle
            .enqueue(ObjectQueueItem::LocalWrite {
                drp_type,
                op_type: op_type.to_string(),
                args,
            })
            .await
    }

    /// Broadcasts a `DRP_DISCOVERY` request, asking peers which
    /// objects they're currently joined to.
    pub async fn discover_peers(&self) -> Result<(), NodeError> {
        self.network
            .broadcast(Message::new(self.identity(), MessageType::DrpDiscovery, "", Vec::new()))
            .await?;
        Ok(())
    }

    /// Routes one decoded inbound message: discovery messages are
    /// handled at the node level (they carry no `object_id`);
    /// everything else is handed to the addressed object's actor.
    pub async fn dispatch_message(&self, message: Message) -> Result<(), NodeError> {
        match message.message_type {
            MessageType::DrpDiscovery => self.handle_drp_discovery(&message).await,
            MessageType::DrpDiscoveryResponse => self.handle_drp_discovery_response(&message).await,
            _ => {
                let object_id = ObjectId::new(message.object_id.clone())?;
                let objects = self.objects.read().await;
                let Some(handle) = objects.get(&object_id) else {
                    debug!(object_id = %object_id, "dropping message for an object we haven't joined");
                    return Ok(());
                };
                handle.enqueue(ObjectQueueItem::Remote(message)).await
            }
        }
    }

    async fn handle_drp_discovery(&self, message: &Message) -> Result<(), NodeError> {
        let joined_objects = self.objects.read().await.keys().map(ObjectId::to_string).collect();
        let payload = DiscoveryResponsePayload {
            peer_id: self.identity(),
            joined_objects,
            multiaddrs: self.network.listen_addrs(),
        };
        self.network
            .broadcast(Message::new(
                self.identity(),
                MessageType::DrpDiscoveryResponse,
                "",
                payload.encode(),
            ))
            .await?;
        let _ = message;
        Ok(())
    }

    async fn handle_drp_discovery_response(&self, message: &Message) -> Result<(), NodeError> {
        let payload = DiscoveryResponsePayload::decode(&message.data)?;
        info!(
            peer = %payload.peer_id,
            objects = payload.joined_objects.len(),
            addrs = payload.multiaddrs.len(),
            "discovered peer"
        );
        for addr in &payload.multiaddrs {
            if let Err(e) = self.network.dial(addr).await {
                warn!(peer = %payload.peer_id, %addr, error = %e, "failed to dial discovered peer");
            }
        }
        self.known_peers.write().await.insert(payload.peer_id, payload.joined_objects);
        Ok(())
    }

    /// The objects known to be joined by `peer_id`, from the last
    /// `DRP_DISCOVERY_RESPONSE` it sent.
    pub async fn known_objects_for(&self, peer_id: &str) -> Vec<String> {
        self.known_peers.read().await.get(peer_id).cloned().unwrap_or_default()
    }

    /// This node's own peer id as a [`PeerId`], for ACL checks that
    /// need the typed form.
    pub fn self_peer_id(&self) -> Result<PeerId, NodeError> {
        Ok(PeerId::new(self.identity())?)
    }
}
