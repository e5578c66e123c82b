// Path: crates/drp-network/src/adapter.rs
use std::sync::Arc;

use async_trait::async_trait;

use drp_queue::MessageQueue;
use drp_types::ObjectId;

use crate::error::NetworkError;
use crate::message::Message;

/// The wire transport seam `drp-node` programs against.
///
/// A `Libp2pNetwork` is the production implementation; tests and
/// single-process demos can swap in an in-memory adapter without
/// touching node logic.
#[async_trait]
pub trait NetworkAdapter: Send + Sync {
    /// Starts background tasks (swarm event loop, listeners).
    async fn start(&self) -> Result<(), NetworkError>;

    /// Stops background tasks and closes connections.
    async fn stop(&self) -> Result<(), NetworkError>;

    /// This node's network identity.
    fn local_peer_id(&self) -> String;

    /// Joins the gossip topic for `object_id`, so `broadcast` and
    /// incoming messages for it start flowing.
    async fn join_object(&self, object_id: &ObjectId) -> Result<(), NetworkError>;

    /// Leaves the gossip topic for `object_id`.
    async fn leave_object(&self, object_id: &ObjectId) -> Result<(), NetworkError>;

    /// Publishes `message` on its object's topic (or the shared
    /// discovery topic, for discovery message types).
    async fn broadcast(&self, message: Message) -> Result<(), NetworkError>;

    /// The queue every decoded inbound message is enqueued on. A
    /// `Node` installs its single dispatch subscriber here.
    fn incoming(&self) -> Arc<MessageQueue<Message>>;

    /// The multiaddrs this node advertises itself as reachable on,
    /// handed out in `DRP_DISCOVERY_RESPONSE` so peers can dial in
    /// directly instead of relying on gossipsub mesh propagation alone.
    fn listen_addrs(&self) -> Vec<String>;

    /// Dials a peer at `addr` directly. Used after learning a peer's
    /// multiaddrs through discovery; failures are non-fatal since the
    /// gossip mesh may still reach that peer through other routes.
    async fn dial(&self, addr: &str) -> Result<(), NetworkError>;
}
