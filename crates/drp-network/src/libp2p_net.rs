// Path: crates/drp-network/src/libp2p_net.rs
//! A gossipsub-backed [`NetworkAdapter`]: every object gets its own
//! topic named after its id directly, plus two shared topics for the
//! discovery protocol — `drp::interval-discovery` for the periodic
//! broadcast requests the reconnect/discovery runners send, and
//! `drp::discovery` for the responses answering them, so a node that
//! only cares about replies doesn't have to filter out the chatter of
//! every other peer's own periodic announcements. A single background
//! task owns the [`Swarm`] and is the only thing that ever touches it,
//! driven by a command channel from the adapter's async methods and
//! forwarding decoded messages onto the adapter's incoming queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use libp2p::gossipsub::{self, IdentTopic, MessageAuthenticity};
use libp2p::swarm::{NetworkBehaviour, SwarmEvent};
use libp2p::{identity, noise, tcp, yamux, Multiaddr, PeerId, Swarm, SwarmBuilder};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use drp_queue::MessageQueue;
use drp_types::ObjectId;

use crate::error::NetworkError;
use crate::message::Message;

const DISCOVERY_TOPIC: &str = "drp::discovery";
const INTERVAL_DISCOVERY_TOPIC: &str = "drp::interval-discovery";
const INCOMING_QUEUE_CAPACITY: usize = 1024;
const COMMAND_CHANNEL_CAPACITY: usize = 256;

fn object_topic(object_id: &str) -> String {
    object_id.to_string()
}

fn topic_for(message: &Message) -> String {
    use crate::message::MessageType;
    match message.message_type {
        MessageType::DrpDiscovery => INTERVAL_DISCOVERY_TOPIC.to_string(),
        MessageType::DrpDiscoveryResponse => DISCOVERY_TOPIC.to_string(),
        _ => object_topic(&message.object_id),
    }
}

fn message_type_label(message_type: crate::message::MessageType) -> &'static str {
    use crate::message::MessageType;
    match message_type {
        MessageType::Unspecified => "unspecified",
        MessageType::FetchState => "fetch_state",
        MessageType::FetchStateResponse => "fetch_state_response",
        MessageType::Update => "update",
        MessageType::Sync => "sync",
        MessageType::SyncAccept => "sync_accept",
        MessageType::SyncReject => "sync_reject",
        MessageType::AttestationUpdate => "attestation_update",
        MessageType::DrpDiscovery => "drp_discovery",
        MessageType::DrpDiscoveryResponse => "drp_discovery_response",
        MessageType::Custom => "custom",
    }
}

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "DrpBehaviourEvent")]
struct DrpBehaviour {
    gossipsub: gossipsub::Behaviour,
}

#[derive(Debug)]
enum DrpBehaviourEvent {
    Gossipsub(gossipsub::Event),
}

impl From<gossipsub::Event> for DrpBehaviourEvent {
    fn from(event: gossipsub::Event) -> Self {
        DrpBehaviourEvent::Gossipsub(event)
    }
}

enum SwarmCommand {
    Join(String),
    Leave(String),
    Publish(String, Vec<u8>),
    Dial(Multiaddr),
}

/// A [`crate::NetworkAdapter`] backed by a libp2p gossipsub mesh.
pub struct Libp2pNetwork {
    local_peer_id: PeerId,
    keypair: identity::Keypair,
    command_tx: RwLock<Option<mpsc::Sender<SwarmCommand>>>,
    incoming: Arc<MessageQueue<Message>>,
    task: Mutex<Option<JoinHandle<()>>>,
    listen_addr: Multiaddr,
}

impl Libp2pNetwork {
    /// Builds a new adapter. Nothing happens on the wire until
    /// [`crate::NetworkAdapter::start`] is called.
    pub fn new(keypair: identity::Keypair, listen_addr: Multiaddr) -> Result<Self, NetworkError> {
        let local_peer_id = PeerId::from(keypair.public());
        Ok(Self {
            local_peer_id,
            keypair,
            command_tx: RwLock::new(None),
            incoming: Arc::new(MessageQueue::new(INCOMING_QUEUE_CAPACITY)),
            task: Mutex::new(None),
            listen_addr,
        })
    }

    async fn send_command(&self, command: SwarmCommand) -> Result<(), NetworkError> {
        let guard = self.command_tx.read().await;
        let Some(tx) = guard.as_ref() else {
            return Err(NetworkError::Subscription("swarm task not running".into()));
        };
        tx.send(command).await.map_err(|_| NetworkError::Subscription("swarm task not running".into()))
    }

    fn build_swarm(keypair: identity::Keypair) -> Result<Swarm<DrpBehaviour>, NetworkError> {
        let swarm = SwarmBuilder::with_existing_identity(keypair)
            .with_tokio()
            .with_tcp(tcp::Config::default(), noise::Config::new, yamux::Config::default)
            .map_err(|e| NetworkError::Transport(e.to_string()))?
            .with_behaviour(|key| {
                gossipsub::Behaviour::new(MessageAuthenticity::Signed(key.clone()), gossipsub::Config::default())
                    .map(|gossipsub| DrpBehaviour { gossipsub })
                    .map_err(|e| Box::<dyn std::error::Error + Send + Sync>::from(e))
            })
            .map_err(|e| NetworkError::Transport(e.to_string()))?
            .with_swarm_config(|c| c.with_idle_connection_timeout(Duration::from_secs(60)))
            .build();
        Ok(swarm)
    }
}

#[async_trait]
impl crate::adapter::NetworkAdapter for Libp2pNetwork {
    async fn start(&self) -> Result<(), NetworkError> {
        let mut task_slot = self.task.lock().await;
        if task_slot.is_some() {
            return Ok(());
        }

        let mut swarm = Self::build_swarm(self.keypair.clone())?;
        swarm
            .listen_on(self.listen_addr.clone())
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        swarm
            .behaviour_mut()
            .gossipsub
            .subscribe(&IdentTopic::new(DISCOVERY_TOPIC))
            .map_err(|e| NetworkError::Subscription(e.to_string()))?;
        swarm
            .behaviour_mut()
            .gossipsub
            .subscribe(&IdentTopic::new(INTERVAL_DISCOVERY_TOPIC))
            .map_err(|e| NetworkError::Subscription(e.to_string()))?;

        let (command_tx, mut command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let incoming = self.incoming.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = command_rx.recv() => {
                        let Some(command) = command else { break };
                        match command {
                            SwarmCommand::Join(topic) => {
                                if let Err(e) = swarm.behaviour_mut().gossipsub.subscribe(&IdentTopic::new(&topic)) {
                                    warn!(error = %e, topic, "failed to join topic");
                                }
                            }
                            SwarmCommand::Leave(topic) => {
                                match swarm.behaviour_mut().gossipsub.unsubscribe(&IdentTopic::new(&topic)) {
                                    Ok(false) | Err(_) => {
                                        warn!(topic, "attempted to leave a topic we were not subscribed to");
                                    }
                                    Ok(true) => {}
                                }
                            }
                            SwarmCommand::Publish(topic, data) => {
                                if let Err(e) = swarm.behaviour_mut().gossipsub.publish(IdentTopic::new(&topic), data) {
                                    warn!(error = %e, topic, "publish failed");
                                }
                            }
                            SwarmCommand::Dial(addr) => {
                                if let Err(e) = swarm.dial(addr.clone()) {
                                    warn!(error = %e, %addr, "dial failed");
                                }
                            }
                        }
                    }
                    event = swarm.select_next_some() => {
                        if let SwarmEvent::Behaviour(DrpBehaviourEvent::Gossipsub(gossipsub::Event::Message {
                            message, ..
                        })) = event
                        {
                            match Message::decode_envelope(&message.data) {
                                Ok(decoded) => {
                                    drp_telemetry::network_metrics().inc_messages_received(message_type_label(decoded.message_type));
                                    if let Err(e) = incoming.enqueue(decoded).await {
                                        warn!(error = %e, "dropping inbound message, incoming queue closed");
                                    }
                                }
                                Err(e) => {
                                    drp_telemetry::network_metrics().inc_decode_failures();
                                    debug!(error = %e, "dropping undecodable gossip message");
                                }
                            }
                        }
                    }
                }
            }
        });

        *task_slot = Some(handle);
        *self.command_tx.write().await = Some(command_tx);
        Ok(())
    }

    async fn stop(&self) -> Result<(), NetworkError> {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
        self.incoming.close();
        Ok(())
    }

    fn local_peer_id(&self) -> String {
        self.local_peer_id.to_string()
    }

    async fn join_object(&self, object_id: &ObjectId) -> Result<(), NetworkError> {
        self.send_command(SwarmCommand::Join(object_topic(object_id.as_str()))).await
    }

    async fn leave_object(&self, object_id: &ObjectId) -> Result<(), NetworkError> {
        self.send_command(SwarmCommand::Leave(object_topic(object_id.as_str()))).await
    }

    async fn broadcast(&self, message: Message) -> Result<(), NetworkError> {
        let topic = topic_for(&message);
        let label = message_type_label(message.message_type);
        let bytes = message.encode_envelope();
        self.send_command(SwarmCommand::Publish(topic, bytes)).await?;
        drp_telemetry::network_metrics().inc_messages_sent(label);
        Ok(())
    }

    fn incoming(&self) -> Arc<MessageQueue<Message>> {
        self.incoming.clone()
    }

    fn listen_addrs(&self) -> Vec<String> {
        vec![self.listen_addr.to_string()]
    }

    async fn dial(&self, addr: &str) -> Result<(), NetworkError> {
        let multiaddr: Multiaddr = addr.parse().map_err(|e: libp2p::multiaddr::Error| NetworkError::Transport(e.to_string()))?;
        self.send_command(SwarmCommand::Dial(multiaddr)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::NetworkAdapter;
    use crate::message::MessageType;

    #[test]
    fn object_messages_route_to_their_object_topic() {
        let message = Message::new("peer-a", MessageType::Update, "obj-1", vec![]);
        assert_eq!(topic_for(&message), "obj-1");
    }

    #[test]
    fn discovery_requests_and_responses_use_distinct_shared_topics() {
        let request = Message::new("peer-a", MessageType::DrpDiscovery, "", vec![]);
        assert_eq!(topic_for(&request), INTERVAL_DISCOVERY_TOPIC);

        let response = Message::new("peer-a", MessageType::DrpDiscoveryResponse, "obj-1", vec![]);
        assert_eq!(topic_for(&response), DISCOVERY_TOPIC);
        assert_ne!(topic_for(&request), topic_for(&response));
    }

    #[tokio::test]
    async fn commands_fail_before_start_is_called() {
        let keypair = identity::Keypair::generate_ed25519();
        let addr: Multiaddr = "/ip4/127.0.0.1/tcp/0".parse().unwrap();
        let network = Libp2pNetwork::new(keypair, addr).unwrap();
        let object_id = ObjectId::new("obj-1").unwrap();
        assert!(network.join_object(&object_id).await.is_err());
    }
}
