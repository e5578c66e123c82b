// Path: crates/drp-node/src/object_handle.rs
//! Per-object actor: one dedicated task owns each joined object's
//! state and drains a single-consumer inbox, so every vertex merge,
//! local write, and sync reply for that object serializes through one
//! point without a second competing mutex.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;

use drp_codec::Value;
use drp_finality::{FinalityConfig, FinalityStore};
use drp_network::Message;
use drp_object::{AclView, Drp, DRPObject};
use drp_queue::Channel;
use drp_types::DrpType;

use crate::context::DispatchCx;
use crate::handlers;

const INBOX_CAPACITY: usize = 256;

/// Work items a per-object actor processes one at a time.
#[derive(Clone, Debug)]
pub enum ObjectQueueItem {
    /// A network message addressed to this object.
    Remote(Message),
    /// A locally-originated write, submitted via [`crate::Node::call_local`].
    LocalWrite {
        /// Which layer the write targets: the ACL or the business DRP.
        drp_type: DrpType,
        /// The `Drp` operation name.
        op_type: String,
        /// Its arguments.
        args: Vec<Value>,
    },
}

/// An object's hash-graph-backed state plus its finality bookkeeping —
/// the two pieces of mutable state a single actor owns exclusively.
pub struct ObjectState<A: Drp, D: Drp> {
    pub object: DRPObject<A, D>,
    pub finality: FinalityStore,
}

impl<A: Drp, D: Drp> ObjectState<A, D> {
    fn new(object: DRPObject<A, D>, finality_config: FinalityConfig) -> Self {
        Self {
            object,
            finality: FinalityStore::new(finality_config),
        }
    }
}

/// A handle to a running per-object actor: the inbox to push work onto
/// and shared read access to its state.
pub struct ObjectHandle<A: Drp, D: Drp> {
    pub state: Arc<RwLock<ObjectState<A, D>>>,
    inbox: Arc<Channel<ObjectQueueItem>>,
    task: JoinHandle<()>,
}

impl<A: Drp, D: Drp> Drop for ObjectHandle<A, D> {
    fn drop(&mut self) {
        self.inbox.close();
        self.task.abort();
    }
}

impl<A: Drp + AclView, D: Drp> ObjectHandle<A, D> {
    /// Spawns a fresh actor for `object`, starting its inbox loop
    /// immediately.
    pub fn spawn(object: DRPObject<A, D>, finality_config: FinalityConfig, cx: DispatchCx) -> Self {
        let state = Arc::new(RwLock::new(ObjectState::new(object, finality_config)));
        let inbox = Arc::new(Channel::new(INBOX_CAPACITY));
        let task = tokio::spawn(run_actor(state.clone(), inbox.clone(), cx));
        Self { state, inbox, task }
    }

    /// Enqueues a work item for this object's actor to process.
    pub async fn enqueue(&self, item: ObjectQueueItem) -> Result<(), crate::error::NodeError> {
        self.inbox.send(item).await.map_err(Into::into)
    }
}

async fn run_actor<A: Drp + AclView, D: Drp>(
    state: Arc<RwLock<ObjectState<A, D>>>,
    inbox: Arc<Channel<ObjectQueueItem>>,
    cx: DispatchCx,
) {
    while let Ok(item) = inbox.receive().await {
        let object_id = {
            let guard = state.read().await;
            guard.object.id().clone()
        };
        let mut guard = state.write().await;
        let result = match item {
            ObjectQueueItem::Remote(message) => handlers::handle_object_message(&mut guard, &cx, message).await,
            ObjectQueueItem::LocalWrite { drp_type, op_type, args } => {
                handlers::handle_local_write(&mut guard, &cx, drp_type, &op_type, args).await
            }
        };
        if let Err(e) = result {
            warn!(object_id = %object_id, error = %e, "object actor rejected work item");
        }
    }
}
