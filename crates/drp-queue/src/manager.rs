// Path: crates/drp-queue/src/manager.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::error::QueueError;
use crate::queue::{Handler, MessageQueue};

const GENERAL: &str = "general";

fn canonical(id: &str) -> &str {
    if id.is_empty() {
        GENERAL
    } else {
        id
    }
}

/// Owns a set of [`MessageQueue`]s keyed by string id, creating them
/// lazily on first use up to a configured cap. The empty string is
/// aliased to `"general"` so callers don't need a special case for an
/// unscoped queue.
pub struct MessageQueueManager<T> {
    queues: RwLock<HashMap<String, Arc<MessageQueue<T>>>>,
    capacity: usize,
    max_queues: usize,
}

impl<T: Clone + Send + 'static> MessageQueueManager<T> {
    /// Creates an empty manager. Every lazily-created queue gets
    /// `capacity` buffer slots; at most `max_queues` distinct queues
    /// may exist at once.
    pub fn new(capacity: usize, max_queues: usize) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            capacity,
            max_queues,
        }
    }

    async fn get(&self, id: &str) -> Option<Arc<MessageQueue<T>>> {
        self.queues.read().await.get(canonical(id)).cloned()
    }

    async fn get_or_create(&self, id: &str) -> Result<Arc<MessageQueue<T>>, QueueError> {
        let id = canonical(id);
        if let Some(queue) = self.queues.read().await.get(id) {
            return Ok(queue.clone());
        }
        let mut queues = self.queues.write().await;
        if let Some(queue) = queues.get(id) {
            return Ok(queue.clone());
        }
        if queues.len() >= self.max_queues {
            return Err(QueueError::MaxQueues(self.max_queues));
        }
        let queue = Arc::new(MessageQueue::new(self.capacity));
        queues.insert(id.to_string(), queue.clone());
        Ok(queue)
    }

    /// Registers `handler` on the queue named `id`, creating it if it
    /// doesn't exist yet. Fails with [`QueueError::MaxQueues`] if
    /// creating it would exceed the cap.
    pub async fn subscribe(&self, id: &str, handler: Handler<T>) -> Result<(), QueueError> {
        let queue = self.get_or_create(id).await?;
        queue.subscribe(handler).await;
        Ok(())
    }

    /// Enqueues `message` on the queue named `id`. Unlike `subscribe`,
    /// this never creates a queue — enqueuing to an id nobody has
    /// subscribed to yet fails silently (logged, not propagated),
    /// matching a fire-and-forget publish with no listener.
    pub async fn enqueue(&self, id: &str, message: T) {
        match self.get(id).await {
            Some(queue) => {
                if let Err(error) = queue.enqueue(message).await {
                    warn!(queue = canonical(id), error = %error, "failed to enqueue message");
                }
            }
            None => warn!(queue = canonical(id), "enqueue to unknown queue"),
        }
    }

    /// Closes and drops every queue this manager owns.
    pub async fn close_all(&self) {
        let mut queues = self.queues.write().await;
        for queue in queues.values() {
            queue.close();
        }
        queues.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn empty_string_id_is_aliased_to_general() {
        let manager: MessageQueueManager<i32> = MessageQueueManager::new(8, 4);
        let seen = Arc::new(AtomicI64::new(0));
        let seen_clone = seen.clone();
        manager
            .subscribe(
                "",
                Box::new(move |v| {
                    seen_clone.fetch_add(v as i64, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .await
            .unwrap();

        manager.enqueue("general", 9).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 9);
    }

    #[tokio::test]
    async fn creating_beyond_max_queues_fails() {
        let manager: MessageQueueManager<i32> = MessageQueueManager::new(1, 1);
        manager.subscribe("a", Box::new(|_| Ok(()))).await.unwrap();
        let result = manager.subscribe("b", Box::new(|_| Ok(()))).await;
        assert_eq!(result, Err(QueueError::MaxQueues(1)));
    }

    #[tokio::test]
    async fn enqueue_to_an_unknown_queue_fails_silently() {
        let manager: MessageQueueManager<i32> = MessageQueueManager::new(8, 4);
        manager.enqueue("nobody-home", 1).await;
    }
}
