// Path: crates/drp-queue/src/queue.rs
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::channel::Channel;
use crate::error::QueueError;

/// A fan-out subscriber. Expected to be non-blocking; an `Err` is
/// logged and otherwise has no effect on dispatch.
pub type Handler<T> = Box<dyn Fn(T) -> Result<(), String> + Send + Sync>;

/// A bounded [`Channel`] paired with a set of subscribers. A single
/// dispatcher task drains the channel and invokes every subscriber
/// sequentially for each message; subscribers never block one
/// another's turn beyond their own runtime.
pub struct MessageQueue<T> {
    channel: Arc<Channel<T>>,
    subscribers: Arc<Mutex<Vec<Handler<T>>>>,
    dispatcher: JoinHandle<()>,
}

impl<T: Clone + Send + 'static> MessageQueue<T> {
    /// Creates a queue with the given buffer capacity and starts its
    /// dispatcher task.
    pub fn new(capacity: usize) -> Self {
        let channel = Arc::new(Channel::<T>::new(capacity));
        let subscribers: Arc<Mutex<Vec<Handler<T>>>> = Arc::new(Mutex::new(Vec::new()));

        let dispatch_channel = channel.clone();
        let dispatch_subscribers = subscribers.clone();
        let dispatcher = tokio::spawn(async move {
            loop {
                match dispatch_channel.receive().await {
                    Ok(message) => {
                        let handlers = dispatch_subscribers.lock().await;
                        for handler in handlers.iter() {
                            if let Err(error) = handler(message.clone()) {
                                warn!(error = %error, "message queue subscriber returned an error");
                            }
                        }
                    }
                    Err(QueueError::Closed) => break,
                    Err(other) => {
                        warn!(error = %other, "message queue dispatcher stopping on error");
                        break;
                    }
                }
            }
        });

        Self {
            channel,
            subscribers,
            dispatcher,
        }
    }

    /// Registers a fan-out handler, invoked for every message enqueued
    /// from here on.
    pub async fn subscribe(&self, handler: Handler<T>) {
        self.subscribers.lock().await.push(handler);
    }

    /// Enqueues a message, waiting for buffer space if necessary.
    pub async fn enqueue(&self, message: T) -> Result<(), QueueError> {
        self.channel.send(message).await
    }

    /// Closes the underlying channel, stopping the dispatcher once it
    /// has drained whatever was already buffered.
    pub fn close(&self) {
        self.channel.close();
    }
}

impl<T> Drop for MessageQueue<T> {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}
