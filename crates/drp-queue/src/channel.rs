// Path: crates/drp-queue/src/channel.rs
use tokio::sync::{mpsc, watch, Mutex};

use crate::error::QueueError;

/// A bounded, multi-producer single-consumer channel with an explicit
/// close signal, so `send`/`receive` observe a close without racing
/// the underlying channel's own teardown.
///
/// `send` blocks when the buffer is full until a `receive` makes room
/// or the channel closes; `receive` blocks when empty until a value
/// arrives or the channel closes. On close, any receive already
/// waiting rejects with [`QueueError::Closed`], buffered values still
/// drain to receives that ask for them, and new sends fail.
pub struct Channel<T> {
    sender: mpsc::Sender<T>,
    receiver: Mutex<mpsc::Receiver<T>>,
    closed_tx: watch::Sender<bool>,
    closed_rx: watch::Receiver<bool>,
}

impl<T: Send + 'static> Channel<T> {
    /// Creates a channel with room for `capacity` buffered values.
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (closed_tx, closed_rx) = watch::channel(false);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            closed_tx,
            closed_rx,
        }
    }

    /// True once [`Channel::close`] has been called.
    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    /// Sends a value, waiting for buffer space if necessary. Fails
    /// immediately if the channel is already closed.
    pub async fn send(&self, value: T) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        self.sender.send(value).await.map_err(|_| QueueError::Closed)
    }

    /// Receives the next value, waiting if the buffer is empty.
    /// Returns `Closed` once the channel is closed and no buffered
    /// value remains for this call to drain.
    pub async fn receive(&self) -> Result<T, QueueError> {
        let mut receiver = self.receiver.lock().await;
        // Already closed before this call started: don't wait on
        // `changed()`, which only fires on *new* transitions and
        // would otherwise never resolve again.
        if self.is_closed() {
            return receiver.try_recv().map_err(|_| QueueError::Closed);
        }
        let mut closed_rx = self.closed_rx.clone();
        tokio::select! {
            biased;
            maybe = receiver.recv() => maybe.ok_or(QueueError::Closed),
            _ = closed_rx.changed() => receiver.try_recv().map_err(|_| QueueError::Closed),
        }
    }

    /// Closes the channel: wakes every pending `receive` (rejecting
    /// those with nothing left to drain) and fails every send from
    /// here on.
    pub fn close(&self) {
        let _ = self.closed_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn send_then_receive_round_trips() {
        let channel: Channel<i32> = Channel::new(4);
        channel.send(7).await.unwrap();
        assert_eq!(channel.receive().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn receive_blocks_until_a_value_arrives() {
        let channel = Arc::new(Channel::<i32>::new(1));
        let reader = channel.clone();
        let handle = tokio::spawn(async move { reader.receive().await });
        tokio::task::yield_now().await;
        channel.send(42).await.unwrap();
        assert_eq!(handle.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn close_rejects_new_sends() {
        let channel: Channel<i32> = Channel::new(1);
        channel.close();
        assert_eq!(channel.send(1).await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn close_still_drains_buffered_values() {
        let channel: Channel<i32> = Channel::new(2);
        channel.send(1).await.unwrap();
        channel.send(2).await.unwrap();
        channel.close();
        assert_eq!(channel.receive().await.unwrap(), 1);
        assert_eq!(channel.receive().await.unwrap(), 2);
        assert_eq!(channel.receive().await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn close_wakes_a_pending_receive_with_nothing_to_drain() {
        let channel = Arc::new(Channel::<i32>::new(1));
        let reader = channel.clone();
        let handle = tokio::spawn(async move { reader.receive().await });
        tokio::task::yield_now().await;
        channel.close();
        assert_eq!(handle.await.unwrap(), Err(QueueError::Closed));
    }
}
