//! Bounded FIFO queues between the host and its consumers.

use async_channel::{Receiver, Sender};

/// The capacity of each notification queue.
pub const NOTIFICATION_QUEUE_SIZE: usize = 200;

/// A bounded, multi-consumer FIFO queue of host events.
///
/// Sending into a full queue waits until a consumer receives, so a slow
/// consumer stalls the producer instead of growing memory. Receivers are
/// cheap to clone; each event is delivered to exactly one of them.
#[derive(Debug, Clone)]
pub struct NotificationQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Default for NotificationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NotificationQueue<T> {
    /// Creates an empty queue holding up to [`NOTIFICATION_QUEUE_SIZE`] events.
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::bounded(NOTIFICATION_QUEUE_SIZE);
        Self { sender, receiver }
    }

    /// Sends an event, waiting while the queue is full.
    ///
    /// Returns `false` if the queue was closed and the event was dropped.
    pub async fn send(&self, event: T) -> bool {
        self.sender.send(event).await.is_ok()
    }

    /// Sends an event, blocking the current thread while the queue is full.
    ///
    /// Must not be called from within an async runtime worker.
    pub fn send_blocking(&self, event: T) -> bool {
        self.sender.send_blocking(event).is_ok()
    }

    /// Returns a read-only handle to the queue.
    pub fn receiver(&self) -> Receiver<T> {
        self.receiver.clone()
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Returns whether no event is queued.
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Returns the queue capacity.
    pub const fn capacity(&self) -> usize {
        NOTIFICATION_QUEUE_SIZE
    }

    /// Closes the queue. Pending events can still be received.
    pub fn close(&self) -> bool {
        self.sender.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = NotificationQueue::new();
        for i in 0..10u32 {
            assert!(queue.send(i).await);
        }
        let receiver = queue.receiver();
        for i in 0..10u32 {
            assert_eq!(receiver.recv().await.unwrap(), i);
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_send_waits_when_full() {
        let queue = NotificationQueue::new();
        for i in 0..NOTIFICATION_QUEUE_SIZE {
            assert!(queue.send(i).await);
        }
        assert_eq!(queue.len(), queue.capacity());

        let blocked = tokio::time::timeout(Duration::from_millis(100), queue.send(200)).await;
        assert!(blocked.is_err(), "send into a full queue must wait");

        let pending = tokio::spawn({
            let queue = queue.clone();
            async move { queue.send(201).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        assert_eq!(queue.receiver().recv().await.unwrap(), 0);
        let sent = tokio::time::timeout(Duration::from_secs(1), pending).await.unwrap().unwrap();
        assert!(sent);
        assert_eq!(queue.len(), NOTIFICATION_QUEUE_SIZE);
    }

    #[test]
    fn test_send_blocking_from_thread() {
        let queue = NotificationQueue::new();
        for i in 0..NOTIFICATION_QUEUE_SIZE {
            assert!(queue.send_blocking(i));
        }
        let producer = std::thread::spawn({
            let queue = queue.clone();
            move || queue.send_blocking(NOTIFICATION_QUEUE_SIZE)
        });
        std::thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        assert_eq!(queue.receiver().recv_blocking().unwrap(), 0);
        assert!(producer.join().unwrap());
    }

    #[tokio::test]
    async fn test_closed_queue_rejects_send() {
        let queue = NotificationQueue::new();
        assert!(queue.send(1u8).await);
        assert!(queue.close());
        assert!(!queue.send(2).await);
        assert_eq!(queue.receiver().recv().await.unwrap(), 1);
        assert!(queue.receiver().recv().await.is_err());
    }
}
