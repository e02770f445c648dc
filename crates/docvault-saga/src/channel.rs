//! In-process named message queues.
//!
//! Each queue is a multi-producer, single-consumer channel addressed by
//! name. Publishers never block; the single consumer side is handed out
//! once per queue to the task that owns that direction of the saga.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;

use crate::message::SagaMessage;

struct Queue {
    tx: mpsc::UnboundedSender<SagaMessage>,
    /// Present until the queue's consumer claims it.
    rx: Option<mpsc::UnboundedReceiver<SagaMessage>>,
}

impl Queue {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx: Some(rx) }
    }
}

/// Registry of named in-process queues.
///
/// Queues are created lazily on first use, so publish order and consumer
/// startup order are independent: messages published before the consumer
/// task starts are buffered and delivered once it claims the receiver.
#[derive(Default)]
pub struct MessageChannel {
    queues: Mutex<HashMap<String, Queue>>,
}

impl MessageChannel {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a message onto the named queue.
    pub fn publish(&self, queue: &str, message: SagaMessage) -> AppResult<()> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| AppError::saga("Message channel registry is poisoned"))?;
        let entry = queues.entry(queue.to_string()).or_insert_with(Queue::new);
        entry
            .tx
            .send(message)
            .map_err(|_| AppError::saga(format!("Queue '{queue}' is closed")))?;
        debug!(queue, "Published saga message");
        Ok(())
    }

    /// Claim the single consumer side of the named queue.
    ///
    /// Fails if another task already claimed it.
    pub fn take_receiver(&self, queue: &str) -> AppResult<mpsc::UnboundedReceiver<SagaMessage>> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| AppError::saga("Message channel registry is poisoned"))?;
        let entry = queues.entry(queue.to_string()).or_insert_with(Queue::new);
        entry
            .rx
            .take()
            .ok_or_else(|| AppError::saga(format!("Queue '{queue}' already has a consumer")))
    }
}

impl std::fmt::Debug for MessageChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageChannel").finish_non_exhaustive()
    }
}
