//! User-side saga coordinator.
//!
//! Initiates deletion sagas and drives each one to a terminal outcome by
//! consuming the document side's replies. Callers get a per-saga
//! completion future with a bounded wait; a saga that does not resolve in
//! time counts as failed and its late replies are dropped.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use docvault_core::config::saga::SagaConfig;
use docvault_core::result::AppResult;
use docvault_core::types::id::{SagaId, UserId};

use crate::channel::MessageChannel;
use crate::message::{DOCUMENT_TO_USER_QUEUE, SagaMessage, USER_TO_DOCUMENT_QUEUE};

struct PendingSaga {
    user_id: UserId,
    done: oneshot::Sender<bool>,
}

/// Initiates deletion sagas and resolves their completion futures.
pub struct SagaCoordinator {
    channel: Arc<MessageChannel>,
    pending: DashMap<SagaId, PendingSaga>,
    timeout: Duration,
}

impl SagaCoordinator {
    /// Build a coordinator from configuration.
    pub fn new(channel: Arc<MessageChannel>, config: &SagaConfig) -> Self {
        Self::with_timeout(channel, Duration::from_secs(config.timeout_seconds))
    }

    /// Build a coordinator with an explicit completion timeout.
    pub fn with_timeout(channel: Arc<MessageChannel>, timeout: Duration) -> Self {
        Self {
            channel,
            pending: DashMap::new(),
            timeout,
        }
    }

    /// Start a deletion saga for `user_id` and wait for its outcome.
    ///
    /// Returns `Ok(true)` only when the document side confirmed erasure.
    /// A failure reply, a timeout, or a coordinator shutdown all resolve
    /// to `Ok(false)` — the caller must then keep the user record.
    pub async fn delete_documents_for(&self, user_id: UserId) -> AppResult<bool> {
        let saga_id = SagaId::new();
        let (done_tx, done_rx) = oneshot::channel();
        self.pending.insert(
            saga_id,
            PendingSaga {
                user_id,
                done: done_tx,
            },
        );

        info!(%saga_id, %user_id, "Starting deletion saga");
        if let Err(e) = self
            .channel
            .publish(USER_TO_DOCUMENT_QUEUE, SagaMessage::PrepareDelete { saga_id, user_id })
        {
            self.pending.remove(&saga_id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, done_rx).await {
            Ok(Ok(outcome)) => {
                info!(%saga_id, %user_id, outcome, "Deletion saga resolved");
                Ok(outcome)
            }
            Ok(Err(_)) => {
                warn!(%saga_id, %user_id, "Deletion saga abandoned before resolution");
                Ok(false)
            }
            Err(_) => {
                // Forget the saga so late replies are dropped as unknown.
                self.pending.remove(&saga_id);
                warn!(%saga_id, %user_id, timeout = ?self.timeout, "Deletion saga timed out");
                Ok(false)
            }
        }
    }

    /// Number of sagas still awaiting a terminal reply.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Consume the document side's replies until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> AppResult<()> {
        let mut replies = self.channel.take_receiver(DOCUMENT_TO_USER_QUEUE)?;
        info!("Saga coordinator started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Saga coordinator stopping");
                        return Ok(());
                    }
                }
                message = replies.recv() => {
                    match message {
                        Some(message) => self.handle(message),
                        None => {
                            warn!("Saga reply queue closed, coordinator stopping");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn handle(&self, message: SagaMessage) {
        match message {
            SagaMessage::PrepareDeleteAck { saga_id, user_id } => {
                if !self.pending.contains_key(&saga_id) {
                    warn!(%saga_id, "Dropping ack for unknown saga");
                    return;
                }
                debug!(%saga_id, %user_id, "Prepare acknowledged, committing delete");
                if let Err(e) = self
                    .channel
                    .publish(USER_TO_DOCUMENT_QUEUE, SagaMessage::Delete { saga_id, user_id })
                {
                    warn!(%saga_id, error = %e, "Failed to publish delete command");
                    self.resolve(saga_id, false);
                }
            }
            SagaMessage::DeleteSucceeded { saga_id, .. } => {
                self.resolve(saga_id, true);
            }
            SagaMessage::DeleteFailed { saga_id, reason, .. } => {
                warn!(%saga_id, reason, "Document erasure failed");
                self.resolve(saga_id, false);
            }
            other => {
                warn!(saga_id = %other.saga_id(), "Unexpected command on reply queue");
            }
        }
    }

    /// Resolve a pending saga's completion future. Unknown saga ids
    /// (already timed out, duplicates) are dropped.
    fn resolve(&self, saga_id: SagaId, outcome: bool) {
        match self.pending.remove(&saga_id) {
            Some((_, pending)) => {
                debug!(%saga_id, user_id = %pending.user_id, outcome, "Resolving saga");
                let _ = pending.done.send(outcome);
            }
            None => warn!(%saga_id, "Dropping reply for unknown saga"),
        }
    }
}

impl std::fmt::Debug for SagaCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SagaCoordinator")
            .field("pending", &self.pending.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
