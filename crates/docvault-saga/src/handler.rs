//! Document-side saga participant.
//!
//! Consumes commands from the user service and answers on the reply
//! queue. The commit phase is the one place where document data is
//! physically erased: every aggregate owned by the user loses its blobs
//! and its events, tombstoned or not, so no personal data survives.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use docvault_core::result::AppResult;
use docvault_core::traits::storage::BlobStorage;
use docvault_core::types::id::{DocumentId, UserId};
use docvault_eventstore::log::EventLog;
use docvault_eventstore::projection;
use docvault_storage::blob_prefix;

use crate::channel::MessageChannel;
use crate::message::{DOCUMENT_TO_USER_QUEUE, SagaMessage, USER_TO_DOCUMENT_QUEUE};

/// Consumes saga commands and erases document state on commit.
pub struct DocumentEraseHandler {
    channel: Arc<MessageChannel>,
    log: Arc<EventLog>,
    storage: Arc<dyn BlobStorage>,
}

impl DocumentEraseHandler {
    pub fn new(
        channel: Arc<MessageChannel>,
        log: Arc<EventLog>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            channel,
            log,
            storage,
        }
    }

    /// Consume saga commands until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> AppResult<()> {
        let mut commands = self.channel.take_receiver(USER_TO_DOCUMENT_QUEUE)?;
        info!("Document erase handler started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Document erase handler stopping");
                        return Ok(());
                    }
                }
                message = commands.recv() => {
                    match message {
                        Some(message) => self.handle(message).await,
                        None => {
                            warn!("Saga command queue closed, handler stopping");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn handle(&self, message: SagaMessage) {
        match message {
            SagaMessage::PrepareDelete { saga_id, user_id } => {
                let owned = self.owned_aggregates(user_id).await.len();
                debug!(%saga_id, %user_id, owned, "Prepare received");
                // Exactly one ack per prepare, on every path.
                if let Err(e) = self
                    .channel
                    .publish(DOCUMENT_TO_USER_QUEUE, SagaMessage::PrepareDeleteAck { saga_id, user_id })
                {
                    error!(%saga_id, error = %e, "Failed to publish prepare ack");
                }
            }
            SagaMessage::Delete { saga_id, user_id } => {
                let reply = match self.erase_documents(user_id).await {
                    Ok(erased) => {
                        info!(%saga_id, %user_id, erased, "Erased user documents");
                        SagaMessage::DeleteSucceeded { saga_id, user_id }
                    }
                    Err(e) => {
                        error!(%saga_id, %user_id, error = %e, "Document erasure failed");
                        SagaMessage::DeleteFailed {
                            saga_id,
                            user_id,
                            reason: e.to_string(),
                        }
                    }
                };
                if let Err(e) = self.channel.publish(DOCUMENT_TO_USER_QUEUE, reply) {
                    error!(%saga_id, error = %e, "Failed to publish delete reply");
                }
            }
            other => {
                warn!(saga_id = %other.saga_id(), "Unexpected reply on command queue");
            }
        }
    }

    /// Ids of every aggregate whose folded state is owned by `user_id`.
    /// Tombstoned documents count too: their events still carry data.
    async fn owned_aggregates(&self, user_id: UserId) -> Vec<DocumentId> {
        let events = self.log.list_all().await;
        let mut groups: HashMap<DocumentId, Vec<_>> = HashMap::new();
        for event in events {
            groups.entry(event.aggregate_id).or_default().push(event);
        }
        groups
            .into_iter()
            .filter_map(|(id, events)| {
                projection::fold(&events)
                    .filter(|doc| doc.owned_by == Some(user_id))
                    .map(|_| id)
            })
            .collect()
    }

    /// Physically erase blobs and events of every document the user owns.
    /// Returns the number of aggregates erased.
    async fn erase_documents(&self, user_id: UserId) -> AppResult<usize> {
        let targets = self.owned_aggregates(user_id).await;
        for id in &targets {
            self.storage.delete_prefix(&blob_prefix(*id)).await?;
            self.log.remove_aggregate(*id).await?;
        }
        Ok(targets.len())
    }
}

impl std::fmt::Debug for DocumentEraseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentEraseHandler").finish_non_exhaustive()
    }
}
