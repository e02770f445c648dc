//! Saga message envelope and queue names.

use serde::{Deserialize, Serialize};

use docvault_core::types::id::{SagaId, UserId};

/// Queue carrying commands from the user service to the document service.
pub const USER_TO_DOCUMENT_QUEUE: &str = "user_to_document_queue";
/// Queue carrying replies from the document service to the user service.
pub const DOCUMENT_TO_USER_QUEUE: &str = "document_to_user_queue";

/// Envelope for every message exchanged by the deletion saga.
///
/// Each message names the saga it belongs to; messages whose saga id is
/// unknown to the receiver (duplicates, or stragglers arriving after a
/// timeout cleaned the saga up) are logged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SagaMessage {
    /// Phase one: ask the document side to check for deletable state.
    PrepareDelete {
        /// The saga this command belongs to.
        saga_id: SagaId,
        /// The user being deleted.
        user_id: UserId,
    },
    /// Phase-one reply. Sent exactly once per received `PrepareDelete`,
    /// in the success and failure paths alike, so the initiator is always
    /// unblocked from this phase.
    PrepareDeleteAck {
        /// The saga this reply belongs to.
        saga_id: SagaId,
        /// The user being deleted.
        user_id: UserId,
    },
    /// Phase two: commit the erasure of the user's documents.
    Delete {
        /// The saga this command belongs to.
        saga_id: SagaId,
        /// The user being deleted.
        user_id: UserId,
    },
    /// Terminal reply: the document side erased everything.
    DeleteSucceeded {
        /// The saga this reply belongs to.
        saga_id: SagaId,
        /// The user being deleted.
        user_id: UserId,
    },
    /// Terminal reply: the document side could not erase.
    DeleteFailed {
        /// The saga this reply belongs to.
        saga_id: SagaId,
        /// The user being deleted.
        user_id: UserId,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl SagaMessage {
    /// The saga this message belongs to.
    pub fn saga_id(&self) -> SagaId {
        match self {
            Self::PrepareDelete { saga_id, .. }
            | Self::PrepareDeleteAck { saga_id, .. }
            | Self::Delete { saga_id, .. }
            | Self::DeleteSucceeded { saga_id, .. }
            | Self::DeleteFailed { saga_id, .. } => *saga_id,
        }
    }
}
