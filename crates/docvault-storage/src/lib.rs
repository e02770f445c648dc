//! # docvault-storage
//!
//! Blob storage backends implementing [`docvault_core::traits::BlobStorage`].
//! Blob keys are namespaced by document id (`{document_id}/{file_name}`),
//! so a prefix delete erases everything a document ever stored.

pub mod local;

pub use local::LocalBlobStorage;

use docvault_core::types::id::DocumentId;

/// Build the blob key for a document's content.
pub fn blob_key(document_id: DocumentId, file_name: &str, version: Option<f64>) -> String {
    match version {
        Some(v) => format!("{document_id}/v{v}/{file_name}"),
        None => format!("{document_id}/{file_name}"),
    }
}

/// Build the erasure prefix covering every blob of a document.
pub fn blob_prefix(document_id: DocumentId) -> String {
    format!("{document_id}/")
}
