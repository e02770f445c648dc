//! Cache key builders for all DocVault cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all DocVault cache keys.
const PREFIX: &str = "docvault";

/// Cache key for a single document projection by aggregate id.
pub fn document_by_id(document_id: Uuid) -> String {
    format!("{PREFIX}:doc:{document_id}")
}

/// Cache key for one page of the document list. The key encodes the full
/// query shape so distinct queries never collide.
pub fn document_page(page: u64, page_size: u64, include_deleted: bool) -> String {
    format!("{PREFIX}:docs:p{page}:s{page_size}:d{include_deleted}")
}
