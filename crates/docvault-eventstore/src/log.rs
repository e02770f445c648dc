//! The append-only document event log.
//!
//! Source of truth for all document state. Events are kept in insertion
//! order; readers receive copies and fold them through the projection
//! engine. The log is constructed once at process start and shared by
//! handle — there is no global state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use docvault_core::events::DocumentEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::cache::ProjectionCache;
use docvault_core::types::id::DocumentId;

/// Append-only, in-process event log.
///
/// Appends cannot conflict (each aggregate's events are only ever added,
/// in arrival order), so `append` has no failure mode beyond the cache
/// invalidation hook. The internal list is guarded by an async `RwLock`
/// so concurrent append/read is safe.
#[derive(Debug)]
pub struct EventLog {
    /// All events, in insertion order.
    events: RwLock<Vec<DocumentEvent>>,
    /// Cache to blanket-invalidate after every mutation.
    cache: Option<Arc<dyn ProjectionCache>>,
}

impl EventLog {
    /// Create an empty event log with no cache attached.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            cache: None,
        }
    }

    /// Create an empty event log whose mutations invalidate the given cache.
    pub fn with_cache(cache: Arc<dyn ProjectionCache>) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            cache: Some(cache),
        }
    }

    /// Append an event. Every successful append blanket-invalidates the
    /// projection cache so no reader can observe pre-write state.
    pub async fn append(&self, event: DocumentEvent) -> AppResult<()> {
        {
            let mut events = self.events.write().await;
            events.push(event.clone());
        }
        debug!(
            aggregate_id = %event.aggregate_id,
            event_id = %event.id,
            "Appended event"
        );
        self.invalidate_cache().await;
        Ok(())
    }

    /// Return every event in insertion order.
    pub async fn list_all(&self) -> Vec<DocumentEvent> {
        self.events.read().await.clone()
    }

    /// Return the events of one aggregate, preserving insertion order.
    pub async fn list_by_aggregate(&self, id: DocumentId) -> Vec<DocumentEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.aggregate_id == id)
            .cloned()
            .collect()
    }

    /// Number of events currently in the log.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether the log holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Physically remove every event of one aggregate.
    ///
    /// This is the single exception to the append-only rule, reserved for
    /// the deletion saga's right-to-erasure commit phase. Returns the
    /// number of events removed.
    pub async fn remove_aggregate(&self, id: DocumentId) -> AppResult<usize> {
        let removed = {
            let mut events = self.events.write().await;
            let before = events.len();
            events.retain(|e| e.aggregate_id != id);
            before - events.len()
        };
        if removed > 0 {
            debug!(aggregate_id = %id, removed, "Erased aggregate events");
            self.invalidate_cache().await;
        }
        Ok(removed)
    }

    /// Invalidate the attached cache. Cache failures are logged and
    /// contained — the log mutation has already happened and must not be
    /// reported as failed.
    async fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_all().await {
                warn!(error = %e, "Cache invalidation after log write failed");
            }
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
