//! The projection engine: pure, deterministic folds over event sequences.
//!
//! `fold` depends only on the chronological order of its input, never on
//! arrival order: the sequence is stably sorted by `occurred_at` before
//! application, so equal timestamps preserve insertion order.

use std::collections::HashMap;

use docvault_core::events::{DocumentEvent, DocumentEventKind};
use docvault_core::types::id::DocumentId;
use docvault_core::types::pagination::{PageRequest, PageResponse};

use crate::document::Document;

/// Fold one aggregate's events into its materialized state.
///
/// Returns `None` for an empty sequence (the aggregate does not exist).
pub fn fold(events: &[DocumentEvent]) -> Option<Document> {
    let first = events.first()?;
    let mut ordered: Vec<&DocumentEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.occurred_at);

    let mut doc = Document::empty(first.aggregate_id);
    for event in ordered {
        apply(&mut doc, event);
    }
    Some(doc)
}

/// Apply a single event to the projection.
fn apply(doc: &mut Document, event: &DocumentEvent) {
    match &event.kind {
        DocumentEventKind::Uploaded {
            name,
            description,
            file_url,
            content_type,
            size_bytes,
            uploaded_by,
            tags,
        } => {
            doc.name = name.clone();
            doc.description = description.clone();
            doc.file_url = file_url.clone();
            doc.content_type = content_type.clone();
            doc.size_bytes = *size_bytes;
            doc.owned_by = Some(*uploaded_by);
            doc.modified_by = Some(*uploaded_by);
            doc.tags = tags.clone();
            doc.version = event.version;
            if doc.created_at.is_none() {
                doc.created_at = Some(event.occurred_at);
            }
            doc.updated_at = Some(event.occurred_at);
        }
        DocumentEventKind::Updated {
            name,
            description,
            tags,
            updated_by,
        } => {
            if let Some(name) = name {
                doc.name = name.clone();
            }
            if let Some(description) = description {
                doc.description = description.clone();
            }
            if let Some(tags) = tags {
                doc.tags = tags.clone();
            }
            doc.modified_by = Some(*updated_by);
            if event.version.is_some() {
                doc.version = event.version;
            }
            doc.updated_at = Some(event.occurred_at);
        }
        DocumentEventKind::Deleted { deleted_by } => {
            doc.tombstone();
            doc.modified_by = Some(*deleted_by);
            doc.updated_at = Some(event.occurred_at);
        }
        DocumentEventKind::RolledBack {
            target_version,
            reapply,
            rolled_back_by,
        } => {
            // Reset to empty and replay only the carried subset, then
            // overlay the rollback metadata. The aggregate's full history
            // stays in the log; only the projection is rewound.
            *doc = fold(reapply).unwrap_or_else(|| Document::empty(doc.id));
            doc.version = Some(*target_version);
            doc.modified_by = Some(*rolled_back_by);
            doc.updated_at = Some(event.occurred_at);
        }
    }
}

/// Fold every aggregate in `events` and paginate over the resulting
/// entity list.
///
/// Groups events by aggregate id (first-seen order), folds each group
/// independently, excludes tombstoned aggregates unless
/// `include_deleted`, then applies skip/take pagination over entities —
/// never over raw events.
pub fn fold_page(
    events: &[DocumentEvent],
    page: &PageRequest,
    include_deleted: bool,
) -> PageResponse<Document> {
    let mut order: Vec<DocumentId> = Vec::new();
    let mut groups: HashMap<DocumentId, Vec<DocumentEvent>> = HashMap::new();
    for event in events {
        if !groups.contains_key(&event.aggregate_id) {
            order.push(event.aggregate_id);
        }
        groups
            .entry(event.aggregate_id)
            .or_default()
            .push(event.clone());
    }

    let documents: Vec<Document> = order
        .iter()
        .filter_map(|id| fold(&groups[id]))
        .filter(|doc| include_deleted || !doc.deleted)
        .collect();

    let total = documents.len() as u64;
    let items: Vec<Document> = documents
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();

    PageResponse::new(items, page.page, page.page_size, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use docvault_core::types::id::UserId;

    fn uploaded(id: DocumentId, name: &str, version: f64) -> DocumentEvent {
        DocumentEvent::new(
            id,
            Some(version),
            DocumentEventKind::Uploaded {
                name: name.to_string(),
                description: format!("{name} description"),
                file_url: format!("{id}/{name}"),
                content_type: "application/pdf".into(),
                size_bytes: 64,
                uploaded_by: UserId::new(),
                tags: vec![],
            },
        )
    }

    fn updated_name(id: DocumentId, name: &str, version: f64) -> DocumentEvent {
        DocumentEvent::new(
            id,
            Some(version),
            DocumentEventKind::Updated {
                name: Some(name.to_string()),
                description: None,
                tags: None,
                updated_by: UserId::new(),
            },
        )
    }

    fn deleted(id: DocumentId) -> DocumentEvent {
        DocumentEvent::new(
            id,
            None,
            DocumentEventKind::Deleted {
                deleted_by: UserId::new(),
            },
        )
    }

    /// Assign strictly increasing timestamps so chronological order is
    /// unambiguous regardless of slice order.
    fn stamp(events: &mut [DocumentEvent]) {
        let base = Utc::now();
        for (i, e) in events.iter_mut().enumerate() {
            e.occurred_at = base + Duration::milliseconds(i as i64);
        }
    }

    #[test]
    fn test_fold_empty_is_none() {
        assert!(fold(&[]).is_none());
    }

    #[test]
    fn test_fold_applies_updates_in_order() {
        let id = DocumentId::new();
        let mut events = vec![
            uploaded(id, "original", 1.0),
            updated_name(id, "renamed", 2.0),
        ];
        stamp(&mut events);

        let doc = fold(&events).expect("projection");
        assert_eq!(doc.name, "renamed");
        assert_eq!(doc.version, Some(2.0));
        assert!(!doc.deleted);
        // Untouched fields survive the partial update.
        assert_eq!(doc.description, "original description");
    }

    #[test]
    fn test_fold_determinism_under_shuffle() {
        let id = DocumentId::new();
        let mut events = vec![
            uploaded(id, "v1", 1.0),
            updated_name(id, "v2", 2.0),
            updated_name(id, "v3", 3.0),
        ];
        stamp(&mut events);

        let chronological = fold(&events).expect("projection");

        let mut shuffled = events.clone();
        shuffled.reverse();
        shuffled.swap(0, 1);
        let refolded = fold(&shuffled).expect("projection");

        assert_eq!(refolded.name, chronological.name);
        assert_eq!(refolded.version, chronological.version);
        assert_eq!(refolded.updated_at, chronological.updated_at);
    }

    #[test]
    fn test_tombstone_is_terminal_state() {
        let id = DocumentId::new();
        let mut events = vec![
            uploaded(id, "doomed", 1.0),
            updated_name(id, "still doomed", 2.0),
            deleted(id),
        ];
        stamp(&mut events);

        let doc = fold(&events).expect("projection");
        assert!(doc.deleted);
        assert_eq!(doc.file_url, crate::document::TOMBSTONE_FILE_URL);
        assert_eq!(doc.size_bytes, 0);
    }

    #[test]
    fn test_rollback_replays_carried_subset() {
        let id = DocumentId::new();
        let mut history = vec![
            uploaded(id, "v1", 1.0),
            updated_name(id, "v2", 2.0),
            updated_name(id, "v3", 3.0),
            updated_name(id, "v4", 4.0),
        ];
        stamp(&mut history);

        // Rollback to version 3: carry events with version <= 3.
        let actor = UserId::new();
        let reapply: Vec<DocumentEvent> = history
            .iter()
            .filter(|e| e.version.is_some_and(|v| v <= 3.0))
            .cloned()
            .collect();
        let mut rollback = DocumentEvent::new(
            id,
            None,
            DocumentEventKind::RolledBack {
                target_version: 3.0,
                reapply: reapply.clone(),
                rolled_back_by: actor,
            },
        );
        rollback.occurred_at = history[3].occurred_at + Duration::milliseconds(1);

        let mut full = history.clone();
        full.push(rollback);

        let rolled = fold(&full).expect("projection");
        let expected = fold(&reapply).expect("projection");

        assert_eq!(rolled.name, expected.name);
        assert_eq!(rolled.name, "v3");
        // Rollback metadata is overlaid on the replayed state.
        assert_eq!(rolled.version, Some(3.0));
        assert_eq!(rolled.modified_by, Some(actor));
    }

    #[test]
    fn test_pagination_over_entities_not_events() {
        // 5 aggregates x 3 events = 15 events; page size 2 must yield
        // 2 folded documents per page and a total of 5.
        let mut events = Vec::new();
        for i in 0..5 {
            let id = DocumentId::new();
            events.push(uploaded(id, &format!("doc{i}"), 1.0));
            events.push(updated_name(id, &format!("doc{i} v2"), 2.0));
            events.push(updated_name(id, &format!("doc{i} v3"), 3.0));
        }
        stamp(&mut events);

        let page = fold_page(&events, &PageRequest::new(1, 2), false);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].name, "doc0 v3");

        let last = fold_page(&events, &PageRequest::new(3, 2), false);
        assert_eq!(last.items.len(), 1);
    }

    #[test]
    fn test_deleted_excluded_unless_requested() {
        let alive = DocumentId::new();
        let dead = DocumentId::new();
        let mut events = vec![
            uploaded(alive, "alive", 1.0),
            uploaded(dead, "dead", 1.0),
            deleted(dead),
        ];
        stamp(&mut events);

        let visible = fold_page(&events, &PageRequest::default(), false);
        assert_eq!(visible.total_items, 1);
        assert_eq!(visible.items[0].id, alive);

        let all = fold_page(&events, &PageRequest::default(), true);
        assert_eq!(all.total_items, 2);
        assert!(all.items.iter().any(|d| d.id == dead && d.deleted));
    }
}
