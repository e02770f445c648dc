//! Document lifecycle tests through the cached service layer: update,
//! delete, rollback, and entity pagination.

use docvault_core::error::ErrorKind;
use docvault_core::types::pagination::PageRequest;
use docvault_service::document::UpdateDocumentRequest;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_update_then_rollback_restores_earlier_state() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();
    let id = app.upload_clean(&ctx, "contract").await;

    let updated = app
        .documents
        .update(
            &ctx,
            id,
            UpdateDocumentRequest {
                name: Some("contract-revised".into()),
                version: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "contract-revised");

    let rolled = app.documents.rollback(&ctx, id, 1.0).await.unwrap();
    assert_eq!(rolled.name, "contract");
    assert_eq!(rolled.version, Some(1.0));

    // History survives the rollback: upload + update + rollback.
    assert_eq!(app.log.list_by_aggregate(id).await.len(), 3);
}

#[tokio::test]
async fn test_delete_hides_but_preserves_history() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();
    let id = app.upload_clean(&ctx, "ephemeral").await;

    app.documents.delete(&ctx, id).await.unwrap();

    let err = app.documents.get(id, false).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let doc = app.documents.get(id, true).await.unwrap();
    assert!(doc.deleted);
    assert_eq!(doc.size_bytes, 0);
    assert_eq!(app.log.list_by_aggregate(id).await.len(), 2);
}

#[tokio::test]
async fn test_list_paginates_folded_documents() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(app.upload_clean(&ctx, &format!("doc{i}")).await);
    }
    app.documents.delete(&ctx, ids[0]).await.unwrap();

    let visible = app
        .documents
        .list(&PageRequest::new(1, 3), false)
        .await
        .unwrap();
    assert_eq!(visible.total_items, 4);
    assert_eq!(visible.items.len(), 3);
    assert!(visible.has_next);

    let all = app
        .documents
        .list(&PageRequest::new(1, 10), true)
        .await
        .unwrap();
    assert_eq!(all.total_items, 5);
}

#[tokio::test]
async fn test_writes_invalidate_cached_reads() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();
    let id = app.upload_clean(&ctx, "cached").await;

    // Prime both cache shapes.
    app.documents.get(id, false).await.unwrap();
    app.documents
        .list(&PageRequest::default(), false)
        .await
        .unwrap();

    app.documents
        .update(
            &ctx,
            id,
            UpdateDocumentRequest {
                description: Some("fresh description".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let doc = app.documents.get(id, false).await.unwrap();
    assert_eq!(doc.description, "fresh description");
    let listed = app
        .documents
        .list(&PageRequest::default(), false)
        .await
        .unwrap();
    assert_eq!(listed.items[0].description, "fresh description");
}
