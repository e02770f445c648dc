//! End-to-end admission pipeline tests: upload, background scan, and
//! conditional commit.

use docvault_admission::status::ScanStatus;
use docvault_core::error::ErrorKind;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_clean_upload_is_admitted() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();

    let id = app
        .documents
        .accept_upload(&ctx, helpers::upload_request("report", b"harmless bytes"))
        .await
        .unwrap();

    assert_eq!(app.wait_for_verdict(id).await, ScanStatus::Clean);

    let doc = app.documents.get(id, false).await.unwrap();
    assert_eq!(doc.name, "report");
    assert_eq!(doc.owned_by, Some(ctx.user_id));
    assert_eq!(doc.size_bytes, 14);
    assert!(app.storage.exists(&doc.file_url).await.unwrap());
    assert_eq!(app.log.list_by_aggregate(id).await.len(), 1);
}

#[tokio::test]
async fn test_malicious_upload_leaves_no_trace() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();

    let id = app
        .documents
        .accept_upload(&ctx, helpers::upload_request("bad", b"xxEICARxx"))
        .await
        .unwrap();

    assert_eq!(app.wait_for_verdict(id).await, ScanStatus::Malicious);
    assert!(app.log.list_by_aggregate(id).await.is_empty());

    let err = app.documents.get(id, false).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_scan_failure_downgrades_to_error() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();

    let id = app
        .documents
        .accept_upload(&ctx, helpers::upload_request("scan-error", b"whatever"))
        .await
        .unwrap();

    assert_eq!(app.wait_for_verdict(id).await, ScanStatus::Error);
    assert!(app.log.list_by_aggregate(id).await.is_empty());
}

#[tokio::test]
async fn test_bad_item_does_not_block_later_uploads() {
    let app = TestApp::spawn().await;
    let ctx = helpers::ctx();

    let bad = app
        .documents
        .accept_upload(&ctx, helpers::upload_request("scan-error", b"whatever"))
        .await
        .unwrap();
    let good = app
        .documents
        .accept_upload(&ctx, helpers::upload_request("good", b"fine content"))
        .await
        .unwrap();

    assert_eq!(app.wait_for_verdict(bad).await, ScanStatus::Error);
    assert_eq!(app.wait_for_verdict(good).await, ScanStatus::Clean);
    assert_eq!(app.log.list_by_aggregate(good).await.len(), 1);
}

#[tokio::test]
async fn test_unknown_id_reports_not_found() {
    let app = TestApp::spawn().await;

    let unknown = docvault_core::types::id::DocumentId::new();
    assert_eq!(app.documents.scan_status(unknown), ScanStatus::NotFound);
}
