//! Cross-service deletion saga tests: all-or-nothing user deletion and
//! physical erasure of everything the user owned.

use std::time::Duration;

use docvault_core::error::ErrorKind;
use docvault_service::RequestContext;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_user_deletion_erases_only_their_documents() {
    let app = TestApp::spawn().await;

    let alice = app.users.register("Alice", "alice@example.com").unwrap();
    let bob = app.users.register("Bob", "bob@example.com").unwrap();
    let alice_ctx = RequestContext::new(alice.id);
    let bob_ctx = RequestContext::new(bob.id);

    let alice_doc = app.upload_clean(&alice_ctx, "alice-notes").await;
    let bob_doc = app.upload_clean(&bob_ctx, "bob-notes").await;
    let alice_blob = app.documents.get(alice_doc, false).await.unwrap().file_url;

    app.users.delete_user(alice.id).await.unwrap();

    // Alice and every trace of her documents are gone.
    assert_eq!(app.users.get(alice.id).unwrap_err().kind, ErrorKind::NotFound);
    assert!(app.log.list_by_aggregate(alice_doc).await.is_empty());
    assert_eq!(
        app.documents.get(alice_doc, true).await.unwrap_err().kind,
        ErrorKind::NotFound
    );
    assert!(!app.storage.exists(&alice_blob).await.unwrap());

    // Bob is untouched.
    assert!(app.users.get(bob.id).is_ok());
    assert_eq!(app.documents.get(bob_doc, false).await.unwrap().name, "bob-notes");
}

#[tokio::test]
async fn test_tombstoned_documents_are_erased_too() {
    let app = TestApp::spawn().await;
    let user = app.users.register("Carol", "carol@example.com").unwrap();
    let ctx = RequestContext::new(user.id);

    let doc = app.upload_clean(&ctx, "soft-deleted").await;
    app.documents.delete(&ctx, doc).await.unwrap();
    assert!(!app.log.list_by_aggregate(doc).await.is_empty());

    app.users.delete_user(user.id).await.unwrap();

    assert!(app.log.list_by_aggregate(doc).await.is_empty());
}

#[tokio::test]
async fn test_unconfirmed_saga_keeps_user_and_documents() {
    let app = TestApp::spawn_without_erase_handler(Duration::from_millis(100)).await;
    let user = app.users.register("Dave", "dave@example.com").unwrap();
    let ctx = RequestContext::new(user.id);
    let doc = app.upload_clean(&ctx, "dave-notes").await;

    let err = app.users.delete_user(user.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Saga);

    // All-or-nothing: nothing was deleted on either side.
    assert!(app.users.get(user.id).is_ok());
    assert_eq!(app.documents.get(doc, false).await.unwrap().name, "dave-notes");
}
