//! Integration tests for user registration, lookup and scope.

mod common;

use budgie_core::ledger::{LedgerError, LedgerStore};
use budgie_core::session::{authenticate, set_current_user};
use common::{new_user, store, unique_email};

#[tokio::test]
async fn test_user_create_and_get() {
    let store = store().await;
    let email = unique_email("create");

    let id = store.create_user(new_user(&email)).await.unwrap();
    let user = store.get_user(&email).await.unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.email, email);
    assert_eq!(user.name, "Test User");
    assert_eq!(user.password_hash, "$2b$12$test_hash");
    assert_eq!(user.created, common::date(2024, 1, 1));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let store = store().await;
    let email = unique_email("dup");

    store.create_user(new_user(&email)).await.unwrap();
    let err = store.create_user(new_user(&email)).await.unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateUser(taken) if taken == email));
}

#[tokio::test]
async fn test_get_user_is_exact_and_case_sensitive() {
    let store = store().await;
    let email = unique_email("case");
    store.create_user(new_user(&email)).await.unwrap();

    let err = store.get_user(&email.to_uppercase()).await.unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(_)));
}

#[tokio::test]
async fn test_set_current_user() {
    let store = store().await;
    let email = unique_email("scope");
    let id = store.create_user(new_user(&email)).await.unwrap();

    let ledger = set_current_user(&store, &email).await.unwrap();
    assert_eq!(ledger.scope().user_id(), id);

    let err = set_current_user(&store, "missing@example.com").await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized));
}

#[tokio::test]
async fn test_authenticate_with_stored_hash() {
    let store = store().await;
    let email = unique_email("auth");
    store.create_user(new_user(&email)).await.unwrap();

    let user = authenticate(&store, &email, |creds| {
        creds.password_hash == "$2b$12$test_hash" && creds.salt == "$2b$12$test_salt"
    })
    .await
    .unwrap();
    assert_eq!(user.email, email);

    let err = authenticate(&store, &email, |_| false).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized));
}
