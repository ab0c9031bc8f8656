//! Login, restore and logout through the public client.

use serde_json::json;
use std::sync::Arc;

use shortly_client::session::{FileStore, KeyValueStore, PersistenceError, SessionPhase};
use shortly_client::{ApiError, SessionEvent, ShortlyClient};

mod common;
use common::{anonymous_client, client_with_store, test_config, MockBackend, Reply};

fn login_reply() -> Reply {
    Reply::json(
        200,
        json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "token": "jwt-token",
                "user": {"id": 7, "username": "kim", "email": "kim@example.com", "profilePicture": null}
            }
        }),
    )
}

struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(None)
    }
    fn set_many(&self, _entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("read-only".into()))
    }
    fn remove_many(&self, _keys: &[&str]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_login_persists_and_restores() {
    let backend = MockBackend::fixed(login_reply()).await;
    let path = std::env::temp_dir()
        .join(format!("shortly-session-{}", uuid::Uuid::new_v4()))
        .join("session.json");
    let config = test_config(&backend);

    let client = client_with_store(&config, Arc::new(FileStore::new(&path)));
    let mut events = client.session().subscribe();
    let outcome = client.auth().login("kim@example.com", "secret1").await.unwrap();
    assert_eq!(outcome.message(), "Login successful");
    assert_eq!(outcome.into_data().map(|u| u.id), Some(7));
    assert!(matches!(events.recv().await.unwrap(), SessionEvent::LoggedIn(_)));

    let req = &backend.requests()[0];
    assert_eq!(req.path, "/api/auth/login");
    assert!(req.header("authorization").is_none());
    assert_eq!(req.json(), json!({"email": "kim@example.com", "password": "secret1"}));

    let restored = client_with_store(&config, Arc::new(FileStore::new(&path)));
    assert_eq!(restored.session().phase(), SessionPhase::Authenticated);
    assert_eq!(restored.session().token().as_deref(), Some("jwt-token"));

    restored.auth().logout();
    let again = client_with_store(&config, Arc::new(FileStore::new(&path)));
    assert_eq!(again.session().phase(), SessionPhase::Anonymous);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn test_rejected_login_is_single_attempt() {
    let backend = MockBackend::fixed(Reply::json(401, json!({"success": false, "message": "Bad credentials"}))).await;
    let client = anonymous_client(&test_config(&backend));

    let outcome = client.auth().login("kim@example.com", "wrong").await.unwrap();
    assert_eq!(outcome.message(), "Bad credentials");
    assert!(!client.session().is_authenticated());
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_login_persistence_failure() {
    let backend = MockBackend::fixed(login_reply()).await;
    let client = client_with_store(&test_config(&backend), Arc::new(ReadOnlyStore));

    let err = client.auth().login("kim@example.com", "secret1").await.unwrap_err();
    assert!(matches!(err, ApiError::Persistence(_)));
    assert_eq!(client.session().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_token_attached_after_login() {
    let backend = MockBackend::start(|req, _| {
        if req.path.ends_with("/auth/login") {
            login_reply()
        } else {
            Reply::ok(json!([]))
        }
    })
    .await;
    let client: ShortlyClient = anonymous_client(&test_config(&backend));

    client.auth().login("kim@example.com", "secret1").await.unwrap();
    client.videos().liked_videos().await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[1].header("authorization"), Some("Bearer jwt-token"));
}

#[tokio::test]
async fn test_signup_validation_and_body() {
    let backend = MockBackend::fixed(Reply::json(200, json!({"success": true, "message": "Welcome"}))).await;
    let client = anonymous_client(&test_config(&backend));

    let err = client.auth().signup("kim", "not-an-email", "secret1").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    let err = client.auth().signup("kim", "kim@example.com", "123").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(backend.request_count(), 0);

    let outcome = client.auth().signup("kim", "kim@example.com", "secret1").await.unwrap();
    assert_eq!(outcome.message(), "Welcome");
    assert_eq!(
        backend.requests()[0].json(),
        json!({"username": "kim", "email": "kim@example.com", "password": "secret1"})
    );
}
