//! Session lifecycle against a mock API.

use std::sync::Arc;

use imena::gateway::ApiClient;
use imena::models::user::Role;
use imena::session::{Session, SessionState};
use imena::store::{CredentialStore, FileStore, MemoryStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, store: Arc<dyn CredentialStore>) -> Session {
    let client = ApiClient::new(&server.uri(), store, None).unwrap();
    Session::new(Arc::new(client))
}

async fn mount_token_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "admin@imena.rw", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "acc-1", "refresh": "ref-1"})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_persists_pair_and_resolves_identity() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .and(header("Authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2, "email": "admin@imena.rw", "phone_number": null,
            "role": "COOPERATIVE_ADMIN", "is_superuser": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let s = session(&server, Arc::new(store.clone()));
    let mut rx = s.subscribe();

    let identity = s.login("admin@imena.rw", "s3cret").await.unwrap();
    assert_eq!(identity.role, Role::CooperativeAdmin);
    assert!(identity.is_admin());
    assert!(s.is_authenticated());
    assert_eq!(store.access().as_deref(), Some("acc-1"));
    assert_eq!(store.refresh().as_deref(), Some("ref-1"));

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().identity().map(|i| i.id), Some(2));
}

#[tokio::test]
async fn test_wrong_password_leaves_session_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid credentials"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let s = session(&server, Arc::new(store.clone()));

    let err = s.login("rider@imena.rw", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(s.state(), SessionState::Anonymous);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_identity_failure_after_login_clears_pair() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let s = session(&server, Arc::new(store.clone()));

    assert!(s.login("admin@imena.rw", "s3cret").await.is_err());
    assert!(!s.is_authenticated());
    assert!(!store.has_credentials());
}

#[tokio::test]
async fn test_restore_with_valid_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .and(header("Authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "phone_number": "0788123456", "role": "RIDER"})))
        .expect(1)
        .mount(&server)
        .await;

    let s = session(&server, Arc::new(MemoryStore::with_tokens("acc-1", "ref-1")));
    assert!(s.is_loading());

    let state = s.restore().await;
    let me = state.identity().unwrap();
    assert_eq!(me.role, Role::Rider);
    assert_eq!(me.email_or_phone(), Some("0788123456"));
    assert!(!s.is_loading());
}

#[tokio::test]
async fn test_restore_failure_clears_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Given token not valid for any token type"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::with_tokens("acc-1", "ref-1");
    let s = session(&server, Arc::new(store.clone()));

    assert_eq!(s.restore().await, SessionState::Anonymous);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_restore_without_token_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let s = session(&server, Arc::new(MemoryStore::new()));
    assert_eq!(s.restore().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_login_survives_process_restart_with_file_store() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "email": "admin@imena.rw", "role": "COOPERATIVE_ADMIN"})))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("creds.json");

    let first = session(&server, Arc::new(FileStore::new(&file)));
    first.login("admin@imena.rw", "s3cret").await.unwrap();

    // A fresh session over the same file picks the login up.
    let second = session(&server, Arc::new(FileStore::new(&file)));
    assert!(second.restore().await.identity().is_some());

    second.logout();
    second.logout();
    assert!(!file.exists());
    assert_eq!(second.state(), SessionState::Anonymous);
}
