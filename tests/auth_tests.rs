mod common;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{spawn, Recorder};
use katalog::auth::{AuthEvent, SessionStore, SupabaseAuth};
use katalog::config::AuthConfig;

async fn token(
    State(seen): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    seen.record(&method, &uri, &headers, &body);
    Json(json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "user": { "id": "user-1", "email": "fan@example.com" }
    }))
}

async fn logout(
    State(seen): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    seen.record(&method, &uri, &headers, &body);
    StatusCode::NO_CONTENT
}

async fn signed_in_store() -> (SessionStore, Recorder) {
    let seen = Recorder::default();
    let router = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/logout", post(logout))
        .with_state(seen.clone());
    let addr = spawn(router).await;

    let auth = SupabaseAuth::new(&AuthConfig {
        provider_url: format!("http://{addr}"),
        anon_key: "anon".to_string(),
    })
    .unwrap();
    let store = SessionStore::new(Arc::new(auth));
    store.sign_in("fan@example.com", "secret").await.unwrap();
    (store, seen)
}

#[tokio::test]
async fn test_sign_out_revokes_only_this_session() {
    let (store, seen) = signed_in_store().await;

    store.sign_out().await;

    let requests = seen.all();
    let logout = requests.last().unwrap();
    assert_eq!(logout.path, "/auth/v1/logout");
    assert_eq!(logout.query.as_deref(), Some("scope=local"));
    assert_eq!(logout.authorization.as_deref(), Some("Bearer access-1"));
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_forget_does_not_contact_provider() {
    let (store, seen) = signed_in_store().await;

    store.forget();

    assert_eq!(seen.paths(), ["/auth/v1/token"]);
    assert_eq!(store.current().event, AuthEvent::SignedOut);
    assert!(store.session().is_none());
}
