mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use common::{api_client, api_config, closed_port, spawn, Recorder, StaticToken};
use katalog::api::{ApiClient, ApiError, PageRequest};
use katalog::config::ApiConfig;
use katalog::models::{CreateType, PhotocardCreatePayload};

async fn record(
    State(seen): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    seen.record(&method, &uri, &headers, &body);
    Json(json!({ "user": { "id": "user-1", "email": "fan@example.com" } }))
}

#[tokio::test]
async fn test_groups_are_parsed() {
    let router = Router::new().route(
        "/api/v1/groups",
        get(|| async {
            Json(json!([{
                "id": "aespa",
                "name": "aespa",
                "koreanName": "에스파",
                "company": "SM Entertainment",
                "debutYear": 2020,
                "imageUrl": "https://cdn.example/aespa.jpg",
                "members": [{
                    "id": "karina",
                    "name": "Karina",
                    "koreanName": "카리나",
                    "imageUrl": "https://cdn.example/karina.jpg"
                }]
            }]))
        }),
    );
    let api = api_client(spawn(router).await);

    let groups = api.groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].debut_year, 2020);
    assert_eq!(groups[0].members[0].name, "Karina");
    assert_eq!(groups[0].members[0].photocard_count, None);
}

#[tokio::test]
async fn test_404_is_generic_not_found() {
    let router = Router::new().route(
        "/api/v1/groups/:id",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "Group not found" }))) }),
    );
    let api = api_client(spawn(router).await);

    let err = api.group("nope").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    assert_eq!(err.to_string(), "Not found");
}

#[tokio::test]
async fn test_error_body_becomes_message() {
    let router = Router::new().route(
        "/api/v1/auth/me",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                r#"{"detail":"Authentication required"}"#,
            )
        }),
    );
    let api = api_client(spawn(router).await);

    let err = api.me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Authentication required"));
}

#[tokio::test]
async fn test_empty_error_body_uses_status() {
    let router = Router::new().route(
        "/api/v1/submissions",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let api = api_client(spawn(router).await);

    let err = api.submissions().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503");
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let router = Router::new().route("/api/v1/groups", get(|| async { "not json" }));
    let api = api_client(spawn(router).await);

    let err = api.groups().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_bearer_token_attached_when_available() {
    let seen = Recorder::default();
    let router = Router::new()
        .route("/api/v1/auth/me", get(record))
        .with_state(seen.clone());
    let addr = spawn(router).await;

    let anonymous = api_client(addr);
    anonymous.me().await.unwrap();

    let signed_in = api_client(addr).with_tokens(Arc::new(StaticToken("tok-1")));
    let me = signed_in.me().await.unwrap();
    assert_eq!(me.user.id, "user-1");

    let requests = seen.all();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn test_group_page_query_params() {
    let seen = Recorder::default();
    let router = Router::new()
        .route(
            "/api/v1/photocards/by-group/:id",
            get(
                |State(seen): State<Recorder>, method: Method, uri: Uri, headers: HeaderMap| async move {
                    seen.record(&method, &uri, &headers, &[]);
                    Json(json!({ "photocards": [], "totalPhotocards": 120 }))
                },
            ),
        )
        .with_state(seen.clone());
    let api = api_client(spawn(router).await);

    let page = api
        .photocards_by_group(
            "aespa",
            PageRequest {
                limit: 40,
                offset: 80,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total_photocards, 120);

    let requests = seen.all();
    assert_eq!(requests[0].path, "/api/v1/photocards/by-group/aespa");
    assert_eq!(requests[0].query.as_deref(), Some("limit=40&offset=80"));
}

#[tokio::test]
async fn test_search_query_params() {
    let seen = Recorder::default();
    let router = Router::new()
        .route(
            "/api/v1/search",
            get(
                |State(seen): State<Recorder>, method: Method, uri: Uri, headers: HeaderMap| async move {
                    seen.record(&method, &uri, &headers, &[]);
                    Json(json!({ "groups": [], "members": [], "photocards": [] }))
                },
            ),
        )
        .with_state(seen.clone());
    let api = api_client(spawn(router).await);

    let result = api
        .search(
            "karina",
            PageRequest {
                limit: 10,
                offset: 20,
            },
        )
        .await
        .unwrap();
    assert_eq!(result.total(), 0);

    let query = seen.all()[0].query.clone().unwrap();
    assert_eq!(query, "q=karina&pc_limit=10&pc_offset=20");
}

#[tokio::test]
async fn test_create_photocard_posts_json() {
    let seen = Recorder::default();
    let router = Router::new()
        .route(
            "/api/v1/photocards",
            post(
                |State(seen): State<Recorder>,
                 method: Method,
                 uri: Uri,
                 headers: HeaderMap,
                 body: Bytes| async move {
                    seen.record(&method, &uri, &headers, &body);
                    Json(json!({
                        "id": "pc-new",
                        "memberId": "karina",
                        "memberName": "Karina",
                        "groupId": "aespa",
                        "groupName": "aespa",
                        "album": "Armageddon",
                        "version": "Superbeing",
                        "year": 2024,
                        "type": "album",
                        "imageUrl": "https://cdn.example/front.jpg"
                    }))
                },
            ),
        )
        .with_state(seen.clone());
    let api = api_client(spawn(router).await);

    let payload = PhotocardCreatePayload {
        member_name: "Karina".to_string(),
        group_name: "aespa".to_string(),
        album: "Armageddon".to_string(),
        version: "Superbeing".to_string(),
        year: 2024,
        kind: CreateType::Album,
        image_url: "https://cdn.example/front.jpg".to_string(),
        back_image_url: None,
    };
    let created = api.create_photocard(&payload).await.unwrap();
    assert_eq!(created.id, "pc-new");

    let request = &seen.all()[0];
    assert_eq!(request.method, Method::POST);
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["type"], "album");
    assert_eq!(body["groupName"], "aespa");
    assert!(body.get("backImageUrl").is_none());
}

#[tokio::test]
async fn test_network_error_hint_for_absolute_base() {
    let api = api_client(closed_port().await);

    let err = api.groups().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    let message = err.to_string();
    assert!(message.starts_with("API request failed: "));
    assert!(message.ends_with("Check the API server is running and reachable."));
}

#[tokio::test]
async fn test_network_error_hint_for_relative_base() {
    let addr = closed_port().await;
    let api = ApiClient::new(&ApiConfig {
        base_url: "/api/v1".to_string(),
        proxy_target: format!("http://{addr}"),
        ..Default::default()
    })
    .unwrap();

    let err = api.groups().await.unwrap_err();
    assert!(err
        .to_string()
        .ends_with("Ensure the dev server proxy target is correct (KATALOG_API_PROXY_TARGET)."));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let router = Router::new().route(
        "/api/v1/groups",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!([]))
        }),
    );
    let addr = spawn(router).await;
    let api = ApiClient::new(&ApiConfig {
        request_timeout: Duration::from_secs(1),
        ..api_config(addr)
    })
    .unwrap();

    let err = api.groups().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(
        err.to_string(),
        "Request timed out after 1s. Is the API server running?"
    );
}

#[tokio::test]
async fn test_stalled_error_body_times_out() {
    // Sends the status line and part of the body, then stalls.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\npartial")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });

    let api = ApiClient::new(&ApiConfig {
        request_timeout: Duration::from_secs(1),
        ..api_config(addr)
    })
    .unwrap();

    let err = api.groups().await.unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err}");
}
