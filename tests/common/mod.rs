#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, Method, Uri};
use axum::Router;

use katalog::api::{ApiClient, TokenSource};
use katalog::config::ApiConfig;
use katalog::models::{Photocard, PhotocardType};

/// Serve `router` on an ephemeral local port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A port nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn api_config(addr: SocketAddr) -> ApiConfig {
    ApiConfig {
        base_url: format!("http://{addr}/api/v1"),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn api_client(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&api_config(addr)).unwrap()
}

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

/// Requests received by a mock server, in arrival order.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    pub fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) {
        self.0.lock().unwrap().push(Seen {
            method: method.clone(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.to_vec(),
        });
    }

    pub fn all(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.all().into_iter().map(|s| s.path).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Token source with a fixed token.
pub struct StaticToken(pub &'static str);

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

pub fn photocard(n: u64) -> Photocard {
    let member = if n % 2 == 0 { "Karina" } else { "Winter" };
    Photocard {
        id: format!("pc-{n}"),
        member_id: member.to_lowercase(),
        member_name: member.to_string(),
        group_id: "aespa".to_string(),
        group_name: "aespa".to_string(),
        album: "Armageddon".to_string(),
        version: format!("Ver {n}"),
        year: 2024,
        kind: PhotocardType::Album,
        image_url: format!("https://cdn.example/pc-{n}.jpg"),
        back_image_url: None,
    }
}

pub fn photocards(range: std::ops::Range<u64>) -> Vec<Photocard> {
    range.map(photocard).collect()
}
