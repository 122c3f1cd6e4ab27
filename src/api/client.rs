use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{ABSOLUTE_BASE_HINT, RELATIVE_BASE_HINT};
use super::{ApiError, TokenSource};
use crate::config::ApiConfig;
use crate::models::{
    CurrentUser, Group, GroupPhotocards, Member, Photocard, PhotocardCreatePayload, SearchResult,
    Submission,
};

/// A window into a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(40)
    }
}

#[derive(Serialize)]
struct GroupPageQuery {
    limit: u32,
    offset: u64,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    pc_limit: u32,
    pc_offset: u64,
}

/// HTTP client for the catalog API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    /// Whether the configured base named a host, or was resolved against the proxy target.
    absolute: bool,
    timeout: Duration,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let resolved = config.resolved_base();
        let base = Url::parse(&resolved)
            .map_err(|e| ApiError::InvalidUrl(format!("{resolved}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(resolved));
        }

        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base,
            absolute: config.is_absolute(),
            timeout: config.request_timeout,
            tokens: None,
        })
    }

    /// Attach a bearer token from `tokens` to every request when one is available.
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub async fn groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get(self.endpoint(&["groups"])).await
    }

    pub async fn group(&self, group_id: &str) -> Result<Group, ApiError> {
        self.get(self.endpoint(&["groups", group_id])).await
    }

    pub async fn members(&self, group_id: &str) -> Result<Vec<Member>, ApiError> {
        self.get(self.endpoint(&["groups", group_id, "members"]))
            .await
    }

    pub async fn member(&self, group_id: &str, member_id: &str) -> Result<Member, ApiError> {
        self.get(self.endpoint(&["groups", group_id, "members", member_id]))
            .await
    }

    pub async fn member_photocards(
        &self,
        group_id: &str,
        member_id: &str,
    ) -> Result<Vec<Photocard>, ApiError> {
        self.get(self.endpoint(&["groups", group_id, "members", member_id, "photocards"]))
            .await
    }

    pub async fn photocards(&self) -> Result<Vec<Photocard>, ApiError> {
        self.get(self.endpoint(&["photocards"])).await
    }

    pub async fn photocards_by_group(
        &self,
        group_id: &str,
        page: PageRequest,
    ) -> Result<GroupPhotocards, ApiError> {
        let mut url = self.endpoint(&["photocards", "by-group", group_id]);
        set_query(
            &mut url,
            &GroupPageQuery {
                limit: page.limit,
                offset: page.offset,
            },
        )?;
        self.get(url).await
    }

    /// Register a new photocard. Requires a signed-in session.
    pub async fn create_photocard(
        &self,
        payload: &PhotocardCreatePayload,
    ) -> Result<Photocard, ApiError> {
        self.post(self.endpoint(&["photocards"]), payload).await
    }

    /// Search groups, members and photocards. Only the photocards are paginated.
    pub async fn search(&self, query: &str, page: PageRequest) -> Result<SearchResult, ApiError> {
        let mut url = self.endpoint(&["search"]);
        set_query(
            &mut url,
            &SearchQuery {
                q: query,
                pc_limit: page.limit,
                pc_offset: page.offset,
            },
        )?;
        self.get(url).await
    }

    pub async fn search_all(&self) -> Result<SearchResult, ApiError> {
        self.get(self.endpoint(&["search", "all"])).await
    }

    /// The signed-in user. Fails with status 401 without a session.
    pub async fn me(&self) -> Result<CurrentUser, ApiError> {
        self.get(self.endpoint(&["auth", "me"])).await
    }

    pub async fn submissions(&self) -> Result<Vec<Submission>, ApiError> {
        self.get(self.endpoint(&["submissions"])).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Cannot fail: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let request = self.http.get(url.clone());
        self.send(request, &url).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(url.clone()).json(body);
        self.send(request, &url).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ApiError> {
        let mut request = request.timeout(self.timeout);
        if let Some(tokens) = &self.tokens {
            if let Some(token) = tokens.access_token().await {
                request = request.bearer_auth(token);
            }
        }

        tracing::debug!(url = %url, "API request");

        let resp = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => return Err(ApiError::Timeout(self.timeout)),
                Err(_) => String::new(),
            };
            tracing::debug!(url = %url, status = status.as_u16(), "API request failed");
            return Err(ApiError::from_status(status, body));
        }

        resp.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::Decode(e.to_string())
            }
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            return ApiError::Timeout(self.timeout);
        }
        let hint = if self.absolute {
            ABSOLUTE_BASE_HINT
        } else {
            RELATIVE_BASE_HINT
        };
        ApiError::Network {
            message: e.to_string(),
            hint,
        }
    }
}

fn set_query<Q: Serialize>(url: &mut Url, query: &Q) -> Result<(), ApiError> {
    let encoded =
        serde_qs::to_string(query).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    url.set_query(Some(&encoded));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let api = client("http://localhost:8000/api/v1");
        let url = api.endpoint(&["groups", "aespa", "members"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/groups/aespa/members");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:8000/api/v1");
        let url = api.endpoint(&["groups", "a/b c"]);
        assert_eq!(url.path(), "/api/v1/groups/a%2Fb%20c");
    }

    #[test]
    fn test_relative_base_uses_proxy_target() {
        let api = client("/api/v1");
        assert_eq!(
            api.endpoint(&["search", "all"]).as_str(),
            "http://127.0.0.1:8000/api/v1/search/all"
        );
    }

    #[test]
    fn test_search_query_encoding() {
        let api = client("http://localhost:8000/api/v1");
        let mut url = api.endpoint(&["search"]);
        set_query(
            &mut url,
            &SearchQuery {
                q: "new jeans",
                pc_limit: 40,
                pc_offset: 80,
            },
        )
        .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("pc_limit=40"));
        assert!(query.contains("pc_offset=80"));
        assert!(query.starts_with("q=new"));
    }

    #[test]
    fn test_invalid_base_rejected() {
        let result = ApiClient::new(&ApiConfig {
            base_url: "http://bad host/api".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
