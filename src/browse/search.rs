use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, PageRequest};
use crate::listing::{Generation, LoadMore, Page, PageSource, PagedList};
use crate::models::{Group, Member, Photocard, SearchResult};

/// Photocard pages of `/search?q=`.
pub struct SearchSource {
    api: ApiClient,
    query: String,
}

impl SearchSource {
    pub fn new(api: ApiClient, query: impl Into<String>) -> Self {
        Self {
            api,
            query: query.into(),
        }
    }
}

#[async_trait]
impl PageSource for SearchSource {
    type Item = Photocard;

    async fn fetch_page(&self, page: PageRequest) -> Result<Page<Photocard>, ApiError> {
        let result = self.api.search(&self.query, page).await?;
        let total = result.total();
        Ok(Page {
            items: result.photocards,
            total,
        })
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Results for the query were committed.
    Loaded,
    /// The query was blank; results were cleared without a request.
    Cleared,
    /// A newer search started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Default)]
struct Matches {
    query: String,
    groups: Vec<Group>,
    members: Vec<Member>,
}

/// Search results that a newer query replaces, with paginated photocards.
pub struct SearchSession {
    api: ApiClient,
    generation: Generation,
    matches: Mutex<Matches>,
    photocards: PagedList<Photocard>,
}

impl SearchSession {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        Self {
            api,
            generation: Generation::default(),
            matches: Mutex::new(Matches::default()),
            photocards: PagedList::new(page_size),
        }
    }

    /// Run `query`. Only the most recently started search may commit its
    /// results; a failure leaves the previous results in place.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        let ticket = self.generation.begin();

        if query.trim().is_empty() {
            self.commit(String::new(), SearchResult::default());
            return Ok(SearchOutcome::Cleared);
        }

        let page = PageRequest::first(self.photocards.page_size());
        let result = self.api.search(query, page).await;

        if !self.generation.is_current(ticket) {
            tracing::debug!(query, "Dropping superseded search result");
            return Ok(SearchOutcome::Superseded);
        }

        let result = result?;
        tracing::debug!(
            query,
            groups = result.groups.len(),
            photocards = result.photocards.len(),
            total = result.total(),
            "Search results"
        );
        self.commit(query.to_string(), result);
        Ok(SearchOutcome::Loaded)
    }

    /// Append the next page of photocards for the current query.
    pub async fn load_more(&self) -> LoadMore {
        let query = self.query();
        if query.is_empty() {
            return LoadMore::Exhausted;
        }
        let source = SearchSource::new(self.api.clone(), query);
        self.photocards.load_more(&source).await
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.lock().groups.clone()
    }

    pub fn members(&self) -> Vec<Member> {
        self.lock().members.clone()
    }

    pub fn photocards(&self) -> &PagedList<Photocard> {
        &self.photocards
    }

    /// Count shown on the "All" tab: matching groups plus all matching photocards.
    pub fn total_results(&self) -> u64 {
        self.lock().groups.len() as u64 + self.photocards.total()
    }

    fn commit(&self, query: String, result: SearchResult) {
        let total = result.total();
        {
            let mut matches = self.lock();
            matches.query = query;
            matches.groups = result.groups;
            matches.members = result.members;
        }
        self.photocards.reset(result.photocards, total);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Matches> {
        self.matches.lock().unwrap_or_else(|e| e.into_inner())
    }
}
