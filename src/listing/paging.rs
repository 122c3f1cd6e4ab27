use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::api::{ApiError, PageRequest};

/// One page of a remote list plus the server's total for the whole list.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Where the next page of a [`PagedList`] comes from.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, page: PageRequest) -> Result<Page<Self::Item>, ApiError>;
}

/// Result of [`PagedList::load_more`].
#[derive(Debug)]
pub enum LoadMore {
    /// The next page arrived; holds the number of items appended.
    Appended(usize),
    /// Everything up to the known total is already held; no request was made.
    Exhausted,
    /// Another load for this list is still running; no request was made.
    InFlight,
    /// The list was reset while the request was running; the page was dropped.
    Stale,
    /// The request failed. Items already held are kept.
    Failed(ApiError),
}

/// Monotonic request counter. A response is committed only if the ticket it
/// was started with is still the latest one.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Generation {
    /// Start a new request, superseding all earlier tickets.
    pub fn begin(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

struct PagedState<T> {
    items: Vec<T>,
    total: u64,
    loading: bool,
    generation: u64,
}

/// A list fetched page by page, accumulating items up to a known total.
pub struct PagedList<T> {
    page_size: u32,
    state: Mutex<PagedState<T>>,
}

impl<T: Clone> PagedList<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            state: Mutex::new(PagedState {
                items: Vec::new(),
                total: 0,
                loading: false,
                generation: 0,
            }),
        }
    }

    /// A list that already holds its first page.
    pub fn with_first_page(page_size: u32, page: Page<T>) -> Self {
        let list = Self::new(page_size);
        list.reset(page.items, page.total);
        list
    }

    /// Replace the held items. Any load still in flight for the previous
    /// contents will be discarded when it completes.
    pub fn reset(&self, items: Vec<T>, total: u64) {
        let mut state = self.lock();
        state.total = total.max(items.len() as u64);
        state.items = items;
        state.loading = false;
        state.generation += 1;
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    /// Run `f` over the held items without cloning them.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock().items)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> u64 {
        self.lock().total
    }

    pub fn has_more(&self) -> bool {
        let state = self.lock();
        (state.items.len() as u64) < state.total
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch the page after the held items and append it.
    pub async fn load_more<S>(&self, source: &S) -> LoadMore
    where
        S: PageSource<Item = T> + ?Sized,
    {
        let (request, generation) = {
            let mut state = self.lock();
            if state.loading {
                return LoadMore::InFlight;
            }
            if state.items.len() as u64 >= state.total {
                return LoadMore::Exhausted;
            }
            state.loading = true;
            (
                PageRequest {
                    limit: self.page_size,
                    offset: state.items.len() as u64,
                },
                state.generation,
            )
        };

        let result = source.fetch_page(request).await;

        let mut state = self.lock();
        if state.generation != generation {
            return LoadMore::Stale;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let appended = page.items.len();
                state.items.extend(page.items);
                let held = state.items.len() as u64;
                // An empty page means the server has nothing past this offset.
                state.total = if appended == 0 {
                    held
                } else {
                    page.total.max(held)
                };
                LoadMore::Appended(appended)
            }
            Err(e) => {
                tracing::warn!(
                    offset = request.offset,
                    error = %e,
                    "Failed to load more items; keeping the ones already loaded"
                );
                LoadMore::Failed(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PagedState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
