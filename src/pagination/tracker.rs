//! Page tracker
//!
//! Tracks which page of a table is shown, the page size, the total number of
//! items, and the fetch function used to load pages. A tracker is a cheap
//! handle: clones share the same state, so a rendering layer and a controller
//! can both hold one.
//!
//! # Modes
//!
//! - **Server-side**: a fetch function is registered with
//!   [`PageTracker::update_items_fn`]. Navigation issues fetches and the
//!   tracker keeps the returned rows, caching over-fetched pages.
//! - **UI-based**: no fetch function. Navigation only moves the current page
//!   and [`paginate`](super::paginate) slices the full data set.
//!
//! # Overlapping fetches
//!
//! Fetches are not serialized. With [`ResolutionOrder::LastSettled`] the
//! fetch that settles last wins, even if it was issued first. With
//! [`ResolutionOrder::LatestIssued`] every fetch gets a generation number and
//! only the most recently issued one is applied.

use super::cache::PageCache;
use super::types::{LoadState, PageResult, PageSnapshot};
use super::window::page_window;
use crate::config::{ResolutionOrder, TrackerOptions};
use crate::error::{Error, Result};
use crate::preferences::{load_items_per_page, save_items_per_page, PreferenceStore};
use crate::source::ItemSource;
use crate::types::Criteria;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, warn};

/// Shared page tracking state for one table
pub struct PageTracker<T> {
    inner: Arc<TrackerInner<T>>,
}

impl<T> Clone for PageTracker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct TrackerInner<T> {
    state: Mutex<TrackerState<T>>,
    source: RwLock<Option<Arc<dyn ItemSource<T>>>>,
    preferences: Arc<dyn PreferenceStore>,
    persist_items_per_page: bool,
    pages_to_show: usize,
    item_size_list: Vec<usize>,
    resolution_order: ResolutionOrder,
    /// Generation of the most recently issued fetch
    issued: AtomicU64,
}

struct TrackerState<T> {
    page_number: usize,
    items_per_page: usize,
    total_items: usize,
    criteria: Criteria,
    cache: PageCache<T>,
    in_flight: usize,
}

/// Decrements the outstanding fetch count when a fetch settles or is dropped
struct InFlight<'a, T> {
    inner: &'a TrackerInner<T>,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl<T> TrackerInner<T> {
    fn lock(&self) -> MutexGuard<'_, TrackerState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl<T> std::fmt::Debug for PageTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_items_fn = self
            .inner
            .source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        let state = self.inner.lock();
        f.debug_struct("PageTracker")
            .field("page_number", &state.page_number)
            .field("items_per_page", &state.items_per_page)
            .field("total_items", &state.total_items)
            .field("in_flight", &state.in_flight)
            .field("has_items_fn", &has_items_fn)
            .finish_non_exhaustive()
    }
}

impl<T> PageTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a tracker.
    ///
    /// The page size comes from `options.items_per_page`, else from the
    /// preference store, else from `options.default_items_per_page`.
    pub fn create_instance(
        options: TrackerOptions,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self> {
        options.validate()?;

        let items_per_page = options
            .items_per_page
            .or_else(|| load_items_per_page(preferences.as_ref()))
            .unwrap_or(options.default_items_per_page);

        Ok(Self {
            inner: Arc::new(TrackerInner {
                state: Mutex::new(TrackerState {
                    page_number: 0,
                    items_per_page,
                    total_items: 0,
                    criteria: Criteria::default(),
                    cache: PageCache::default(),
                    in_flight: 0,
                }),
                source: RwLock::new(None),
                preferences,
                persist_items_per_page: options.persist_items_per_page,
                pages_to_show: options.pages_to_show,
                item_size_list: options.item_size_list,
                resolution_order: options.resolution_order,
                issued: AtomicU64::new(0),
            }),
        })
    }

    // ========================================================================
    // Fetch function registration
    // ========================================================================

    /// Register the fetch function, replacing any previous one
    pub fn update_items_fn(&self, source: Arc<dyn ItemSource<T>>) {
        let mut slot = self
            .inner
            .source
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(source);
    }

    /// Check if a fetch function is registered
    pub fn has_items_fn(&self) -> bool {
        self.inner
            .source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn items_fn(&self) -> Option<Arc<dyn ItemSource<T>>> {
        self.inner
            .source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ========================================================================
    // Fetch resolution
    // ========================================================================

    /// Wait for a pending fetch and apply its result.
    ///
    /// While the fetch is pending the tracker reports [`LoadState::Loading`]
    /// and keeps showing the previous rows. On success the rows, total and
    /// current page are replaced; on failure the state is left untouched and
    /// the error is returned.
    pub async fn new_items<F>(&self, response: F) -> Result<()>
    where
        F: Future<Output = Result<PageResult<T>>>,
    {
        let generation = self.inner.next_generation();
        let (items_per_page, epoch) = {
            let mut state = self.inner.lock();
            state.in_flight += 1;
            (state.items_per_page, state.cache.epoch())
        };
        let _in_flight = InFlight {
            inner: self.inner.as_ref(),
        };

        match response.await {
            Ok(page) => self.apply(page, generation, items_per_page, epoch),
            Err(e) => {
                warn!(generation, "Fetch failed, staying on current page: {}", e);
                Err(e)
            }
        }
    }

    fn apply(
        &self,
        page: PageResult<T>,
        generation: u64,
        items_per_page: usize,
        epoch: u64,
    ) -> Result<()> {
        if self.inner.resolution_order == ResolutionOrder::LatestIssued {
            let latest = self.inner.issued.load(Ordering::SeqCst);
            if generation < latest {
                debug!(generation, latest, "Discarding stale page result");
                return Ok(());
            }
        }

        let mut state = self.inner.lock();
        if state.items_per_page != items_per_page {
            debug!(
                requested = items_per_page,
                current = state.items_per_page,
                "Discarding page result fetched with an old page size"
            );
            return Ok(());
        }

        page.validate(items_per_page)?;

        debug!(
            generation,
            page = page.page_number,
            returned = page.items.len(),
            total = page.total_number_of_items,
            "Applying page result"
        );
        if epoch != state.cache.epoch() {
            debug!(generation, "Page result predates a cache flush, not caching it");
        }
        state.page_number = page.page_number;
        state.total_items = page.total_number_of_items;
        state.cache.store(
            page.page_number,
            items_per_page,
            page.total_number_of_items,
            page.items,
            epoch,
        );
        Ok(())
    }

    async fn fetch_page(&self, page_number: usize) -> Result<()> {
        let source = self.items_fn().ok_or(Error::NoItemsFn)?;
        let (items_per_page, criteria) = {
            let state = self.inner.lock();
            (state.items_per_page, state.criteria.clone())
        };

        debug!(page = page_number, items_per_page, "Requesting page");
        let response = async move {
            source
                .get_items(page_number, items_per_page, &criteria)
                .await
        };
        self.new_items(response).await
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Go to page `n`, clamped to the existing pages.
    ///
    /// Pages held in the local cache are shown without a fetch, except the
    /// current page, which is always fetched again.
    pub async fn go_to_page(&self, n: usize) -> Result<()> {
        let has_items_fn = self.has_items_fn();
        let target = {
            let mut state = self.inner.lock();
            let target = clamp_page(n, state.total_pages());

            if !has_items_fn {
                state.page_number = target;
                return Ok(());
            }

            if target != state.page_number && state.cache.covers(target, state.items_per_page) {
                debug!(page = target, "Serving page from local cache");
                state.page_number = target;
                // Supersedes any fetch still in flight.
                self.inner.next_generation();
                return Ok(());
            }
            target
        };

        self.fetch_page(target).await
    }

    /// Go to the first page
    pub async fn go_to_first_page(&self) -> Result<()> {
        self.go_to_page(0).await
    }

    /// Go to the previous page, staying on the first page
    pub async fn go_to_prev_page(&self) -> Result<()> {
        let page = self.current_page().saturating_sub(1);
        self.go_to_page(page).await
    }

    /// Go to the next page, staying on the last page
    pub async fn go_to_next_page(&self) -> Result<()> {
        let page = self.current_page() + 1;
        self.go_to_page(page).await
    }

    /// Go to the last page
    pub async fn go_to_last_page(&self) -> Result<()> {
        let page = self.total_pages().saturating_sub(1);
        self.go_to_page(page).await
    }

    /// Fetch again with the current criteria, bypassing the local cache.
    ///
    /// Requests the current page when `stay_on_page` is set, page 0
    /// otherwise. If the criteria changed since the last fetch, the current
    /// page may no longer exist; the fetch function decides what to return.
    pub async fn refresh(&self, stay_on_page: bool) -> Result<()> {
        let page = {
            let mut state = self.inner.lock();
            state.cache.invalidate();
            if stay_on_page {
                state.page_number
            } else {
                0
            }
        };

        if !self.has_items_fn() {
            self.inner.lock().page_number = page;
            return Ok(());
        }

        self.fetch_page(page).await
    }

    // ========================================================================
    // Page size and criteria
    // ========================================================================

    /// Change the page size on behalf of the user.
    ///
    /// Persists the new size when this tracker shares its preference, then
    /// goes back to page 0.
    pub async fn set_items_per_page(&self, items_per_page: usize) -> Result<()> {
        if items_per_page == 0 {
            return Err(Error::invalid_value(
                "items_per_page",
                "must be greater than zero",
            ));
        }

        if self.inner.persist_items_per_page {
            if let Err(e) = save_items_per_page(self.inner.preferences.as_ref(), items_per_page) {
                warn!("Failed to persist items per page: {}", e);
            }
        }

        {
            let mut state = self.inner.lock();
            state.items_per_page = items_per_page;
            state.page_number = 0;
            state.cache.invalidate();
        }

        self.refresh(false).await
    }

    /// Replace the criteria sent with future fetches.
    ///
    /// Changed criteria flush the local cache.
    pub fn set_criteria(&self, criteria: Criteria) {
        let mut state = self.inner.lock();
        if state.criteria != criteria {
            state.criteria = criteria;
            state.cache.invalidate();
        }
    }

    /// Criteria sent with fetches
    pub fn criteria(&self) -> Criteria {
        self.inner.lock().criteria.clone()
    }

    /// Record the size of a UI-paginated data set and keep the current page
    /// in range.
    pub(crate) fn set_local_total(&self, total_items: usize) -> (usize, usize) {
        let mut state = self.inner.lock();
        state.total_items = total_items;
        state.page_number = clamp_page(state.page_number, state.total_pages());
        (state.page_number, state.items_per_page)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// 0-based current page
    pub fn current_page(&self) -> usize {
        self.inner.lock().page_number
    }

    /// Page size
    pub fn items_per_page(&self) -> usize {
        self.inner.lock().items_per_page
    }

    /// Total number of items
    pub fn total_items(&self) -> usize {
        self.inner.lock().total_items
    }

    /// Total number of pages
    pub fn total_pages(&self) -> usize {
        self.inner.lock().total_pages()
    }

    /// Rows of the current page (server-side mode)
    pub fn items(&self) -> Vec<T> {
        let state = self.inner.lock();
        state.cache.page(state.page_number).to_vec()
    }

    /// 1-based index of the first visible item, 0 when there are none
    pub fn first(&self) -> usize {
        let state = self.inner.lock();
        if state.total_items == 0 {
            0
        } else {
            state.page_number * state.items_per_page + 1
        }
    }

    /// 1-based index of the last visible item, 0 when there are none
    pub fn last(&self) -> usize {
        let state = self.inner.lock();
        ((state.page_number + 1) * state.items_per_page).min(state.total_items)
    }

    /// Check if the current page is the first one
    pub fn is_first_page(&self) -> bool {
        self.current_page() == 0
    }

    /// Check if the current page is the last one
    pub fn is_last_page(&self) -> bool {
        let state = self.inner.lock();
        state.page_number + 1 >= state.total_pages()
    }

    /// Check if `n` is the current page
    pub fn is_page(&self, n: usize) -> bool {
        self.current_page() == n
    }

    /// Check if there are no items
    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    /// Check if `n` is the current page size
    pub fn is_items_per_page(&self, n: usize) -> bool {
        self.items_per_page() == n
    }

    /// Page sizes offered to the user
    pub fn item_size_list(&self) -> &[usize] {
        &self.inner.item_size_list
    }

    /// Size of the visible page window
    pub fn pages_to_show(&self) -> usize {
        self.inner.pages_to_show
    }

    /// Whether a fetch is outstanding
    pub fn load_state(&self) -> LoadState {
        if self.inner.lock().in_flight > 0 {
            LoadState::Loading
        } else {
            LoadState::Idle
        }
    }

    /// Check if a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.load_state().is_loading()
    }

    /// Page numbers of the visible page window
    pub fn page_window(&self) -> Vec<usize> {
        let state = self.inner.lock();
        page_window(state.page_number, state.total_pages(), self.inner.pages_to_show)
    }

    /// Consistent view of the tracker for rendering
    pub fn snapshot(&self) -> PageSnapshot<T> {
        let state = self.inner.lock();
        let total_pages = state.total_pages();
        let first = if state.total_items == 0 {
            0
        } else {
            state.page_number * state.items_per_page + 1
        };
        PageSnapshot {
            items: state.cache.page(state.page_number).to_vec(),
            current_page: state.page_number,
            items_per_page: state.items_per_page,
            total_items: state.total_items,
            total_pages,
            first,
            last: ((state.page_number + 1) * state.items_per_page).min(state.total_items),
            pages: page_window(state.page_number, total_pages, self.inner.pages_to_show),
            state: if state.in_flight > 0 {
                LoadState::Loading
            } else {
                LoadState::Idle
            },
        }
    }

    /// Number of rows held locally, including cached pages
    pub fn cached_len(&self) -> usize {
        let state = self.inner.lock();
        if state.cache.is_valid() {
            state.cache.len()
        } else {
            0
        }
    }
}

impl<T> TrackerState<T> {
    fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }
}

fn clamp_page(n: usize, total_pages: usize) -> usize {
    n.min(total_pages.saturating_sub(1))
}
