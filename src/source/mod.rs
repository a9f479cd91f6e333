//! Item sources
//!
//! An item source is the fetch function a page tracker calls to obtain one
//! page of data. Applications implement [`ItemSource`] for their own APIs or
//! wrap a closure with [`from_fn`].
//!
//! Two ready-made sources are provided:
//! - [`MemorySource`] pages, filters and sorts an in-memory JSON data set
//! - [`ApiSource`] pages a remote REST API, over-fetching when configured

mod api;
mod memory;

pub use api::ApiSource;
pub use memory::MemorySource;

use crate::error::Result;
use crate::pagination::PageResult;
use crate::types::Criteria;
use async_trait::async_trait;
use std::future::Future;

/// Fetch function contract consumed by the page tracker
///
/// `get_items` receives the 0-based page the user asked for, the user's page
/// size and the current criteria. It must return at least `items_per_page`
/// items when that many exist from that page on; it may return more (a
/// multiple of `items_per_page`) to let the tracker serve the following pages
/// from its local cache.
#[async_trait]
pub trait ItemSource<T>: Send + Sync {
    /// Fetch one page
    async fn get_items(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<PageResult<T>>;
}

/// Item source backed by a closure
pub struct FnSource<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

/// Wrap a closure returning a future as an item source
///
/// ```rust,ignore
/// let source = from_fn(|page, per_page, criteria| async move {
///     my_api::list_servers(page, per_page, &criteria).await
/// });
/// tracker.update_items_fn(Arc::new(source));
/// ```
///
/// Client errors reported through `anyhow` convert with `?` into
/// [`Error::Anyhow`](crate::Error::Anyhow), keeping their context chain.
pub fn from_fn<T, F, Fut>(f: F) -> FnSource<F>
where
    F: Fn(usize, usize, Criteria) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<T>>> + Send,
{
    FnSource { f }
}

#[async_trait]
impl<T, F, Fut> ItemSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(usize, usize, Criteria) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<T>>> + Send,
{
    async fn get_items(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<PageResult<T>> {
        (self.f)(page_number, items_per_page, criteria.clone()).await
    }
}
