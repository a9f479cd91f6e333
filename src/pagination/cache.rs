//! Local page cache
//!
//! Holds the batch returned by the last applied fetch. A batch covers the
//! page it was requested for plus every further whole page it contains, and a
//! trailing partial page when that page ends the data set.
//!
//! An invalidated cache still hands out rows for display, so the current page
//! stays visible while a replacement fetch is loading, but it no longer
//! serves navigation.
//!
//! Every invalidation starts a new epoch. A batch fetched in an older epoch
//! is stored for display only, since it may reflect criteria or a page size
//! that no longer apply.

#[derive(Debug, Clone)]
pub(crate) struct PageCache<T> {
    first_page: usize,
    items_per_page: usize,
    total_items: usize,
    items: Vec<T>,
    valid: bool,
    epoch: u64,
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self {
            first_page: 0,
            items_per_page: 0,
            total_items: 0,
            items: Vec::new(),
            valid: false,
            epoch: 0,
        }
    }
}

impl<T> PageCache<T> {
    /// Replace the batch. It serves navigation only if it was fetched in the
    /// current epoch.
    pub(crate) fn store(
        &mut self,
        first_page: usize,
        items_per_page: usize,
        total_items: usize,
        items: Vec<T>,
        fetched_in: u64,
    ) {
        self.first_page = first_page;
        self.items_per_page = items_per_page;
        self.total_items = total_items;
        self.items = items;
        self.valid = fetched_in == self.epoch;
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
        self.epoch += 1;
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if `page` at `items_per_page` can be served without a fetch.
    pub(crate) fn covers(&self, page: usize, items_per_page: usize) -> bool {
        if !self.valid || items_per_page != self.items_per_page {
            return false;
        }
        let Some(range) = self.range_of(page) else {
            return false;
        };
        range.len() == items_per_page
            || self.first_page * items_per_page + self.items.len() >= self.total_items
    }

    /// Rows of `page`, empty when the page is not in the batch
    pub(crate) fn page(&self, page: usize) -> &[T] {
        self.range_of(page).map_or(&[], |range| &self.items[range])
    }

    fn range_of(&self, page: usize) -> Option<std::ops::Range<usize>> {
        if page < self.first_page || self.items_per_page == 0 {
            return None;
        }
        let start = (page - self.first_page).checked_mul(self.items_per_page)?;
        if start >= self.items.len() {
            return None;
        }
        let end = (start + self.items_per_page).min(self.items.len());
        Some(start..end)
    }
}
