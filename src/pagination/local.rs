//! UI-based pagination
//!
//! When the whole data set is already in memory there is no fetch function:
//! the tracker only remembers the position and [`paginate`] cuts the current
//! page out of the (already filtered and sorted) rows on every render.

use super::tracker::PageTracker;

/// Slice the current page out of `items`.
///
/// Updates the tracker's total to `items.len()` and pulls the current page
/// back into range when the data set shrank.
pub fn paginate<T>(tracker: &PageTracker<T>, items: &[T]) -> Vec<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (page_number, items_per_page) = tracker.set_local_total(items.len());
    items
        .iter()
        .skip(page_number * items_per_page)
        .take(items_per_page)
        .cloned()
        .collect()
}
