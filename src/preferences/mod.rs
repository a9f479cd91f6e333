//! Persisted user preferences
//!
//! The page size a user last picked is remembered across sessions and shared
//! by every tracker that does not override it. The store is injected into
//! trackers explicitly; trackers read it once when created and write to it
//! only when the user changes the page size.

mod store;

pub use store::{FileStore, MemoryStore};

use crate::error::Result;
use crate::types::JsonValue;
use tracing::warn;

/// Key under which the shared page size is stored
pub const ITEMS_PER_PAGE_KEY: &str = "tablepager.itemsPerPage";

/// Key-value store for user preferences
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Read a stored value
    fn get_object(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Store a value, replacing any previous one
    fn set_object(&self, key: &str, value: JsonValue) -> Result<()>;
}

/// Read the persisted page size.
///
/// Unreadable or invalid entries are logged and treated as absent.
pub fn load_items_per_page(store: &dyn PreferenceStore) -> Option<usize> {
    match store.get_object(ITEMS_PER_PAGE_KEY) {
        Ok(Some(value)) => match value.as_u64() {
            Some(n) if n > 0 => Some(n as usize),
            _ => {
                warn!("Ignoring invalid persisted items per page: {}", value);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read persisted items per page: {}", e);
            None
        }
    }
}

/// Persist the page size
pub fn save_items_per_page(store: &dyn PreferenceStore, items_per_page: usize) -> Result<()> {
    store.set_object(ITEMS_PER_PAGE_KEY, JsonValue::from(items_per_page))
}
