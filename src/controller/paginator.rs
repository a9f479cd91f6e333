//! Pagination controller
//!
//! Bridges criteria changes reported by a rendering layer and a
//! [`PageTracker`]. Changes are debounced per trigger so a burst of UI events
//! becomes one fetch; when a debounced handler fires it copies the full
//! criteria into the tracker and goes back to page 0.

use super::debounce::Debouncer;
use super::hooks::{LoadingGuard, LoadingIndicator, NoopLoading, Notifier, TracingNotifier};
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::pagination::{PageResult, PageTracker};
use crate::source::ItemSource;
use crate::types::{Criteria, Selections, SortDirection};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// Kind of criteria change, each with its own debounce window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Sort column or direction
    Sort,
    /// Filter text
    Filter,
    /// Selection sets
    Selection,
}

impl Trigger {
    fn window(self, config: &ControllerConfig) -> Duration {
        match self {
            Self::Sort => config.sort_window(),
            Self::Filter => config.filter_window(),
            Self::Selection => config.selection_window(),
        }
    }
}

/// Debounced orchestration of one tracker
pub struct PaginationController<T> {
    inner: Arc<ControllerInner<T>>,
}

struct ControllerInner<T> {
    tracker: PageTracker<T>,
    config: ControllerConfig,
    criteria: Mutex<Criteria>,
    debouncer: Debouncer<Trigger>,
}

impl<T> std::fmt::Debug for PaginationController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("tracker", &self.inner.tracker)
            .field("config", &self.inner.config)
            .field("criteria", &*self.inner.criteria())
            .field("debouncer", &self.inner.debouncer)
            .finish()
    }
}

impl<T> ControllerInner<T> {
    fn criteria(&self) -> MutexGuard<'_, Criteria> {
        self.criteria.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> ControllerInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn notify_page_tracking(&self) -> Result<()> {
        let criteria = self.criteria().clone();
        self.tracker.set_criteria(criteria);
        self.tracker.refresh(false).await
    }
}

/// Builder for [`PaginationController`]
pub struct PaginationControllerBuilder<T> {
    tracker: PageTracker<T>,
    source: Option<Arc<dyn ItemSource<T>>>,
    config: ControllerConfig,
    notifier: Arc<dyn Notifier>,
    loading: Arc<dyn LoadingIndicator>,
}

impl<T> PaginationControllerBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Fetch function to register with the tracker
    #[must_use]
    pub fn source(mut self, source: Arc<dyn ItemSource<T>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Controller options
    #[must_use]
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Collaborator receiving the configured error message
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Collaborator showing the loading state
    #[must_use]
    pub fn loading(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = loading;
        self
    }

    /// Build the controller, registering the wrapped fetch function.
    ///
    /// Without a source the tracker keeps whatever fetch function it already
    /// has, or stays in UI-based mode.
    pub fn build(self) -> Result<PaginationController<T>> {
        self.config.validate()?;

        if let Some(source) = self.source {
            self.tracker.update_items_fn(Arc::new(ControlledSource {
                source,
                notifier: self.notifier,
                loading: self.loading,
                error_message: self.config.error_message.clone(),
            }));
        }

        let criteria = self.tracker.criteria();
        Ok(PaginationController {
            inner: Arc::new(ControllerInner {
                tracker: self.tracker,
                config: self.config,
                criteria: Mutex::new(criteria),
                debouncer: Debouncer::new(),
            }),
        })
    }
}

impl<T> PaginationController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start building a controller for `tracker`
    pub fn builder(tracker: PageTracker<T>) -> PaginationControllerBuilder<T> {
        PaginationControllerBuilder {
            tracker,
            source: None,
            config: ControllerConfig::default(),
            notifier: Arc::new(TracingNotifier),
            loading: Arc::new(NoopLoading),
        }
    }

    /// Load page 0 with the current criteria
    pub async fn start(&self) -> Result<()> {
        self.inner.notify_page_tracking().await
    }

    /// The controlled tracker
    pub fn tracker(&self) -> &PageTracker<T> {
        &self.inner.tracker
    }

    /// Criteria as last reported, including changes still being debounced
    pub fn criteria(&self) -> Criteria {
        self.inner.criteria().clone()
    }

    /// Change the sort column
    ///
    /// # Panics
    ///
    /// A changed value schedules a debounced fetch with `tokio::spawn`, so
    /// this panics outside a tokio runtime. The same holds for every setter
    /// below.
    pub fn set_sort_column(&self, column: Option<String>) {
        self.update(Trigger::Sort, |criteria| {
            if criteria.sort_column == column {
                return false;
            }
            criteria.sort_column = column;
            true
        });
    }

    /// Change the sort direction
    ///
    /// # Panics
    ///
    /// Outside a tokio runtime, when the direction changes.
    pub fn set_sort_direction(&self, direction: SortDirection) {
        self.update(Trigger::Sort, |criteria| {
            if criteria.sort_direction == direction {
                return false;
            }
            criteria.sort_direction = direction;
            true
        });
    }

    /// Change the filter text
    ///
    /// # Panics
    ///
    /// Outside a tokio runtime, when the text changes.
    pub fn set_filter_text(&self, text: Option<String>) {
        self.update(Trigger::Filter, |criteria| {
            if criteria.filter_text == text {
                return false;
            }
            criteria.filter_text = text;
            true
        });
    }

    /// Replace the selections
    ///
    /// # Panics
    ///
    /// Outside a tokio runtime, when the selections change.
    pub fn set_selections(&self, selections: Selections) {
        self.update(Trigger::Selection, |criteria| {
            if criteria.selections == selections {
                return false;
            }
            criteria.selections = selections;
            true
        });
    }

    /// Check if a change of this kind is waiting for its window to pass
    pub fn is_pending(&self, trigger: Trigger) -> bool {
        self.inner.debouncer.is_pending(&trigger)
    }

    /// Drop all debounced changes that have not fired yet
    pub fn cancel_pending(&self) {
        self.inner.debouncer.cancel_all();
    }

    fn update(&self, trigger: Trigger, change: impl FnOnce(&mut Criteria) -> bool) {
        let changed = change(&mut self.inner.criteria());
        if !changed {
            debug!(?trigger, "Criteria unchanged, nothing to schedule");
            return;
        }

        let window = trigger.window(&self.inner.config);
        let weak: Weak<ControllerInner<T>> = Arc::downgrade(&self.inner);
        debug!(?trigger, window_ms = window.as_millis() as u64, "Scheduling refresh");

        self.inner.debouncer.schedule(trigger, window, move || async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            debug!(?trigger, "Applying debounced criteria change");
            if let Err(e) = inner.notify_page_tracking().await {
                warn!(?trigger, "Refresh after criteria change failed: {}", e);
            }
        });
    }
}

/// Fetch function wrapper adding loading indication and error notification
struct ControlledSource<T> {
    source: Arc<dyn ItemSource<T>>,
    notifier: Arc<dyn Notifier>,
    loading: Arc<dyn LoadingIndicator>,
    error_message: Option<String>,
}

#[async_trait]
impl<T> ItemSource<T> for ControlledSource<T>
where
    T: Send + 'static,
{
    async fn get_items(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<PageResult<T>> {
        let _loading = LoadingGuard::show(self.loading.as_ref());

        let result = self
            .source
            .get_items(page_number, items_per_page, criteria)
            .await;

        if let Err(e) = &result {
            warn!(page = page_number, "Fetch rejected: {}", e);
            if let Some(message) = &self.error_message {
                self.notifier.error(message);
            }
        }
        result
    }
}
