//! Collaborators notified by the controller

use tracing::{debug, error};

/// Receives user-facing error messages
pub trait Notifier: Send + Sync {
    /// Show an error message
    fn error(&self, message: &str);
}

/// Notifier that writes messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Shows and hides a loading indicator around fetches
pub trait LoadingIndicator: Send + Sync {
    /// A fetch was issued
    fn show(&self);

    /// A fetch settled
    fn hide(&self);
}

/// Loading indicator that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoading;

impl LoadingIndicator for NoopLoading {
    fn show(&self) {
        debug!("Loading");
    }

    fn hide(&self) {
        debug!("Loaded");
    }
}

/// Hides the indicator when dropped, so a cancelled fetch cannot leave it shown
pub(crate) struct LoadingGuard<'a> {
    indicator: &'a dyn LoadingIndicator,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn show(indicator: &'a dyn LoadingIndicator) -> Self {
        indicator.show();
        Self { indicator }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}
