//! Progress reporting for a running batch.
//!
//! Workers advance a [`ProgressCallback`] once per job they finish, whether
//! the job succeeded or not. Rendering lives upstream (the CLI draws an
//! `indicatif` bar); this crate only knows the trait.

use std::sync::Arc;

/// Receives batch progress. Shared across every worker task.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of files discovery emitted.
    fn set_total(&self, total: u64);

    /// Advances by `delta` finished files.
    fn inc(&self, delta: u64);

    /// Shows what the batch is doing (the current phase).
    fn set_message(&self, msg: String);

    /// Marks the batch as finished with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
