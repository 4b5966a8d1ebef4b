//! Progress-callback trait for per-entity pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the download and deck stages walk their item lists. The library
//! itself never prints; the CLI forwards these events to a progress bar.
//!
//! # Example
//!
//! ```rust
//! use flagdeck::{PipelineConfig, PipelineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl PipelineProgressCallback for Counter {
//!     fn on_item_complete(&self, _index: usize, _total: usize, _label: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each item (entity or image).
///
/// All methods default to no-ops so callers only override what they care
/// about. Items are processed one at a time, in order.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once the item list is known.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an item is processed.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position
    /// * `total`: number of items
    /// * `label`: entity name or file name
    fn on_item_start(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when an item produced a record or a file.
    fn on_item_complete(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when an item was skipped or failed; the run continues.
    fn on_item_skipped(&self, index: usize, total: usize, label: &str, reason: &str) {
        let _ = (index, total, label, reason);
    }

    /// Called once after all items have been attempted.
    fn on_run_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
