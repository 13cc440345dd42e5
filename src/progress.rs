//! Progress reporting for a conversion run.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! an event for every resource entry the run visits.
//!
//! Front ends that prefer polling over callbacks (a UI timer, a status line
//! refreshed from another thread) can use [`ProgressCounter`], which turns the
//! events into three atomics: processed entries, total entries and a finished
//! flag.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tex2dtx::{ConversionConfig, ConversionProgressCallback, ProgressCounter};
//!
//! let counter = Arc::new(ProgressCounter::new());
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter.clone() as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//!
//! // … run the conversion on a worker thread, then from the UI thread:
//! let (done, total) = (counter.processed(), counter.total());
//! # let _ = (config, done, total);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Called by the conversion as it visits each resource entry.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` so the run can
/// happen on a worker thread while a UI observes it.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any entry is read.
    ///
    /// # Arguments
    /// * `total_files` — number of entries in the resource directory
    fn on_conversion_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called after a source file has been classified and parsed.
    ///
    /// # Arguments
    /// * `index`    — 1-based position of the entry
    /// * `total`    — number of entries
    /// * `name`     — file name
    /// * `commands` — number of commands found in the file
    fn on_file_complete(&self, index: usize, total: usize, name: &str, commands: usize) {
        let _ = (index, total, name, commands);
    }

    /// Called for entries that are not source files.
    fn on_file_skipped(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called once after the document has been assembled.
    ///
    /// # Arguments
    /// * `total_files`  — number of entries visited
    /// * `source_files` — entries that were parsed as sources
    fn on_conversion_complete(&self, total_files: usize, source_files: usize) {
        let _ = (total_files, source_files);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Polled progress: processed entries, total entries, finished flag.
///
/// A fresh counter reports `finished() == true` (nothing is running); the
/// flag drops when a conversion starts and rises again when it completes.
#[derive(Debug)]
pub struct ProgressCounter {
    processed: AtomicUsize,
    total: AtomicUsize,
    finished: AtomicBool,
}

impl Default for ProgressCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            finished: AtomicBool::new(true),
        }
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Back to the idle state.
    pub fn reset(&self) {
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
        self.finished.store(true, Ordering::SeqCst);
    }
}

impl ConversionProgressCallback for ProgressCounter {
    fn on_conversion_start(&self, total_files: usize) {
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(total_files, Ordering::SeqCst);
        self.finished.store(false, Ordering::SeqCst);
    }

    fn on_file_complete(&self, _index: usize, _total: usize, _name: &str, _commands: usize) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, _name: &str) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, _total_files: usize, _source_files: usize) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_file_complete(1, 5, "a_b.tex", 3);
        cb.on_file_skipped(2, 5, "docu");
        cb.on_conversion_complete(5, 1);
    }

    #[test]
    fn counter_tracks_a_run() {
        let counter = ProgressCounter::new();
        assert!(counter.finished());

        counter.on_conversion_start(3);
        assert!(!counter.finished());
        assert_eq!(counter.total(), 3);

        counter.on_file_complete(1, 3, "a_x.tex", 2);
        counter.on_file_skipped(2, 3, "docu");
        assert_eq!(counter.processed(), 2);

        counter.on_file_complete(3, 3, "b_y.tex", 0);
        counter.on_conversion_complete(3, 2);
        assert_eq!(counter.processed(), 3);
        assert!(counter.finished());

        counter.reset();
        assert_eq!((counter.processed(), counter.total()), (0, 0));
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(ProgressCounter::new());
        cb.on_conversion_start(10);
        cb.on_file_complete(1, 10, "x_y.tex", 1);
    }
}
