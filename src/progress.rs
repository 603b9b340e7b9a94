//! Download progress reporting
//!
//! Sources invoke the sink synchronously on the download task, once per
//! received chunk, so implementations must be cheap and non-blocking.

use crate::types::DownloadProgress;

/// Receiver for download progress events
pub trait ProgressSink: Send + Sync {
    /// Called with the current byte counts for an in-flight download
    fn report(&self, progress: DownloadProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(DownloadProgress) + Send + Sync,
{
    fn report(&self, progress: DownloadProgress) {
        self(progress)
    }
}

/// Sink that discards all progress events
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: DownloadProgress) {}
}
