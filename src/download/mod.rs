//! Streaming file downloads with progress reporting and cancellation.
//!
//! This module provides functionality for streaming files from HTTP/HTTPS
//! URLs to local temporary files in fixed-size chunks, with per-chunk
//! progress callbacks, cooperative cancellation, and pause/resume via range
//! requests.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Content-length probe before transfer (HEAD, no payload)
//! - Per-chunk progress snapshots with percentage math
//! - Cooperative cancellation bounded by one chunk's latency
//! - Pause/resume backed by `Range: bytes=N-` requests
//!
//! # Example
//!
//! ```no_run
//! use netkit::download::start_download;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = start_download("https://example.com/release.tar.gz", |progress| {
//!     if progress.has_error() {
//!         eprintln!("transfer failed");
//!     } else if progress.output_file().is_some() {
//!         println!("done: {} bytes", progress.transferred_bytes());
//!     }
//! })?;
//!
//! // The transfer streams on the background pool; stop it any time:
//! handle.cancel();
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod handle;
mod status;

use std::sync::Arc;

use tracing::warn;

pub use engine::{DEFAULT_CHUNK_SIZE, DownloadEngine, EngineError};
pub use error::DownloadError;
pub use handle::{DownloadHandle, DownloadState};
pub use status::ProgressStatus;

use crate::http::RequestError;
use crate::runtime;

/// Starts a detached download on the background pool.
///
/// Returns the handle immediately; the transfer streams in the background
/// and reports through `on_progress` (per chunk, then once terminally). Use
/// the handle to cancel or pause. For an awaitable transfer, use
/// [`DownloadEngine::download`] directly.
///
/// # Errors
///
/// Returns [`RequestError::InvalidUrl`] or [`RequestError::InvalidScheme`]
/// if the URL is rejected before any network activity.
pub fn start_download<F>(url: &str, on_progress: F) -> Result<Arc<DownloadHandle>, RequestError>
where
    F: FnMut(&ProgressStatus) + Send + 'static,
{
    let handle = Arc::new(DownloadHandle::new(url)?);
    let task_handle = Arc::clone(&handle);

    runtime::shared().spawn(async move {
        let engine = DownloadEngine::new();
        if let Err(error) = engine.download(&task_handle, on_progress).await {
            // Unreachable for a fresh handle; transfer faults land in the
            // progress callback instead.
            warn!(url = %task_handle.url(), error = %error, "detached download rejected");
        }
    });

    Ok(handle)
}
