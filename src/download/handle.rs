//! Caller-visible handle for one download attempt.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

use crate::http::{self, RequestError};

/// Lifecycle of a download attempt.
///
/// Terminal states are final: a handle that reached one cannot stream again,
/// and a new attempt requires a new handle. `Paused` is not terminal; a
/// further `download` call on the same handle resumes the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DownloadState {
    /// No transfer started yet.
    Idle = 0,
    /// Probing the server for content length.
    Probing = 1,
    /// Copying chunks to the temporary file.
    Streaming = 2,
    /// Stopped cooperatively with the partial file kept for resumption.
    Paused = 3,
    /// The whole payload reached the temporary file.
    Completed = 4,
    /// A fault terminated the transfer; the partial file was removed.
    Failed = 5,
    /// Cancellation terminated the transfer; the partial file was removed.
    Cancelled = 6,
}

impl DownloadState {
    /// Returns true for states no transfer can leave.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Probing,
            2 => Self::Streaming,
            3 => Self::Paused,
            4 => Self::Completed,
            5 => Self::Failed,
            6 => Self::Cancelled,
            _ => Self::Idle,
        }
    }
}

/// One download attempt for one URL.
///
/// The handle owns the cancellation and pause flags (settable from any
/// thread while the transfer runs) and tracks the attempt's state. After a
/// pause it also carries the byte offset and temporary path needed to resume
/// with a range request.
///
/// # Example
///
/// ```no_run
/// use netkit::download::{DownloadEngine, DownloadHandle};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = DownloadHandle::new("https://example.com/archive.zip")?;
/// let engine = DownloadEngine::new();
/// let status = engine
///     .download(&handle, |progress| {
///         println!("{}%", progress.rounded_percentage());
///     })
///     .await?;
/// if let Some(path) = status.output_file() {
///     println!("saved to {}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DownloadHandle {
    url: Url,
    cancelled: AtomicBool,
    paused: AtomicBool,
    state: AtomicU8,
    resume_offset: AtomicU64,
    temp_path: Mutex<Option<PathBuf>>,
}

impl DownloadHandle {
    /// Creates a handle for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] or [`RequestError::InvalidScheme`]
    /// if the URL is unparsable or not http/https. No network activity
    /// happens here.
    pub fn new(url: &str) -> Result<Self, RequestError> {
        Ok(Self {
            url: http::parse_url(url)?,
            cancelled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            state: AtomicU8::new(DownloadState::Idle as u8),
            resume_offset: AtomicU64::new(0),
            temp_path: Mutex::new(None),
        })
    }

    /// Returns the validated download URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the attempt's current state.
    #[must_use]
    pub fn state(&self) -> DownloadState {
        DownloadState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Requests cooperative cancellation.
    ///
    /// Observed at chunk boundaries; an in-flight chunk read completes
    /// first. Calling this repeatedly, or after the attempt terminated, is a
    /// no-op.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        debug!(url = %self.url, "cancellation requested");
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Requests a cooperative pause.
    ///
    /// Observed at chunk boundaries. The partial file and byte offset are
    /// kept on the handle; a further `download` call resumes with a range
    /// request.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        debug!(url = %self.url, "pause requested");
    }

    /// Clears a pause request so the transfer can be re-run.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Returns true if a pause was requested and not yet cleared.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Returns true if a header probe of the URL reports HTTP 200.
    pub async fn exists(&self) -> bool {
        http::url_exists(self.url.as_str()).await
    }

    /// Returns the URL's headers when the resource exists, `None` otherwise.
    pub async fn headers(&self) -> Option<HeaderMap> {
        if self.exists().await {
            http::url_headers(self.url.as_str()).await
        } else {
            None
        }
    }

    /// Returns the advertised size in bytes, or `-1` if unknown.
    pub async fn content_length(&self) -> i64 {
        http::url_content_length(self.url.as_str()).await
    }

    pub(crate) fn set_state(&self, state: DownloadState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Byte offset already on disk from a paused attempt.
    pub(crate) fn resume_offset(&self) -> u64 {
        self.resume_offset.load(Ordering::SeqCst)
    }

    /// Temporary file path recorded for the in-flight or paused attempt.
    pub(crate) fn temp_path(&self) -> Option<PathBuf> {
        self.temp_path
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_temp_path(&self, path: PathBuf) {
        *self
            .temp_path
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(path);
    }

    pub(crate) fn set_resume_offset(&self, offset: u64) {
        self.resume_offset.store(offset, Ordering::SeqCst);
    }

    pub(crate) fn clear_resume(&self) {
        self.resume_offset.store(0, Ordering::SeqCst);
        *self
            .temp_path
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }
}
