//! Error types for the download module.
//!
//! Download faults never escape `download()` as raised errors; they are
//! captured into the terminal [`ProgressStatus`](super::ProgressStatus) and
//! reported through the progress callback. The `Err` arm of the download
//! API is reserved for caller mistakes (reusing a finished handle).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a streaming download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level fault while opening the source stream (DNS, connection
    /// refused, TLS, timeout).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered the streaming request with an error status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The source stream faulted mid-copy.
    #[error("stream error downloading {url}: {source}")]
    Stream {
        /// The URL being streamed.
        url: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// File system error on the destination side (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download was cancelled cooperatively mid-transfer.
    #[error("download of {url} was cancelled")]
    Cancelled {
        /// The URL being downloaded.
        url: String,
    },

    /// The handle already reached a terminal state; a new attempt needs a
    /// new handle.
    #[error("download of {url} already finished; create a new handle to retry")]
    AttemptFinished {
        /// The URL of the finished attempt.
        url: String,
    },

    /// No output file exists yet (the transfer has not completed).
    #[error("download has not produced an output file")]
    Incomplete,
}

impl DownloadError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a mid-stream read error.
    pub fn stream(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Stream {
            url: url.into(),
            source,
        }
    }

    /// Creates a destination IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a cancellation marker.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Creates a finished-handle reuse error.
    pub fn attempt_finished(url: impl Into<String>) -> Self {
        Self::AttemptFinished { url: url.into() }
    }

    /// Returns true for cooperative cancellation (as opposed to a fault).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
