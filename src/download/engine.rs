//! Streaming download engine with progress, cancellation, and resumption.
//!
//! The engine owns the lifecycle of a single transfer:
//! `Idle → Probing → Streaming → {Completed | Failed | Cancelled}`, with a
//! non-terminal `Paused` detour. It probes the server for the payload size,
//! copies the body to a uniquely-named temporary file in fixed-size chunks,
//! and invokes the caller's progress callback after every chunk and once,
//! terminally, at the end of the attempt.
//!
//! # Overview
//!
//! Faults never escape `download()` as raised errors: stream and IO faults
//! delete the partial file and land in the terminal [`ProgressStatus`],
//! exactly like cooperative cancellation. The engine does not retry.
//!
//! # Example
//!
//! ```no_run
//! use netkit::download::{DownloadEngine, DownloadHandle};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = DownloadHandle::new("https://example.com/dataset.zip")?;
//! let engine = DownloadEngine::new();
//!
//! // The callback fires once per chunk; de-duplicate by rounded percentage
//! // for coarse reporting.
//! let mut last_shown = -1;
//! let status = engine
//!     .download(&handle, |progress| {
//!         let percent = progress.rounded_percentage();
//!         if percent != last_shown {
//!             last_shown = percent;
//!             println!("{percent}%");
//!         }
//!     })
//!     .await?;
//!
//! if let Some(path) = status.output_file() {
//!     status.move_to("./dataset.zip")?;
//!     println!("was at {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use futures_util::io::{AsyncRead, AsyncReadExt};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::RANGE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use super::handle::{DownloadHandle, DownloadState};
use super::status::ProgressStatus;
use crate::http::{ClientProvider, DispatchEngine};

/// Minimum allowed chunk size in bytes.
const MIN_CHUNK_SIZE: usize = 1;

/// Maximum allowed chunk size in bytes (1 MiB keeps per-chunk latency, and
/// therefore cancellation latency, bounded).
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Default chunk size for the streaming copy loop.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Suffix for in-flight temporary files.
const TEMP_SUFFIX: &str = ".tmpdownload";

/// Error type for download engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid chunk size provided.
    #[error(
        "invalid chunk size {value}: must be between {MIN_CHUNK_SIZE} and {MAX_CHUNK_SIZE} bytes"
    )]
    InvalidChunkSize {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// How a transfer run ended without a fault.
enum TransferEnd {
    Completed,
    Paused,
}

/// Streaming download engine.
///
/// One engine can run any number of transfers (sequentially or from
/// separate tasks); per-attempt state lives on the [`DownloadHandle`] and
/// [`ProgressStatus`], never on the engine.
#[derive(Debug)]
pub struct DownloadEngine {
    provider: ClientProvider,
    dispatch: DispatchEngine,
    chunk_size: usize,
    temp_dir: PathBuf,
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadEngine {
    /// Creates an engine with the shared transport client, the default
    /// chunk size, and the system temporary directory.
    #[must_use]
    pub fn new() -> Self {
        let provider = ClientProvider::default();
        Self {
            dispatch: DispatchEngine::new(provider.clone()),
            provider,
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Replaces the client acquisition strategy.
    #[must_use]
    pub fn with_provider(mut self, provider: ClientProvider) -> Self {
        self.dispatch = DispatchEngine::new(provider.clone());
        self.provider = provider;
        self
    }

    /// Sets the copy-loop chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidChunkSize`] if `size` is zero or above
    /// 1 MiB.
    pub fn with_chunk_size(mut self, size: usize) -> Result<Self, EngineError> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) {
            return Err(EngineError::InvalidChunkSize { value: size });
        }
        self.chunk_size = size;
        Ok(self)
    }

    /// Places temporary files in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Returns the configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Runs one download attempt for `handle`, reporting progress through
    /// `on_progress`.
    ///
    /// The callback fires after every chunk and exactly once with the
    /// terminal status (completed, failed, or cancelled); on a pause it
    /// fires with the last live status instead. Transfer faults are reported
    /// through the returned [`ProgressStatus`], not through `Err`.
    ///
    /// Re-invoking with a `Paused` handle resumes the transfer with a range
    /// request from the persisted offset.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::AttemptFinished`] if the handle already
    /// reached a terminal state; a new attempt requires a new handle.
    #[instrument(skip(self, handle, on_progress), fields(url = %handle.url()))]
    pub async fn download<F>(
        &self,
        handle: &DownloadHandle,
        mut on_progress: F,
    ) -> Result<ProgressStatus, DownloadError>
    where
        F: FnMut(&ProgressStatus),
    {
        if handle.state().is_terminal() {
            return Err(DownloadError::attempt_finished(handle.url().as_str()));
        }
        // A fresh run always starts live; pausing again is the caller's call.
        handle.resume();
        handle.set_state(DownloadState::Probing);

        info!("starting download attempt");
        let mut status = ProgressStatus::new();

        match self.transfer(handle, &mut status, &mut on_progress).await {
            Ok(TransferEnd::Completed | TransferEnd::Paused) => {}
            Err(fault) => {
                if let Some(path) = handle.temp_path() {
                    debug!(path = %path.display(), "removing partial file");
                    let _ = tokio::fs::remove_file(&path).await;
                }
                handle.clear_resume();
                handle.set_state(if fault.is_cancelled() {
                    DownloadState::Cancelled
                } else {
                    DownloadState::Failed
                });
                status.fail(fault);
                on_progress(&status);
            }
        }

        Ok(status)
    }

    /// Probes, streams, and finishes one transfer run.
    ///
    /// Returns `Err` on any fault, including observed cancellation; the
    /// caller owns cleanup and terminal bookkeeping for those.
    async fn transfer<F>(
        &self,
        handle: &DownloadHandle,
        status: &mut ProgressStatus,
        on_progress: &mut F,
    ) -> Result<TransferEnd, DownloadError>
    where
        F: FnMut(&ProgressStatus),
    {
        let url = handle.url().clone();

        // Probe for the payload size. A failed probe degrades to -1
        // (indeterminate) rather than failing the attempt.
        let total = self.dispatch.url_content_length(url.as_str()).await;
        status.set_total_bytes(total);
        debug!(total, "probe finished");

        // Resume only when a paused attempt left a partial file behind.
        let offset = handle.resume_offset();
        let prior_temp = handle.temp_path();
        let resuming = offset > 0 && prior_temp.as_ref().is_some_and(|p| p.exists());

        let temp_path = match prior_temp {
            Some(path) if resuming => path,
            _ => {
                let path = allocate_temp_file(&self.temp_dir, &url)?;
                handle.set_temp_path(path.clone());
                path
            }
        };

        // Open the source stream.
        let client = self.provider.client();
        let mut request = client.get(url.clone());
        if resuming {
            request = request.header(RANGE, format!("bytes={offset}-"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;
        let response_status = response.status();
        if !response_status.is_success() {
            return Err(DownloadError::http_status(
                url.as_str(),
                response_status.as_u16(),
            ));
        }
        // A server that ignores the range request answers 200 with the full
        // body; the transfer then restarts from zero.
        let resumed = resuming && response_status.as_u16() == 206;

        let file = if resumed {
            tokio::fs::OpenOptions::new()
                .append(true)
                .open(&temp_path)
                .await
        } else {
            File::create(&temp_path).await
        }
        .map_err(|e| DownloadError::io(temp_path.clone(), e))?;
        let mut writer = BufWriter::new(file);

        if resumed {
            status.add_transferred(offset);
            info!(offset, "resuming paused download");
        }

        handle.set_state(DownloadState::Streaming);
        let mut reader = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed()
            .into_async_read();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            // Flags are only observed here, at chunk boundaries; an
            // in-flight read finishes first, which bounds the latency of
            // both signals by one chunk.
            if handle.is_cancelled() {
                let _ = writer.flush().await;
                return Err(DownloadError::cancelled(url.as_str()));
            }
            if handle.is_paused() {
                writer
                    .flush()
                    .await
                    .map_err(|e| DownloadError::io(temp_path.clone(), e))?;
                handle.set_resume_offset(status.transferred_bytes());
                handle.set_state(DownloadState::Paused);
                info!(offset = status.transferred_bytes(), "download paused");
                on_progress(status);
                return Ok(TransferEnd::Paused);
            }

            let read = read_full_chunk(&mut reader, &mut buffer)
                .await
                .map_err(|e| DownloadError::stream(url.as_str(), e))?;

            if read == 0 {
                writer
                    .flush()
                    .await
                    .map_err(|e| DownloadError::io(temp_path.clone(), e))?;
                status.set_output_file(temp_path.clone());
                handle.clear_resume();
                handle.set_state(DownloadState::Completed);
                info!(
                    bytes = status.transferred_bytes(),
                    path = %temp_path.display(),
                    "download complete"
                );
                on_progress(status);
                return Ok(TransferEnd::Completed);
            }

            writer
                .write_all(&buffer[..read])
                .await
                .map_err(|e| DownloadError::io(temp_path.clone(), e))?;
            status.add_transferred(read as u64);
            on_progress(status);
        }
    }
}

/// Reads until the buffer is full or the stream ends.
///
/// The transport yields frames of arbitrary size; accumulating full chunks
/// keeps the per-chunk progress arithmetic independent of framing.
async fn read_full_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let read = reader.read(&mut buffer[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

/// Allocates a unique `<segment>.<hex-timestamp>.….tmpdownload` file.
fn allocate_temp_file(dir: &Path, url: &Url) -> Result<PathBuf, DownloadError> {
    let prefix = format!("{}.{}.", last_path_segment(url), hex_timestamp());
    let temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| DownloadError::io(dir.to_path_buf(), e))?;
    let (_file, path) = temp
        .keep()
        .map_err(|e| DownloadError::io(dir.to_path_buf(), e.error))?;
    debug!(path = %path.display(), "allocated temporary file");
    Ok(path)
}

/// Last non-empty path segment of the URL, or a generic fallback.
fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// Current time in milliseconds since the epoch, in lowercase hex.
fn hex_timestamp() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{millis:x}")
}
