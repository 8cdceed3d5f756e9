//! Progress reporting for in-flight downloads.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::debug;

use super::error::DownloadError;

/// Progress snapshot for one download attempt.
///
/// One instance exists per attempt. The engine mutates it in place on every
/// chunk and hands it to the progress callback by reference, so callers must
/// not assume the values are stable between invocations; copy out what they
/// need. Callers wanting coarse updates typically de-duplicate by
/// [`rounded_percentage`](Self::rounded_percentage).
#[derive(Debug, Serialize)]
pub struct ProgressStatus {
    total_bytes: i64,
    transferred_bytes: u64,
    output_file: Option<PathBuf>,
    has_error: bool,
    #[serde(serialize_with = "serialize_error_message")]
    error: Option<DownloadError>,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStatus {
    /// Creates a fresh status: unknown size, nothing transferred.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_bytes: -1,
            transferred_bytes: 0,
            output_file: None,
            has_error: false,
            error: None,
        }
    }

    /// Total size in bytes, or `-1` when the server did not advertise one.
    #[must_use]
    pub fn total_bytes(&self) -> i64 {
        self.total_bytes
    }

    /// Bytes transferred so far. Monotonically non-decreasing within one
    /// attempt.
    #[must_use]
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    /// Path of the finished temporary file. Set only on completion.
    #[must_use]
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// True once the attempt terminated with a fault or cancellation.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// The captured fault, if the attempt failed or was cancelled.
    #[must_use]
    pub fn error(&self) -> Option<&DownloadError> {
        self.error.as_ref()
    }

    /// True when the total size is unknown.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        self.total_bytes == -1
    }

    /// Completion percentage, or exactly `-1.0` when indeterminate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f32 {
        if self.is_indeterminate() {
            -1.0
        } else {
            self.transferred_bytes as f32 * 100.0 / self.total_bytes as f32
        }
    }

    /// [`percentage`](Self::percentage) rounded to the nearest integer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_percentage(&self) -> i32 {
        self.percentage().round() as i32
    }

    /// Moves the finished output file to `dest`.
    ///
    /// The engine leaves the completed file at its temporary path; relocation
    /// to the final destination is the caller's explicit step. Falls back to
    /// copy-and-delete when a plain rename crosses file systems.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Incomplete`] if the attempt has not produced
    /// an output file, or [`DownloadError::Io`] if the move fails.
    pub fn move_to(&self, dest: impl AsRef<Path>) -> Result<PathBuf, DownloadError> {
        let dest = dest.as_ref();
        let source = self.output_file.as_deref().ok_or(DownloadError::Incomplete)?;

        match std::fs::rename(source, dest) {
            Ok(()) => Ok(dest.to_path_buf()),
            Err(rename_error) => {
                debug!(
                    source = %source.display(),
                    dest = %dest.display(),
                    error = %rename_error,
                    "rename failed, retrying as copy"
                );
                std::fs::copy(source, dest)
                    .and_then(|_| std::fs::remove_file(source))
                    .map_err(|e| DownloadError::io(dest.to_path_buf(), e))?;
                Ok(dest.to_path_buf())
            }
        }
    }

    pub(crate) fn set_total_bytes(&mut self, total: i64) {
        self.total_bytes = total;
    }

    pub(crate) fn add_transferred(&mut self, bytes: u64) {
        self.transferred_bytes += bytes;
    }

    pub(crate) fn set_output_file(&mut self, path: PathBuf) {
        self.output_file = Some(path);
    }

    pub(crate) fn fail(&mut self, error: DownloadError) {
        self.has_error = true;
        self.error = Some(error);
    }
}

/// Serializes the captured error as its message text.
fn serialize_error_message<S: Serializer>(
    error: &Option<DownloadError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
