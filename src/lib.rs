//! netkit — client-side HTTP utility library.
//!
//! One logical request operation exposed through three invocation styles
//! (blocking, callback, async) with uniform outcome semantics, plus a
//! streaming file-download engine with progress reporting and cooperative
//! cancellation.
//!
//! # Architecture
//!
//! - [`http`] - request descriptors, the dispatch engine, probe helpers
//! - [`download`] - the streaming download engine, handles, progress
//!
//! Transport and file-system faults never escape these APIs as raised
//! errors: dispatch faults become [`ResponseOutcome::Failure`] values and
//! download faults land in the terminal [`ProgressStatus`]. The only
//! synchronous failures are URL construction errors ([`RequestError`]).

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod http;
mod runtime;

// Re-export commonly used types
pub use download::{
    DEFAULT_CHUNK_SIZE, DownloadEngine, DownloadError, DownloadHandle, DownloadState,
    EngineError, ProgressStatus, start_download,
};
pub use http::{
    ClientProvider, DispatchEngine, FAILURE_STATUS, Method, MultipartForm, RequestDescriptor,
    RequestError, ResponseOutcome, flatten_headers, parse_url, request_async, request_callback,
    request_sync, url_content_length, url_exists, url_exists_then, url_headers,
};
