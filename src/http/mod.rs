//! HTTP request layer: descriptors, dispatch styles, probes, outcomes.
//!
//! One logical request operation is exposed through three invocation styles
//! with identical semantics and a shared normalized result shape:
//!
//! - blocking: [`request_sync`]
//! - callback: [`request_callback`]
//! - async: [`request_async`]
//!
//! # Example
//!
//! ```no_run
//! use netkit::http::{Method, RequestDescriptor, request_sync};
//!
//! # fn example() -> Result<(), netkit::http::RequestError> {
//! let descriptor = RequestDescriptor::new("https://example.com/api/login", Method::Post)?
//!     .form([("user", "frog"), ("pass", "dream")]);
//! let outcome = request_sync(descriptor);
//! if outcome.is_failure() {
//!     eprintln!("request failed: {}", outcome.body());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod descriptor;
mod dispatch;
mod error;
pub mod headers;
pub mod json;
mod method;
mod multipart;
mod outcome;

use std::sync::OnceLock;

use reqwest::header::HeaderMap;

pub use client::ClientProvider;
pub use descriptor::RequestDescriptor;
pub use dispatch::DispatchEngine;
pub use error::{RequestError, parse_url};
pub use headers::flatten_headers;
pub use method::Method;
pub use multipart::MultipartForm;
pub use outcome::{FAILURE_STATUS, ResponseOutcome};

static DEFAULT_ENGINE: OnceLock<DispatchEngine> = OnceLock::new();

/// Returns the default engine: shared transport client, background pool.
fn default_engine() -> &'static DispatchEngine {
    DEFAULT_ENGINE.get_or_init(DispatchEngine::default)
}

/// Executes a request synchronously on the calling thread.
///
/// See [`DispatchEngine::request_sync`].
///
/// # Panics
///
/// Panics if called from inside an async runtime context.
#[must_use]
pub fn request_sync(descriptor: RequestDescriptor) -> ResponseOutcome {
    default_engine().request_sync(descriptor)
}

/// Schedules a request on the background pool; `on_result` is invoked
/// exactly once with the outcome.
///
/// See [`DispatchEngine::request_callback`].
pub fn request_callback<F>(descriptor: RequestDescriptor, on_result: F)
where
    F: FnOnce(ResponseOutcome) + Send + 'static,
{
    default_engine().request_callback(descriptor, on_result);
}

/// Executes a request on the background pool and awaits the outcome.
///
/// See [`DispatchEngine::request_async`].
#[must_use = "the outcome reports whether the request succeeded"]
pub async fn request_async(descriptor: RequestDescriptor) -> ResponseOutcome {
    default_engine().request_async(descriptor).await
}

/// Returns true if a header probe of `url` reports HTTP 200.
pub async fn url_exists(url: &str) -> bool {
    default_engine().url_exists(url).await
}

/// Runs `action` if a header probe of `url` reports HTTP 200.
///
/// # Errors
///
/// See [`DispatchEngine::url_exists_then`].
pub async fn url_exists_then<T, F>(url: &str, action: F) -> Result<T, RequestError>
where
    F: FnOnce() -> T,
{
    default_engine().url_exists_then(url, action).await
}

/// Returns the header set from a probe of `url`, or `None` on a transport
/// fault.
pub async fn url_headers(url: &str) -> Option<HeaderMap> {
    default_engine().url_headers(url).await
}

/// Returns the probed resource size in bytes, or `-1` if unknown.
pub async fn url_content_length(url: &str) -> i64 {
    default_engine().url_content_length(url).await
}
