//! Error types for request construction and probes.
//!
//! Transport-level faults (DNS, connection, timeout) are never surfaced
//! through these types; the dispatch engine converts them into
//! [`ResponseOutcome::Failure`](super::ResponseOutcome) values instead.
//! `RequestError` covers only what fails before the network is touched.

use thiserror::Error;
use url::Url;

/// Errors raised while constructing a request descriptor or probing a URL.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The URL string could not be parsed at all.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The unparsable URL string.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The URL parsed but carries a scheme other than http/https.
    #[error("\"{url}\" has unsupported scheme \"{scheme}\": only http and https are allowed")]
    InvalidScheme {
        /// The offending URL.
        url: String,
        /// The rejected scheme.
        scheme: String,
    },

    /// A URL probe completed but did not report the resource as available.
    ///
    /// The status is the normalized probe status; `-1` means the probe
    /// itself failed at the transport level.
    #[error("probe of {url} failed with status {status}")]
    ProbeStatus {
        /// The probed URL.
        url: String,
        /// The normalized status observed by the probe.
        status: i32,
    },
}

impl RequestError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Creates an unsupported scheme error.
    pub fn invalid_scheme(url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::InvalidScheme {
            url: url.into(),
            scheme: scheme.into(),
        }
    }

    /// Creates a probe status error.
    pub fn probe_status(url: impl Into<String>, status: i32) -> Self {
        Self::ProbeStatus {
            url: url.into(),
            status,
        }
    }
}

/// Parses a URL string and validates its scheme.
///
/// Only `http` and `https` URLs are accepted; any other scheme fails
/// synchronously, before any network activity.
///
/// # Errors
///
/// Returns [`RequestError::InvalidUrl`] for unparsable input and
/// [`RequestError::InvalidScheme`] for parsable URLs with a different scheme.
pub fn parse_url(url: &str) -> Result<Url, RequestError> {
    let parsed = Url::parse(url).map_err(|source| RequestError::invalid_url(url, source))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(RequestError::invalid_scheme(url, other)),
    }
}
