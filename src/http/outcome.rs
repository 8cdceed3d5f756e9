//! Normalized request outcomes.
//!
//! Every dispatch style resolves to a [`ResponseOutcome`]: a real response
//! (any status, including 4xx/5xx) or a transport failure folded into a
//! value. Callers branch on status fields; they never catch a propagated
//! fault from the dispatch APIs.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use super::json;

/// Sentinel status reported by failure outcomes.
///
/// Chosen to be distinct from every real protocol status code. An earlier
/// revision reported 404 from one call path and -1 from another for the same
/// class of failure; the sentinel is now uniformly -1.
pub const FAILURE_STATUS: i32 = -1;

/// The normalized result of one dispatched request.
#[derive(Debug)]
pub enum ResponseOutcome {
    /// The transport produced a response. Carries every status the server
    /// returned, including client and server errors.
    Success {
        /// The request URL.
        url: Url,
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HeaderMap,
        /// Response body text.
        body: String,
    },
    /// The transport faulted (DNS, connection, timeout, malformed request).
    /// No response exists; the headers are copied from the request so the
    /// origin is still identifiable.
    Failure {
        /// The request URL.
        url: Url,
        /// Headers copied from the originating request.
        headers: HeaderMap,
        /// The fault's message, also exposed as the outcome body.
        message: String,
    },
}

impl ResponseOutcome {
    /// Returns the normalized status: the HTTP code for responses,
    /// [`FAILURE_STATUS`] for transport failures.
    #[must_use]
    pub fn status(&self) -> i32 {
        match self {
            Self::Success { status, .. } => i32::from(*status),
            Self::Failure { .. } => FAILURE_STATUS,
        }
    }

    /// Returns true if the transport produced a response (any status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true if the transport faulted.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Returns the request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    /// Returns the outcome headers: response headers for a response, the
    /// originating request's headers for a failure.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        match self {
            Self::Success { headers, .. } | Self::Failure { headers, .. } => headers,
        }
    }

    /// Returns the body text: the response body, or the fault message.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Success { body, .. } => body,
            Self::Failure { message, .. } => message,
        }
    }

    /// Returns true if the body parses as JSON.
    #[must_use]
    pub fn is_valid_json(&self) -> bool {
        json::is_valid_json(self.body().as_bytes())
    }

    /// Decodes the body as an untyped JSON value, or `None` if invalid.
    #[must_use]
    pub fn json_value(&self) -> Option<serde_json::Value> {
        json::decode_value(self.body().as_bytes())
    }

    /// Decodes the body into a typed value, or `None` if invalid.
    #[must_use]
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        json::decode(self.body().as_bytes())
    }

    /// Builds a failure outcome for a request that never produced a response.
    pub(crate) fn failure(url: Url, headers: HeaderMap, message: impl Into<String>) -> Self {
        Self::Failure {
            url,
            headers,
            message: message.into(),
        }
    }

    /// Consumes a transport response into a success outcome.
    ///
    /// Reading the body can itself fault mid-stream; the caller folds that
    /// error into a failure outcome.
    pub(crate) async fn from_response(
        url: Url,
        response: reqwest::Response,
    ) -> Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self::Success {
            url,
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn success(status: u16, body: &str) -> ResponseOutcome {
        ResponseOutcome::Success {
            url: Url::parse("https://example.com/a").unwrap(),
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_status_passthrough() {
        assert_eq!(success(200, "").status(), 200);
        assert_eq!(success(503, "").status(), 503);
        assert!(success(404, "").is_success());
    }

    #[test]
    fn test_failure_uses_sentinel_status() {
        let outcome = ResponseOutcome::failure(
            Url::parse("https://example.com/a").unwrap(),
            HeaderMap::new(),
            "connection refused",
        );
        assert_eq!(outcome.status(), FAILURE_STATUS);
        assert!(outcome.is_failure());
        assert_eq!(outcome.body(), "connection refused");
    }

    #[test]
    fn test_failure_keeps_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        let outcome = ResponseOutcome::failure(
            Url::parse("https://example.com/a").unwrap(),
            headers,
            "timed out",
        );
        assert_eq!(outcome.headers().get("x-api-key").unwrap(), "secret");
    }

    #[test]
    fn test_json_accessors() {
        let outcome = success(200, r#"{"id": 5}"#);
        assert!(outcome.is_valid_json());
        assert_eq!(outcome.json_value().unwrap()["id"], 5);

        #[derive(serde::Deserialize)]
        struct Payload {
            id: u32,
        }
        assert_eq!(outcome.json::<Payload>().unwrap().id, 5);

        assert!(!success(200, "<html></html>").is_valid_json());
    }

    #[test]
    fn test_sentinel_is_not_a_real_status_code() {
        assert!(FAILURE_STATUS < 100, "sentinel must not collide with HTTP codes");
    }
}
