//! Request dispatch: one logical send, three invocation styles.
//!
//! The engine executes a [`RequestDescriptor`] and normalizes the result
//! into a [`ResponseOutcome`], whichever style the caller picked:
//!
//! - [`request_sync`](DispatchEngine::request_sync) blocks the calling
//!   thread,
//! - [`request_callback`](DispatchEngine::request_callback) schedules the
//!   send on the background pool and invokes a single-shot callback,
//! - [`request_async`](DispatchEngine::request_async) awaits the same
//!   background send.
//!
//! Transport faults (DNS, refused connections, timeouts) never escape as
//! errors or panics from any style; they become failure outcomes.

use reqwest::header::HeaderMap;
use tracing::{debug, instrument, warn};

use super::client::ClientProvider;
use super::descriptor::RequestDescriptor;
use super::error::RequestError;
use super::headers;
use super::outcome::ResponseOutcome;
use crate::runtime;

/// Status a probe must observe to report a URL as existing.
const PROBE_OK: i32 = 200;

/// Executes requests through one of three concurrency styles.
#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    provider: ClientProvider,
}

impl DispatchEngine {
    /// Creates an engine using the given client acquisition strategy.
    #[must_use]
    pub fn new(provider: ClientProvider) -> Self {
        Self { provider }
    }

    /// Executes the request in place on the current async context.
    ///
    /// This is the shared send path behind all three styles; unlike
    /// [`request_async`](Self::request_async) it is not detached, so
    /// dropping the returned future aborts the transfer.
    #[instrument(level = "debug", skip(self, descriptor), fields(url = %descriptor.url(), method = %descriptor.method()))]
    pub async fn send(&self, descriptor: RequestDescriptor) -> ResponseOutcome {
        execute(self.provider.clone(), descriptor).await
    }

    /// Executes the request synchronously on the calling thread.
    ///
    /// Blocks until the transfer completes or faults; faults are returned as
    /// failure outcomes, never raised.
    ///
    /// # Panics
    ///
    /// Panics if called from inside an async runtime context. Use
    /// [`request_async`](Self::request_async) there instead.
    #[must_use]
    pub fn request_sync(&self, descriptor: RequestDescriptor) -> ResponseOutcome {
        runtime::shared().block_on(self.send(descriptor))
    }

    /// Schedules the request on the background pool and invokes `on_result`
    /// exactly once with the outcome.
    ///
    /// The calling thread is not blocked. No ordering is guaranteed between
    /// concurrently issued callback requests.
    pub fn request_callback<F>(&self, descriptor: RequestDescriptor, on_result: F)
    where
        F: FnOnce(ResponseOutcome) + Send + 'static,
    {
        let provider = self.provider.clone();
        runtime::shared().spawn(async move {
            let outcome = execute(provider, descriptor).await;
            on_result(outcome);
        });
    }

    /// Executes the request on the background pool and awaits the outcome.
    ///
    /// The send runs as a detached task: cancelling the returned future only
    /// detaches the waiter and does not abort the in-flight transfer. This
    /// is a documented limitation, not incidental behavior; true end-to-end
    /// cancellation would need a token threaded into the transport layer.
    #[must_use = "the outcome reports whether the request succeeded"]
    pub async fn request_async(&self, descriptor: RequestDescriptor) -> ResponseOutcome {
        let url = descriptor.url().clone();
        let request_headers = descriptor.request_headers();
        let provider = self.provider.clone();

        let task = runtime::shared().spawn(execute(provider, descriptor));
        match task.await {
            Ok(outcome) => outcome,
            // The task itself never returns an error; a join error means it
            // panicked. Normalize even that into a failure outcome.
            Err(join_error) => {
                warn!(url = %url, error = %join_error, "background request task failed");
                ResponseOutcome::failure(
                    url,
                    request_headers,
                    format!("background request task failed: {join_error}"),
                )
            }
        }
    }

    /// Returns true if a header probe of `url` reports HTTP 200.
    ///
    /// Construction errors and transport faults are swallowed into `false`;
    /// this is a yes/no question by contract.
    #[instrument(level = "debug", skip(self))]
    pub async fn url_exists(&self, url: &str) -> bool {
        let Ok(descriptor) = RequestDescriptor::probe(url) else {
            return false;
        };
        self.send(descriptor).await.status() == PROBE_OK
    }

    /// Runs `action` if a header probe of `url` reports HTTP 200.
    ///
    /// # Errors
    ///
    /// Returns the descriptor construction error, or
    /// [`RequestError::ProbeStatus`] carrying the status the probe observed
    /// (`-1` if the probe itself faulted).
    pub async fn url_exists_then<T, F>(&self, url: &str, action: F) -> Result<T, RequestError>
    where
        F: FnOnce() -> T,
    {
        let descriptor = RequestDescriptor::probe(url)?;
        let status = self.send(descriptor).await.status();
        if status == PROBE_OK {
            Ok(action())
        } else {
            Err(RequestError::probe_status(url, status))
        }
    }

    /// Returns the header set from a probe of `url`, without transferring
    /// the payload.
    ///
    /// `None` means the probe faulted at the transport level. A probe that
    /// reaches the server returns its headers whatever the status; callers
    /// wanting a guarantee should confirm [`url_exists`](Self::url_exists)
    /// first.
    pub async fn url_headers(&self, url: &str) -> Option<HeaderMap> {
        let descriptor = RequestDescriptor::probe(url).ok()?;
        match self.send(descriptor).await {
            ResponseOutcome::Success { headers, .. } => Some(headers),
            ResponseOutcome::Failure { .. } => None,
        }
    }

    /// Returns the resource size advertised by a probe of `url`, in bytes.
    ///
    /// Returns `-1` when the probe fails or the response lacks a parsable
    /// `content-length` header.
    pub async fn url_content_length(&self, url: &str) -> i64 {
        match self.url_headers(url).await {
            Some(response_headers) => headers::content_length(&response_headers),
            None => -1,
        }
    }
}

/// Builds and sends one transport request, normalizing every fault.
async fn execute(provider: ClientProvider, descriptor: RequestDescriptor) -> ResponseOutcome {
    let client = provider.client();
    let url = descriptor.url().clone();
    let request_headers = descriptor.request_headers();

    let request = match descriptor.build_transport_request(&client) {
        Ok(request) => request,
        Err(error) => {
            debug!(url = %url, error = %error, "request construction failed");
            return ResponseOutcome::failure(url, request_headers, error.to_string());
        }
    };

    match client.execute(request).await {
        Ok(response) => match ResponseOutcome::from_response(url.clone(), response).await {
            Ok(outcome) => outcome,
            Err(error) => {
                debug!(url = %url, error = %error, "reading response body failed");
                ResponseOutcome::failure(url, request_headers, error.to_string())
            }
        },
        Err(error) => {
            debug!(url = %url, error = %error, "transport fault");
            ResponseOutcome::failure(url, request_headers, error.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::Method;

    #[tokio::test]
    async fn test_send_returns_response_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let engine = DispatchEngine::default();
        let descriptor =
            RequestDescriptor::new(&format!("{}/data", server.uri()), Method::Get).unwrap();
        let outcome = engine.send(descriptor).await;

        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.body(), "hello");
    }

    #[tokio::test]
    async fn test_error_status_is_still_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let engine = DispatchEngine::default();
        let descriptor =
            RequestDescriptor::new(&format!("{}/missing", server.uri()), Method::Get).unwrap();
        let outcome = engine.send(descriptor).await;

        assert!(outcome.is_success(), "404 is a response, not a fault");
        assert_eq!(outcome.status(), 404);
    }

    #[tokio::test]
    async fn test_unreachable_host_becomes_failure_outcome() {
        // Port 1 on localhost: connection refused, no response.
        let engine = DispatchEngine::default();
        let descriptor = RequestDescriptor::new("http://127.0.0.1:1/x", Method::Get)
            .unwrap()
            .header("x-origin", "test");
        let outcome = engine.send(descriptor).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.status(), crate::http::FAILURE_STATUS);
        assert!(!outcome.body().is_empty(), "failure must carry a message");
        assert_eq!(outcome.headers().get("x-origin").unwrap(), "test");
    }

    #[tokio::test]
    async fn test_request_async_resolves_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let engine = DispatchEngine::default();
        let descriptor =
            RequestDescriptor::new(&format!("{}/submit", server.uri()), Method::Post).unwrap();
        let outcome = engine.request_async(descriptor).await;

        assert_eq!(outcome.status(), 201);
    }

    #[tokio::test]
    async fn test_request_callback_invoked_once_with_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("callback body"))
            .mount(&server)
            .await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let engine = DispatchEngine::default();
        let descriptor =
            RequestDescriptor::new(&format!("{}/cb", server.uri()), Method::Get).unwrap();

        engine.request_callback(descriptor, move |outcome| {
            let _ = tx.send(outcome);
        });

        let outcome = rx.await.unwrap();
        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.body(), "callback body");
    }

    #[tokio::test]
    async fn test_url_exists_true_false_and_fault() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let engine = DispatchEngine::default();
        assert!(engine.url_exists(&format!("{}/present", server.uri())).await);
        // Unmatched path: mock server answers 404.
        assert!(!engine.url_exists(&format!("{}/absent", server.uri())).await);
        assert!(!engine.url_exists("http://127.0.0.1:1/x").await);
        assert!(!engine.url_exists("ftp://example.com/x").await);
    }

    #[tokio::test]
    async fn test_url_exists_then_runs_action_only_on_ok() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let engine = DispatchEngine::default();
        let ran = engine
            .url_exists_then(&format!("{}/present", server.uri()), || "ran")
            .await;
        assert_eq!(ran.unwrap(), "ran");

        let missing = engine
            .url_exists_then(&format!("{}/absent", server.uri()), || "ran")
            .await;
        assert!(matches!(
            missing,
            Err(RequestError::ProbeStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_url_content_length() {
        let server = MockServer::start().await;
        // The server computes content-length from the body; HEAD responses
        // carry the header without the payload.
        Mock::given(method("HEAD"))
            .and(path("/sized"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1234]))
            .mount(&server)
            .await;
        let engine = DispatchEngine::default();
        assert_eq!(
            engine
                .url_content_length(&format!("{}/sized", server.uri()))
                .await,
            1234
        );
        assert_eq!(engine.url_content_length("http://127.0.0.1:1/x").await, -1);
    }
}
