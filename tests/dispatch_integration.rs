//! Integration tests for the request dispatch engine.
//!
//! These tests verify that the three invocation styles produce equivalent
//! normalized outcomes against mock HTTP servers, including on the failure
//! path.

use netkit::{Method, MultipartForm, RequestDescriptor, ResponseOutcome};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn descriptor(url: &str, request_method: Method) -> RequestDescriptor {
    RequestDescriptor::new(url, request_method).expect("valid test URL")
}

/// Runs the blocking style off the async test thread.
async fn run_sync(descriptor: RequestDescriptor) -> ResponseOutcome {
    tokio::task::spawn_blocking(move || netkit::request_sync(descriptor))
        .await
        .expect("sync dispatch must not panic")
}

/// Runs the callback style and waits for its single invocation.
async fn run_callback(descriptor: RequestDescriptor) -> ResponseOutcome {
    let (tx, rx) = tokio::sync::oneshot::channel();
    netkit::request_callback(descriptor, move |outcome| {
        let _ = tx.send(outcome);
    });
    rx.await.expect("callback must fire exactly once")
}

#[tokio::test]
async fn test_all_three_styles_yield_equivalent_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-resource-version", "7")
                .set_body_string("shared payload"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/resource", server.uri());

    let sync_outcome = run_sync(descriptor(&url, Method::Get)).await;
    let callback_outcome = run_callback(descriptor(&url, Method::Get)).await;
    let async_outcome = netkit::request_async(descriptor(&url, Method::Get)).await;

    for outcome in [&sync_outcome, &callback_outcome, &async_outcome] {
        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.body(), "shared payload");
        assert_eq!(
            outcome.headers().get("x-resource-version").unwrap(),
            "7",
            "response headers must survive normalization"
        );
    }
}

#[tokio::test]
async fn test_unreachable_host_fails_uniformly_across_styles() {
    // Nothing listens on port 1; the connection is refused.
    let url = "http://127.0.0.1:1/anything";

    let sync_outcome = run_sync(descriptor(url, Method::Get)).await;
    let callback_outcome = run_callback(descriptor(url, Method::Get)).await;
    let async_outcome = netkit::request_async(descriptor(url, Method::Get)).await;

    for outcome in [&sync_outcome, &callback_outcome, &async_outcome] {
        assert!(outcome.is_failure(), "expected failure, got {outcome:?}");
        assert_eq!(outcome.status(), netkit::FAILURE_STATUS);
        assert!(
            !outcome.body().is_empty(),
            "failure must carry an error message"
        );
    }
}

#[tokio::test]
async fn test_post_sends_form_encoded_body() {
    let server = MockServer::start().await;
    // BTreeMap ordering: keys serialize alphabetically.
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=frog%20dream&tag=a%26b"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = netkit::request_async(
        descriptor(&format!("{}/form", server.uri()), Method::Post)
            .form([("name", "frog dream"), ("tag", "a&b")]),
    )
    .await;

    assert_eq!(outcome.status(), 200, "body/content-type did not match");
}

#[tokio::test]
async fn test_patch_sends_form_body_like_post() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/entity"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("field=updated"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = netkit::request_async(
        descriptor(&format!("{}/entity", server.uri()), Method::Patch)
            .form([("field", "updated")]),
    )
    .await;

    assert_eq!(outcome.status(), 200);
}

#[tokio::test]
async fn test_get_ignores_body_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = netkit::request_async(
        descriptor(&format!("{}/plain", server.uri()), Method::Get).form([("dropped", "yes")]),
    )
    .await;

    assert_eq!(outcome.status(), 200);
}

#[tokio::test]
async fn test_delete_dispatches_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/entity/4"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let outcome =
        netkit::request_async(descriptor(&format!("{}/entity/4", server.uri()), Method::Delete))
            .await;

    assert_eq!(outcome.status(), 204);
}

#[tokio::test]
async fn test_multipart_body_reaches_server() {
    /// Matches multipart requests carrying both expected parts.
    struct MultipartMatcher;

    impl wiremock::Match for MultipartMatcher {
        fn matches(&self, request: &wiremock::Request) -> bool {
            let content_type = request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if !content_type.starts_with("multipart/form-data; boundary=") {
                return false;
            }
            let body = String::from_utf8_lossy(&request.body);
            body.contains("monthly report")
                && body.contains("report.txt")
                && body.contains("file payload")
        }
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(MultipartMatcher)
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let form = MultipartForm::new()
        .text("description", "monthly report")
        .file_bytes(
            "report",
            "report.txt",
            b"file payload".to_vec(),
            Some("text/plain"),
        );
    let outcome = netkit::request_async(
        descriptor(&format!("{}/upload", server.uri()), Method::Post).multipart(form),
    )
    .await;

    assert_eq!(outcome.status(), 201, "multipart body did not match");
}

#[tokio::test]
async fn test_invalid_scheme_fails_before_any_network_call() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would be answered 404 and recorded.

    let result = RequestDescriptor::new(&server.uri().replace("http://", "ftp://"), Method::Get);
    assert!(result.is_err());

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.is_empty(),
        "scheme validation must not touch the network"
    );
}

#[tokio::test]
async fn test_json_body_accessors_on_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"name": "netkit", "ok": true}"#),
        )
        .mount(&server)
        .await;

    let outcome =
        netkit::request_async(descriptor(&format!("{}/json", server.uri()), Method::Get)).await;

    assert!(outcome.is_valid_json());
    let value = outcome.json_value().unwrap();
    assert_eq!(value["name"], "netkit");
    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_probe_helpers() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/present"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
        .mount(&server)
        .await;

    let present = format!("{}/present", server.uri());
    assert!(netkit::url_exists(&present).await);
    assert_eq!(netkit::url_content_length(&present).await, 2048);

    let headers = netkit::url_headers(&present).await.unwrap();
    assert_eq!(
        netkit::flatten_headers(&headers).get("content-length").unwrap(),
        "2048"
    );

    // Unmatched path: the mock server answers 404, so the probe says no.
    assert!(!netkit::url_exists(&format!("{}/absent", server.uri())).await);
    // Transport fault: probe degrades to false / -1 / None.
    assert!(!netkit::url_exists("http://127.0.0.1:1/x").await);
    assert_eq!(netkit::url_content_length("http://127.0.0.1:1/x").await, -1);
    assert!(netkit::url_headers("http://127.0.0.1:1/x").await.is_none());
}
