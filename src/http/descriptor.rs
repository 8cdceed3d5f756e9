//! Immutable request descriptors.
//!
//! A descriptor is the fully-resolved representation of one request: URL
//! (scheme-validated at construction), method, raw header pairs, and an
//! optional body. It is built once, handed to the dispatch engine, and
//! consumed by the transport layer.

use std::collections::BTreeMap;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use url::Url;

use super::error::{RequestError, parse_url};
use super::headers::header_map_from_pairs;
use super::method::Method;
use super::multipart::MultipartForm;

/// Content type attached to form-encoded request bodies.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An immutable, transport-ready description of a single HTTP request.
///
/// Construction validates the URL scheme (`http`/`https` only) and never
/// touches the network. Headers are kept as raw name/value pairs and only
/// interpreted by the transport layer at dispatch time.
///
/// # Example
///
/// ```
/// use netkit::http::{Method, RequestDescriptor};
///
/// # fn example() -> Result<(), netkit::http::RequestError> {
/// let descriptor = RequestDescriptor::new("https://example.com/api", Method::Post)?
///     .header("accept", "application/json")
///     .form([("user", "frog"), ("active", "yes")]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    url: Url,
    method: Method,
    probe: bool,
    headers: Vec<(String, String)>,
    form: BTreeMap<String, String>,
    multipart: Option<MultipartForm>,
}

impl RequestDescriptor {
    /// Creates a descriptor for the given URL and method.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] or [`RequestError::InvalidScheme`]
    /// if the URL is unparsable or not http/https.
    pub fn new(url: &str, method: Method) -> Result<Self, RequestError> {
        Ok(Self {
            url: parse_url(url)?,
            method,
            probe: false,
            headers: Vec::new(),
            form: BTreeMap::new(),
            multipart: None,
        })
    }

    /// Creates a header-probe descriptor: a HEAD request with no body.
    ///
    /// Probes check existence or read metadata (e.g. content length) without
    /// transferring the payload.
    ///
    /// # Errors
    ///
    /// Returns the same construction errors as [`RequestDescriptor::new`].
    pub fn probe(url: &str) -> Result<Self, RequestError> {
        let mut descriptor = Self::new(url, Method::Get)?;
        descriptor.probe = true;
        Ok(descriptor)
    }

    /// Appends one raw header pair.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends raw header pairs.
    #[must_use]
    pub fn headers<N, V>(mut self, pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(pairs.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// Sets the form body map.
    ///
    /// The map is serialized as percent-encoded `key=value` pairs joined by
    /// `&` (deterministic key order) and only attached for body-accepting
    /// methods; GET and DELETE descriptors ignore it.
    #[must_use]
    pub fn form<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a multipart body, replacing any form map for body purposes.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.multipart = Some(form);
        self
    }

    /// Returns the validated target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns true if this is a header-probe (HEAD) descriptor.
    #[must_use]
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    /// Copies the raw header pairs into a header map, skipping invalid pairs.
    ///
    /// Failure outcomes carry these headers so callers can still identify the
    /// originating request.
    pub(crate) fn request_headers(&self) -> HeaderMap {
        header_map_from_pairs(&self.headers)
    }

    /// Builds the transport-level request.
    ///
    /// Body-accepting methods get the form-encoded body (empty map encodes
    /// to an empty body) and the form content type, unless a multipart body
    /// was set, which carries its own boundary content type.
    pub(crate) fn build_transport_request(
        &self,
        client: &Client,
    ) -> Result<reqwest::Request, reqwest::Error> {
        let method = if self.probe {
            reqwest::Method::HEAD
        } else {
            self.method.into()
        };
        let mut builder = client.request(method, self.url.clone());

        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !self.probe && self.method.accepts_body() {
            if let Some(multipart) = &self.multipart {
                builder = builder.multipart(multipart.to_form()?);
            } else {
                builder = builder
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(form_encode(&self.form));
            }
        }

        builder.build()
    }
}

/// Serializes a body map as percent-encoded `key=value` pairs joined by `&`.
pub(crate) fn form_encode(map: &BTreeMap<String, String>) -> String {
    let mut encoded = String::new();
    for (key, value) in map {
        if !encoded.is_empty() {
            encoded.push('&');
        }
        encoded.push_str(&urlencoding::encode(key));
        encoded.push('=');
        encoded.push_str(&urlencoding::encode(value));
    }
    encoded
}
