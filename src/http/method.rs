//! Request method types.

use std::fmt;

/// HTTP request methods supported by the dispatch engine.
///
/// Methods that accept a body ([`Method::accepts_body`]) have their body map
/// form-encoded and a `Content-Type: application/x-www-form-urlencoded`
/// header attached at dispatch time; the rest are sent without a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Retrieve a resource.
    Get,
    /// Partially update a resource.
    Patch,
    /// Delete a resource.
    Delete,
    /// Replace a resource.
    Put,
    /// Create or submit a resource.
    Post,
}

impl Method {
    /// Returns true if this method carries a request body.
    ///
    /// PATCH carries a body like POST and PUT. An earlier revision of this
    /// library dispatched PATCH as a bodyless GET; that was an oversight,
    /// not a protocol requirement, and is not preserved here.
    #[must_use]
    pub fn accepts_body(self) -> bool {
        matches!(self, Self::Patch | Self::Put | Self::Post)
    }

    /// Returns the canonical upper-case method token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Put => "PUT",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
        }
    }
}
