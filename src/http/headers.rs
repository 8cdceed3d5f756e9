//! Header map helpers: flattening and content-length extraction.

use std::collections::HashMap;

use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

/// Flattens a header map into a plain string map.
///
/// Multi-valued headers are joined with `", "` in insertion order, matching
/// the comma-combining rule for repeated HTTP header fields. Values that are
/// not valid UTF-8 are skipped.
#[must_use]
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat: HashMap<String, String> = HashMap::new();

    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            debug!(header = %name, "skipping non-UTF-8 header value");
            continue;
        };
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    flat
}

/// Extracts and parses the `content-length` header.
///
/// Returns `-1` when the header is absent or unparsable, so callers can
/// treat the result as an indeterminate size without branching on errors.
#[must_use]
pub fn content_length(headers: &HeaderMap) -> i64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(-1)
}

/// Builds a header map from raw name/value pairs, skipping invalid entries.
///
/// Used to copy a descriptor's headers onto a failure outcome; a malformed
/// pair must not turn a failure report into a second failure.
pub(crate) fn header_map_from_pairs(pairs: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.append(name, value);
            }
            _ => debug!(header = %name, "skipping malformed header pair"),
        }
    }
    map
}
