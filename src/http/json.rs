//! Thin JSON helpers over `serde_json`.
//!
//! The request layer consumes JSON as an opaque capability: validity checks,
//! untyped and typed decoding, and compact/pretty encoding. Schema
//! validation is out of scope.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Returns true if the bytes parse as a JSON document.
#[must_use]
pub fn is_valid_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<Value>(bytes).is_ok()
}

/// Decodes bytes into an untyped JSON value, or `None` if invalid.
#[must_use]
pub fn decode_value(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

/// Decodes bytes into a typed value, or `None` if invalid or mismatched.
///
/// Unknown fields are ignored unless the target type opts into
/// `#[serde(deny_unknown_fields)]`.
#[must_use]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    serde_json::from_slice(bytes).ok()
}

/// Encodes a value to compact JSON bytes.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if the value cannot be
/// serialized (e.g. a map with non-string keys).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// Encodes a value to pretty-printed JSON bytes.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if the value cannot be
/// serialized.
pub fn encode_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(value)
}
