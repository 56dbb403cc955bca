//! JSON rendering of an [`Extraction`].
//!
//! The document shape is fixed: a `dependencies` array in encounter
//! order, an optional `ruby_version`, and a `warnings` array. Output
//! for identical input is byte-identical.

use crate::record::Extraction;

/// Serialize an extraction to compact JSON.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails; the record
/// types serialize infallibly in practice.
pub fn to_json(extraction: &Extraction) -> serde_json::Result<String> {
    serde_json::to_string(extraction)
}

/// Serialize an extraction to pretty-printed JSON, the form the CLI
/// prints.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn to_json_pretty(extraction: &Extraction) -> serde_json::Result<String> {
    serde_json::to_string_pretty(extraction)
}

/// Serialize an extraction to an in-memory JSON value.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn to_value(extraction: &Extraction) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(extraction)
}
