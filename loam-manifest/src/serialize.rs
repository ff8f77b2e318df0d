//! Canonical document output.
//!
//! The canonical form writes shorthands out in full (`required`, explicit
//! `validations`, object-form `protected`), so parsing the output yields an
//! IR equal to the one serialized.

use loam_ir::Manifest;

/// Serialize a manifest to pretty-printed canonical JSON.
pub fn to_json_string(manifest: &Manifest) -> serde_json::Result<String> {
    serde_json::to_string_pretty(manifest)
}

/// Serialize a manifest to a canonical JSON value.
pub fn to_json_value(manifest: &Manifest) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(manifest)
}
