//! Manifest front-ends for the Loam compiler.
//!
//! Two independent front-ends build the same [`loam_ir::Manifest`]:
//!
//! - [`define`]: a fluent builder API
//! - [`document`]: JSON and TOML documents with shorthand reconciliation
//!
//! [`serialize`] writes the canonical JSON form back out.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod define;
pub mod document;
mod error;
pub mod serialize;

pub use document::{
    entity_from_json, entity_from_value, entity_patch_from_json, entity_patch_from_value,
    from_file, from_json_str, from_json_str_with_filename, from_toml_str,
    from_toml_str_with_filename,
};
pub use error::{Error, Result, SourceContext};
pub use serialize::{to_json_string, to_json_value};
