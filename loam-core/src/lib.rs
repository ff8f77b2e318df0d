//! Core utilities and types for the Loam manifest compiler.
//!
//! This crate provides the naming conventions, generated-file types and
//! version handling shared by every other crate in the workspace.

mod file;
mod naming;
mod version;

// File types
pub use file::{GeneratedFile, Overwrite, PathError, WriteResult, check_relative_path};
// Naming conventions
pub use naming::{
    is_camel_case, is_pascal_case, pluralize, to_camel_case, to_kebab_case, to_pascal_case,
    to_snake_case,
};
pub use version::Version;
