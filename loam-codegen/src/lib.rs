//! Validation, compilation and code generation for Loam manifests.
//!
//! This crate takes a [`loam_ir::Manifest`] from either front-end through
//! the compiler and on to a template:
//!
//! - [`pipeline`] - normalize, validate and resolve phases with plugin hooks
//! - [`validate`] / [`normalize`] / [`resolve`] - the same steps as plain functions
//! - [`Template`] - the backend contract, and [`TemplateRegistry`] to select one
//! - [`generate`] - gated, all-or-nothing generation runs
//! - [`CodeBuilder`] - indentation-aware text assembly for templates
//!
//! # Example
//!
//! ```ignore
//! let result = loam_codegen::validate(&manifest);
//! if !result.valid {
//!     return Err(result.errors);
//! }
//!
//! let report = loam_codegen::generate(&manifest, &BasicTemplate, &GenerateOptions::new("out"));
//! ```

pub mod apply;
mod code_builder;
mod orchestrator;
pub mod pipeline;
mod registry;
mod template;

pub use code_builder::{CodeBuilder, Indent};
pub use orchestrator::{GenerationReport, generate, generate_with, generate_with_registry};
pub use pipeline::{
    Diagnostic, DiagnosticCode, Pipeline, Severity, ValidationResult,
    phases::{ValidatePhase, normalize, resolve},
};
pub use registry::{DEFAULT_TEMPLATE, TemplateRegistry};
pub use template::{GenerateOptions, Template, generate_per_entity};

use loam_ir::Manifest;

/// Validate a manifest with the built-in rules.
///
/// Defaults are merged first, so diagnostics describe the manifest as it
/// would be generated. Every violation is reported; this never stops at the
/// first error.
pub fn validate(manifest: &Manifest) -> ValidationResult {
    let normalized = normalize(manifest);
    ValidationResult::from_diagnostics(ValidatePhase::new().check(&normalized))
}
