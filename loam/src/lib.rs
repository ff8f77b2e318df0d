//! Loam compiles declarative entity manifests into a consistent set of
//! generated artifacts: storage schema, validation rules, API types and
//! client bindings.
//!
//! This crate is the entry point. It re-exports the front-ends, the
//! compiler and the reference template, and adds [`ManifestBuilder`] for
//! incremental, tool-driven construction.
//!
//! # Example
//!
//! ```no_run
//! use loam::define::{entity, manifest, text};
//! use loam::{BasicTemplate, DatabaseConfig, GenerateOptions};
//!
//! let m = manifest()
//!     .database(DatabaseConfig::sqlite("app.db"))
//!     .entity(entity("User").field("email", text().email().unique()))
//!     .build();
//!
//! let report = loam::generate(&m, &BasicTemplate, &GenerateOptions::new("generated"));
//! assert!(report.success);
//! ```

mod builder;
mod result;
pub mod tools;

pub use builder::ManifestBuilder;
pub use loam_codegen::{
    Diagnostic, DiagnosticCode, GenerateOptions, GenerationReport, Severity, Template,
    TemplateRegistry, ValidationResult, generate, generate_with_registry, resolve, validate,
};
pub use loam_ir::{
    AuthConfig, DatabaseConfig, DatabaseType, Entity, EntityPatch, Manifest, Mode,
    ResolvedManifest,
};
pub use loam_manifest::{define, from_file, from_json_str, from_toml_str, to_json_string};
pub use loam_template_basic::{BasicTemplate, registry};
pub use result::ToolResult;
pub use tools::{ToolSession, tool_definitions};
