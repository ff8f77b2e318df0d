//! Compilation pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that takes a manifest
//! from either front-end to a [`loam_ir::ResolvedManifest`]. The pipeline
//! provides:
//!
//! - Explicit phase boundaries (normalize → validate → resolve)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//!
//! # Example
//!
//! ```ignore
//! use loam_codegen::pipeline::Pipeline;
//!
//! let mut ctx = Pipeline::new().run(manifest)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("{diag}");
//! }
//!
//! if let Some(resolved) = ctx.take_resolved() {
//!     template.generate(&resolved, &options)?;
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, ValidationResult};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};
