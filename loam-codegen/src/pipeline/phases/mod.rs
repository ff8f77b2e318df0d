//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`NormalizePhase`] - merges defaults into the manifest
//! - [`ValidatePhase`] - runs lints and collects diagnostics
//! - [`ResolvePhase`] - derives names and builds the resolved manifest

mod normalize;
mod resolve;
mod validate;

pub use normalize::{NormalizePhase, normalize};
pub use resolve::{ResolvePhase, resolve};
pub use validate::{
    AdvisoryLint, ConfigurationLint, DuplicatesLint, FieldRulesLint, Lint, LintInfo, NamingLint,
    RelationsLint, ValidatePhase,
};
