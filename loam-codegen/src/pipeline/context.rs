//! Compilation context passed through pipeline phases.

use loam_ir::{Manifest, ResolvedManifest};

use super::diagnostic::{Diagnostic, Severity, ValidationResult};

/// Context passed through all pipeline phases.
///
/// This struct carries the state of compilation through each phase,
/// accumulating results and diagnostics along the way.
#[derive(Debug)]
pub struct CompilationContext {
    /// The manifest as handed to the pipeline.
    pub manifest: Manifest,
    /// The default-merged manifest (populated by NormalizePhase).
    pub normalized: Option<Manifest>,
    /// The resolved manifest (populated by ResolvePhase).
    pub resolved: Option<ResolvedManifest>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context from a manifest.
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            normalized: None,
            resolved: None,
            diagnostics: Vec::new(),
        }
    }

    /// The normalized manifest if NormalizePhase has run, else the input.
    pub fn current_manifest(&self) -> &Manifest {
        self.normalized.as_ref().unwrap_or(&self.manifest)
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Collected diagnostics as a validation result.
    pub fn validation(&self) -> ValidationResult {
        ValidationResult::from_diagnostics(self.diagnostics.iter().cloned())
    }

    /// Take the resolved manifest out of the context.
    ///
    /// Returns `None` if ResolvePhase did not run, which happens when
    /// validation recorded errors.
    pub fn take_resolved(&mut self) -> Option<ResolvedManifest> {
        self.resolved.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DiagnosticCode;

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(Manifest::default());

        assert!(ctx.normalized.is_none());
        assert!(ctx.resolved.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = CompilationContext::new(Manifest::default());

        ctx.add_diagnostic(Diagnostic::new(DiagnosticCode::DatabaseRequired, "no database"));
        ctx.add_diagnostic(Diagnostic::new(DiagnosticCode::NoEntities, "no entities"));

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);

        let result = ctx.validation();
        assert!(!result.valid);
        assert_eq!(result.warnings[0].code, DiagnosticCode::NoEntities);
    }

    #[test]
    fn test_context_no_errors() {
        let mut ctx = CompilationContext::new(Manifest::default());

        ctx.add_diagnostic(Diagnostic::new(DiagnosticCode::EmptyEntity, "just a warning"));

        assert!(!ctx.has_errors());
        assert!(ctx.has_warnings());
        assert!(ctx.validation().valid);
    }
}
