//! Validate phase - runs lints on the normalized manifest.

mod lint;
pub mod lints;

use eyre::Result;
pub use lint::{Lint, LintInfo};
pub use lints::{
    AdvisoryLint, ConfigurationLint, DuplicatesLint, FieldRulesLint, NamingLint, RelationsLint,
};
use loam_ir::Manifest;

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Phase that validates the manifest using configurable lints.
///
/// Unlike a fatal phase, validation records every diagnostic and returns
/// `Ok`; the pipeline skips the remaining phases when errors were recorded.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Create a new validate phase with the built-in lints, in rule-class
    /// order: structural, referential, configuration, type-specific, advisory.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(NamingLint),
                Box::new(DuplicatesLint),
                Box::new(RelationsLint),
                Box::new(ConfigurationLint),
                Box::new(FieldRulesLint),
                Box::new(AdvisoryLint),
            ],
        }
    }

    /// Create a validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    /// Add a custom lint to the validation phase.
    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    /// Get the names of all lints that will be run.
    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    /// Get information about all lints that will be run.
    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.lints.iter().map(|l| l.info()).collect()
    }

    /// Run every lint against a normalized manifest.
    pub fn check(&self, manifest: &Manifest) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for lint in &self.lints {
            lint.check(manifest, &mut diagnostics);
        }
        diagnostics
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check manifest integrity and collect diagnostics"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let diagnostics = self.check(ctx.current_manifest());
        tracing::debug!(count = diagnostics.len(), "validation finished");
        ctx.diagnostics.extend(diagnostics);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DiagnosticCode;

    #[test]
    fn test_lint_order() {
        assert_eq!(
            ValidatePhase::new().lint_names(),
            vec![
                "naming",
                "duplicates",
                "relations",
                "configuration",
                "field-rules",
                "advisory"
            ]
        );
    }

    #[test]
    fn test_errors_recorded_not_fatal() {
        struct AlwaysErrorLint;
        impl Lint for AlwaysErrorLint {
            fn name(&self) -> &'static str {
                "always-error"
            }
            fn description(&self) -> &'static str {
                "Always produces an error"
            }
            fn check(&self, _manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::new(DiagnosticCode::InvalidEntityName, "forced"));
            }
        }

        let mut ctx = CompilationContext::new(Manifest::default());
        let phase = ValidatePhase::empty().with_lint(AlwaysErrorLint);

        assert!(phase.run(&mut ctx).is_ok());
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_warnings_allowed() {
        let mut ctx = CompilationContext::new(Manifest::default());

        let phase = ValidatePhase::empty().with_lint(AdvisoryLint);
        phase.run(&mut ctx).unwrap();

        assert!(ctx.has_warnings());
        assert!(!ctx.has_errors());
    }
}
