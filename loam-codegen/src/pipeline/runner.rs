//! Pipeline orchestrator.

use eyre::Result;
use loam_ir::Manifest;

use super::{
    CompilationContext, Phase, PhaseInfo, Plugin,
    phases::{NormalizePhase, ResolvePhase, ValidatePhase},
};

/// The compilation pipeline orchestrator.
///
/// The pipeline manages the execution of compilation phases and plugin hooks.
/// It runs built-in phases (normalize, validate, resolve) followed by any user
/// phases, calling plugin hooks before and after each phase.
///
/// Validation errors do not fail the run: they are left in the context's
/// diagnostics and every phase after the failing one is skipped.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .plugin(SnapshotPlugin::new())
///     .phase(MyCustomPhase);
///
/// let ctx = pipeline.run(manifest)?;
/// ```
pub struct Pipeline {
    validate: ValidatePhase,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with default built-in phases.
    pub fn new() -> Self {
        Self {
            validate: ValidatePhase::new(),
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Replace the built-in validate phase, e.g. to add custom lints.
    pub fn validate_with(mut self, validate: ValidatePhase) -> Self {
        self.validate = validate;
        self
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run the pipeline on a manifest.
    ///
    /// Executes all phases in order:
    /// 1. NormalizePhase - merges defaults
    /// 2. ValidatePhase - runs lints, collects diagnostics
    /// 3. ResolvePhase - derives names, produces the resolved manifest
    /// 4. User phases (if any)
    ///
    /// Plugin hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase or plugin fails fatally.
    pub fn run(&self, manifest: Manifest) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(manifest);

        for phase in self.phases() {
            if ctx.has_errors() {
                tracing::debug!(
                    phase = phase.name(),
                    errors = ctx.error_count(),
                    "skipping phase after validation errors"
                );
                break;
            }
            self.run_phase(phase, &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Name and description of every phase, in run order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        self.phases().into_iter().map(|p| p.info()).collect()
    }

    fn phases(&self) -> Vec<&dyn Phase> {
        let mut phases: Vec<&dyn Phase> = vec![&NormalizePhase, &self.validate, &ResolvePhase];
        phases.extend(self.phases.iter().map(|p| p.as_ref()));
        phases
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            tracing::debug!(plugin = plugin.name(), phase = phase_name, "before phase");
            plugin.on_before_phase(phase_name, ctx)?;
        }

        tracing::debug!(phase = phase_name, "running phase");
        phase.run(ctx)?;

        for plugin in &self.plugins {
            tracing::debug!(plugin = plugin.name(), phase = phase_name, "after phase");
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
