//! Validation-gated generation runs.

use eyre::Report;
use loam_core::GeneratedFile;
use loam_ir::{Manifest, ResolvedManifest};
use serde::Serialize;

use crate::{
    GenerateOptions, Template, TemplateRegistry, apply,
    pipeline::{Pipeline, ValidationResult},
};

/// Outcome of one generation run.
///
/// A failed run has `success: false`, no files, and one entry in `errors`
/// per validation error or generation failure. Nothing is written to the
/// output directory by a failed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub success: bool,
    pub dry_run: bool,
    /// `name@version` of the template that ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub files: Vec<GeneratedFile>,
    /// Paths written (or that would be written in a dry run)
    pub written: Vec<String>,
    /// Paths whose content already matched
    pub unchanged: Vec<String>,
    /// Hook files left as they were
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub validation: ValidationResult,
}

impl GenerationReport {
    fn failed(
        options: &GenerateOptions,
        validation: ValidationResult,
        errors: Vec<String>,
    ) -> Self {
        Self {
            success: false,
            dry_run: options.dry_run,
            template: None,
            files: Vec::new(),
            written: Vec::new(),
            unchanged: Vec::new(),
            skipped: Vec::new(),
            errors,
            validation,
        }
    }

    fn with_template(mut self, template: &dyn Template) -> Self {
        self.template = Some(template_ref(template));
        self
    }
}

/// Validate `manifest`, then run `template` on it and apply the output.
pub fn generate(
    manifest: &Manifest,
    template: &dyn Template,
    options: &GenerateOptions,
) -> GenerationReport {
    generate_with(&Pipeline::new(), manifest, template, options)
}

/// Like [`generate`], with a caller-configured pipeline (extra lints,
/// plugins or phases).
pub fn generate_with(
    pipeline: &Pipeline,
    manifest: &Manifest,
    template: &dyn Template,
    options: &GenerateOptions,
) -> GenerationReport {
    match compile(pipeline, manifest, options) {
        Ok((resolved, validation)) => render(template, &resolved, validation, options),
        Err(report) => report,
    }
}

/// Like [`generate`], selecting the template named by the manifest's
/// `template` key (or the default) from `registry`.
pub fn generate_with_registry(
    manifest: &Manifest,
    registry: &TemplateRegistry,
    options: &GenerateOptions,
) -> GenerationReport {
    let (resolved, validation) = match compile(&Pipeline::new(), manifest, options) {
        Ok(compiled) => compiled,
        Err(report) => return report,
    };

    match registry.select(resolved.template.as_deref()) {
        Ok(template) => render(template, &resolved, validation, options),
        Err(err) => GenerationReport::failed(options, validation, error_chain(&err)),
    }
}

/// Run the pipeline, stopping with a failed report unless the manifest
/// validates.
fn compile(
    pipeline: &Pipeline,
    manifest: &Manifest,
    options: &GenerateOptions,
) -> Result<(ResolvedManifest, ValidationResult), GenerationReport> {
    let mut ctx = pipeline.run(manifest.clone()).map_err(|err| {
        GenerationReport::failed(options, ValidationResult::default(), error_chain(&err))
    })?;

    let validation = ctx.validation();
    if !validation.valid {
        tracing::warn!(
            errors = validation.errors.len(),
            "manifest failed validation, template not run"
        );
        let errors = validation.errors.iter().map(|d| d.to_string()).collect();
        return Err(GenerationReport::failed(options, validation, errors));
    }

    match ctx.take_resolved() {
        Some(resolved) => Ok((resolved, validation)),
        None => Err(GenerationReport::failed(
            options,
            validation,
            vec!["pipeline produced no resolved manifest".to_string()],
        )),
    }
}

fn render(
    template: &dyn Template,
    resolved: &ResolvedManifest,
    validation: ValidationResult,
    options: &GenerateOptions,
) -> GenerationReport {
    let name = template_ref(template);
    tracing::debug!(template = %name, entities = resolved.entities.len(), "running template");

    let outcome = template.generate(resolved, options).and_then(|files| {
        let plan = apply::plan(&options.output_dir, files.clone())?;
        let applied = if options.dry_run {
            plan.report()
        } else {
            plan.commit()?
        };
        Ok((files, applied))
    });

    match outcome {
        Ok((files, applied)) => {
            tracing::info!(
                template = %name,
                dry_run = options.dry_run,
                files = applied.total(),
                written = applied.written.len(),
                unchanged = applied.unchanged.len(),
                skipped = applied.skipped.len(),
                "generation finished"
            );
            GenerationReport {
                success: true,
                dry_run: options.dry_run,
                template: Some(name),
                files,
                written: applied.written,
                unchanged: applied.unchanged,
                skipped: applied.skipped,
                errors: Vec::new(),
                validation,
            }
        }
        Err(err) => {
            tracing::warn!(template = %name, error = %err, "generation failed, nothing written");
            GenerationReport::failed(options, validation, error_chain(&err)).with_template(template)
        }
    }
}

fn template_ref(template: &dyn Template) -> String {
    format!("{}@{}", template.name(), template.version())
}

/// One message with every cause, outermost first.
fn error_chain(err: &Report) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|cause| cause.to_string()).collect();
    vec![chain.join(": ")]
}

#[cfg(test)]
mod tests {
    use loam_core::Version;
    use loam_ir::{DatabaseConfig, Mode};
    use loam_manifest::define::{entity, manifest, text};
    use tempfile::TempDir;

    use super::*;
    use crate::DiagnosticCode;

    struct Listing;

    impl Template for Listing {
        fn name(&self) -> &'static str {
            "listing"
        }

        fn version(&self) -> Version {
            Version::new(1, 0, 0)
        }

        fn generate(
            &self,
            manifest: &ResolvedManifest,
            _options: &GenerateOptions,
        ) -> eyre::Result<Vec<GeneratedFile>> {
            let tables: Vec<_> = manifest.entities.iter().map(|e| e.table.as_str()).collect();
            Ok(vec![GeneratedFile::generated("tables.txt", tables.join("\n"))])
        }
    }

    #[test]
    fn test_generate_writes_files() {
        let dir = TempDir::new().unwrap();
        let m = manifest()
            .database(DatabaseConfig::sqlite("app.db"))
            .entity(entity("User").field("email", text()))
            .entity(entity("BlogPost").field("title", text()))
            .build();

        let report = generate(&m, &Listing, &GenerateOptions::new(dir.path()));

        assert!(report.success, "{:?}", report.errors);
        assert_eq!(report.template.as_deref(), Some("listing@1.0.0"));
        assert_eq!(report.written, vec!["tables.txt"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("tables.txt")).unwrap(),
            "users\nblog_posts"
        );
    }

    #[test]
    fn test_invalid_manifest_is_gated() {
        let dir = TempDir::new().unwrap();
        let m = manifest().mode(Mode::Full).entity(entity("User")).build();

        let report = generate(&m, &Listing, &GenerateOptions::new(dir.path()));

        assert!(!report.success);
        assert!(report.template.is_none());
        assert!(report.validation.has_error(DiagnosticCode::DatabaseRequired));
        assert_eq!(
            report.errors,
            vec!["error[DATABASE_REQUIRED]: mode 'full' requires a database (at database)"]
        );
        assert!(!dir.path().join("tables.txt").exists());
    }

    #[test]
    fn test_registry_selection_failure() {
        let dir = TempDir::new().unwrap();
        let m = manifest()
            .mode(Mode::Headless)
            .template("listing@2.0.0")
            .entity(entity("User").field("email", text()))
            .build();
        let registry = TemplateRegistry::new().with(Listing);

        let report = generate_with_registry(&m, &registry, &GenerateOptions::new(dir.path()));

        assert!(!report.success);
        assert!(report.validation.valid);
        assert_eq!(
            report.errors,
            vec!["template 'listing@2.0.0' not found, available: listing@1.0.0"]
        );
    }
}
