//! Lint for suspicious but legal manifests.

use loam_ir::{Manifest, Mode};

use super::super::Lint;
use crate::pipeline::{Diagnostic, DiagnosticCode};

/// Lint that warns about manifests that are valid but probably unintended.
///
/// Produces only warnings, so it never blocks generation.
pub struct AdvisoryLint;

impl Lint for AdvisoryLint {
    fn name(&self) -> &'static str {
        "advisory"
    }

    fn description(&self) -> &'static str {
        "Warn about empty manifests, empty entities and unused configuration"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        if manifest.entities.is_empty() {
            diagnostics.push(
                Diagnostic::new(DiagnosticCode::NoEntities, "manifest declares no entities")
                    .at("entities"),
            );
        }

        for entity in &manifest.entities {
            if entity.fields.is_empty() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::EmptyEntity,
                        format!("entity '{}' declares no fields", entity.name),
                    )
                    .at(format!("{}.fields", entity.name)),
                );
            }
        }

        if let Some(auth) = &manifest.auth
            && auth.is_enabled()
            && auth.providers.is_empty()
        {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::AuthWithoutProviders,
                    "auth is enabled but declares no providers",
                )
                .at("auth.providers")
                .suggest("add a provider such as 'credentials'"),
            );
        }

        if manifest.mode() == Mode::ApiOnly && manifest.database.is_some() {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DatabaseUnused,
                    "mode 'api-only' has no storage, the database is ignored",
                )
                .at("database"),
            );
        }
    }
}
