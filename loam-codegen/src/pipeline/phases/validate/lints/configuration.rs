//! Lint for cross-cutting manifest configuration.

use loam_ir::{Manifest, Mode, SUPPORTED_AUTH_PROVIDERS, SourceConfig};

use super::super::Lint;
use crate::pipeline::{Diagnostic, DiagnosticCode};

/// Lint that errors on inconsistent database, auth, source, i18n and
/// tenancy settings.
pub struct ConfigurationLint;

impl Lint for ConfigurationLint {
    fn name(&self) -> &'static str {
        "configuration"
    }

    fn description(&self) -> &'static str {
        "Check database, auth, source, locale and tenancy configuration"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        check_database(manifest, diagnostics);
        check_auth(manifest, diagnostics);
        check_sources(manifest, diagnostics);
        check_i18n(manifest, diagnostics);
        check_tenancy(manifest, diagnostics);
    }
}

fn check_database(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
    match &manifest.database {
        None if manifest.mode() == Mode::Full => diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::DatabaseRequired,
                "mode 'full' requires a database",
            )
            .at("database")
            .suggest(r#"add "database": {"type": "sqlite", "file": "./data.db"}"#),
        ),
        None => {}
        Some(database) => {
            if database.connection().is_none() {
                let key = database.kind.connection_key();
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::DatabaseConnectionMissing,
                        format!(
                            "database type '{}' requires '{}'",
                            database.kind.as_str(),
                            key
                        ),
                    )
                    .at(format!("database.{}", key)),
                );
            }
        }
    }
}

fn check_auth(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
    if !manifest.auth_enabled() {
        for entity in &manifest.entities {
            if entity.protection().is_any() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::AuthRequired,
                        format!(
                            "entity '{}' protects operations but auth is not enabled",
                            entity.name
                        ),
                    )
                    .at(format!("{}.protected", entity.name))
                    .suggest("enable auth or set 'protected' to false"),
                );
            }
        }
    }

    let providers = manifest.auth.iter().flat_map(|a| a.providers.iter());
    for (i, provider) in providers.enumerate() {
        if !SUPPORTED_AUTH_PROVIDERS.contains(&provider.as_str()) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::UnsupportedAuthProvider,
                    format!("auth provider '{}' is not supported", provider),
                )
                .at(format!("auth.providers[{}]", i))
                .suggest(format!(
                    "use one of: {}",
                    SUPPORTED_AUTH_PROVIDERS.join(", ")
                )),
            );
        }
    }
}

fn check_sources(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(source) = &manifest.source {
        check_source(source, "source", diagnostics);
    }

    for entity in &manifest.entities {
        match &entity.source {
            None if manifest.mode() == Mode::ApiOnly => diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::SourceRequired,
                    format!(
                        "entity '{}' has no source and mode 'api-only' has no storage",
                        entity.name
                    ),
                )
                .at(format!("{}.source", entity.name))
                .suggest("add a 'source' to the entity or the manifest"),
            ),
            // Inherited from the manifest source, already reported there.
            Some(source) if manifest.source.as_ref() == Some(source) => {}
            Some(source) => {
                check_source(source, &format!("{}.source", entity.name), diagnostics);
            }
            None => {}
        }
    }
}

fn check_source(source: &SourceConfig, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let base_url = source.base_url.trim();
    if base_url.is_empty() {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::InvalidSource, "source base URL is empty")
                .at(format!("{}.baseUrl", path)),
        );
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::InvalidSource,
                format!("source base URL '{}' must use http or https", base_url),
            )
            .at(format!("{}.baseUrl", path)),
        );
    }

    let endpoints = &source.endpoints;
    let overrides = [
        ("list", &endpoints.list),
        ("get", &endpoints.get),
        ("create", &endpoints.create),
        ("update", &endpoints.update),
        ("remove", &endpoints.remove),
    ];
    for (op, endpoint) in overrides {
        if let Some(endpoint) = endpoint
            && !endpoint.starts_with('/')
        {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::InvalidSource,
                    format!("endpoint '{}' must start with '/'", endpoint),
                )
                .at(format!("{}.endpoints.{}", path, op)),
            );
        }
    }
}

fn check_i18n(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
    let Some(i18n) = &manifest.i18n else {
        return;
    };
    let Some(default_locale) = &i18n.default_locale else {
        return;
    };
    if !i18n.locales.is_empty() && !i18n.locales.contains(default_locale) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::InvalidLocale,
                format!(
                    "default locale '{}' is not among the declared locales",
                    default_locale
                ),
            )
            .at("i18n.defaultLocale")
            .suggest(format!("add '{}' to 'i18n.locales'", default_locale)),
        );
    }
}

fn check_tenancy(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
    let Some(tenancy) = &manifest.tenancy else {
        return;
    };
    if !tenancy.enabled.unwrap_or(false) {
        return;
    }
    let field = tenancy.field.as_deref().unwrap_or("tenantId");
    for entity in &manifest.entities {
        if entity.fields.contains_key(field) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::TenantFieldConflict,
                    format!(
                        "entity '{}' declares '{}', which tenancy manages",
                        entity.name, field
                    ),
                )
                .at(format!("{}.fields.{}", entity.name, field))
                .suggest("remove the field; tenancy adds it to every entity"),
            );
        }
    }
}
