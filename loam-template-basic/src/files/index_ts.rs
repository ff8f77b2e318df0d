//! API index generator.

use loam_codegen::CodeBuilder;
use loam_ir::ResolvedManifest;

use super::GENERATED_HEADER;
use crate::type_mapper::ts_string;

/// `api/index.ts`: re-exports every entity module and the app configuration.
pub struct IndexTs<'a> {
    manifest: &'a ResolvedManifest,
}

impl<'a> IndexTs<'a> {
    pub fn new(manifest: &'a ResolvedManifest) -> Self {
        Self { manifest }
    }

    pub fn render(&self) -> String {
        let m = self.manifest;

        CodeBuilder::typescript()
            .doc("//", GENERATED_HEADER)
            .blank()
            .each(&m.entities, |b, e| {
                b.line(&format!("export * from './{}';", e.singular))
            })
            .when(!m.entities.is_empty(), |b| b.blank())
            .block_with_close("export const config = {", "} as const;", |b| {
                b.line(&format!("mode: {},", ts_string(m.mode.as_str())))
                    .line(&format!(
                        "auth: {{ enabled: {}, providers: [{}] }},",
                        m.auth.enabled,
                        quoted(&m.auth.providers)
                    ))
                    .line(&format!(
                        "defaultLocale: {},",
                        ts_string(&m.i18n.default_locale)
                    ))
                    .line(&format!("locales: [{}],", quoted(&m.i18n.locales)))
                    .when(m.tenancy.enabled, |b| {
                        b.line(&format!("tenantField: {},", ts_string(&m.tenancy.field)))
                    })
                    .line(&format!(
                        "observability: {{ logging: {}, metrics: {}, tracing: {} }},",
                        m.observability.logging, m.observability.metrics, m.observability.tracing
                    ))
            })
            .build()
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| ts_string(s))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use loam_codegen::resolve;
    use loam_ir::{AuthConfig, DatabaseConfig, I18nConfig};
    use loam_manifest::define::{entity, manifest, text};

    use super::*;

    #[test]
    fn test_index() {
        let m = manifest()
            .database(DatabaseConfig::sqlite("app.db"))
            .auth(AuthConfig::with_providers(["github"]))
            .i18n(I18nConfig {
                default_locale: Some("fr".into()),
                locales: vec!["fr".into(), "en".into()],
            })
            .entity(entity("User").field("email", text()))
            .entity(entity("BlogPost").field("title", text()))
            .build();
        let resolved = resolve(&m);

        insta::assert_snapshot!(IndexTs::new(&resolved).render(), @r"
        // Generated by loam. Do not edit.

        export * from './user';
        export * from './blog_post';

        export const config = {
          mode: 'full',
          auth: { enabled: true, providers: ['github'] },
          defaultLocale: 'fr',
          locales: ['fr', 'en'],
          observability: { logging: true, metrics: false, tracing: false },
        } as const;
        ");
    }
}
