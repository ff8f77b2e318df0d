//! Normalize phase - merges documented defaults into the manifest.
//!
//! After this phase every presence-as-intent slot holds an explicit value,
//! so later phases never consult built-in defaults themselves. Normalizing
//! an already normalized manifest returns it unchanged.

use eyre::Result;
use indexmap::IndexMap;
use loam_ir::{
    AuthConfig, Behaviors, Entity, Field, I18nConfig, Manifest, ObservabilityConfig, Relation,
    TenancyConfig,
};

use crate::pipeline::{CompilationContext, Phase};

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_TENANT_FIELD: &str = "tenantId";

/// Phase that fills every unset manifest slot with its default.
pub struct NormalizePhase;

impl Phase for NormalizePhase {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn description(&self) -> &'static str {
        "Merge defaults into the manifest"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        ctx.normalized = Some(normalize(&ctx.manifest));
        Ok(())
    }
}

/// Return a copy of `manifest` with every default applied.
///
/// Precedence for per-entity settings is entity, then the manifest's
/// `defaults`, then the built-in value. An entity's own `source` wins over
/// the manifest-level `source`.
pub fn normalize(manifest: &Manifest) -> Manifest {
    let defaults = manifest.defaults.clone().unwrap_or_default();

    Manifest {
        entities: manifest
            .entities
            .iter()
            .map(|entity| normalize_entity(entity, manifest))
            .collect(),
        database: manifest.database.clone(),
        auth: Some(normalize_auth(manifest.auth.as_ref())),
        mode: Some(manifest.mode()),
        i18n: Some(normalize_i18n(manifest.i18n.as_ref())),
        tenancy: Some(normalize_tenancy(manifest.tenancy.as_ref())),
        observability: Some(normalize_observability(manifest.observability.as_ref())),
        defaults: (!defaults.is_empty()).then_some(defaults),
        source: manifest.source.clone(),
        template: manifest.template.clone(),
    }
}

fn normalize_auth(auth: Option<&AuthConfig>) -> AuthConfig {
    AuthConfig {
        enabled: Some(auth.is_some_and(AuthConfig::is_enabled)),
        providers: auth.map(|a| a.providers.clone()).unwrap_or_default(),
    }
}

fn normalize_i18n(i18n: Option<&I18nConfig>) -> I18nConfig {
    let default_locale = i18n
        .and_then(|c| c.default_locale.clone())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
    let locales = match i18n {
        Some(c) if !c.locales.is_empty() => c.locales.clone(),
        _ => vec![default_locale.clone()],
    };
    I18nConfig {
        default_locale: Some(default_locale),
        locales,
    }
}

fn normalize_tenancy(tenancy: Option<&TenancyConfig>) -> TenancyConfig {
    TenancyConfig {
        enabled: Some(tenancy.and_then(|t| t.enabled).unwrap_or(false)),
        field: Some(
            tenancy
                .and_then(|t| t.field.clone())
                .unwrap_or_else(|| DEFAULT_TENANT_FIELD.to_string()),
        ),
    }
}

fn normalize_observability(observability: Option<&ObservabilityConfig>) -> ObservabilityConfig {
    let o = observability.cloned().unwrap_or_default();
    ObservabilityConfig {
        logging: Some(o.logging.unwrap_or(true)),
        metrics: Some(o.metrics.unwrap_or(false)),
        tracing: Some(o.tracing.unwrap_or(false)),
    }
}

fn normalize_entity(entity: &Entity, manifest: &Manifest) -> Entity {
    let defaults = manifest.defaults.as_ref();
    let default_behaviors = defaults.map(|d| d.behaviors).unwrap_or_default();
    let default_protection = defaults.and_then(|d| d.protection);

    Entity {
        name: entity.name.clone(),
        table: entity.table.clone(),
        fields: normalize_fields(&entity.fields),
        relations: entity
            .relations
            .iter()
            .map(|(name, relation)| (name.clone(), normalize_relation(relation)))
            .collect(),
        behaviors: entity
            .behaviors
            .or(default_behaviors)
            .or(Behaviors::DEFAULT),
        protection: Some(
            entity
                .protection
                .or(default_protection)
                .unwrap_or_default(),
        ),
        source: entity.source.clone().or_else(|| manifest.source.clone()),
    }
}

fn normalize_fields(fields: &IndexMap<String, Field>) -> IndexMap<String, Field> {
    fields
        .iter()
        .map(|(name, field)| {
            let field = Field {
                required: Some(field.is_required()),
                unique: Some(field.is_unique()),
                ..field.clone()
            };
            (name.clone(), field)
        })
        .collect()
}

fn normalize_relation(relation: &Relation) -> Relation {
    let mut relation = relation.clone();
    if let Some(pivot) = relation.pivot.as_mut() {
        pivot.fields = normalize_fields(&pivot.fields);
    }
    relation
}

#[cfg(test)]
mod tests {
    use loam_ir::{DatabaseConfig, Mode, Protection, SourceConfig};
    use loam_manifest::define::{belongs_to_many, entity, manifest, number, text};

    use super::*;

    #[test]
    fn test_global_defaults() {
        let m = normalize(&Manifest::default());

        assert_eq!(m.mode, Some(Mode::Full));
        assert_eq!(
            m.auth,
            Some(AuthConfig {
                enabled: Some(false),
                providers: vec![],
            })
        );
        let i18n = m.i18n.unwrap();
        assert_eq!(i18n.default_locale.as_deref(), Some("en"));
        assert_eq!(i18n.locales, vec!["en"]);
        let tenancy = m.tenancy.unwrap();
        assert_eq!(tenancy.enabled, Some(false));
        assert_eq!(tenancy.field.as_deref(), Some("tenantId"));
        let obs = m.observability.unwrap();
        assert_eq!(
            (obs.logging, obs.metrics, obs.tracing),
            (Some(true), Some(false), Some(false))
        );
    }

    #[test]
    fn test_entity_defaults() {
        let m = normalize(&manifest().entity(entity("User").field("email", text())).build());
        let user = &m.entities[0];

        assert_eq!(user.behaviors, Behaviors::DEFAULT);
        assert_eq!(user.protection, Some(Protection::none()));
        assert_eq!(user.fields["email"].required, Some(true));
        assert_eq!(user.fields["email"].unique, Some(false));
    }

    #[test]
    fn test_behavior_precedence() {
        let m = manifest()
            .default_behaviors(Behaviors {
                timestamps: Some(false),
                audit: Some(true),
                ..Default::default()
            })
            .entity(entity("Log").audit(false))
            .entity(entity("Post").soft_delete(true))
            .build();
        let m = normalize(&m);

        let log = m.entity("Log").unwrap().behaviors;
        assert_eq!(log.timestamps, Some(false));
        assert_eq!(log.audit, Some(false));
        assert_eq!(log.soft_delete, Some(false));

        let post = m.entity("Post").unwrap().behaviors;
        assert_eq!(post.timestamps, Some(false));
        assert_eq!(post.audit, Some(true));
        assert_eq!(post.soft_delete, Some(true));
    }

    #[test]
    fn test_protection_precedence() {
        let m = manifest()
            .default_protection(Protection::write())
            .entity(entity("User"))
            .entity(entity("Page").protected(Protection::none()))
            .build();
        let m = normalize(&m);

        assert_eq!(m.entities[0].protection, Some(Protection::write()));
        assert_eq!(m.entities[1].protection, Some(Protection::none()));
    }

    #[test]
    fn test_entity_source_wins() {
        let m = manifest()
            .mode(Mode::ApiOnly)
            .source(SourceConfig::new("https://api.example.com"))
            .entity(entity("User"))
            .entity(entity("Repo").source(SourceConfig::new("https://git.example.com")))
            .build();
        let m = normalize(&m);

        assert_eq!(
            m.entities[0].source.as_ref().unwrap().base_url,
            "https://api.example.com"
        );
        assert_eq!(
            m.entities[1].source.as_ref().unwrap().base_url,
            "https://git.example.com"
        );
    }

    #[test]
    fn test_pivot_fields_normalized() {
        let m = manifest()
            .entity(entity("Post").relation(
                "tags",
                belongs_to_many("Tag").pivot_field("order", number().optional()),
            ))
            .build();
        let m = normalize(&m);
        let pivot = m.entities[0].relations["tags"].pivot.as_ref().unwrap();

        assert_eq!(pivot.fields["order"].required, Some(false));
        assert_eq!(pivot.fields["order"].unique, Some(false));
    }

    #[test]
    fn test_idempotent() {
        let m = manifest()
            .database(DatabaseConfig::sqlite("app.db"))
            .default_behaviors(Behaviors {
                soft_delete: Some(true),
                ..Default::default()
            })
            .entity(entity("User").field("email", text().email().unique()))
            .build();

        let once = normalize(&m);
        assert_eq!(normalize(&once), once);
    }
}
