//! Resolve phase - derives storage and API names from the normalized manifest.
//!
//! Resolution never rejects input. Rejection is the validator's job; this
//! phase only computes names, deterministically, so that templates never
//! repeat naming logic.

use eyre::Result;
use loam_core::{pluralize, to_kebab_case, to_snake_case};
use loam_ir::{
    Endpoints, Entity, Field, JunctionTable, Manifest, Relation, RelationKind, ResolvedAuth,
    ResolvedBehaviors, ResolvedEndpoints, ResolvedEntity, ResolvedField, ResolvedI18n,
    ResolvedManifest, ResolvedObservability, ResolvedRelation, ResolvedSource, ResolvedTenancy,
};

use super::normalize::normalize;
use crate::pipeline::{CompilationContext, Phase};

/// Phase that produces the resolved manifest.
///
/// The pipeline only runs this phase when validation recorded no errors.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Derive tables, columns, keys and endpoints"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let resolved = match &ctx.normalized {
            Some(normalized) => resolve_normalized(normalized),
            None => resolve(&ctx.manifest),
        };
        ctx.resolved = Some(resolved);
        Ok(())
    }
}

/// Normalize `manifest` and derive every name templates need.
pub fn resolve(manifest: &Manifest) -> ResolvedManifest {
    resolve_normalized(&normalize(manifest))
}

fn resolve_normalized(manifest: &Manifest) -> ResolvedManifest {
    let auth = manifest.auth.clone().unwrap_or_default();
    let i18n = manifest.i18n.clone().unwrap_or_default();
    let tenancy = manifest.tenancy.clone().unwrap_or_default();
    let observability = manifest.observability.clone().unwrap_or_default();
    let tenant_field = tenancy.field.unwrap_or_else(|| "tenantId".to_string());

    ResolvedManifest {
        entities: manifest.entities.iter().map(resolve_entity).collect(),
        junctions: resolve_junctions(&manifest.entities),
        database: manifest.database.clone(),
        auth: ResolvedAuth {
            enabled: auth.is_enabled(),
            providers: auth.providers,
        },
        mode: manifest.mode(),
        i18n: ResolvedI18n {
            default_locale: i18n.default_locale.unwrap_or_else(|| "en".to_string()),
            locales: i18n.locales,
        },
        tenancy: ResolvedTenancy {
            enabled: tenancy.enabled.unwrap_or(false),
            column: column_name(&tenant_field),
            field: tenant_field,
        },
        observability: ResolvedObservability {
            logging: observability.logging.unwrap_or(true),
            metrics: observability.metrics.unwrap_or(false),
            tracing: observability.tracing.unwrap_or(false),
        },
        template: manifest.template.clone(),
    }
}

fn resolve_entity(entity: &Entity) -> ResolvedEntity {
    let endpoints = default_endpoints(&entity.name);

    ResolvedEntity {
        name: entity.name.clone(),
        singular: entity_singular(&entity.name),
        plural: entity_plural(&entity.name),
        table: table_name(entity),
        fields: entity
            .fields
            .iter()
            .map(|(name, field)| resolve_field(name, field))
            .collect(),
        relations: entity
            .relations
            .iter()
            .map(|(name, relation)| resolve_relation(entity, name, relation))
            .collect(),
        behaviors: ResolvedBehaviors {
            timestamps: entity.behaviors.timestamps(),
            soft_delete: entity.behaviors.soft_delete(),
            audit: entity.behaviors.audit(),
        },
        protection: entity.protection(),
        source: entity.source.as_ref().map(|source| ResolvedSource {
            base_url: source.base_url.clone(),
            endpoints: apply_overrides(&endpoints, &source.endpoints),
        }),
        endpoints,
    }
}

fn resolve_field(name: &str, field: &Field) -> ResolvedField {
    ResolvedField {
        name: name.to_string(),
        column: column_name(name),
        kind: field.kind.clone(),
        required: field.is_required(),
        unique: field.is_unique(),
        default: field.default.clone(),
        validations: field.validations.clone(),
    }
}

fn resolve_relation(owner: &Entity, name: &str, relation: &Relation) -> ResolvedRelation {
    let many_to_many = relation.kind == RelationKind::BelongsToMany;

    ResolvedRelation {
        name: name.to_string(),
        kind: relation.kind,
        target: relation.entity.clone(),
        foreign_key: foreign_key(&owner.name, name, relation),
        local_key: many_to_many.then(|| local_key(&owner.name)),
        junction: many_to_many.then(|| junction_name(&owner.name, relation)),
        external: relation.external,
    }
}

/// Junction tables in first-declaration order.
///
/// Relations that share a junction contribute their pivot fields to one
/// table; the first declaration of a pivot field name wins.
fn resolve_junctions(entities: &[Entity]) -> Vec<JunctionTable> {
    let mut junctions: Vec<JunctionTable> = Vec::new();

    for entity in entities {
        for (name, relation) in &entity.relations {
            if relation.kind != RelationKind::BelongsToMany {
                continue;
            }
            let table = junction_name(&entity.name, relation);
            let fields: Vec<ResolvedField> = relation
                .pivot
                .iter()
                .flat_map(|pivot| pivot.fields.iter())
                .map(|(field_name, field)| resolve_field(field_name, field))
                .collect();

            match junctions.iter_mut().find(|j| j.name == table) {
                Some(existing) => {
                    for field in fields {
                        if !existing.fields.iter().any(|f| f.name == field.name) {
                            existing.fields.push(field);
                        }
                    }
                }
                None => junctions.push(JunctionTable {
                    name: table,
                    left_entity: entity.name.clone(),
                    left_column: local_key(&entity.name),
                    right_entity: relation.entity.clone(),
                    right_column: foreign_key(&entity.name, name, relation),
                    fields,
                }),
            }
        }
    }

    junctions
}

/// snake_case singular of an entity name, e.g. `BlogPost` -> `blog_post`.
pub(crate) fn entity_singular(name: &str) -> String {
    to_snake_case(name)
}

/// snake_case plural of an entity name, e.g. `BlogPost` -> `blog_posts`.
pub(crate) fn entity_plural(name: &str) -> String {
    pluralize(&entity_singular(name))
}

pub(crate) fn table_name(entity: &Entity) -> String {
    entity
        .table
        .clone()
        .unwrap_or_else(|| entity_plural(&entity.name))
}

pub(crate) fn column_name(field: &str) -> String {
    to_snake_case(field)
}

/// Foreign key column for a relation.
///
/// - hasOne: `<relation>_id` on the owner's table
/// - hasMany: `<owner>_id` on the target's table
/// - belongsToMany: `<target>_id` on the junction table, prefixed with
///   `related_` when an entity relates to itself
///
/// An explicit `field` always wins.
pub(crate) fn foreign_key(owner: &str, relation_name: &str, relation: &Relation) -> String {
    if let Some(field) = &relation.field {
        return field.clone();
    }
    match relation.kind {
        RelationKind::HasOne => format!("{}_id", to_snake_case(relation_name)),
        RelationKind::HasMany => format!("{}_id", entity_singular(owner)),
        RelationKind::BelongsToMany if relation.entity == owner => {
            format!("related_{}_id", entity_singular(owner))
        }
        RelationKind::BelongsToMany => format!("{}_id", entity_singular(&relation.entity)),
    }
}

/// Owner column on a junction table.
pub(crate) fn local_key(owner: &str) -> String {
    format!("{}_id", entity_singular(owner))
}

/// Junction table for a belongsToMany relation: the pivot `table` if given,
/// else both singular names sorted and joined with `_`.
pub(crate) fn junction_name(owner: &str, relation: &Relation) -> String {
    if let Some(table) = relation.pivot.as_ref().and_then(|p| p.table.clone()) {
        return table;
    }
    let mut names = [entity_singular(owner), entity_singular(&relation.entity)];
    names.sort();
    names.join("_")
}

fn default_endpoints(entity: &str) -> ResolvedEndpoints {
    let collection = format!("/{}", to_kebab_case(&entity_plural(entity)));
    let member = format!("{collection}/:id");
    ResolvedEndpoints {
        list: collection.clone(),
        get: member.clone(),
        create: collection,
        update: member.clone(),
        remove: member,
    }
}

fn apply_overrides(defaults: &ResolvedEndpoints, overrides: &Endpoints) -> ResolvedEndpoints {
    let pick = |o: &Option<String>, d: &String| o.clone().unwrap_or_else(|| d.clone());
    ResolvedEndpoints {
        list: pick(&overrides.list, &defaults.list),
        get: pick(&overrides.get, &defaults.get),
        create: pick(&overrides.create, &defaults.create),
        update: pick(&overrides.update, &defaults.update),
        remove: pick(&overrides.remove, &defaults.remove),
    }
}

#[cfg(test)]
mod tests {
    use loam_ir::{DatabaseConfig, Mode, SourceConfig, TenancyConfig};
    use loam_manifest::define::{
        belongs_to_many, computed, entity, has_many, has_one, manifest, number, text,
    };

    use super::*;

    fn blog() -> Manifest {
        manifest()
            .database(DatabaseConfig::sqlite("blog.db"))
            .entity(
                entity("User")
                    .field("displayName", text())
                    .relation("profile", has_one("Profile"))
                    .relation("posts", has_many("BlogPost")),
            )
            .entity(entity("Profile").field("bio", text()))
            .entity(
                entity("BlogPost")
                    .field("title", text())
                    .relation(
                        "tags",
                        belongs_to_many("Tag").pivot_field("order", number()),
                    ),
            )
            .entity(
                entity("Tag")
                    .field("label", text())
                    .relation("posts", belongs_to_many("BlogPost")),
            )
            .build()
    }

    #[test]
    fn test_names() {
        let r = resolve(&blog());
        let post = r.entity("BlogPost").unwrap();

        assert_eq!(post.singular, "blog_post");
        assert_eq!(post.plural, "blog_posts");
        assert_eq!(post.table, "blog_posts");
        assert_eq!(post.endpoints.list, "/blog-posts");
        assert_eq!(post.endpoints.get, "/blog-posts/:id");

        let user = r.entity("User").unwrap();
        assert_eq!(user.fields[0].column, "display_name");
    }

    #[test]
    fn test_foreign_keys() {
        let r = resolve(&blog());
        let user = r.entity("User").unwrap();

        assert_eq!(user.relations[0].foreign_key, "profile_id");
        assert_eq!(user.relations[1].foreign_key, "user_id");
        assert_eq!(user.owned_foreign_keys().count(), 1);

        let tags = &r.entity("BlogPost").unwrap().relations[0];
        assert_eq!(tags.foreign_key, "tag_id");
        assert_eq!(tags.local_key.as_deref(), Some("blog_post_id"));
        assert_eq!(tags.junction.as_deref(), Some("blog_post_tag"));
    }

    #[test]
    fn test_field_override() {
        let m = manifest()
            .entity(entity("User").relation("manager", has_one("User").field("boss_id")))
            .build();
        let r = resolve(&m);
        assert_eq!(r.entities[0].relations[0].foreign_key, "boss_id");
    }

    #[test]
    fn test_junctions_deduplicated() {
        let r = resolve(&blog());

        assert_eq!(r.junctions.len(), 1);
        let junction = &r.junctions[0];
        assert_eq!(
            serde_json::to_string(junction).unwrap(),
            concat!(
                r#"{"name":"blog_post_tag","leftEntity":"BlogPost","leftColumn":"blog_post_id","#,
                r#""rightEntity":"Tag","rightColumn":"tag_id","fields":[{"name":"order","#,
                r#""column":"order","type":"number","required":true,"unique":false,"#,
                r#""default":null,"validations":[]}]}"#
            )
        );
    }

    #[test]
    fn test_self_relation() {
        let m = manifest()
            .entity(entity("User").relation("friends", belongs_to_many("User")))
            .build();
        let r = resolve(&m);

        assert_eq!(r.junctions[0].name, "user_user");
        assert_eq!(r.junctions[0].left_column, "user_id");
        assert_eq!(r.junctions[0].right_column, "related_user_id");
    }

    #[test]
    fn test_source_endpoints() {
        let mut source = SourceConfig::new("https://api.example.com");
        source.endpoints.get = Some("/people/:id".into());
        let m = manifest()
            .mode(Mode::ApiOnly)
            .entity(entity("Person").field("name", text()).source(source))
            .build();
        let r = resolve(&m);
        let person = &r.entities[0];

        assert_eq!(person.endpoints.list, "/people");
        let source = person.source.as_ref().unwrap();
        assert_eq!(source.endpoints.get, "/people/:id");
        assert_eq!(source.endpoints.list, "/people");
        assert!(!r.has_storage());
    }

    #[test]
    fn test_computed_not_input() {
        let m = manifest()
            .entity(
                entity("User")
                    .field("first", text())
                    .field("last", text())
                    .field("full", computed(["first", "last"], "first + ' ' + last")),
            )
            .build();
        let r = resolve(&m);
        let names: Vec<_> = r.entities[0].input_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
    }

    #[test]
    fn test_globals() {
        let m = manifest()
            .tenancy(TenancyConfig {
                enabled: Some(true),
                field: None,
            })
            .build();
        let r = resolve(&m);

        assert!(r.tenancy.enabled);
        assert_eq!(r.tenancy.column, "tenant_id");
        assert_eq!(r.i18n.default_locale, "en");
        assert!(r.observability.logging);
        assert!(!r.auth.enabled);
        assert_eq!(r.mode, Mode::Full);
    }

    #[test]
    fn test_resolve_never_rejects() {
        let m = manifest()
            .entity(entity("post").relation("author", has_one("Ghost")))
            .build();
        let r = resolve(&m);
        assert_eq!(r.entities[0].relations[0].target, "Ghost");
    }
}
