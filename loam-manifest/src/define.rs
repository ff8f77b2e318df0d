//! Fluent builder front-end.
//!
//! Every method consumes the builder and returns the updated value. Builders
//! are plain `Clone` values with no shared state, so a partially built
//! definition can be cloned and reused freely.
//!
//! ```
//! use loam_manifest::define::{entity, has_many, manifest, text};
//!
//! let email = text().unique().email();
//! let user = entity("User")
//!     .field("email", email.clone())
//!     .field("backupEmail", email.optional())
//!     .relation("posts", has_many("Post"));
//!
//! let m = manifest().entity(user).build();
//! assert_eq!(m.entities[0].fields.len(), 2);
//! assert!(m.entities[0].fields["email"].is_required());
//! assert!(!m.entities[0].fields["backupEmail"].is_required());
//! ```

use loam_ir::{
    AuthConfig, Behaviors, DatabaseConfig, DefaultValue, Entity, EntityDefaults, Field, FieldKind,
    I18nConfig, Manifest, Mode, ObservabilityConfig, Pivot, Protection, Relation, RelationKind,
    SourceConfig, TenancyConfig, Validation,
};

/// Field definition under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef(Field);

pub fn text() -> FieldDef {
    FieldDef(Field::new(FieldKind::Text))
}

pub fn number() -> FieldDef {
    FieldDef(Field::new(FieldKind::Number))
}

pub fn boolean() -> FieldDef {
    FieldDef(Field::new(FieldKind::Boolean))
}

pub fn date() -> FieldDef {
    FieldDef(Field::new(FieldKind::Date))
}

pub fn enumeration<I, S>(values: I) -> FieldDef
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FieldDef(Field::new(FieldKind::Enum {
        values: values.into_iter().map(Into::into).collect(),
    }))
}

/// A field derived from other fields; it has no storage and is never input.
pub fn computed<I, S>(source_fields: I, expression: impl Into<String>) -> FieldDef
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FieldDef(Field::new(FieldKind::Computed {
        source_fields: source_fields.into_iter().map(Into::into).collect(),
        expression: expression.into(),
    }))
}

impl FieldDef {
    pub fn required(mut self) -> Self {
        self.0.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.0.required = Some(false);
        self
    }

    pub fn unique(mut self) -> Self {
        self.0.unique = Some(true);
        self
    }

    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.0.default = Some(value.into());
        self
    }

    pub fn validate(mut self, rule: Validation) -> Self {
        self.0.validations.push(rule);
        self
    }

    pub fn email(self) -> Self {
        self.validate(Validation::Email)
    }

    pub fn url(self) -> Self {
        self.validate(Validation::Url)
    }

    pub fn regex(self, pattern: impl Into<String>) -> Self {
        self.validate(Validation::Regex(pattern.into()))
    }

    pub fn min(self, n: f64) -> Self {
        self.validate(Validation::Min(n))
    }

    pub fn max(self, n: f64) -> Self {
        self.validate(Validation::Max(n))
    }

    pub fn integer(self) -> Self {
        self.validate(Validation::Integer)
    }

    pub fn positive(self) -> Self {
        self.validate(Validation::Positive)
    }

    pub fn build(self) -> Field {
        self.0
    }
}

impl From<FieldDef> for Field {
    fn from(def: FieldDef) -> Self {
        def.0
    }
}

/// Relation definition under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDef(Relation);

pub fn has_one(entity: impl Into<String>) -> RelationDef {
    RelationDef(Relation::new(RelationKind::HasOne, entity))
}

pub fn has_many(entity: impl Into<String>) -> RelationDef {
    RelationDef(Relation::new(RelationKind::HasMany, entity))
}

pub fn belongs_to_many(entity: impl Into<String>) -> RelationDef {
    RelationDef(Relation::new(RelationKind::BelongsToMany, entity))
}

impl RelationDef {
    /// Override the foreign key column.
    pub fn field(mut self, column: impl Into<String>) -> Self {
        self.0.field = Some(column.into());
        self
    }

    /// Mark the target as living outside this manifest.
    pub fn external(mut self) -> Self {
        self.0.external = true;
        self
    }

    pub fn pivot_table(mut self, table: impl Into<String>) -> Self {
        self.0.pivot.get_or_insert_with(Pivot::default).table = Some(table.into());
        self
    }

    pub fn pivot_field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.0
            .pivot
            .get_or_insert_with(Pivot::default)
            .fields
            .insert(name.into(), field.into());
        self
    }

    pub fn build(self) -> Relation {
        self.0
    }
}

impl From<RelationDef> for Relation {
    fn from(def: RelationDef) -> Self {
        def.0
    }
}

/// Entity definition under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef(Entity);

pub fn entity(name: impl Into<String>) -> EntityDef {
    EntityDef(Entity::new(name))
}

impl EntityDef {
    /// Add or replace a field.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.0.fields.insert(name.into(), field.into());
        self
    }

    /// Add or replace a relation.
    pub fn relation(mut self, name: impl Into<String>, relation: impl Into<Relation>) -> Self {
        self.0.relations.insert(name.into(), relation.into());
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.0.behaviors.timestamps = Some(enabled);
        self
    }

    pub fn soft_delete(mut self, enabled: bool) -> Self {
        self.0.behaviors.soft_delete = Some(enabled);
        self
    }

    pub fn audit(mut self, enabled: bool) -> Self {
        self.0.behaviors.audit = Some(enabled);
        self
    }

    pub fn protected(mut self, protection: Protection) -> Self {
        self.0.protection = Some(protection);
        self
    }

    pub fn source(mut self, source: SourceConfig) -> Self {
        self.0.source = Some(source);
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.0.table = Some(table.into());
        self
    }

    pub fn build(self) -> Entity {
        self.0
    }
}

impl From<EntityDef> for Entity {
    fn from(def: EntityDef) -> Self {
        def.0
    }
}

/// Manifest definition under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestDef(Manifest);

pub fn manifest() -> ManifestDef {
    ManifestDef::default()
}

impl ManifestDef {
    /// Append an entity; declaration order is preserved.
    pub fn entity(mut self, entity: impl Into<Entity>) -> Self {
        self.0.entities.push(entity.into());
        self
    }

    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.0.database = Some(database);
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.0.auth = Some(auth);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.0.mode = Some(mode);
        self
    }

    pub fn i18n(mut self, i18n: I18nConfig) -> Self {
        self.0.i18n = Some(i18n);
        self
    }

    pub fn tenancy(mut self, tenancy: TenancyConfig) -> Self {
        self.0.tenancy = Some(tenancy);
        self
    }

    pub fn observability(mut self, observability: ObservabilityConfig) -> Self {
        self.0.observability = Some(observability);
        self
    }

    /// Manifest-wide behavior defaults beneath per-entity values.
    pub fn default_behaviors(mut self, behaviors: Behaviors) -> Self {
        self.0
            .defaults
            .get_or_insert_with(EntityDefaults::default)
            .behaviors = behaviors;
        self
    }

    /// Manifest-wide protection for entities that declare none.
    pub fn default_protection(mut self, protection: Protection) -> Self {
        self.0
            .defaults
            .get_or_insert_with(EntityDefaults::default)
            .protection = Some(protection);
        self
    }

    pub fn source(mut self, source: SourceConfig) -> Self {
        self.0.source = Some(source);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.0.template = Some(template.into());
        self
    }

    pub fn build(self) -> Manifest {
        self.0
    }
}

impl From<ManifestDef> for Manifest {
    fn from(def: ManifestDef) -> Self {
        def.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_do_not_alias() {
        let base = text().unique();
        let a = base.clone().email();
        let b = base.clone().optional();

        assert!(base.clone().build().validations.is_empty());
        assert_eq!(a.build().validations, vec![Validation::Email]);
        assert_eq!(b.build().required, Some(false));
        assert_eq!(base.build().required, None);
    }

    #[test]
    fn test_entity_def() {
        let post = entity("Post")
            .field("title", text().min(3.0).max(120.0))
            .field("views", number().integer().default(0))
            .field("status", enumeration(["draft", "published"]).default("draft"))
            .relation("tags", belongs_to_many("Tag").pivot_field("order", number()))
            .soft_delete(true)
            .protected(Protection::write())
            .build();

        assert_eq!(post.fields.len(), 3);
        assert_eq!(post.fields["views"].default, Some(DefaultValue::Int(0)));
        assert_eq!(post.behaviors.soft_delete, Some(true));
        assert_eq!(post.behaviors.timestamps, None);
        let pivot = post.relations["tags"].pivot.as_ref().unwrap();
        assert!(pivot.fields.contains_key("order"));
    }

    #[test]
    fn test_computed_field() {
        let field = computed(["firstName", "lastName"], "firstName + ' ' + lastName").build();
        assert!(field.is_computed());
    }

    #[test]
    fn test_manifest_def() {
        let m = manifest()
            .database(DatabaseConfig::sqlite("app.db"))
            .entity(entity("User"))
            .entity(entity("Post"))
            .default_protection(Protection::all())
            .build();
        assert_eq!(m.entity_names(), vec!["User", "Post"]);
        assert_eq!(
            m.defaults.and_then(|d| d.protection),
            Some(Protection::all())
        );
    }
}
