//! Resolved manifest consumed by templates.
//!
//! Every default is applied and every derived name (tables, columns, foreign
//! keys, junction tables, endpoints) is computed, so templates never repeat
//! naming logic.

use serde::Serialize;

use crate::{DatabaseConfig, DefaultValue, FieldKind, Mode, Protection, RelationKind, Validation};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedManifest {
    /// Entities in declaration order
    pub entities: Vec<ResolvedEntity>,
    /// Junction tables in first-declaration order, deduplicated by name
    pub junctions: Vec<JunctionTable>,
    pub database: Option<DatabaseConfig>,
    pub auth: ResolvedAuth,
    pub mode: Mode,
    pub i18n: ResolvedI18n,
    pub tenancy: ResolvedTenancy,
    pub observability: ResolvedObservability,
    pub template: Option<String>,
}

impl ResolvedManifest {
    pub fn entity(&self, name: &str) -> Option<&ResolvedEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Returns true if generated output includes a storage layer.
    pub fn has_storage(&self) -> bool {
        self.mode != Mode::ApiOnly
    }

    /// Returns true if generated output includes client bindings.
    pub fn has_client(&self) -> bool {
        self.mode == Mode::Full
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAuth {
    pub enabled: bool,
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedI18n {
    pub default_locale: String,
    pub locales: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTenancy {
    pub enabled: bool,
    pub field: String,
    /// Storage column for `field`
    pub column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedObservability {
    pub logging: bool,
    pub metrics: bool,
    pub tracing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntity {
    /// PascalCase entity name
    pub name: String,
    /// snake_case singular, e.g. `blog_post`
    pub singular: String,
    /// snake_case plural, e.g. `blog_posts`
    pub plural: String,
    pub table: String,
    pub fields: Vec<ResolvedField>,
    pub relations: Vec<ResolvedRelation>,
    pub behaviors: ResolvedBehaviors,
    pub protection: Protection,
    /// Route paths the generated API serves this entity on
    pub endpoints: ResolvedEndpoints,
    /// External API this entity is read from
    pub source: Option<ResolvedSource>,
}

impl ResolvedEntity {
    /// Fields with a storage column.
    pub fn stored_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.is_stored())
    }

    /// Fields accepted by create and update inputs.
    pub fn input_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.stored_fields()
    }

    /// Foreign key columns stored on this entity's own table.
    pub fn owned_foreign_keys(&self) -> impl Iterator<Item = &ResolvedRelation> {
        self.relations
            .iter()
            .filter(|r| r.kind == RelationKind::HasOne)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    /// camelCase field name
    pub name: String,
    /// snake_case storage column
    pub column: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub validations: Vec<Validation>,
}

impl ResolvedField {
    pub fn is_stored(&self) -> bool {
        !matches!(self.kind, FieldKind::Computed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRelation {
    pub name: String,
    pub kind: RelationKind,
    /// Target entity name
    pub target: String,
    /// Column referencing the target (hasOne, belongsToMany) or the owner
    /// (hasMany, stored on the target table)
    pub foreign_key: String,
    /// Owner column on the junction table (belongsToMany only)
    pub local_key: Option<String>,
    /// Junction table name (belongsToMany only)
    pub junction: Option<String>,
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JunctionTable {
    pub name: String,
    pub left_entity: String,
    pub left_column: String,
    pub right_entity: String,
    pub right_column: String,
    /// Extra pivot columns
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBehaviors {
    pub timestamps: bool,
    pub soft_delete: bool,
    pub audit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoints {
    pub list: String,
    pub get: String,
    pub create: String,
    pub update: String,
    pub remove: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSource {
    pub base_url: String,
    /// Remote paths, overrides applied over the derived defaults
    pub endpoints: ResolvedEndpoints,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, kind: FieldKind) -> ResolvedField {
        ResolvedField {
            name: name.into(),
            column: name.into(),
            kind,
            required: true,
            unique: false,
            default: None,
            validations: vec![],
        }
    }

    #[test]
    fn test_computed_excluded_from_inputs() {
        let fields = vec![
            field("first", FieldKind::Text),
            field(
                "full",
                FieldKind::Computed {
                    source_fields: vec!["first".into()],
                    expression: "first".into(),
                },
            ),
        ];
        let stored: Vec<_> = fields.iter().filter(|f| f.is_stored()).collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "first");
    }
}
