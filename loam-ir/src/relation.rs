use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Field;

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "hasOne",
            RelationKind::HasMany => "hasMany",
            RelationKind::BelongsToMany => "belongsToMany",
        }
    }
}

/// A relation from one entity to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Target entity name
    pub entity: String,
    /// Foreign key column override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Pivot>,
    /// Target lives outside this manifest
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

impl Relation {
    pub fn new(kind: RelationKind, entity: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            field: None,
            pivot: None,
            external: false,
        }
    }
}

/// Junction table settings for a belongsToMany relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pivot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Extra columns stored on the junction table
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Field>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_serialize() {
        let relation = Relation::new(RelationKind::BelongsToMany, "Tag");
        assert_eq!(
            serde_json::to_string(&relation).unwrap(),
            r#"{"type":"belongsToMany","entity":"Tag"}"#
        );

        let external = Relation {
            external: true,
            field: Some("owner_ref".into()),
            ..Relation::new(RelationKind::HasOne, "Account")
        };
        assert_eq!(
            serde_json::to_string(&external).unwrap(),
            r#"{"type":"hasOne","entity":"Account","field":"owner_ref","external":true}"#
        );
    }

    #[test]
    fn test_kind_as_str() {
        let kind: RelationKind = serde_json::from_str(r#""hasMany""#).unwrap();
        assert_eq!(kind.as_str(), "hasMany");
    }
}
