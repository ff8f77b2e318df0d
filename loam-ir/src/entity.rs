use indexmap::IndexMap;
use serde::Serialize;

use crate::{Field, Relation, SourceConfig};

/// A named data type with fields, relations and opt-in behaviors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    /// Storage table override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub fields: IndexMap<String, Field>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relations: IndexMap<String, Relation>,
    #[serde(skip_serializing_if = "Behaviors::is_unset")]
    pub behaviors: Behaviors,
    #[serde(rename = "protected", skip_serializing_if = "Option::is_none")]
    pub protection: Option<Protection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: IndexMap::new(),
            relations: IndexMap::new(),
            behaviors: Behaviors::default(),
            protection: None,
            source: None,
        }
    }

    /// Effective protection, all-false when unset.
    pub fn protection(&self) -> Protection {
        self.protection.unwrap_or_default()
    }

    /// Names of fields backed by storage, in declaration order.
    pub fn stored_fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter().filter(|(_, f)| !f.is_computed())
    }
}

/// Cross-cutting behaviors, each a tri-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Behaviors {
    /// Unset resolves to `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    /// Unset resolves to `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete: Option<bool>,
    /// Unset resolves to `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<bool>,
}

impl Behaviors {
    /// Built-in defaults.
    pub const DEFAULT: Behaviors = Behaviors {
        timestamps: Some(true),
        soft_delete: Some(false),
        audit: Some(false),
    };

    pub fn is_unset(&self) -> bool {
        self.timestamps.is_none() && self.soft_delete.is_none() && self.audit.is_none()
    }

    /// Fill unset slots from `fallback`. Values already set on `self` win.
    pub fn or(self, fallback: Behaviors) -> Behaviors {
        Behaviors {
            timestamps: self.timestamps.or(fallback.timestamps),
            soft_delete: self.soft_delete.or(fallback.soft_delete),
            audit: self.audit.or(fallback.audit),
        }
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps.unwrap_or(true)
    }

    pub fn soft_delete(&self) -> bool {
        self.soft_delete.unwrap_or(false)
    }

    pub fn audit(&self) -> bool {
        self.audit.unwrap_or(false)
    }
}

/// A CRUD operation on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Remove,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Remove => "remove",
        }
    }
}

/// Per-operation authentication requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Protection {
    pub list: bool,
    pub get: bool,
    pub create: bool,
    pub update: bool,
    pub remove: bool,
}

impl Protection {
    /// Every operation requires authentication.
    pub const fn all() -> Self {
        Self {
            list: true,
            get: true,
            create: true,
            update: true,
            remove: true,
        }
    }

    /// No operation requires authentication.
    pub const fn none() -> Self {
        Self {
            list: false,
            get: false,
            create: false,
            update: false,
            remove: false,
        }
    }

    /// Reads are public, writes require authentication.
    pub const fn write() -> Self {
        Self {
            list: false,
            get: false,
            create: true,
            update: true,
            remove: true,
        }
    }

    pub fn requires(&self, op: Operation) -> bool {
        match op {
            Operation::List => self.list,
            Operation::Get => self.get,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Remove => self.remove,
        }
    }

    /// Returns true if at least one operation is protected.
    pub fn is_any(&self) -> bool {
        Operation::ALL.iter().any(|op| self.requires(*op))
    }
}

/// Manifest-wide defaults applied beneath per-entity values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityDefaults {
    #[serde(skip_serializing_if = "Behaviors::is_unset")]
    pub behaviors: Behaviors,
    #[serde(rename = "protected", skip_serializing_if = "Option::is_none")]
    pub protection: Option<Protection>,
}

impl EntityDefaults {
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_unset() && self.protection.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldKind;

    #[test]
    fn test_protection_presets() {
        assert!(Protection::all().is_any());
        assert!(!Protection::none().is_any());
        assert_eq!(Protection::default(), Protection::none());

        let write = Protection::write();
        assert!(!write.requires(Operation::List));
        assert!(!write.requires(Operation::Get));
        assert!(write.requires(Operation::Create));
        assert!(write.requires(Operation::Update));
        assert!(write.requires(Operation::Remove));
    }

    #[test]
    fn test_behaviors_precedence() {
        let entity = Behaviors {
            soft_delete: Some(true),
            ..Behaviors::default()
        };
        let defaults = Behaviors {
            timestamps: Some(false),
            soft_delete: Some(false),
            ..Behaviors::default()
        };
        let merged = entity.or(defaults).or(Behaviors::DEFAULT);
        assert_eq!(merged.timestamps, Some(false));
        assert_eq!(merged.soft_delete, Some(true));
        assert_eq!(merged.audit, Some(false));
    }

    #[test]
    fn test_explicit_false_is_not_unset() {
        let explicit = Behaviors {
            timestamps: Some(false),
            ..Behaviors::default()
        };
        assert!(!explicit.is_unset());
        assert!(!explicit.timestamps());
        assert!(Behaviors::default().timestamps());
    }

    #[test]
    fn test_entity_serialize() {
        let mut entity = Entity::new("User");
        entity
            .fields
            .insert("email".into(), Field::new(FieldKind::Text));
        entity.protection = Some(Protection::write());

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["name"], "User");
        assert_eq!(value["fields"]["email"]["type"], "text");
        assert_eq!(value["protected"]["create"], true);
        assert_eq!(value["protected"]["list"], false);
        assert!(value.get("behaviors").is_none());
        assert!(value.get("relations").is_none());
    }
}
