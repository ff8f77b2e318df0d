use indexmap::IndexMap;

use crate::{Behaviors, Entity, Field, Protection, Relation, SourceConfig};

/// A partial update to an existing entity.
///
/// Fields and relations are merged by name: entries in `fields` and
/// `relations` replace or append, names in the `remove_*` lists are dropped,
/// everything else is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPatch {
    pub fields: IndexMap<String, Field>,
    pub remove_fields: Vec<String>,
    pub relations: IndexMap<String, Relation>,
    pub remove_relations: Vec<String>,
    /// Set slots override, unset slots keep the current value
    pub behaviors: Behaviors,
    pub protection: Option<Protection>,
    pub source: Option<SourceConfig>,
    pub table: Option<String>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        *self == EntityPatch::default()
    }
}

impl Entity {
    /// Return a copy of this entity with `patch` merged in.
    ///
    /// Replaced fields keep their declaration position; new fields are
    /// appended.
    pub fn with_patch(&self, patch: &EntityPatch) -> Entity {
        let mut entity = self.clone();

        for name in &patch.remove_fields {
            entity.fields.shift_remove(name);
        }
        for (name, field) in &patch.fields {
            entity.fields.insert(name.clone(), field.clone());
        }

        for name in &patch.remove_relations {
            entity.relations.shift_remove(name);
        }
        for (name, relation) in &patch.relations {
            entity.relations.insert(name.clone(), relation.clone());
        }

        entity.behaviors = patch.behaviors.or(entity.behaviors);
        if let Some(protection) = patch.protection {
            entity.protection = Some(protection);
        }
        if let Some(source) = &patch.source {
            entity.source = Some(source.clone());
        }
        if let Some(table) = &patch.table {
            entity.table = Some(table.clone());
        }

        entity
    }
}
