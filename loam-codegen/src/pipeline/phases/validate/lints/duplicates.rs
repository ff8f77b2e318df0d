//! Lint for duplicate entities, columns and tables.

use std::collections::{HashMap, HashSet};

use loam_ir::{Entity, Manifest, RelationKind};

use super::super::Lint;
use crate::pipeline::{
    Diagnostic, DiagnosticCode,
    phases::resolve::{column_name, entity_singular, foreign_key, junction_name, table_name},
};

/// Lint that errors on names declared twice.
///
/// Checks entity names and their snake_case forms, field and relation names
/// within an entity, the storage columns each table ends up with (generated
/// columns, fields and foreign keys, including keys contributed by other
/// entities' hasMany relations), reserved column names, and storage table
/// names.
pub struct DuplicatesLint;

impl Lint for DuplicatesLint {
    fn name(&self) -> &'static str {
        "duplicates"
    }

    fn description(&self) -> &'static str {
        "Detect duplicate entities, fields, columns and tables"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        let unique = check_entities(manifest, diagnostics);

        for &index in &unique {
            let entity = &manifest.entities[index];

            for name in entity.relations.keys() {
                if entity.fields.contains_key(name) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateField,
                            format!(
                                "relation '{}' on '{}' has the same name as a field",
                                name, entity.name
                            ),
                        )
                        .at(format!("{}.relations.{}", entity.name, name))
                        .suggest("rename the relation or the field"),
                    );
                }
            }

            check_reserved(manifest, index, diagnostics);
            check_columns(manifest, index, diagnostics);
        }

        let distinct = check_singulars(manifest, &unique, diagnostics);
        check_tables(manifest, &distinct, diagnostics);
    }
}

/// Report repeated entity names and return the indices of first declarations.
fn check_entities(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for (i, entity) in manifest.entities.iter().enumerate() {
        if seen.insert(entity.name.as_str()) {
            unique.push(i);
        } else {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateEntity,
                    format!("entity '{}' is declared more than once", entity.name),
                )
                .at(format!("entities[{}]", i)),
            );
        }
    }

    unique
}

/// Columns every table of `entity` gets regardless of its fields, with the
/// feature that owns each one.
fn generated_columns(manifest: &Manifest, entity: &Entity) -> Vec<(String, &'static str)> {
    let mut columns = vec![("id".to_string(), "the primary key")];
    if let Some(field) = tenant_field(manifest) {
        columns.push((column_name(field), "tenancy"));
    }
    if entity.behaviors.timestamps() {
        columns.push(("created_at".to_string(), "the timestamps behavior"));
        columns.push(("updated_at".to_string(), "the timestamps behavior"));
    }
    if entity.behaviors.soft_delete() {
        columns.push(("deleted_at".to_string(), "the softDelete behavior"));
    }
    columns
}

fn tenant_field(manifest: &Manifest) -> Option<&str> {
    let tenancy = manifest.tenancy.as_ref()?;
    if !tenancy.enabled.unwrap_or(false) {
        return None;
    }
    Some(tenancy.field.as_deref().unwrap_or("tenantId"))
}

fn check_reserved(manifest: &Manifest, index: usize, diagnostics: &mut Vec<Diagnostic>) {
    let entity = &manifest.entities[index];
    let generated = generated_columns(manifest, entity);

    for name in entity.fields.keys() {
        // The configuration lint reports the tenant field itself.
        if tenant_field(manifest) == Some(name.as_str()) {
            continue;
        }
        let column = column_name(name);
        let Some((_, owner)) = generated.iter().find(|(c, _)| *c == column) else {
            continue;
        };

        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::ReservedFieldName,
                format!(
                    "field '{}' on '{}' is reserved for {}",
                    name, entity.name, owner
                ),
            )
            .at(format!("{}.fields.{}", entity.name, name)),
        );
    }
}

/// Check the columns stored on one entity's table.
///
/// Columns come from the generated columns, then stored fields, then hasOne
/// foreign keys, then hasMany foreign keys that other entities place on this
/// table. Fields that land on a generated column are left to
/// [`check_reserved`].
fn check_columns(manifest: &Manifest, index: usize, diagnostics: &mut Vec<Diagnostic>) {
    let entity = &manifest.entities[index];
    let mut columns: HashMap<String, String> = HashMap::new();
    for (column, owner) in generated_columns(manifest, entity) {
        columns.insert(column, owner.to_string());
    }
    let reserved: HashSet<String> = columns.keys().cloned().collect();

    let mut add = |column: String, origin: String, path: String| {
        if let Some(first) = columns.get(&column) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateField,
                    format!(
                        "column '{}' on '{}' is defined by both {} and {}",
                        column, entity.name, first, origin
                    ),
                )
                .at(path)
                .suggest("set an explicit foreign key with 'field' or rename the field"),
            );
        } else {
            columns.insert(column, origin);
        }
    };

    for (name, _) in entity.stored_fields() {
        let column = column_name(name);
        if reserved.contains(&column) {
            continue;
        }
        add(
            column,
            format!("field '{}'", name),
            format!("{}.fields.{}", entity.name, name),
        );
    }

    for (name, relation) in &entity.relations {
        if relation.kind == RelationKind::HasOne {
            add(
                foreign_key(&entity.name, name, relation),
                format!("relation '{}'", name),
                format!("{}.relations.{}", entity.name, name),
            );
        }
    }

    for owner in &manifest.entities {
        for (name, relation) in &owner.relations {
            if relation.kind == RelationKind::HasMany
                && !relation.external
                && relation.entity == entity.name
            {
                add(
                    foreign_key(&owner.name, name, relation),
                    format!("relation '{}.{}'", owner.name, name),
                    format!("{}.relations.{}", owner.name, name),
                );
            }
        }
    }
}

/// Report entities whose snake_case names collide. Generated file paths are
/// keyed on that form, so the later entity is reported even when its table
/// differs. Returns the indices that remain distinct.
fn check_singulars(
    manifest: &Manifest,
    unique: &[usize],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<usize> {
    let mut singulars: HashMap<String, &str> = HashMap::new();
    let mut distinct = Vec::new();

    for &index in unique {
        let entity = &manifest.entities[index];
        let singular = entity_singular(&entity.name);
        match singulars.get(&singular) {
            Some(first) => diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateEntity,
                    format!(
                        "entity '{}' has the same snake_case name '{}' as '{}'",
                        entity.name, singular, first
                    ),
                )
                .at(format!("entities[{}]", index))
                .suggest("rename one of the entities"),
            ),
            None => {
                singulars.insert(singular, entity.name.as_str());
                distinct.push(index);
            }
        }
    }

    distinct
}

fn check_tables(manifest: &Manifest, unique: &[usize], diagnostics: &mut Vec<Diagnostic>) {
    let mut tables: HashMap<String, &str> = HashMap::new();

    for &index in unique {
        let entity = &manifest.entities[index];
        let table = table_name(entity);
        match tables.get(&table) {
            Some(first) => diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateTable,
                    format!(
                        "entity '{}' uses table '{}', already used by '{}'",
                        entity.name, table, first
                    ),
                )
                .at(format!("{}.table", entity.name))
                .suggest("set a distinct 'table' name"),
            ),
            None => {
                tables.insert(table, entity.name.as_str());
            }
        }
    }

    let mut reported = HashSet::new();
    for &index in unique {
        let entity = &manifest.entities[index];
        for (name, relation) in &entity.relations {
            if relation.kind != RelationKind::BelongsToMany {
                continue;
            }
            let junction = junction_name(&entity.name, relation);
            if let Some(owner) = tables.get(&junction)
                && reported.insert(junction.clone())
            {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::DuplicateTable,
                        format!(
                            "junction table '{}' for '{}.{}' collides with the table of '{}'",
                            junction, entity.name, name, owner
                        ),
                    )
                    .at(format!("{}.relations.{}", entity.name, name))
                    .suggest("set a distinct 'pivot.table' name"),
                );
            }
        }
    }
}
