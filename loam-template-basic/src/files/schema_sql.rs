//! Storage schema generator.

use loam_codegen::CodeBuilder;
use loam_ir::{
    DatabaseType, FieldKind, JunctionTable, RelationKind, ResolvedEntity, ResolvedField,
    ResolvedManifest,
};

use super::GENERATED_HEADER;
use crate::type_mapper::{SqlTypeMapper, sql_string};

/// `schema.sql`: one table per entity, junction tables, and an audit log
/// when any entity is audited.
pub struct SchemaSql<'a> {
    manifest: &'a ResolvedManifest,
    types: SqlTypeMapper,
}

impl<'a> SchemaSql<'a> {
    pub fn new(manifest: &'a ResolvedManifest, database: DatabaseType) -> Self {
        Self {
            manifest,
            types: SqlTypeMapper(database),
        }
    }

    pub fn render(&self) -> String {
        let mut builder = CodeBuilder::sql().doc("--", GENERATED_HEADER);

        for entity in &self.manifest.entities {
            builder = self.render_table(builder.blank(), entity);
        }
        for junction in &self.manifest.junctions {
            builder = self.render_junction(builder.blank(), junction);
        }
        if self.manifest.entities.iter().any(|e| e.behaviors.audit) {
            builder = self.render_audit_log(builder.blank());
        }

        builder.build()
    }

    fn render_table(&self, builder: CodeBuilder, entity: &ResolvedEntity) -> CodeBuilder {
        let columns = self.entity_columns(entity);
        builder.block_with_close(&format!("CREATE TABLE {} (", entity.table), ");", |b| {
            b.each(comma_separated(&columns), |b, line| b.line(&line))
        })
    }

    fn entity_columns(&self, entity: &ResolvedEntity) -> Vec<String> {
        let id = self.types.id_type();
        let timestamp = self.types.timestamp_type();
        let mut columns = vec![format!("id {} PRIMARY KEY", id)];

        let tenancy = &self.manifest.tenancy;
        if tenancy.enabled {
            columns.push(format!("{} {} NOT NULL", tenancy.column, id));
        }

        columns.extend(entity.stored_fields().map(|f| self.field_column(f)));

        for relation in entity.owned_foreign_keys() {
            columns.push(format!(
                "{} {}{}",
                relation.foreign_key,
                id,
                self.references(&relation.target)
            ));
        }

        // hasMany relations store their key on the target table.
        for owner in &self.manifest.entities {
            for relation in &owner.relations {
                if relation.kind == RelationKind::HasMany
                    && !relation.external
                    && relation.target == entity.name
                {
                    columns.push(format!(
                        "{} {} REFERENCES {} (id)",
                        relation.foreign_key, id, owner.table
                    ));
                }
            }
        }

        if entity.behaviors.timestamps {
            columns.push(format!(
                "created_at {} NOT NULL DEFAULT CURRENT_TIMESTAMP",
                timestamp
            ));
            columns.push(format!(
                "updated_at {} NOT NULL DEFAULT CURRENT_TIMESTAMP",
                timestamp
            ));
        }
        if entity.behaviors.soft_delete {
            columns.push(format!("deleted_at {}", timestamp));
        }

        columns
    }

    fn field_column(&self, field: &ResolvedField) -> String {
        let mut column = format!("{} {}", field.column, self.types.column_type(field));
        if field.required {
            column.push_str(" NOT NULL");
        }
        if field.unique {
            column.push_str(" UNIQUE");
        }
        if let Some(default) = &field.default {
            column.push_str(" DEFAULT ");
            column.push_str(&self.types.literal(default));
        }
        if let FieldKind::Enum { values } = &field.kind {
            let values: Vec<_> = values.iter().map(|v| sql_string(v)).collect();
            column.push_str(&format!(" CHECK ({} IN ({}))", field.column, values.join(", ")));
        }
        column
    }

    fn render_junction(&self, builder: CodeBuilder, junction: &JunctionTable) -> CodeBuilder {
        let id = self.types.id_type();
        let mut columns = vec![
            format!(
                "{} {} NOT NULL{}",
                junction.left_column,
                id,
                self.references(&junction.left_entity)
            ),
            format!(
                "{} {} NOT NULL{}",
                junction.right_column,
                id,
                self.references(&junction.right_entity)
            ),
        ];
        columns.extend(junction.fields.iter().map(|f| self.field_column(f)));
        columns.push(format!(
            "PRIMARY KEY ({}, {})",
            junction.left_column, junction.right_column
        ));

        builder.block_with_close(&format!("CREATE TABLE {} (", junction.name), ");", |b| {
            b.each(comma_separated(&columns), |b, line| b.line(&line))
        })
    }

    fn render_audit_log(&self, builder: CodeBuilder) -> CodeBuilder {
        let id = self.types.id_type();
        let columns = vec![
            format!("id {} PRIMARY KEY", id),
            "entity TEXT NOT NULL".to_string(),
            format!("record_id {} NOT NULL", id),
            "action TEXT NOT NULL".to_string(),
            format!(
                "changed_at {} NOT NULL DEFAULT CURRENT_TIMESTAMP",
                self.types.timestamp_type()
            ),
        ];
        builder.block_with_close("CREATE TABLE audit_log (", ");", |b| {
            b.each(comma_separated(&columns), |b, line| b.line(&line))
        })
    }

    /// ` REFERENCES <table> (id)`, empty for entities outside the manifest.
    fn references(&self, entity: &str) -> String {
        self.manifest
            .entity(entity)
            .map(|e| format!(" REFERENCES {} (id)", e.table))
            .unwrap_or_default()
    }
}

fn comma_separated(lines: &[String]) -> Vec<String> {
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| if i < last { format!("{},", line) } else { line.clone() })
        .collect()
}
