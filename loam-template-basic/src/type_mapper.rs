//! Field type mapping for SQL dialects and TypeScript.

use loam_ir::{DatabaseType, DefaultValue, FieldKind, ResolvedField, Validation};

/// Column types for one SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTypeMapper(pub DatabaseType);

impl SqlTypeMapper {
    /// Type of `id` and of every column referencing one.
    pub fn id_type(&self) -> &'static str {
        match self.0 {
            DatabaseType::Sqlite | DatabaseType::Postgres => "TEXT",
            DatabaseType::Mysql => "CHAR(36)",
        }
    }

    pub fn timestamp_type(&self) -> &'static str {
        match self.0 {
            DatabaseType::Sqlite => "TEXT",
            DatabaseType::Postgres => "TIMESTAMPTZ",
            DatabaseType::Mysql => "DATETIME",
        }
    }

    pub fn column_type(&self, field: &ResolvedField) -> String {
        match (&field.kind, self.0) {
            (FieldKind::Text | FieldKind::Enum { .. }, DatabaseType::Mysql) => {
                let length = field
                    .validations
                    .iter()
                    .find_map(|v| match v {
                        Validation::Max(n) => Some(*n as u32),
                        _ => None,
                    })
                    .unwrap_or(255);
                format!("VARCHAR({})", length)
            }
            (FieldKind::Text | FieldKind::Enum { .. }, _) => "TEXT".to_string(),
            (FieldKind::Number, dialect) if field.validations.contains(&Validation::Integer) => {
                match dialect {
                    DatabaseType::Mysql => "INT",
                    _ => "INTEGER",
                }
                .to_string()
            }
            (FieldKind::Number, DatabaseType::Sqlite) => "REAL".to_string(),
            (FieldKind::Number, DatabaseType::Postgres) => "DOUBLE PRECISION".to_string(),
            (FieldKind::Number, DatabaseType::Mysql) => "DOUBLE".to_string(),
            (FieldKind::Boolean, DatabaseType::Sqlite) => "INTEGER".to_string(),
            (FieldKind::Boolean, _) => "BOOLEAN".to_string(),
            (FieldKind::Date, _) => self.timestamp_type().to_string(),
            // Computed fields have no column.
            (FieldKind::Computed { .. }, _) => String::new(),
        }
    }

    pub fn literal(&self, value: &DefaultValue) -> String {
        match (value, self.0) {
            (DefaultValue::String(s), _) => sql_string(s),
            (DefaultValue::Int(i), _) => i.to_string(),
            (DefaultValue::Float(f), _) => f.to_string(),
            (DefaultValue::Bool(b), DatabaseType::Sqlite) => u8::from(*b).to_string(),
            (DefaultValue::Bool(true), _) => "TRUE".to_string(),
            (DefaultValue::Bool(false), _) => "FALSE".to_string(),
        }
    }
}

pub fn sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// TypeScript type of a field's value.
pub fn ts_type(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text | FieldKind::Date => "string".to_string(),
        FieldKind::Number => "number".to_string(),
        FieldKind::Boolean => "boolean".to_string(),
        FieldKind::Enum { values } => values
            .iter()
            .map(|v| ts_string(v))
            .collect::<Vec<_>>()
            .join(" | "),
        FieldKind::Computed { .. } => "unknown".to_string(),
    }
}

/// Single-quoted TypeScript string literal.
pub fn ts_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
