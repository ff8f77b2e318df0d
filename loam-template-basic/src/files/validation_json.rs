//! Input validation rules generator.

use eyre::Result;
use loam_ir::{FieldKind, ResolvedEntity};
use serde_json::{Map, Value, json};

/// `validation/<entity>.json`: the rules a create input must satisfy.
///
/// Update inputs apply the same rules to the fields they carry.
pub struct ValidationJson<'a> {
    entity: &'a ResolvedEntity,
}

impl<'a> ValidationJson<'a> {
    pub fn new(entity: &'a ResolvedEntity) -> Self {
        Self { entity }
    }

    pub fn render(&self) -> Result<String> {
        let mut fields = Map::new();
        for field in self.entity.input_fields() {
            let mut rule = Map::new();
            rule.insert("type".into(), json!(field.kind.type_name()));
            rule.insert("required".into(), json!(field.required));
            if field.unique {
                rule.insert("unique".into(), json!(true));
            }
            if let FieldKind::Enum { values } = &field.kind {
                rule.insert("values".into(), json!(values));
            }
            if let Some(default) = &field.default {
                rule.insert("default".into(), serde_json::to_value(default)?);
            }
            if !field.validations.is_empty() {
                rule.insert("rules".into(), serde_json::to_value(&field.validations)?);
            }
            fields.insert(field.name.clone(), Value::Object(rule));
        }

        let document = json!({
            "entity": self.entity.name,
            "fields": fields,
        });
        let mut out = serde_json::to_string_pretty(&document)?;
        out.push('\n');
        Ok(out)
    }
}
