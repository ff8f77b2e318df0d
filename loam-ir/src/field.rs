//! Field definitions.

use serde::{Deserialize, Serialize};

/// A single entity field.
///
/// Serializes in canonical document form: `kind` is flattened into a `type`
/// tag next to the field's flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Unset resolves to `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Unset resolves to `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Applied in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<Validation>,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: None,
            unique: None,
            default: None,
            validations: Vec::new(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    pub fn is_unique(&self) -> bool {
        self.unique.unwrap_or(false)
    }

    /// Computed fields have no storage column and never appear in inputs.
    pub fn is_computed(&self) -> bool {
        matches!(self.kind, FieldKind::Computed { .. })
    }
}

/// The closed set of field types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Enum {
        values: Vec<String>,
    },
    Computed {
        #[serde(rename = "sourceFields")]
        source_fields: Vec<String>,
        expression: String,
    },
}

impl FieldKind {
    /// Name used by the document syntax.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Computed { .. } => "computed",
        }
    }
}

/// Input validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum Validation {
    Email,
    Url,
    Regex(String),
    /// Minimum length on text, minimum value on number
    Min(f64),
    /// Maximum length on text, maximum value on number
    Max(f64),
    Integer,
    Positive,
}

impl Validation {
    pub fn rule(&self) -> &'static str {
        match self {
            Validation::Email => "email",
            Validation::Url => "url",
            Validation::Regex(_) => "regex",
            Validation::Min(_) => "min",
            Validation::Max(_) => "max",
            Validation::Integer => "integer",
            Validation::Positive => "positive",
        }
    }

    /// Rules that only make sense on text fields.
    pub fn is_text_only(&self) -> bool {
        matches!(
            self,
            Validation::Email | Validation::Url | Validation::Regex(_)
        )
    }

    /// Rules that only make sense on number fields.
    pub fn is_number_only(&self) -> bool {
        matches!(self, Validation::Integer | Validation::Positive)
    }
}

/// A literal default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl DefaultValue {
    /// Convert to a string representation suitable for code generation.
    pub fn to_code_string(&self) -> String {
        match self {
            Self::String(s) => format!("{:?}", s),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for DefaultValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for DefaultValue {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<f64> for DefaultValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for DefaultValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults() {
        let field = Field::new(FieldKind::Text);
        assert!(field.is_required());
        assert!(!field.is_unique());
        assert!(!field.is_computed());

        let optional = Field {
            required: Some(false),
            ..Field::new(FieldKind::Number)
        };
        assert!(!optional.is_required());
    }

    #[test]
    fn test_field_serialize_canonical() {
        let field = Field {
            unique: Some(true),
            validations: vec![Validation::Email, Validation::Min(3.0)],
            ..Field::new(FieldKind::Text)
        };
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(
            json,
            r#"{"type":"text","unique":true,"validations":[{"rule":"email"},{"rule":"min","value":3.0}]}"#
        );
    }

    #[test]
    fn test_computed_serialize() {
        let field = Field::new(FieldKind::Computed {
            source_fields: vec!["firstName".into(), "lastName".into()],
            expression: "firstName + ' ' + lastName".into(),
        });
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "computed");
        assert_eq!(value["sourceFields"][1], "lastName");
    }

    #[test]
    fn test_validation_deserialize() {
        let rules: Vec<Validation> =
            serde_json::from_str(r#"[{"rule":"regex","value":"^a"},{"rule":"positive"}]"#)
                .unwrap();
        assert_eq!(
            rules,
            vec![Validation::Regex("^a".into()), Validation::Positive]
        );
    }

    #[test]
    fn test_default_value() {
        let value: DefaultValue = serde_json::from_str("3").unwrap();
        assert_eq!(value, DefaultValue::Int(3));
        let value: DefaultValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(value, DefaultValue::Float(2.5));
        assert_eq!(DefaultValue::String("draft".into()).to_code_string(), "\"draft\"");
        assert_eq!(DefaultValue::Bool(true).to_code_string(), "true");
    }
}
