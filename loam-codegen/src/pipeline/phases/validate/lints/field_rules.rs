//! Lint for type-specific field rules.

use std::collections::HashSet;

use indexmap::IndexMap;
use loam_ir::{DefaultValue, Field, FieldKind, Manifest, Validation};
use regex::Regex;

use super::super::Lint;
use crate::pipeline::{Diagnostic, DiagnosticCode};

/// Lint that checks validations, enum values, defaults and computed sources
/// against each field's type.
///
/// `min`/`max` are lengths on text fields (non-negative integers) and
/// values on number fields. Every other validation belongs to exactly one
/// of the two types.
pub struct FieldRulesLint;

impl Lint for FieldRulesLint {
    fn name(&self) -> &'static str {
        "field-rules"
    }

    fn description(&self) -> &'static str {
        "Check validations, enum values, defaults and computed fields against field types"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for entity in &manifest.entities {
            check_fields(
                &entity.fields,
                &format!("{}.fields", entity.name),
                diagnostics,
            );
            for (name, relation) in &entity.relations {
                if let Some(pivot) = &relation.pivot {
                    check_fields(
                        &pivot.fields,
                        &format!("{}.relations.{}.pivot.fields", entity.name, name),
                        diagnostics,
                    );
                }
            }
        }
    }
}

fn check_fields(
    fields: &IndexMap<String, Field>,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, field) in fields {
        let path = format!("{}.{}", prefix, name);
        check_validations(field, &path, diagnostics);
        check_enum(field, &path, diagnostics);
        check_default(field, &path, diagnostics);
        check_computed(field, fields, &path, diagnostics);
    }
}

fn check_validations(field: &Field, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let is_text = field.kind == FieldKind::Text;
    let is_number = field.kind == FieldKind::Number;
    let mut min = None;
    let mut max = None;

    for (j, validation) in field.validations.iter().enumerate() {
        let rule_path = format!("{}.validations[{}]", path, j);
        let legal = match validation {
            Validation::Email | Validation::Url | Validation::Regex(_) => is_text,
            Validation::Integer | Validation::Positive => is_number,
            Validation::Min(_) | Validation::Max(_) => is_text || is_number,
        };
        if !legal {
            let expected = if validation.is_text_only() {
                "text"
            } else if validation.is_number_only() {
                "number"
            } else {
                "text or number"
            };
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ValidationTypeMismatch,
                    format!(
                        "'{}' validation applies to {} fields, not {}",
                        validation.rule(),
                        expected,
                        field.kind.type_name()
                    ),
                )
                .at(rule_path)
                .suggest(format!("remove '{}' or change the field type", validation.rule())),
            );
            continue;
        }

        match validation {
            Validation::Regex(pattern) => {
                if let Err(err) = Regex::new(pattern) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::InvalidRegex,
                            format!(
                                "regex '{}' does not compile: {}",
                                pattern,
                                regex_error_summary(&err)
                            ),
                        )
                        .at(rule_path),
                    );
                }
            }
            Validation::Min(n) | Validation::Max(n) => {
                if !n.is_finite() || (is_text && (*n < 0.0 || n.fract() != 0.0)) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::InvalidValidationRange,
                            format!(
                                "'{}' of {} is not a valid {}",
                                validation.rule(),
                                n,
                                if is_text { "length" } else { "value" }
                            ),
                        )
                        .at(rule_path),
                    );
                    continue;
                }
                if matches!(validation, Validation::Min(_)) {
                    min.get_or_insert(*n);
                } else {
                    max.get_or_insert(*n);
                }
            }
            _ => {}
        }
    }

    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::InvalidValidationRange,
                format!("min {} is greater than max {}", min, max),
            )
            .at(format!("{}.validations", path)),
        );
    }
}

fn regex_error_summary(err: &regex::Error) -> String {
    err.to_string()
        .lines()
        .last()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn check_enum(field: &Field, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let FieldKind::Enum { values } = &field.kind else {
        return;
    };

    if values.is_empty() {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::InvalidEnum, "enum field declares no values")
                .at(format!("{}.values", path)),
        );
        return;
    }

    let mut seen = HashSet::new();
    for (i, value) in values.iter().enumerate() {
        if !seen.insert(value.as_str()) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::InvalidEnum,
                    format!("enum value '{}' is declared more than once", value),
                )
                .at(format!("{}.values[{}]", path, i)),
            );
        }
    }
}

fn check_default(field: &Field, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let Some(default) = &field.default else {
        return;
    };

    let problem = match (&field.kind, default) {
        (FieldKind::Computed { .. }, _) => {
            Some("computed fields cannot have a default".to_string())
        }
        (FieldKind::Text | FieldKind::Date, DefaultValue::String(_)) => None,
        (FieldKind::Number, DefaultValue::Int(_) | DefaultValue::Float(_)) => None,
        (FieldKind::Boolean, DefaultValue::Bool(_)) => None,
        (FieldKind::Enum { values }, DefaultValue::String(s)) => (!values.contains(s))
            .then(|| format!("default '{}' is not one of the enum values", s)),
        (kind, value) => Some(format!(
            "default {} does not match field type {}",
            value.to_code_string(),
            kind.type_name()
        )),
    };

    if let Some(message) = problem {
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::InvalidDefault, message)
                .at(format!("{}.default", path)),
        );
    }
}

fn check_computed(
    field: &Field,
    siblings: &IndexMap<String, Field>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let FieldKind::Computed { source_fields, .. } = &field.kind else {
        return;
    };

    for (i, source) in source_fields.iter().enumerate() {
        let message = match siblings.get(source) {
            None => format!("computed field source '{}' does not exist", source),
            Some(f) if f.is_computed() => {
                format!("computed field source '{}' is itself computed", source)
            }
            Some(_) => continue,
        };
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::ComputedSourceNotFound, message)
                .at(format!("{}.sourceFields[{}]", path, i)),
        );
    }
}

#[cfg(test)]
mod tests {
    use loam_manifest::define::{
        boolean, computed, date, entity, enumeration, manifest, number, text,
    };

    use super::*;

    fn check(m: Manifest) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        FieldRulesLint.check(&m, &mut diagnostics);
        diagnostics
    }

    fn codes(diags: &[Diagnostic]) -> Vec<(DiagnosticCode, &str)> {
        diags.iter().map(|d| (d.code, d.path.as_str())).collect()
    }

    #[test]
    fn test_valid_fields() {
        let m = manifest()
            .entity(
                entity("User")
                    .field("email", text().email().min(3.0).max(255.0))
                    .field("site", text().url().regex("^https://"))
                    .field("age", number().integer().positive().min(0.0).max(150.0))
                    .field("score", number().min(-1.5).default(0.5))
                    .field("role", enumeration(["user", "admin"]).default("user"))
                    .field("active", boolean().default(true))
                    .field("born", date().default("2000-01-01"))
                    .field("label", computed(["email", "role"], "email + role")),
            )
            .build();
        assert!(check(m).is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let m = manifest()
            .entity(
                entity("User")
                    .field("age", number().email())
                    .field("name", text().integer())
                    .field("active", boolean().min(1.0)),
            )
            .build();
        let diags = check(m);

        assert_eq!(
            codes(&diags),
            vec![
                (DiagnosticCode::ValidationTypeMismatch, "User.fields.age.validations[0]"),
                (DiagnosticCode::ValidationTypeMismatch, "User.fields.name.validations[0]"),
                (DiagnosticCode::ValidationTypeMismatch, "User.fields.active.validations[0]"),
            ]
        );
        assert_eq!(
            diags[0].message,
            "'email' validation applies to text fields, not number"
        );
    }

    #[test]
    fn test_ranges() {
        let m = manifest()
            .entity(
                entity("User")
                    .field("name", text().min(10.0).max(5.0))
                    .field("code", text().min(-1.0).max(2.5))
                    .field("delta", number().min(-10.0).max(-20.0)),
            )
            .build();
        assert_eq!(
            codes(&check(m)),
            vec![
                (DiagnosticCode::InvalidValidationRange, "User.fields.name.validations"),
                (DiagnosticCode::InvalidValidationRange, "User.fields.code.validations[0]"),
                (DiagnosticCode::InvalidValidationRange, "User.fields.code.validations[1]"),
                (DiagnosticCode::InvalidValidationRange, "User.fields.delta.validations"),
            ]
        );
    }

    #[test]
    fn test_invalid_regex() {
        let m = manifest()
            .entity(entity("User").field("code", text().regex("([a-z")))
            .build();
        assert_eq!(
            codes(&check(m)),
            vec![(DiagnosticCode::InvalidRegex, "User.fields.code.validations[0]")]
        );
    }

    #[test]
    fn test_enums() {
        let m = manifest()
            .entity(
                entity("Post")
                    .field("status", enumeration(["draft", "live", "draft"]))
                    .field("kind", enumeration(Vec::<String>::new())),
            )
            .build();
        assert_eq!(
            codes(&check(m)),
            vec![
                (DiagnosticCode::InvalidEnum, "Post.fields.status.values[2]"),
                (DiagnosticCode::InvalidEnum, "Post.fields.kind.values"),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let m = manifest()
            .entity(
                entity("Post")
                    .field("views", number().default("many"))
                    .field("status", enumeration(["draft"]).default("archived"))
                    .field("title", text())
                    .field("slug", computed(["title"], "slugify(title)").default("x")),
            )
            .build();
        let diags = check(m);

        assert_eq!(
            codes(&diags),
            vec![
                (DiagnosticCode::InvalidDefault, "Post.fields.views.default"),
                (DiagnosticCode::InvalidDefault, "Post.fields.status.default"),
                (DiagnosticCode::InvalidDefault, "Post.fields.slug.default"),
            ]
        );
        assert_eq!(
            diags[0].message,
            "default \"many\" does not match field type number"
        );
    }

    #[test]
    fn test_computed_sources() {
        let m = manifest()
            .entity(
                entity("User")
                    .field("first", text())
                    .field("full", computed(["first", "last"], "first + last"))
                    .field("shout", computed(["full"], "upper(full)")),
            )
            .build();
        assert_eq!(
            codes(&check(m)),
            vec![
                (DiagnosticCode::ComputedSourceNotFound, "User.fields.full.sourceFields[1]"),
                (DiagnosticCode::ComputedSourceNotFound, "User.fields.shout.sourceFields[0]"),
            ]
        );
    }
}
