//! Lint for entity, field and relation name casing.

use loam_core::{is_camel_case, is_pascal_case, to_camel_case, to_pascal_case};
use loam_ir::Manifest;

use super::super::Lint;
use crate::pipeline::{Diagnostic, DiagnosticCode};

/// Lint that errors on names that break casing conventions.
///
/// Entity names are PascalCase (`BlogPost`). Field and relation names are
/// camelCase (`createdAt`, `posts`).
pub struct NamingLint;

impl Lint for NamingLint {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn description(&self) -> &'static str {
        "Check entity, field and relation names follow casing conventions"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for (i, entity) in manifest.entities.iter().enumerate() {
            if !is_pascal_case(&entity.name) {
                let mut diag = Diagnostic::new(
                    DiagnosticCode::InvalidEntityName,
                    format!("entity name '{}' must be PascalCase", entity.name),
                )
                .at(format!("entities[{}].name", i));
                let fixed = to_pascal_case(&entity.name);
                if is_pascal_case(&fixed) {
                    diag = diag.suggest(format!("rename to '{}'", fixed));
                }
                diagnostics.push(diag);
            }

            for name in entity.fields.keys() {
                check_field_name(name, format!("{}.fields.{}", entity.name, name), diagnostics);
            }

            for (name, relation) in &entity.relations {
                let path = format!("{}.relations.{}", entity.name, name);
                if !is_camel_case(name) {
                    diagnostics.push(with_camel_suggestion(
                        Diagnostic::new(
                            DiagnosticCode::InvalidRelationName,
                            format!("relation name '{}' must be camelCase", name),
                        )
                        .at(path.clone()),
                        name,
                    ));
                }
                for field in relation.pivot.iter().flat_map(|p| p.fields.keys()) {
                    check_field_name(
                        field,
                        format!("{}.pivot.fields.{}", path, field),
                        diagnostics,
                    );
                }
            }
        }
    }
}

fn check_field_name(name: &str, path: String, diagnostics: &mut Vec<Diagnostic>) {
    if is_camel_case(name) {
        return;
    }
    diagnostics.push(with_camel_suggestion(
        Diagnostic::new(
            DiagnosticCode::InvalidFieldName,
            format!("field name '{}' must be camelCase", name),
        )
        .at(path),
        name,
    ));
}

fn with_camel_suggestion(diag: Diagnostic, name: &str) -> Diagnostic {
    let fixed = to_camel_case(name);
    if is_camel_case(&fixed) {
        diag.suggest(format!("rename to '{}'", fixed))
    } else {
        diag
    }
}
