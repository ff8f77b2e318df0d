//! Lint for relation targets and pivot tables.

use indexmap::IndexMap;
use loam_ir::{Field, Manifest, RelationKind};

use super::super::Lint;
use crate::pipeline::{Diagnostic, DiagnosticCode, phases::resolve::junction_name};

/// Lint that errors on dangling relation targets and invalid pivots.
pub struct RelationsLint;

impl Lint for RelationsLint {
    fn name(&self) -> &'static str {
        "relations"
    }

    fn description(&self) -> &'static str {
        "Check relation targets exist and pivot definitions agree"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        // junction table -> pivot field name -> (definition, declaring path)
        let mut pivots: IndexMap<String, IndexMap<&str, (&Field, String)>> = IndexMap::new();

        for entity in &manifest.entities {
            for (name, relation) in &entity.relations {
                let path = format!("{}.relations.{}", entity.name, name);

                if !relation.external && !manifest.has_entity(&relation.entity) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::RelationTargetNotFound,
                            format!(
                                "relation '{}' on '{}' targets unknown entity '{}'",
                                name, entity.name, relation.entity
                            ),
                        )
                        .at(format!("{}.entity", path))
                        .suggest(target_suggestion(manifest, &relation.entity)),
                    );
                }

                let Some(pivot) = &relation.pivot else {
                    continue;
                };

                if relation.kind != RelationKind::BelongsToMany {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::InvalidPivot,
                            format!(
                                "relation '{}' on '{}' is {} and cannot declare a pivot",
                                name,
                                entity.name,
                                relation.kind.as_str()
                            ),
                        )
                        .at(format!("{}.pivot", path))
                        .suggest("remove the pivot or use belongsToMany"),
                    );
                    continue;
                }

                let junction = junction_name(&entity.name, relation);
                let fields = pivots.entry(junction.clone()).or_default();
                for (field_name, field) in &pivot.fields {
                    let field_path = format!("{}.pivot.fields.{}", path, field_name);
                    match fields.get(field_name.as_str()) {
                        Some((first, first_path)) if *first != field => diagnostics.push(
                            Diagnostic::new(
                                DiagnosticCode::PivotFieldConflict,
                                format!(
                                    "pivot field '{}' on junction table '{}' differs from the definition at '{}'",
                                    field_name, junction, first_path
                                ),
                            )
                            .at(field_path),
                        ),
                        Some(_) => {}
                        None => {
                            fields.insert(field_name.as_str(), (field, field_path));
                        }
                    }
                }
            }
        }
    }
}

fn target_suggestion(manifest: &Manifest, target: &str) -> String {
    let close = manifest
        .entities
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(target));
    match close {
        Some(entity) => format!("did you mean '{}'?", entity.name),
        None => format!("declare entity '{}' or mark the relation external", target),
    }
}

#[cfg(test)]
mod tests {
    use loam_manifest::define::{
        belongs_to_many, entity, has_many, has_one, manifest, number, text,
    };

    use super::*;
    use crate::normalize;

    fn check(m: Manifest) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        RelationsLint.check(&normalize(&m), &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_target_not_found() {
        let m = manifest()
            .entity(entity("User").relation("posts", has_many("Post")))
            .build();
        let diags = check(m);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::RelationTargetNotFound);
        assert_eq!(diags[0].path, "User.relations.posts.entity");
    }

    #[test]
    fn test_target_case_suggestion() {
        let m = manifest()
            .entity(entity("User").relation("posts", has_many("post")))
            .entity(entity("Post"))
            .build();
        let diags = check(m);
        assert_eq!(diags[0].suggestion.as_deref(), Some("did you mean 'Post'?"));
    }

    #[test]
    fn test_external_target() {
        let m = manifest()
            .entity(entity("User").relation("account", has_one("Account").external()))
            .build();
        assert!(check(m).is_empty());
    }

    #[test]
    fn test_pivot_on_has_many() {
        let m = manifest()
            .entity(
                entity("User").relation("posts", has_many("Post").pivot_field("x", number())),
            )
            .entity(entity("Post"))
            .build();
        let diags = check(m);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidPivot);
        assert_eq!(diags[0].path, "User.relations.posts.pivot");
    }

    #[test]
    fn test_pivot_field_conflict() {
        let m = manifest()
            .entity(entity("Post").relation(
                "tags",
                belongs_to_many("Tag")
                    .pivot_field("order", number())
                    .pivot_field("note", text()),
            ))
            .entity(entity("Tag").relation(
                "posts",
                belongs_to_many("Post")
                    .pivot_field("order", text())
                    .pivot_field("note", text()),
            ))
            .build();
        let diags = check(m);

        // `note` agrees, `order` conflicts.
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::PivotFieldConflict);
        assert_eq!(diags[0].path, "Tag.relations.posts.pivot.fields.order");
        assert!(diags[0].message.contains("Post.relations.tags.pivot.fields.order"));
    }

    #[test]
    fn test_pivot_fields_on_distinct_junctions() {
        let m = manifest()
            .entity(entity("Post").relation(
                "tags",
                belongs_to_many("Tag").pivot_field("order", number()),
            ))
            .entity(entity("Tag").relation(
                "posts",
                belongs_to_many("Post")
                    .pivot_table("tag_posts")
                    .pivot_field("order", text()),
            ))
            .build();
        assert!(check(m).is_empty());
    }
}
