use loam_ir::{DatabaseConfig, Manifest, Mode, Protection, Validation};
use loam_manifest::{
    Error,
    define::{belongs_to_many, entity, enumeration, has_many, manifest, number, text},
    from_file, from_json_str, to_json_string,
};

const BLOG_JSON: &str = r#"{
  "mode": "full",
  "database": {"type": "sqlite", "file": "./blog.db"},
  "entities": [
    {
      "name": "User",
      "fields": {
        "email": {"type": "text", "email": true, "unique": true},
        "nickname": {"type": "text", "optional": true, "max": 32}
      },
      "relations": {
        "posts": {"type": "hasMany", "entity": "Post"}
      },
      "protected": "write"
    },
    {
      "name": "Post",
      "fields": {
        "title": {"type": "text", "min": 3},
        "status": {"type": "enum", "values": ["draft", "published"], "default": "draft"},
        "views": {"type": "number", "integer": true, "positive": true, "optional": true}
      },
      "relations": {
        "tags": {"type": "belongsToMany", "entity": "Tag"}
      },
      "behaviors": {"softDelete": true}
    },
    {"name": "Tag", "fields": {"label": {"type": "text", "unique": true}}}
  ]
}"#;

fn blog_builder() -> Manifest {
    manifest()
        .mode(Mode::Full)
        .database(DatabaseConfig::sqlite("./blog.db"))
        .entity(
            entity("User")
                .field("email", text().email().unique())
                .field("nickname", text().optional().max(32.0))
                .relation("posts", has_many("Post"))
                .protected(Protection::write()),
        )
        .entity(
            entity("Post")
                .field("title", text().min(3.0))
                .field(
                    "status",
                    enumeration(["draft", "published"]).default("draft"),
                )
                .field("views", number().integer().positive().optional())
                .relation("tags", belongs_to_many("Tag"))
                .soft_delete(true),
        )
        .entity(entity("Tag").field("label", text().unique()))
        .build()
}

#[test]
fn builder_and_document_converge() {
    let parsed = from_json_str(BLOG_JSON).unwrap();
    assert_eq!(parsed, blog_builder());
}

#[test]
fn canonical_json_reparses_to_equal_ir() {
    let parsed = from_json_str(BLOG_JSON).unwrap();
    let json = to_json_string(&parsed).unwrap();
    let reparsed = from_json_str(&json).unwrap();
    assert_eq!(parsed, reparsed);

    // The canonical form is a fixed point.
    assert_eq!(to_json_string(&reparsed).unwrap(), json);
}

#[test]
fn email_scenario_traces_to_input() {
    let json = r#"{"entities": [{"name": "User", "fields": {
        "email": {"type": "text", "email": true, "unique": true}
    }}]}"#;
    let parsed = from_json_str(json).unwrap();
    let email = &parsed.entities[0].fields["email"];
    assert_eq!(email.unique, Some(true));
    assert_eq!(email.validations, vec![Validation::Email]);
}

#[test]
fn from_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("loam.json");
    std::fs::write(&json_path, BLOG_JSON).unwrap();
    assert_eq!(from_file(&json_path).unwrap().entities.len(), 3);

    let toml_path = dir.path().join("loam.toml");
    std::fs::write(
        &toml_path,
        "[[entities]]\nname = \"User\"\n\n[entities.fields.email]\ntype = \"text\"\n",
    )
    .unwrap();
    let from_toml = from_file(&toml_path).unwrap();
    assert_eq!(from_toml.entity_names(), vec!["User"]);

    let yaml_path = dir.path().join("loam.yaml");
    std::fs::write(&yaml_path, "entities: []").unwrap();
    let err = from_file(&yaml_path).unwrap_err();
    assert!(matches!(*err, Error::UnsupportedFormat { .. }));

    let err = from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(*err, Error::Io { .. }));
}

#[test]
fn malformed_json_fails_before_validation() {
    let err = from_json_str(r#"{"entities": [{"name": "User",}]}"#).unwrap_err();
    assert!(matches!(*err, Error::Json { span: Some(_), .. }));
}
