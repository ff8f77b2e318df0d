//! JSON tool adapters over [`ManifestBuilder`].
//!
//! An agent sees the builder as a set of named tools. [`tool_definitions`]
//! describes them with JSON Schema, and [`ToolSession::call`] dispatches a
//! call by name with JSON arguments. Unknown tools and malformed arguments
//! come back as failed [`ToolResult`]s.

use std::path::PathBuf;

use loam_codegen::GenerateOptions;
use loam_ir::{AuthConfig, DatabaseConfig, Mode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{ManifestBuilder, ToolResult};

/// Names of every tool, in definition order.
pub const TOOL_NAMES: &[&str] = &[
    "add_entity",
    "update_entity",
    "remove_entity",
    "set_database",
    "set_auth",
    "set_mode",
    "list_entities",
    "get_entity",
    "validate",
    "generate",
];

/// JSON Schema descriptions of every tool.
pub fn tool_definitions() -> Vec<Value> {
    let name = json!({"type": "string", "description": "Entity name in PascalCase"});

    vec![
        tool(
            "add_entity",
            "Add a new entity. Fails with DUPLICATE_ENTITY if the name is taken.",
            json!({
                "entity": {
                    "type": "object",
                    "description": "Entity definition: name, fields, and optional relations, behaviors, protected, source, table",
                },
            }),
            &["entity"],
        ),
        tool(
            "update_entity",
            "Merge changes into an existing entity. Fields and relations not mentioned are kept.",
            json!({
                "name": name,
                "patch": {
                    "type": "object",
                    "description": "fields, removeFields, relations, removeRelations, behaviors, protected, source, table",
                },
            }),
            &["name", "patch"],
        ),
        tool(
            "remove_entity",
            "Remove an entity by name.",
            json!({ "name": name }),
            &["name"],
        ),
        tool(
            "set_database",
            "Replace the database configuration.",
            json!({
                "database": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string", "enum": ["sqlite", "postgres", "mysql"]},
                        "file": {"type": "string"},
                        "url": {"type": "string"},
                    },
                    "required": ["type"],
                },
            }),
            &["database"],
        ),
        tool(
            "set_auth",
            "Replace the authentication configuration.",
            json!({
                "auth": {
                    "type": "object",
                    "properties": {
                        "enabled": {"type": "boolean"},
                        "providers": {"type": "array", "items": {"type": "string"}},
                    },
                },
            }),
            &["auth"],
        ),
        tool(
            "set_mode",
            "Choose what the generated application contains.",
            json!({
                "mode": {"type": "string", "enum": ["full", "headless", "api-only"]},
            }),
            &["mode"],
        ),
        tool(
            "list_entities",
            "List entity names in declaration order.",
            json!({}),
            &[],
        ),
        tool(
            "get_entity",
            "Show an entity as currently declared.",
            json!({ "name": name }),
            &["name"],
        ),
        tool(
            "validate",
            "Validate the manifest and report every error.",
            json!({}),
            &[],
        ),
        tool(
            "generate",
            "Validate, then generate files into a directory. Nothing is written if validation fails.",
            json!({
                "outputDir": {"type": "string"},
                "dryRun": {"type": "boolean", "default": false},
            }),
            &["outputDir"],
        ),
    ]
}

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "name": name,
        "description": description,
        "parameters": {
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        },
    })
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AddEntityArgs {
    entity: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateEntityArgs {
    name: String,
    patch: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseArgs {
    database: DatabaseConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthArgs {
    auth: AuthConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ModeArgs {
    mode: Mode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GenerateArgs {
    output_dir: PathBuf,
    #[serde(default)]
    dry_run: bool,
}

/// A builder driven by named tool calls.
#[derive(Debug, Default)]
pub struct ToolSession {
    builder: ManifestBuilder,
}

impl ToolSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: ManifestBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &ManifestBuilder {
        &self.builder
    }

    pub fn into_builder(self) -> ManifestBuilder {
        self.builder
    }

    /// Run the tool `name` with JSON `args`. A `null` argument is treated as
    /// an empty object.
    pub fn call(&mut self, name: &str, args: Value) -> ToolResult {
        tracing::debug!(tool = name, "tool call");
        match self.dispatch(name, args) {
            Ok(result) | Err(result) => result,
        }
    }

    fn dispatch(&mut self, name: &str, args: Value) -> Result<ToolResult, ToolResult> {
        let b = &mut self.builder;

        let result = match name {
            "add_entity" => {
                let args: AddEntityArgs = parse(name, args)?;
                let entity = loam_manifest::entity_from_value(args.entity)
                    .map_err(|e| ToolResult::from_error("entity not added", &*e))?;
                b.add_entity(entity)
            }
            "update_entity" => {
                let args: UpdateEntityArgs = parse(name, args)?;
                let patch = loam_manifest::entity_patch_from_value(args.patch)
                    .map_err(|e| ToolResult::from_error("entity not updated", &*e))?;
                b.update_entity(&args.name, &patch)
            }
            "remove_entity" => {
                let args: NameArgs = parse(name, args)?;
                b.remove_entity(&args.name)
            }
            "set_database" => {
                let args: DatabaseArgs = parse(name, args)?;
                b.set_database(args.database)
            }
            "set_auth" => {
                let args: AuthArgs = parse(name, args)?;
                b.set_auth(args.auth)
            }
            "set_mode" => {
                let args: ModeArgs = parse(name, args)?;
                b.set_mode(args.mode)
            }
            "list_entities" => {
                let _: NoArgs = parse(name, args)?;
                let names = b.entity_names();
                ToolResult::ok(format!("{} entities", names.len()))
                    .with_data(json!({ "entities": names }))
            }
            "get_entity" => {
                let args: NameArgs = parse(name, args)?;
                b.get_entity(&args.name)
            }
            "validate" => {
                let _: NoArgs = parse(name, args)?;
                b.validate()
            }
            "generate" => {
                let args: GenerateArgs = parse(name, args)?;
                b.generate(&GenerateOptions::new(args.output_dir).dry_run(args.dry_run))
            }
            _ => {
                return Err(ToolResult::fail(format!(
                    "unknown tool '{}', available: {}",
                    name,
                    TOOL_NAMES.join(", ")
                )));
            }
        };

        Ok(result)
    }
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolResult> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| ToolResult::from_error(&format!("invalid arguments for '{}'", tool), &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_cover_every_tool() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|t| t["name"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, TOOL_NAMES);
    }

    #[test]
    fn test_unknown_tool() {
        let result = ToolSession::new().call("drop_database", json!({}));
        assert!(!result.success);
        assert!(result.message.starts_with("unknown tool 'drop_database'"));
    }

    #[test]
    fn test_malformed_arguments() {
        let mut session = ToolSession::new();

        let missing = session.call("remove_entity", json!({}));
        assert!(!missing.success);
        assert!(missing.message.starts_with("invalid arguments for 'remove_entity': "));

        let bad_mode = session.call("set_mode", json!({"mode": "everything"}));
        assert!(!bad_mode.success);

        let bad_entity = session.call("add_entity", json!({"entity": {"fields": {}}}));
        assert!(!bad_entity.success);
        assert!(bad_entity.message.starts_with("entity not added: invalid entity: "));
        assert!(session.builder().entity_names().is_empty());
    }

    #[test]
    fn test_null_arguments() {
        let result = ToolSession::new().call("list_entities", Value::Null);
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"entities": []})));
    }
}
