//! Incremental manifest construction.

use loam_codegen::{
    Diagnostic, DiagnosticCode, GenerateOptions, TemplateRegistry, generate_with_registry,
};
use loam_ir::{AuthConfig, DatabaseConfig, Entity, EntityPatch, Manifest, Mode};
use serde_json::json;

use crate::ToolResult;

/// A manifest under construction, one operation at a time.
///
/// Each operation returns a [`ToolResult`]. [`validate`](Self::validate) and
/// [`generate`](Self::generate) work on a snapshot from
/// [`to_manifest`](Self::to_manifest), so the builder state is never touched
/// by the compiler.
///
/// The builder has a single writer. Independent sessions use separate
/// instances.
#[derive(Debug)]
pub struct ManifestBuilder {
    manifest: Manifest,
    registry: TemplateRegistry,
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestBuilder {
    /// An empty builder using the templates shipped with loam.
    pub fn new() -> Self {
        Self::from_manifest(Manifest::default())
    }

    /// Continue building from an existing manifest.
    pub fn from_manifest(manifest: Manifest) -> Self {
        Self {
            manifest,
            registry: loam_template_basic::registry(),
        }
    }

    /// Replace the templates [`generate`](Self::generate) selects from.
    pub fn with_registry(mut self, registry: TemplateRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> ToolResult {
        if self.manifest.has_entity(&entity.name) {
            return ToolResult::rejected(
                Diagnostic::new(
                    DiagnosticCode::DuplicateEntity,
                    format!("entity '{}' already exists", entity.name),
                )
                .at(entity.name.as_str())
                .suggest("use update_entity to change an existing entity"),
            );
        }

        tracing::debug!(entity = %entity.name, "adding entity");
        let message = format!("added entity '{}'", entity.name);
        self.manifest.entities.push(entity);
        self.entity_list(message)
    }

    /// Merge `patch` into the named entity; anything the patch does not
    /// mention is preserved.
    pub fn update_entity(&mut self, name: &str, patch: &EntityPatch) -> ToolResult {
        let Some(entity) = self.manifest.entities.iter_mut().find(|e| e.name == name) else {
            return not_found(name);
        };

        tracing::debug!(entity = %name, "updating entity");
        *entity = entity.with_patch(patch);
        let fields: Vec<&String> = entity.fields.keys().collect();
        let relations: Vec<&String> = entity.relations.keys().collect();
        ToolResult::ok(format!("updated entity '{}'", name)).with_data(json!({
            "entity": name,
            "fields": fields,
            "relations": relations,
        }))
    }

    pub fn remove_entity(&mut self, name: &str) -> ToolResult {
        let Some(index) = self.manifest.entities.iter().position(|e| e.name == name) else {
            return not_found(name);
        };

        tracing::debug!(entity = %name, "removing entity");
        self.manifest.entities.remove(index);
        self.entity_list(format!("removed entity '{}'", name))
    }

    pub fn set_database(&mut self, database: DatabaseConfig) -> ToolResult {
        let message = format!("database set to {}", database.kind.as_str());
        self.manifest.database = Some(database);
        ToolResult::ok(message)
    }

    pub fn set_auth(&mut self, auth: AuthConfig) -> ToolResult {
        let message = if auth.is_enabled() {
            format!("auth enabled with providers [{}]", auth.providers.join(", "))
        } else {
            "auth disabled".to_string()
        };
        self.manifest.auth = Some(auth);
        ToolResult::ok(message)
    }

    pub fn set_mode(&mut self, mode: Mode) -> ToolResult {
        self.manifest.mode = Some(mode);
        ToolResult::ok("mode updated").with_data(json!({ "mode": mode }))
    }

    pub fn entity_names(&self) -> Vec<String> {
        self.manifest.entity_names()
    }

    /// The named entity as currently declared.
    pub fn get_entity(&self, name: &str) -> ToolResult {
        match self.manifest.entity(name) {
            Some(entity) => match serde_json::to_value(entity) {
                Ok(value) => ToolResult::ok(format!("entity '{}'", name)).with_data(value),
                Err(err) => ToolResult::from_error("failed to serialize entity", &err),
            },
            None => not_found(name),
        }
    }

    /// An immutable snapshot of the current state.
    pub fn to_manifest(&self) -> Manifest {
        self.manifest.clone()
    }

    pub fn validate(&self) -> ToolResult {
        let result = loam_codegen::validate(&self.to_manifest());
        let warnings = json!({ "warnings": result.warnings });

        if result.valid {
            ToolResult::ok("manifest is valid").with_data(warnings)
        } else {
            ToolResult::fail(format!(
                "manifest has {} error(s)",
                result.errors.len()
            ))
            .with_data(warnings)
            .with_errors(result.errors)
        }
    }

    /// Validate, then run the manifest's template. An invalid manifest never
    /// reaches the template; its diagnostics are returned instead.
    pub fn generate(&self, options: &GenerateOptions) -> ToolResult {
        let report = generate_with_registry(&self.to_manifest(), &self.registry, options);

        if !report.validation.errors.is_empty() {
            let errors = report.validation.errors.clone();
            return ToolResult::fail(format!(
                "manifest has {} error(s), nothing generated",
                errors.len()
            ))
            .with_errors(errors);
        }

        let message = if !report.success {
            format!("generation failed: {}", report.errors.join("; "))
        } else if report.dry_run {
            format!("would generate {} file(s)", report.files.len())
        } else {
            format!(
                "generated {} file(s), {} written",
                report.files.len(),
                report.written.len()
            )
        };
        let result = if report.success {
            ToolResult::ok(message)
        } else {
            ToolResult::fail(message)
        };
        result.with_data(json!(report))
    }

    fn entity_list(&self, message: String) -> ToolResult {
        ToolResult::ok(message).with_data(json!({ "entities": self.entity_names() }))
    }
}

fn not_found(name: &str) -> ToolResult {
    ToolResult::rejected(
        Diagnostic::new(
            DiagnosticCode::EntityNotFound,
            format!("entity '{}' does not exist", name),
        )
        .at(name),
    )
}
