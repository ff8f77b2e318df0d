//! Reference template for the Loam manifest compiler.
//!
//! [`BasicTemplate`] emits one synchronized set of artifacts from a resolved
//! manifest:
//!
//! | Path                     | Emitted when            | Kind        |
//! |--------------------------|-------------------------|-------------|
//! | `schema.sql`             | storage and a database  | regenerated |
//! | `validation/<entity>.json` | always                | regenerated |
//! | `api/<entity>.ts`        | always                  | regenerated |
//! | `api/index.ts`           | always                  | regenerated |
//! | `client/index.ts`        | mode `full`             | regenerated |
//! | `hooks/<entity>.ts`      | always                  | hook        |
//!
//! # Example
//!
//! ```ignore
//! use loam_codegen::{GenerateOptions, generate};
//! use loam_template_basic::BasicTemplate;
//!
//! let report = generate(&manifest, &BasicTemplate, &GenerateOptions::new("generated"));
//! ```

mod files;
mod type_mapper;

use eyre::Result;
use loam_codegen::{GenerateOptions, Template, TemplateRegistry, generate_per_entity};
use loam_core::{GeneratedFile, Version};
use loam_ir::ResolvedManifest;

pub use files::{GENERATED_HEADER, HOOK_HEADER};
use files::{ApiTs, ClientTs, HookTs, IndexTs, SchemaSql, ValidationJson};

/// The `basic` template.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTemplate;

impl BasicTemplate {
    pub const NAME: &'static str = "basic";
    pub const VERSION: Version = Version::new(0, 1, 0);
}

impl Template for BasicTemplate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn version(&self) -> Version {
        Self::VERSION
    }

    fn generate(
        &self,
        manifest: &ResolvedManifest,
        _options: &GenerateOptions,
    ) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();

        if manifest.has_storage()
            && let Some(database) = &manifest.database
        {
            files.push(GeneratedFile::generated(
                "schema.sql",
                SchemaSql::new(manifest, database.kind).render(),
            ));
        }

        files.extend(generate_per_entity(manifest, |entity| {
            Ok(vec![
                GeneratedFile::generated(
                    format!("validation/{}.json", entity.singular),
                    ValidationJson::new(entity).render()?,
                ),
                GeneratedFile::generated(
                    format!("api/{}.ts", entity.singular),
                    ApiTs::new(entity, manifest).render(),
                ),
            ])
        })?);

        files.push(GeneratedFile::generated(
            "api/index.ts",
            IndexTs::new(manifest).render(),
        ));

        if manifest.has_client() {
            files.push(GeneratedFile::generated(
                "client/index.ts",
                ClientTs::new(manifest).render(),
            ));
        }

        files.extend(manifest.entities.iter().map(|entity| {
            GeneratedFile::hook(
                format!("hooks/{}.ts", entity.singular),
                HookTs::new(entity).render(),
            )
        }));

        Ok(files)
    }
}

/// A registry holding every template this crate provides.
pub fn registry() -> TemplateRegistry {
    TemplateRegistry::new().with(BasicTemplate)
}
