//! The contract every code-generation backend implements.

use std::path::PathBuf;

use eyre::Result;
use loam_core::{GeneratedFile, Version};
use loam_ir::{ResolvedEntity, ResolvedManifest};
use rayon::prelude::*;

/// Options for a single generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Plan the run and report what would change without writing.
    pub dry_run: bool,
    /// Directory generated paths are relative to.
    pub output_dir: PathBuf,
}

impl GenerateOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dry_run: false,
            output_dir: output_dir.into(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A code-generation backend.
///
/// Implementations must be pure: the same resolved manifest and the same
/// template version produce byte-identical files, in the same order, with no
/// timestamps or other run-dependent content. Templates only return files;
/// the orchestrator decides what is written, which keeps hook handling and
/// all-or-nothing application out of template code.
///
/// Hook files (scaffolded once, then owned by the user) are marked with
/// [`GeneratedFile::hook`].
pub trait Template: Send + Sync {
    /// Registry name, e.g. `basic`.
    fn name(&self) -> &'static str;

    fn version(&self) -> Version;

    /// Produce every output file for `manifest`.
    ///
    /// Only called with manifests that passed validation.
    fn generate(
        &self,
        manifest: &ResolvedManifest,
        options: &GenerateOptions,
    ) -> Result<Vec<GeneratedFile>>;
}

/// Run `f` for every entity in parallel and concatenate the results in
/// entity declaration order.
///
/// Fails with the first error in declaration order if any entity fails.
pub fn generate_per_entity<F>(manifest: &ResolvedManifest, f: F) -> Result<Vec<GeneratedFile>>
where
    F: Fn(&ResolvedEntity) -> Result<Vec<GeneratedFile>> + Send + Sync,
{
    let per_entity: Vec<Vec<GeneratedFile>> = manifest
        .entities
        .par_iter()
        .map(f)
        .collect::<Result<_>>()?;
    Ok(per_entity.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use loam_ir::DatabaseConfig;
    use loam_manifest::define::{entity, manifest, text};

    use super::*;
    use crate::resolve;

    fn many_entities() -> ResolvedManifest {
        let mut def = manifest().database(DatabaseConfig::sqlite("app.db"));
        for i in 0..32 {
            def = def.entity(entity(format!("Entity{i}")).field("name", text()));
        }
        resolve(&def.build())
    }

    #[test]
    fn test_per_entity_order_is_declaration_order() {
        let resolved = many_entities();
        let files = generate_per_entity(&resolved, |e| {
            Ok(vec![GeneratedFile::generated(
                format!("{}.txt", e.singular),
                e.name.clone(),
            )])
        })
        .unwrap();

        let names: Vec<_> = files.iter().map(|f| f.content.as_str()).collect();
        let expected: Vec<_> = resolved.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_per_entity_error() {
        let resolved = many_entities();
        let result = generate_per_entity(&resolved, |e| {
            if e.name == "Entity7" {
                eyre::bail!("cannot render {}", e.name);
            }
            Ok(vec![])
        });
        assert_eq!(result.unwrap_err().to_string(), "cannot render Entity7");
    }
}
