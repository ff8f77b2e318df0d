//! Staged, all-or-nothing application of generated files.
//!
//! Applying a run happens in three steps:
//!
//! 1. [`plan`] checks every path and reads the current content of each
//!    target to decide whether it is written, unchanged or skipped.
//! 2. [`ApplyPlan::commit`] stages every written file as a temporary file
//!    next to its target.
//! 3. Staged files are persisted over their targets. If any step fails,
//!    targets already replaced are restored and directories created for the
//!    run are removed, so the output directory ends as it started.

use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr, bail};
use loam_core::{GeneratedFile, WriteResult, check_relative_path};
use serde::Serialize;
use tempfile::NamedTempFile;

/// Paths grouped by what applying them does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len() + self.skipped.len()
    }
}

#[derive(Debug)]
struct PlannedFile {
    file: GeneratedFile,
    target: PathBuf,
    previous: Option<Vec<u8>>,
    result: WriteResult,
}

/// A checked set of files with the on-disk state they were planned against.
#[derive(Debug)]
pub struct ApplyPlan {
    files: Vec<PlannedFile>,
}

/// Check paths and compute each file's disposition against `output_dir`.
///
/// Fails on a path that escapes the output directory, on two files with the
/// same path, and on targets that exist but cannot be read. Never writes.
pub fn plan(output_dir: &Path, files: Vec<GeneratedFile>) -> Result<ApplyPlan> {
    let mut seen = HashSet::new();
    for file in &files {
        check_relative_path(&file.path)?;
        if !seen.insert(normalized_path(&file.path)) {
            bail!("duplicate output path '{}'", file.path);
        }
    }

    let files = files
        .into_iter()
        .map(|file| {
            let target = output_dir.join(&file.path);
            let previous = read_existing(&target)
                .wrap_err_with(|| format!("failed to read {}", target.display()))?;
            let current = previous.as_deref().map(String::from_utf8_lossy);
            let result = file.disposition(current.as_deref());
            Ok(PlannedFile {
                file,
                target,
                previous,
                result,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ApplyPlan { files })
}

impl ApplyPlan {
    /// What committing this plan does, in generation order.
    pub fn report(&self) -> ApplyReport {
        let mut report = ApplyReport::default();
        for planned in &self.files {
            let path = planned.file.path.clone();
            match planned.result {
                WriteResult::Written => report.written.push(path),
                WriteResult::Unchanged => report.unchanged.push(path),
                WriteResult::Skipped => report.skipped.push(path),
            }
        }
        report
    }

    /// Write every file marked [`WriteResult::Written`], or nothing.
    pub fn commit(self) -> Result<ApplyReport> {
        let report = self.report();
        let mut created_dirs = Vec::new();

        let staged = match stage(&self.files, &mut created_dirs) {
            Ok(staged) => staged,
            Err(err) => {
                remove_created_dirs(&created_dirs);
                return Err(err);
            }
        };

        let mut persisted: Vec<&PlannedFile> = Vec::with_capacity(staged.len());
        for (planned, temp) in staged {
            if let Err(err) = temp.persist(&planned.target) {
                tracing::warn!(
                    path = %planned.file.path,
                    restored = persisted.len(),
                    "failed to apply generated file, rolling back"
                );
                rollback(&persisted);
                remove_created_dirs(&created_dirs);
                return Err(err.error)
                    .wrap_err_with(|| format!("failed to write {}", planned.target.display()));
            }
            tracing::debug!(path = %planned.file.path, "wrote generated file");
            persisted.push(planned);
        }

        Ok(report)
    }
}

/// Write each changed file to a temporary file beside its target.
fn stage<'a>(
    files: &'a [PlannedFile],
    created_dirs: &mut Vec<PathBuf>,
) -> Result<Vec<(&'a PlannedFile, NamedTempFile)>> {
    let mut staged = Vec::new();

    for planned in files.iter().filter(|p| p.result == WriteResult::Written) {
        let parent = match planned.target.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => bail!("output path '{}' has no parent directory", planned.file.path),
        };
        create_dirs(parent, created_dirs)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;

        let mut temp = NamedTempFile::new_in(parent)
            .wrap_err_with(|| format!("failed to stage {}", planned.file.path))?;
        temp.write_all(planned.file.content.as_bytes())
            .and_then(|()| temp.flush())
            .wrap_err_with(|| format!("failed to stage {}", planned.file.path))?;
        staged.push((planned, temp));
    }

    Ok(staged)
}

/// Restore replaced targets in reverse write order.
fn rollback(persisted: &[&PlannedFile]) {
    for planned in persisted.iter().rev() {
        let restored = match &planned.previous {
            Some(previous) => fs::write(&planned.target, previous),
            None => fs::remove_file(&planned.target),
        };
        if let Err(err) = restored {
            tracing::warn!(
                path = %planned.target.display(),
                error = %err,
                "failed to restore file during rollback"
            );
        }
    }
}

/// Create `dir` and its missing ancestors, recording each one created.
fn create_dirs(dir: &Path, created: &mut Vec<PathBuf>) -> io::Result<()> {
    let missing: Vec<&Path> = dir.ancestors().take_while(|d| !d.exists()).collect();
    for d in missing.into_iter().rev() {
        fs::create_dir(d)?;
        created.push(d.to_path_buf());
    }
    Ok(())
}

fn remove_created_dirs(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        // Only empty directories are removed.
        let _ = fs::remove_dir(dir);
    }
}

fn read_existing(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// `./a/b` and `a/b` name the same file.
fn normalized_path(path: &str) -> String {
    path.split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn read(dir: &TempDir, path: &str) -> String {
        fs::read_to_string(dir.path().join(path)).unwrap()
    }

    #[test]
    fn test_plan_new_directory() {
        let dir = TempDir::new().unwrap();
        let planned = plan(
            dir.path(),
            vec![
                GeneratedFile::generated("schema.sql", "create"),
                GeneratedFile::hook("hooks/user.ts", "export {}"),
            ],
        )
        .unwrap();

        let report = planned.report();
        assert_eq!(report.written, vec!["schema.sql", "hooks/user.ts"]);
        assert!(report.unchanged.is_empty());
        assert!(!dir.path().join("schema.sql").exists());
    }

    #[test]
    fn test_commit_and_rerun() {
        let dir = TempDir::new().unwrap();
        let files = || {
            vec![
                GeneratedFile::generated("api/user.ts", "export const user = 1;\n"),
                GeneratedFile::hook("hooks/user.ts", "// edit me\n"),
            ]
        };

        let report = plan(dir.path(), files()).unwrap().commit().unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(read(&dir, "api/user.ts"), "export const user = 1;\n");

        fs::write(dir.path().join("hooks/user.ts"), "// mine\n").unwrap();

        let report = plan(dir.path(), files()).unwrap().commit().unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.unchanged, vec!["api/user.ts"]);
        assert_eq!(report.skipped, vec!["hooks/user.ts"]);
        assert_eq!(read(&dir, "hooks/user.ts"), "// mine\n");
    }

    #[test]
    fn test_rejects_bad_paths() {
        let dir = TempDir::new().unwrap();

        let err = plan(dir.path(), vec![GeneratedFile::generated("../x.ts", "")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid output path '../x.ts': path contains '..'"
        );

        let err = plan(
            dir.path(),
            vec![
                GeneratedFile::generated("api/user.ts", "a"),
                GeneratedFile::generated("./api/user.ts", "b"),
            ],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "duplicate output path './api/user.ts'");
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.sql"), "old").unwrap();

        let planned = plan(
            dir.path(),
            vec![
                GeneratedFile::generated("schema.sql", "new"),
                GeneratedFile::generated("nested/deep/a.ts", "a"),
                GeneratedFile::generated("client/index.ts", "client"),
            ],
        )
        .unwrap();
        assert_eq!(planned.report().written.len(), 3);

        // A non-empty directory at the second target makes persisting it fail.
        fs::create_dir_all(dir.path().join("client/index.ts/nested")).unwrap();

        assert!(planned.commit().is_err());
        assert_eq!(read(&dir, "schema.sql"), "old");
        assert!(!dir.path().join("nested").exists());
        assert!(dir.path().join("client/index.ts/nested").is_dir());
    }

    #[test]
    fn test_unreadable_target_fails_plan() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("schema.sql")).unwrap();

        let err = plan(dir.path(), vec![GeneratedFile::generated("schema.sql", "x")]).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }
}
