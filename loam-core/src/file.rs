use std::{
    fmt,
    path::{Component, Path},
};

use serde::Serialize;

/// How to handle a file that already exists in the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Overwrite {
    /// Always overwrite (regenerated output)
    Always,
    /// Only create if the file doesn't exist (hook files owned by the user)
    IfMissing,
}

/// Outcome of applying a single generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteResult {
    /// File was written (new or changed content)
    Written,
    /// File already holds identical content
    Unchanged,
    /// File was skipped (hook file that already exists)
    Skipped,
}

/// A file produced by a template, held in memory until the run is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the output directory, `/`-separated
    pub path: String,
    /// Full file content
    pub content: String,
    /// Write rule for this file
    #[serde(skip)]
    pub overwrite: Overwrite,
}

impl GeneratedFile {
    /// Create a file that is fully regenerated on every run.
    pub fn generated(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: Overwrite::Always,
        }
    }

    /// Create a hook file: scaffolded once, then owned by the user.
    pub fn hook(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: Overwrite::IfMissing,
        }
    }

    /// Returns true if this is a scaffold-once hook file.
    pub fn is_hook(&self) -> bool {
        self.overwrite == Overwrite::IfMissing
    }

    /// Decide what applying this file does given the current on-disk content.
    ///
    /// `existing` is `None` when no file exists at the target path.
    pub fn disposition(&self, existing: Option<&str>) -> WriteResult {
        match (self.overwrite, existing) {
            (_, None) => WriteResult::Written,
            (Overwrite::IfMissing, Some(_)) => WriteResult::Skipped,
            (Overwrite::Always, Some(current)) if current == self.content => WriteResult::Unchanged,
            (Overwrite::Always, Some(_)) => WriteResult::Written,
        }
    }
}

/// A generated path that would escape or clobber the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub reason: &'static str,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid output path '{}': {}", self.path, self.reason)
    }
}

impl std::error::Error for PathError {}

/// Check that a generated path stays inside the output directory.
pub fn check_relative_path(path: &str) -> Result<(), PathError> {
    let error = |reason| PathError {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(error("path is empty"));
    }
    if path.ends_with('/') {
        return Err(error("path names a directory"));
    }

    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(error("path contains '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(error("path must be relative"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let file = GeneratedFile::generated("schema.sql", "create table");
        assert_eq!(file.overwrite, Overwrite::Always);
        assert!(!file.is_hook());

        let hook = GeneratedFile::hook("hooks/user.ts", "export {}");
        assert!(hook.is_hook());
    }

    #[test]
    fn test_disposition_new_file() {
        let file = GeneratedFile::generated("a.txt", "x");
        assert_eq!(file.disposition(None), WriteResult::Written);

        let hook = GeneratedFile::hook("b.txt", "x");
        assert_eq!(hook.disposition(None), WriteResult::Written);
    }

    #[test]
    fn test_disposition_existing_file() {
        let file = GeneratedFile::generated("a.txt", "same");
        assert_eq!(file.disposition(Some("same")), WriteResult::Unchanged);
        assert_eq!(file.disposition(Some("other")), WriteResult::Written);

        let hook = GeneratedFile::hook("b.txt", "template");
        assert_eq!(hook.disposition(Some("edited")), WriteResult::Skipped);
        assert_eq!(hook.disposition(Some("template")), WriteResult::Skipped);
    }

    #[test]
    fn test_check_relative_path() {
        assert!(check_relative_path("schema.sql").is_ok());
        assert!(check_relative_path("api/users.ts").is_ok());
        assert!(check_relative_path("./api/users.ts").is_ok());

        assert!(check_relative_path("").is_err());
        assert!(check_relative_path("api/").is_err());
        assert!(check_relative_path("../outside.ts").is_err());
        assert!(check_relative_path("api/../../x").is_err());
        assert!(check_relative_path("/etc/passwd").is_err());
    }

    #[test]
    fn test_serialize_omits_rule() {
        let file = GeneratedFile::hook("hooks/user.ts", "x");
        let json = serde_json::to_string(&file).unwrap();
        assert_eq!(json, r#"{"path":"hooks/user.ts","content":"x"}"#);
    }
}
