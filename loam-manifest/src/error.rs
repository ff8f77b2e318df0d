use std::{ops::Range, path::PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest parsing (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Holds the document text and its display name so parse failures can point
/// at the offending location.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a serde_json error.
    pub fn json_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = line_col_span(&self.src, source.line(), source.column()).map(SourceSpan::from);
        Box::new(Error::Json {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a parse error from a toml error.
    pub fn toml_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Toml {
            src: self.named_source(),
            span,
            source,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(loam::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON manifest")]
    #[diagnostic(code(loam::parse_error))]
    Json {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse TOML manifest")]
    #[diagnostic(code(loam::parse_error))]
    Toml {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {what}")]
    #[diagnostic(code(loam::invalid_value))]
    Value {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported manifest format '{}'", path.display())]
    #[diagnostic(
        code(loam::unsupported_format),
        help("manifest files must end in .json or .toml")
    )]
    UnsupportedFormat { path: PathBuf },
}

impl Error {
    /// Create an error for a JSON value that does not have the expected shape.
    pub fn value(what: impl Into<String>, source: serde_json::Error) -> Box<Self> {
        Box::new(Error::Value {
            what: what.into(),
            source,
        })
    }
}

/// Convert a 1-based line/column position into a one-byte span.
///
/// serde_json reports `0` for positions it does not know.
fn line_col_span(src: &str, line: usize, column: usize) -> Option<Range<usize>> {
    if line == 0 {
        return None;
    }

    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = (line_start + column.saturating_sub(1)).min(src.len());
    let end = (offset + 1).min(src.len());
    Some(offset..end)
}
