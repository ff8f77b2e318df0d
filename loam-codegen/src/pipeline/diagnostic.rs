//! Diagnostic types for the compilation pipeline.
//!
//! Every diagnostic carries a code from a closed taxonomy, so callers
//! (including automated agents) can branch on it without parsing messages.

use std::fmt;

use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks code generation.
    Error,
    /// Reported but does not block code generation.
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    InvalidEntityName,
    DuplicateEntity,
    InvalidFieldName,
    InvalidRelationName,
    DuplicateField,
    ReservedFieldName,
    DuplicateTable,
    RelationTargetNotFound,
    InvalidPivot,
    PivotFieldConflict,
    DatabaseRequired,
    DatabaseConnectionMissing,
    AuthRequired,
    UnsupportedAuthProvider,
    SourceRequired,
    InvalidSource,
    InvalidLocale,
    TenantFieldConflict,
    ValidationTypeMismatch,
    InvalidValidationRange,
    InvalidRegex,
    InvalidEnum,
    InvalidDefault,
    ComputedSourceNotFound,
    EntityNotFound,
    NoEntities,
    EmptyEntity,
    AuthWithoutProviders,
    DatabaseUnused,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidEntityName => "INVALID_ENTITY_NAME",
            DiagnosticCode::DuplicateEntity => "DUPLICATE_ENTITY",
            DiagnosticCode::InvalidFieldName => "INVALID_FIELD_NAME",
            DiagnosticCode::InvalidRelationName => "INVALID_RELATION_NAME",
            DiagnosticCode::DuplicateField => "DUPLICATE_FIELD",
            DiagnosticCode::ReservedFieldName => "RESERVED_FIELD_NAME",
            DiagnosticCode::DuplicateTable => "DUPLICATE_TABLE",
            DiagnosticCode::RelationTargetNotFound => "RELATION_TARGET_NOT_FOUND",
            DiagnosticCode::InvalidPivot => "INVALID_PIVOT",
            DiagnosticCode::PivotFieldConflict => "PIVOT_FIELD_CONFLICT",
            DiagnosticCode::DatabaseRequired => "DATABASE_REQUIRED",
            DiagnosticCode::DatabaseConnectionMissing => "DATABASE_CONNECTION_MISSING",
            DiagnosticCode::AuthRequired => "AUTH_REQUIRED",
            DiagnosticCode::UnsupportedAuthProvider => "UNSUPPORTED_AUTH_PROVIDER",
            DiagnosticCode::SourceRequired => "SOURCE_REQUIRED",
            DiagnosticCode::InvalidSource => "INVALID_SOURCE",
            DiagnosticCode::InvalidLocale => "INVALID_LOCALE",
            DiagnosticCode::TenantFieldConflict => "TENANT_FIELD_CONFLICT",
            DiagnosticCode::ValidationTypeMismatch => "VALIDATION_TYPE_MISMATCH",
            DiagnosticCode::InvalidValidationRange => "INVALID_VALIDATION_RANGE",
            DiagnosticCode::InvalidRegex => "INVALID_REGEX",
            DiagnosticCode::InvalidEnum => "INVALID_ENUM",
            DiagnosticCode::InvalidDefault => "INVALID_DEFAULT",
            DiagnosticCode::ComputedSourceNotFound => "COMPUTED_SOURCE_NOT_FOUND",
            DiagnosticCode::EntityNotFound => "ENTITY_NOT_FOUND",
            DiagnosticCode::NoEntities => "NO_ENTITIES",
            DiagnosticCode::EmptyEntity => "EMPTY_ENTITY",
            DiagnosticCode::AuthWithoutProviders => "AUTH_WITHOUT_PROVIDERS",
            DiagnosticCode::DatabaseUnused => "DATABASE_UNUSED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::NoEntities
            | DiagnosticCode::EmptyEntity
            | DiagnosticCode::AuthWithoutProviders
            | DiagnosticCode::DatabaseUnused => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// Derived from `code`
    #[serde(skip)]
    pub severity: Severity,
    /// Location in the manifest, e.g. `User.relations.posts.entity`
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            path: String::new(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Set the manifest location.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Attach a suggested fix.
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path)?;
        }
        Ok(())
    }
}

/// Outcome of validating a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Split diagnostics by severity, keeping their order.
    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics
            .into_iter()
            .partition(|d| d.severity.is_error());
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Returns true if any error carries `code`.
    pub fn has_error(&self, code: DiagnosticCode) -> bool {
        self.errors.iter().any(|d| d.code == code)
    }
}
