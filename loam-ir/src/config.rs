//! Manifest-level configuration types.
//!
//! These types have no shorthand forms, so the document parser deserializes
//! them directly.

use serde::{Deserialize, Serialize};

/// Authentication providers a manifest may declare.
pub const SUPPORTED_AUTH_PROVIDERS: &[&str] = &[
    "credentials",
    "email",
    "github",
    "google",
    "discord",
    "apple",
    "microsoft",
];

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Sqlite,
    Postgres,
    Mysql,
}

impl DatabaseType {
    /// Get the lowercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Mysql => "mysql",
        }
    }

    /// The connection key this database type requires (`file` or `url`).
    pub fn connection_key(&self) -> &'static str {
        match self {
            DatabaseType::Sqlite => "file",
            DatabaseType::Postgres | DatabaseType::Mysql => "url",
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: DatabaseType,
    /// SQLite database file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Connection URL for server databases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn sqlite(file: impl Into<String>) -> Self {
        Self {
            kind: DatabaseType::Sqlite,
            file: Some(file.into()),
            url: None,
        }
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            kind: DatabaseType::Postgres,
            file: None,
            url: Some(url.into()),
        }
    }

    pub fn mysql(url: impl Into<String>) -> Self {
        Self {
            kind: DatabaseType::Mysql,
            file: None,
            url: Some(url.into()),
        }
    }

    /// The connection value required by this database type, if present and non-empty.
    pub fn connection(&self) -> Option<&str> {
        let value = match self.kind {
            DatabaseType::Sqlite => self.file.as_deref(),
            DatabaseType::Postgres | DatabaseType::Mysql => self.url.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Unset resolves to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<String>,
}

impl AuthConfig {
    /// Enabled auth with the given providers.
    pub fn with_providers<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: Some(true),
            providers: providers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

/// What the generated application contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Storage, API and client
    #[default]
    Full,
    /// API and storage, no client bindings
    Headless,
    /// API over external sources, no storage
    ApiOnly,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Headless => "headless",
            Mode::ApiOnly => "api-only",
        }
    }
}

/// Internationalization configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct I18nConfig {
    /// Unset resolves to `"en"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
    /// Empty resolves to `[default_locale]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
}

/// Multi-tenancy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancyConfig {
    /// Unset resolves to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Tenant discriminator field, unset resolves to `"tenantId"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Observability switches for generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Unset resolves to `true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<bool>,
    /// Unset resolves to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<bool>,
    /// Unset resolves to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracing: Option<bool>,
}

/// External REST API an entity is read from instead of local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Endpoints::is_empty")]
    pub endpoints: Endpoints,
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Endpoint path overrides; unset paths derive from the entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<String>,
}

impl Endpoints {
    pub fn is_empty(&self) -> bool {
        self.list.is_none()
            && self.get.is_none()
            && self.create.is_none()
            && self.update.is_none()
            && self.remove.is_none()
    }
}
