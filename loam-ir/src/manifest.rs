use serde::Serialize;

use crate::{
    AuthConfig, DatabaseConfig, Entity, EntityDefaults, I18nConfig, Mode, ObservabilityConfig,
    SourceConfig, TenancyConfig,
};

/// The full declarative description of entities plus global configuration.
///
/// A manifest is treated as a value: front-ends build one, the compiler
/// produces new ones from it, and nothing mutates a manifest it was handed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    /// Entities in declaration order
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenancy: Option<TenancyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<EntityDefaults>,
    /// Default external source for entities without their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
    /// Template selector, `name` or `name@version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Manifest {
    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entity(name).is_some()
    }

    pub fn entity_names(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.name.clone()).collect()
    }

    /// Effective mode, `full` when unset.
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.as_ref().is_some_and(AuthConfig::is_enabled)
    }
}
