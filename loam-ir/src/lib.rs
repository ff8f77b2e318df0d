//! Intermediate representation types for the Loam manifest compiler.
//!
//! Both definition front-ends (the fluent builder and the document parser)
//! converge on the types in this crate. The compiler then turns a
//! [`Manifest`] into a [`ResolvedManifest`] that templates consume.
//!
//! # Architecture
//!
//! ```text
//! builder API ─┐
//!              ├→ Manifest → normalize → validate → resolve → ResolvedManifest → Template
//! document ────┘
//! ```
//!
//! Optional slots on [`Manifest`] and its children encode presence-as-intent:
//! `None` means "unset, use the documented default", which stays distinct
//! from an explicit `Some(false)`.

mod config;
mod entity;
mod field;
mod manifest;
mod patch;
mod relation;
mod resolved;

pub use config::{
    AuthConfig, DatabaseConfig, DatabaseType, Endpoints, I18nConfig, Mode, ObservabilityConfig,
    SUPPORTED_AUTH_PROVIDERS, SourceConfig, TenancyConfig,
};
pub use entity::{Behaviors, Entity, EntityDefaults, Operation, Protection};
pub use field::{DefaultValue, Field, FieldKind, Validation};
pub use manifest::Manifest;
pub use patch::EntityPatch;
pub use relation::{Pivot, Relation, RelationKind};
pub use resolved::{
    JunctionTable, ResolvedAuth, ResolvedBehaviors, ResolvedEndpoints, ResolvedEntity,
    ResolvedField, ResolvedI18n, ResolvedManifest, ResolvedObservability, ResolvedRelation,
    ResolvedSource, ResolvedTenancy,
};
