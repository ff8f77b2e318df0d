//! Document front-end: JSON and TOML manifests.
//!
//! Documents deserialize into private raw types that mirror the accepted
//! syntax, shorthands included, and are then reconciled into the canonical
//! IR. Shape errors are raised through serde so they carry source positions.

use std::{fmt, marker::PhantomData, path::Path};

use indexmap::IndexMap;
use loam_ir::{
    AuthConfig, Behaviors, DatabaseConfig, DefaultValue, Entity, EntityDefaults, EntityPatch,
    Field, FieldKind, I18nConfig, Manifest, Mode, ObservabilityConfig, Pivot, Protection,
    Relation, RelationKind, SourceConfig, TenancyConfig, Validation,
};
use serde::{
    Deserialize, Deserializer,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};

use crate::{Error, Result, error::SourceContext};

/// Parse a JSON manifest (uses "loam.json" as the filename in errors).
pub fn from_json_str(content: &str) -> Result<Manifest> {
    from_json_str_with_filename(content, "loam.json")
}

/// Parse a JSON manifest with a custom filename for error reporting.
pub fn from_json_str_with_filename(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let raw: RawManifest =
        serde_json::from_str(content).map_err(|e| source_ctx.json_error(e))?;
    Ok(raw.into())
}

/// Parse a TOML manifest (uses "loam.toml" as the filename in errors).
pub fn from_toml_str(content: &str) -> Result<Manifest> {
    from_toml_str_with_filename(content, "loam.toml")
}

/// Parse a TOML manifest with a custom filename for error reporting.
pub fn from_toml_str_with_filename(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let raw: RawManifest = toml::from_str(content).map_err(|e| source_ctx.toml_error(e))?;
    Ok(raw.into())
}

/// Parse a manifest file, choosing the syntax by extension.
pub fn from_file(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str());
    if !matches!(extension, Some("json") | Some("toml")) {
        return Err(Box::new(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    let filename = path.display().to_string();

    match extension {
        Some("toml") => from_toml_str_with_filename(&content, &filename),
        _ => from_json_str_with_filename(&content, &filename),
    }
}

/// Parse a single entity definition; `name` is required.
pub fn entity_from_json(content: &str) -> Result<Entity> {
    let source_ctx = SourceContext::new(content, "entity.json");
    let raw: RawEntity = serde_json::from_str(content).map_err(|e| source_ctx.json_error(e))?;
    raw.into_named_entity()
        .map_err(|e| source_ctx.json_error(<serde_json::Error as de::Error>::missing_field(e)))
}

/// Parse a single entity definition from an already decoded JSON value.
pub fn entity_from_value(value: serde_json::Value) -> Result<Entity> {
    let raw = RawEntity::deserialize(value).map_err(|e| Error::value("entity", e))?;
    raw.into_named_entity()
        .map_err(|e| Error::value("entity", <serde_json::Error as de::Error>::missing_field(e)))
}

/// Parse a partial entity update.
pub fn entity_patch_from_json(content: &str) -> Result<EntityPatch> {
    let source_ctx = SourceContext::new(content, "patch.json");
    let raw: RawEntityPatch =
        serde_json::from_str(content).map_err(|e| source_ctx.json_error(e))?;
    Ok(raw.into())
}

/// Parse a partial entity update from an already decoded JSON value.
pub fn entity_patch_from_value(value: serde_json::Value) -> Result<EntityPatch> {
    let raw = RawEntityPatch::deserialize(value).map_err(|e| Error::value("entity patch", e))?;
    Ok(raw.into())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(rename = "$schema")]
    _schema: Option<IgnoredAny>,
    #[serde(deserialize_with = "deserialize_entities")]
    entities: Vec<Entity>,
    database: Option<DatabaseConfig>,
    auth: Option<AuthConfig>,
    mode: Option<Mode>,
    i18n: Option<I18nConfig>,
    tenancy: Option<TenancyConfig>,
    observability: Option<ObservabilityConfig>,
    defaults: Option<RawDefaults>,
    source: Option<SourceConfig>,
    template: Option<String>,
}

impl From<RawManifest> for Manifest {
    fn from(raw: RawManifest) -> Self {
        Manifest {
            entities: raw.entities,
            database: raw.database,
            auth: raw.auth,
            mode: raw.mode,
            i18n: raw.i18n,
            tenancy: raw.tenancy,
            observability: raw.observability,
            defaults: raw.defaults.map(Into::into),
            source: raw.source,
            template: raw.template,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaults {
    behaviors: Option<RawBehaviors>,
    #[serde(rename = "protected")]
    protection: Option<ParsedProtection>,
}

impl From<RawDefaults> for EntityDefaults {
    fn from(raw: RawDefaults) -> Self {
        EntityDefaults {
            behaviors: raw.behaviors.map(Into::into).unwrap_or_default(),
            protection: raw.protection.map(|p| p.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntity {
    name: Option<String>,
    table: Option<String>,
    #[serde(default, deserialize_with = "unique_map")]
    fields: IndexMap<String, ParsedField>,
    #[serde(default, deserialize_with = "unique_map")]
    relations: IndexMap<String, ParsedRelation>,
    behaviors: Option<RawBehaviors>,
    #[serde(rename = "protected")]
    protection: Option<ParsedProtection>,
    source: Option<SourceConfig>,
}

impl RawEntity {
    fn into_entity(self, name: String) -> Entity {
        Entity {
            name,
            table: self.table,
            fields: self.fields.into_iter().map(|(k, v)| (k, v.0)).collect(),
            relations: self.relations.into_iter().map(|(k, v)| (k, v.0)).collect(),
            behaviors: self.behaviors.map(Into::into).unwrap_or_default(),
            protection: self.protection.map(|p| p.0),
            source: self.source,
        }
    }

    /// Convert an entity given in array form, where `name` is mandatory.
    fn into_named_entity(mut self) -> std::result::Result<Entity, &'static str> {
        let name = self.name.take().ok_or("name")?;
        Ok(self.into_entity(name))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawEntityPatch {
    #[serde(default, deserialize_with = "unique_map")]
    fields: IndexMap<String, ParsedField>,
    #[serde(default)]
    remove_fields: Vec<String>,
    #[serde(default, deserialize_with = "unique_map")]
    relations: IndexMap<String, ParsedRelation>,
    #[serde(default)]
    remove_relations: Vec<String>,
    behaviors: Option<RawBehaviors>,
    #[serde(rename = "protected")]
    protection: Option<ParsedProtection>,
    source: Option<SourceConfig>,
    table: Option<String>,
}

impl From<RawEntityPatch> for EntityPatch {
    fn from(raw: RawEntityPatch) -> Self {
        EntityPatch {
            fields: raw.fields.into_iter().map(|(k, v)| (k, v.0)).collect(),
            remove_fields: raw.remove_fields,
            relations: raw.relations.into_iter().map(|(k, v)| (k, v.0)).collect(),
            remove_relations: raw.remove_relations,
            behaviors: raw.behaviors.map(Into::into).unwrap_or_default(),
            protection: raw.protection.map(|p| p.0),
            source: raw.source,
            table: raw.table,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawBehaviors {
    timestamps: Option<bool>,
    soft_delete: Option<bool>,
    audit: Option<bool>,
}

impl From<RawBehaviors> for Behaviors {
    fn from(raw: RawBehaviors) -> Self {
        Behaviors {
            timestamps: raw.timestamps,
            soft_delete: raw.soft_delete,
            audit: raw.audit,
        }
    }
}

/// Field as written in a document, shorthands included.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawField {
    #[serde(rename = "type")]
    kind: String,
    required: Option<bool>,
    optional: Option<bool>,
    unique: Option<bool>,
    default: Option<DefaultValue>,
    values: Option<Vec<String>>,
    source_fields: Option<Vec<String>>,
    expression: Option<String>,
    #[serde(default)]
    validations: Vec<Validation>,
    email: Option<bool>,
    url: Option<bool>,
    regex: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    integer: Option<bool>,
    positive: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(try_from = "RawField")]
struct ParsedField(Field);

impl TryFrom<RawField> for ParsedField {
    type Error = String;

    fn try_from(raw: RawField) -> std::result::Result<Self, Self::Error> {
        let RawField {
            kind,
            required,
            optional,
            unique,
            default,
            mut values,
            mut source_fields,
            mut expression,
            mut validations,
            email,
            url,
            regex,
            min,
            max,
            integer,
            positive,
        } = raw;

        let kind = match kind.as_str() {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "date" => FieldKind::Date,
            "enum" => FieldKind::Enum {
                values: values.take().ok_or("enum fields require 'values'")?,
            },
            "computed" => FieldKind::Computed {
                source_fields: source_fields
                    .take()
                    .ok_or("computed fields require 'sourceFields'")?,
                expression: expression
                    .take()
                    .ok_or("computed fields require 'expression'")?,
            },
            other => {
                return Err(format!(
                    "unknown field type '{}', expected one of: text, number, boolean, date, enum, computed",
                    other
                ));
            }
        };

        if values.is_some() {
            return Err("'values' is only allowed on enum fields".into());
        }
        if source_fields.is_some() || expression.is_some() {
            return Err("'sourceFields' and 'expression' are only allowed on computed fields".into());
        }

        let required = match (required, optional) {
            (Some(required), Some(optional)) if required == optional => {
                return Err("'required' and 'optional' contradict each other".into());
            }
            (Some(required), _) => Some(required),
            (None, Some(optional)) => Some(!optional),
            (None, None) => None,
        };

        // Shorthands append after the explicit list in a fixed order.
        if email == Some(true) {
            validations.push(Validation::Email);
        }
        if url == Some(true) {
            validations.push(Validation::Url);
        }
        if let Some(pattern) = regex {
            validations.push(Validation::Regex(pattern));
        }
        if let Some(min) = min {
            validations.push(Validation::Min(min));
        }
        if let Some(max) = max {
            validations.push(Validation::Max(max));
        }
        if integer == Some(true) {
            validations.push(Validation::Integer);
        }
        if positive == Some(true) {
            validations.push(Validation::Positive);
        }

        Ok(ParsedField(Field {
            kind,
            required,
            unique,
            default,
            validations,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelation {
    #[serde(rename = "type")]
    kind: RelationKind,
    entity: String,
    field: Option<String>,
    pivot: Option<RawPivot>,
    #[serde(default)]
    external: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPivot {
    table: Option<String>,
    #[serde(default, deserialize_with = "unique_map")]
    fields: IndexMap<String, ParsedField>,
}

#[derive(Debug, Deserialize)]
#[serde(from = "RawRelation")]
struct ParsedRelation(Relation);

impl From<RawRelation> for ParsedRelation {
    fn from(raw: RawRelation) -> Self {
        ParsedRelation(Relation {
            kind: raw.kind,
            entity: raw.entity,
            field: raw.field,
            pivot: raw.pivot.map(|p| Pivot {
                table: p.table,
                fields: p.fields.into_iter().map(|(k, v)| (k, v.0)).collect(),
            }),
            external: raw.external,
        })
    }
}

/// Per-operation form of `protected`; omitted operations are unprotected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawOperations {
    list: bool,
    get: bool,
    create: bool,
    update: bool,
    remove: bool,
}

/// `protected` accepts a boolean, `"all"`, `"write"`, or an operation map.
#[derive(Debug)]
struct ParsedProtection(Protection);

impl<'de> Deserialize<'de> for ParsedProtection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProtectionVisitor;

        impl<'de> Visitor<'de> for ProtectionVisitor {
            type Value = Protection;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"a boolean, "all", "write", or a map of operation flags"#)
            }

            fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(if v {
                    Protection::all()
                } else {
                    Protection::none()
                })
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                match v {
                    "all" => Ok(Protection::all()),
                    "write" => Ok(Protection::write()),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }

            fn visit_map<M>(self, map: M) -> std::result::Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let ops = RawOperations::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(Protection {
                    list: ops.list,
                    get: ops.get,
                    create: ops.create,
                    update: ops.update,
                    remove: ops.remove,
                })
            }
        }

        deserializer
            .deserialize_any(ProtectionVisitor)
            .map(ParsedProtection)
    }
}

/// Deserialize a map, rejecting repeated keys instead of keeping the last.
fn unique_map<'de, D, V>(deserializer: D) -> std::result::Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueMapVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for UniqueMapVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = IndexMap<String, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map with unique keys")
        }

        fn visit_map<M>(self, mut map: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(key) = map.next_key::<String>()? {
                if entries.contains_key(&key) {
                    return Err(de::Error::custom(format_args!("duplicate key '{}'", key)));
                }
                let value = map.next_value()?;
                entries.insert(key, value);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
}

/// Deserialize entities from either array format (each with a `name`) or map
/// format (keyed by name).
fn deserialize_entities<'de, D>(deserializer: D) -> std::result::Result<Vec<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntitiesVisitor;

    impl<'de> Visitor<'de> for EntitiesVisitor {
        type Value = Vec<Entity>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an array of entities or a map of entities keyed by name")
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut entities = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(raw) = seq.next_element::<RawEntity>()? {
                let entity = raw
                    .into_named_entity()
                    .map_err(<A::Error as de::Error>::missing_field)?;
                entities.push(entity);
            }
            Ok(entities)
        }

        fn visit_map<M>(self, mut map: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut entities: Vec<Entity> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(name) = map.next_key::<String>()? {
                if entities.iter().any(|e| e.name == name) {
                    return Err(de::Error::custom(format_args!(
                        "duplicate entity '{}'",
                        name
                    )));
                }
                let raw: RawEntity = map.next_value()?;
                if let Some(declared) = &raw.name {
                    if *declared != name {
                        return Err(de::Error::custom(format_args!(
                            "entity keyed '{}' declares name '{}'",
                            name, declared
                        )));
                    }
                }
                entities.push(raw.into_entity(name));
            }
            Ok(entities)
        }
    }

    deserializer.deserialize_any(EntitiesVisitor)
}
