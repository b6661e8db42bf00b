//! Model definitions, the registry, and model instances.
//!
//! The registry answers one question for the adapter: which properties of a
//! kind are temporal, so that their string wire form can be parsed back into
//! timestamps when an entity is materialised.

use crate::error::{TabulaError, TabulaResult};
use crate::query::{Value, parse_timestamp};
use crate::transport::Entity;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Declared property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Text,
    Int,
    Number,
    Boolean,
    Datetime,
    Date,
    Object,
}

impl DataType {
    /// Stored as strings, read back as timestamps.
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Datetime | DataType::Date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub datatype: DataType,
}

/// Property list for one model kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    pub name: String,
    pub properties: Vec<PropertyDef>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, datatype: DataType) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            datatype,
        });
        self
    }

    pub fn datatype_of(&self, name: &str) -> Option<DataType> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.datatype)
    }
}

/// Implemented by `#[derive(Model)]`.
pub trait Model {
    /// Kind name, also the table name.
    const MODEL_NAME: &'static str;

    fn definition() -> ModelDefinition;
}

/// Parse a temporal property. `Date` columns also accept a bare `YYYY-MM-DD`.
fn parse_temporal(datatype: DataType, text: &str) -> TabulaResult<DateTime<Utc>> {
    match parse_timestamp(text) {
        Ok(ts) => Ok(ts),
        Err(err) if datatype == DataType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or(err),
        Err(err) => Err(err),
    }
}

/// Registry of model definitions, keyed by kind.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, ModelDefinition>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a definition.
    pub fn register(&self, definition: ModelDefinition) {
        self.models
            .write()
            .insert(definition.name.clone(), definition);
    }

    pub fn register_model<M: Model>(&self) {
        self.register(M::definition());
    }

    pub fn get(&self, kind: &str) -> Option<ModelDefinition> {
        self.models.read().get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.models.read().contains_key(kind)
    }

    /// Build a saved instance of `kind` from a stored entity.
    ///
    /// Temporal properties are parsed from their string form; a stored value
    /// that does not parse is kept as text. The row key becomes the id unless
    /// the entity carries its own `id` property.
    pub fn materialize(
        &self,
        kind: &str,
        entity: Entity,
        scenario: Option<&str>,
    ) -> TabulaResult<ModelInstance> {
        let models = self.models.read();
        let definition = models
            .get(kind)
            .ok_or_else(|| TabulaError::ModelNotRegistered(kind.to_string()))?;

        let mut instance = ModelInstance::new(kind);
        for (name, value) in entity.properties {
            if name == "id" {
                instance.id = value.as_str().map(str::to_string);
                continue;
            }
            let value = match (definition.datatype_of(&name), value) {
                (Some(dt), Value::String(text)) if dt.is_temporal() => {
                    match parse_temporal(dt, &text) {
                        Ok(ts) => Value::DateTime(ts),
                        Err(err) => {
                            warn!(
                                kind,
                                field = %name,
                                error = %err,
                                "unparsable stored timestamp kept as text"
                            );
                            Value::String(text)
                        }
                    }
                }
                (_, other) => other,
            };
            instance.fields.insert(name, value);
        }
        if instance.id.is_none() {
            instance.id = Some(entity.row_key);
        }
        instance.saved = true;
        instance.scenario = scenario.map(str::to_string);
        Ok(instance)
    }
}

/// A record on the ORM side of the adapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelInstance {
    pub kind: String,
    pub id: Option<String>,
    pub fields: BTreeMap<String, Value>,
    /// Set once the instance is known to exist remotely.
    pub saved: bool,
    pub scenario: Option<String>,
}

impl ModelInstance {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Convert a typed model through its serde representation.
    ///
    /// Temporal properties (per [`Model::definition`]) are kept as timestamps.
    pub fn from_model<M: Model + Serialize>(model: &M) -> TabulaResult<Self> {
        let definition = M::definition();
        let serde_json::Value::Object(map) = serde_json::to_value(model)? else {
            return Err(TabulaError::Serialization(format!(
                "model '{}' does not serialize to an object",
                M::MODEL_NAME
            )));
        };

        let mut instance = ModelInstance::new(M::MODEL_NAME);
        for (name, json) in map {
            if name == "id" {
                instance.id = match json {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                };
                continue;
            }
            let value = match (definition.datatype_of(&name), Value::from_json(json)) {
                (Some(dt), Value::String(text)) if dt.is_temporal() => {
                    Value::DateTime(parse_temporal(dt, &text)?)
                }
                (_, other) => other,
            };
            instance.fields.insert(name, value);
        }
        Ok(instance)
    }

    /// Convert back into a typed model.
    pub fn to_model<M: DeserializeOwned>(&self) -> TabulaResult<M> {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        if let Some(id) = &self.id {
            map.insert("id".to_string(), serde_json::Value::String(id.clone()));
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }

    /// Entity with the given keys and every field in wire form.
    /// The id is carried by the row key only.
    pub fn to_entity(&self, partition_key: &str, row_key: &str) -> Entity {
        let mut entity = Entity::new(partition_key, row_key);
        for (name, value) in &self.fields {
            entity
                .properties
                .insert(name.clone(), value.clone().into_wire());
        }
        entity
    }
}
