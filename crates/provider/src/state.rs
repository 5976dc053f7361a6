//! Per-operation resource state.
//!
//! The host exchanges state as a JSON object whose `id` key holds the
//! resource ID and whose other keys are the schema attributes.

use hemmer_provider_sdk::schema::{AttributeType, Schema};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::StateError;

/// State key holding the resource ID.
pub const ID_KEY: &str = "id";

/// State of one resource instance while an operation runs.
///
/// An empty ID means the resource does not exist.
#[derive(Debug, Clone)]
pub struct ResourceData {
    id: String,
    attributes: Map<String, Value>,
    new_resource: bool,
    types: HashMap<String, AttributeType>,
}

impl ResourceData {
    /// State for an existing resource.
    #[must_use]
    pub fn new(schema: &Schema, id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        let types = schema
            .block
            .attributes
            .iter()
            .map(|(name, attr)| (name.clone(), attr.attr_type.clone()))
            .collect();

        Self {
            id: id.into(),
            attributes,
            new_resource: false,
            types,
        }
    }

    /// State received from the host. `null` or a non-object is an empty state.
    #[must_use]
    pub fn from_state(schema: &Schema, state: Value) -> Self {
        let mut attributes = match state {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match attributes.remove(ID_KEY) {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };

        Self::new(schema, id, attributes)
    }

    /// State for a resource about to be created from its planned state.
    #[must_use]
    pub fn for_create(schema: &Schema, planned: Value) -> Self {
        let mut data = Self::from_state(schema, planned);
        data.id.clear();
        data.new_resource = true;
        data
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource as gone.
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Whether the resource is being created in this operation.
    #[must_use]
    pub fn is_new_resource(&self) -> bool {
        self.new_resource
    }

    /// String attribute, empty when unset or not a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Bool attribute, `false` when unset or not a bool.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Write an attribute declared in the schema.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let ty = self
            .types
            .get(key)
            .ok_or_else(|| StateError::UnknownAttribute(key.to_string()))?;

        let value = value.into();
        if !accepts(ty, &value) {
            return Err(StateError::TypeMismatch {
                attribute: key.to_string(),
                expected: type_name(ty),
                actual: json_type(&value),
            });
        }

        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// State to hand back to the host, or `None` once the resource is gone.
    #[must_use]
    pub fn into_state(self) -> Option<Value> {
        if self.id.is_empty() {
            return None;
        }

        let mut state = self.attributes;
        state.insert(ID_KEY.to_string(), Value::String(self.id));
        Some(Value::Object(state))
    }
}

/// Whether a JSON value fits an attribute type. `null` always does.
fn accepts(ty: &AttributeType, value: &Value) -> bool {
    match (ty, value) {
        (_, Value::Null)
        | (AttributeType::Dynamic, _)
        | (AttributeType::String, Value::String(_))
        | (AttributeType::Bool, Value::Bool(_))
        | (AttributeType::Float64, Value::Number(_))
        | (AttributeType::List(_) | AttributeType::Set(_), Value::Array(_))
        | (AttributeType::Map(_) | AttributeType::Object(_), Value::Object(_)) => true,
        (AttributeType::Int64, Value::Number(n)) => n.is_i64() || n.is_u64(),
        _ => false,
    }
}

fn type_name(ty: &AttributeType) -> &'static str {
    match ty {
        AttributeType::String => "string",
        AttributeType::Int64 => "int64",
        AttributeType::Float64 => "float64",
        AttributeType::Bool => "bool",
        AttributeType::List(_) => "list",
        AttributeType::Set(_) => "set",
        AttributeType::Map(_) => "map",
        AttributeType::Object(_) => "object",
        AttributeType::Dynamic => "dynamic",
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
