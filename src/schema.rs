//! Input schema derivation from command flags.
//!
//! Every visible flag becomes one property. Flags whose default renders as
//! the empty string are required; everything else is optional and carries
//! its default in the description.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::command::{Flag, FlagKind};

/// JSON Schema primitive types used in tool input schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
        }
    }
}

/// One schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub data_type: DataType,
    /// Item type, only meaningful for arrays.
    pub items: Option<DataType>,
    pub description: String,
}

/// Object schema of a tool's arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    pub properties: BTreeMap<String, Property>,
    /// Required property names in flag order.
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Render as a JSON Schema object.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for (name, property) in &self.properties {
            let mut entry = Map::new();
            entry.insert("type".into(), json!(property.data_type.as_str()));
            if property.data_type == DataType::Array
                && let Some(items) = property.items
            {
                entry.insert("items".into(), json!({ "type": items.as_str() }));
            }
            entry.insert("description".into(), json!(property.description));
            properties.insert(name.clone(), Value::Object(entry));
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !self.required.is_empty() {
            schema.insert("required".into(), json!(self.required));
        }
        schema
    }
}

/// Maps a flag onto its schema type and, for arrays, the item type.
pub type TypeMapper = Arc<dyn Fn(&Flag) -> (DataType, Option<DataType>) + Send + Sync>;

/// Built-in flag kind mapping. Unknown kinds map to `string`.
pub fn default_type_mapper(flag: &Flag) -> (DataType, Option<DataType>) {
    match flag.kind() {
        FlagKind::Bool => (DataType::Boolean, None),
        k if k.is_signed_int() || k.is_unsigned_int() => (DataType::Integer, None),
        k if k.is_float() => (DataType::Number, None),
        k if k.is_int_slice() => (DataType::Array, Some(DataType::Integer)),
        FlagKind::StringSlice => (DataType::Array, Some(DataType::String)),
        _ => (DataType::String, None),
    }
}

/// Description of a flag's property: override, or usage plus default.
pub fn property_description(flag: &Flag) -> String {
    if let Some(custom) = flag.overrides().effective_description() {
        return custom.to_string();
    }
    if flag.default_value().is_empty() {
        flag.usage().to_string()
    } else {
        format!("{} (default: {})", flag.usage(), flag.default_value())
    }
}

/// Property name of a flag: override name, else the flag name.
pub fn property_name(flag: &Flag) -> &str {
    flag.overrides().effective_name().unwrap_or(flag.name())
}

/// Build the input schema of a flag set. Hidden flags are skipped.
///
/// When two flags map to one property, a flag whose own name is the property
/// keeps it (that is the flag `--<property>` reaches); otherwise the first
/// one does.
pub fn build_schema<'a, I>(flags: I, mapper: Option<&TypeMapper>) -> InputSchema
where
    I: IntoIterator<Item = &'a Flag>,
{
    let mut schema = InputSchema::default();
    let mut owners: BTreeMap<String, &Flag> = BTreeMap::new();
    for flag in flags {
        if flag.is_hidden() {
            continue;
        }
        let name = property_name(flag).to_string();
        if let Some(owner) = owners.get(&name) {
            let takes_over = owner.name() != name && flag.name() == name;
            tracing::warn!(
                property = %name,
                kept = if takes_over { flag.name() } else { owner.name() },
                dropped = if takes_over { owner.name() } else { flag.name() },
                "flags share a property name"
            );
            if !takes_over {
                continue;
            }
            schema.required.retain(|r| *r != name);
        }
        owners.insert(name.clone(), flag);

        let (data_type, items) = match mapper {
            Some(map) => map(flag),
            None => default_type_mapper(flag),
        };
        if flag.is_required() && !schema.is_required(&name) {
            schema.required.push(name.clone());
        }
        schema.properties.insert(
            name,
            Property {
                data_type,
                items: if data_type == DataType::Array { items } else { None },
                description: property_description(flag),
            },
        );
    }
    schema
}
