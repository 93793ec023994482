//! Field definitions as delivered by an application-type schema, and the
//! renderable projection produced from them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of a field's option list.
///
/// The data service mixes bare values with `{value, label}` objects, sometimes
/// inside the same list. Only JSON objects are read as labeled entries;
/// arrays and every other value stay scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionEntry {
    /// `{ "value": ..., "label": ... }`; `value` may be missing
    Labeled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<Value>,
    },
    /// A bare string, number, boolean, array or null
    Scalar(Value),
}

impl<'de> Deserialize<'de> for OptionEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(mut entry) => OptionEntry::Labeled {
                value: entry.remove("value"),
                label: entry.remove("label"),
            },
            other => OptionEntry::Scalar(other),
        })
    }
}

impl OptionEntry {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn labeled(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self::Labeled {
            value: Some(value.into()),
            label: Some(Value::String(label.into())),
        }
    }
}

/// Node of an application-type schema tree.
///
/// `path` is the dot-qualified key the field's value is stored under
/// (`customData.color`); the wire name is `id`. Children arrive under
/// `fields`. Everything else the service sends (label, type, attributes,
/// sub-field layout hints) is kept verbatim in `attributes` for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<OptionEntry>,
    #[serde(
        rename = "fields",
        default,
        deserialize_with = "skip_null_entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// Set once the custom-data prefix has been stripped from `path`.
    #[serde(skip)]
    pub(crate) scoped: bool,
}

impl FieldDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<FieldDefinition>) -> Self {
        self.children = children;
        self
    }

    pub fn with_options(mut self, options: Vec<OptionEntry>) -> Self {
        self.options = options;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Whether `path` has already been rewritten to its unprefixed form
    pub fn is_scoped(&self) -> bool {
        self.scoped
    }
}

/// A field ready for rendering: flat, unprefixed, defaulted, options reduced
/// to plain values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableField {
    #[serde(rename = "id")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Previously stored custom-data values keyed by unprefixed path.
///
/// Empty for a record that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordValues(Map<String, Value>);

impl RecordValues {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a record's `customData` payload; anything but an object
    /// yields no values.
    pub fn from_custom_data(custom_data: Option<&Value>) -> Self {
        match custom_data {
            Some(Value::Object(map)) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RecordValues {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RecordValues {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Deserialize a list that may be `null`, treating `null` as empty
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list that may be `null` or contain `null` entries, dropping both
pub(crate) fn skip_null_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries.into_iter().flatten().collect())
}
