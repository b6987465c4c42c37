//! Resource - Representing resources and their state

use std::collections::{BTreeSet, HashMap};
use std::fmt;

static NULL: Value = Value::Null;

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Resource type (e.g., "pingdirectory_identity_mapper")
    pub resource_type: String,
    /// Resource name (label given in the configuration)
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Attribute is not set
    #[default]
    Null,
    /// Computed attribute whose value is only known after apply
    Unknown,
    String(String),
    Int(i64),
    Bool(bool),
    /// Unordered set of strings
    Set(BTreeSet<String>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn empty_set() -> Self {
        Value::Set(BTreeSet::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// True for null and for the empty string
    pub fn is_empty_string(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Equality where null matches the empty string and the empty set
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
            (Value::Null, Value::Set(s)) | (Value::Set(s), Value::Null) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert to JSON for persisting. Unknown values cannot be persisted.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Unknown => None,
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Int(n) => Some(serde_json::Value::from(*n)),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Set(items) => Some(serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            )),
        }
    }

    /// Convert a JSON value back into a Value. Arrays must contain strings only.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(Value::Int),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<BTreeSet<_>>>()
                .map(Value::Set),
            serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Unknown => write!(f, "(known after apply)"),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Set(items) => {
                let strs: Vec<_> = items.iter().map(|s| format!("\"{}\"", s)).collect();
                write!(f, "[{}]", strs.join(", "))
            }
        }
    }
}

/// Desired state declared in configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: HashMap<String, Value>,
    /// If true, this is a data source (read-only) that won't be modified
    pub read_only: bool,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
            read_only: false,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns true if this resource is a data source (read-only)
    pub fn is_data_source(&self) -> bool {
        self.read_only
    }

    /// Attribute value, null when absent
    pub fn attribute(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }
}

/// Current state fetched from the server
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: ResourceId,
    /// Server-side identifier (the configuration object's name)
    pub identifier: Option<String>,
    pub attributes: HashMap<String, Value>,
    /// Whether this state exists
    pub exists: bool,
}

impl State {
    pub fn not_found(id: ResourceId) -> Self {
        Self {
            id,
            identifier: None,
            attributes: HashMap::new(),
            exists: false,
        }
    }

    pub fn existing(id: ResourceId, attributes: HashMap<String, Value>) -> Self {
        Self {
            id,
            identifier: None,
            attributes,
            exists: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Attribute value, null when absent
    pub fn attribute(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_equivalent_to_empty_string_and_empty_set() {
        assert!(Value::Null.equivalent(&Value::string("")));
        assert!(Value::string("").equivalent(&Value::Null));
        assert!(Value::Null.equivalent(&Value::empty_set()));
        assert!(!Value::Null.equivalent(&Value::string("x")));
        assert!(!Value::Null.equivalent(&Value::Bool(false)));
    }

    #[test]
    fn json_conversion_keeps_sets_unordered() {
        let json = serde_json::json!(["b", "a", "b"]);
        let value = Value::from_json(&json).unwrap();
        assert_eq!(value, Value::set(["a", "b"]));
        assert_eq!(value.to_json().unwrap(), serde_json::json!(["a", "b"]));
    }

    #[test]
    fn json_conversion_rejects_objects_and_mixed_arrays() {
        assert!(Value::from_json(&serde_json::json!({"a": 1})).is_none());
        assert!(Value::from_json(&serde_json::json!(["a", 1])).is_none());
        assert!(Value::Unknown.to_json().is_none());
    }

    #[test]
    fn missing_attribute_reads_as_null() {
        let resource = Resource::new("pingdirectory_identity_mapper", "mapper");
        assert!(resource.attribute("description").is_null());
    }

    #[test]
    fn display_values() {
        assert_eq!(Value::string("a").to_string(), "\"a\"");
        assert_eq!(Value::set(["x", "y"]).to_string(), "[\"x\", \"y\"]");
        assert_eq!(Value::Unknown.to_string(), "(known after apply)");
        assert_eq!(
            ResourceId::new("pingdirectory_identity_mapper", "m").to_string(),
            "pingdirectory_identity_mapper.m"
        );
    }
}
