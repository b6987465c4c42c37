//! Attribute schemas used to type check configuration
//!
//! Providers define a schema for each resource type so configuration can be
//! type checked before any request reaches the server.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Value shape an attribute accepts
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// One of a fixed list of strings
    Enum(Vec<String>),
    /// A base type narrowed by an extra check
    Constrained {
        name: &'static str,
        base: Box<AttributeType>,
        check: fn(&Value) -> Result<(), String>,
    },
    /// Unordered set whose members are checked against the inner type
    Set(Box<AttributeType>),
}

impl AttributeType {
    /// Enum type from a list of string literals
    pub fn enumeration(variants: &[&str]) -> Self {
        AttributeType::Enum(variants.iter().map(|v| v.to_string()).collect())
    }

    /// Set of plain strings
    pub fn string_set() -> Self {
        AttributeType::Set(Box::new(AttributeType::String))
    }

    /// Checks `value` against this type. Null and unknown always pass.
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        if matches!(value, Value::Null | Value::Unknown) {
            return Ok(());
        }
        match self {
            AttributeType::Constrained { base, check, .. } => {
                base.validate(value)?;
                check(value).map_err(|message| TypeError::ValidationFailed { message })
            }
            AttributeType::Enum(variants) => match value {
                Value::String(s) if variants.contains(s) => Ok(()),
                Value::String(s) => Err(TypeError::InvalidEnumVariant {
                    value: s.clone(),
                    expected: variants.clone(),
                }),
                other => Err(self.mismatch(other)),
            },
            AttributeType::Set(inner) => {
                let Value::Set(items) = value else {
                    return Err(self.mismatch(value));
                };
                items.iter().try_for_each(|item| {
                    inner
                        .validate(&Value::String(item.clone()))
                        .map_err(|e| TypeError::SetItemError {
                            item: item.clone(),
                            inner: Box::new(e),
                        })
                })
            }
            AttributeType::String if matches!(value, Value::String(_)) => Ok(()),
            AttributeType::Int if matches!(value, Value::Int(_)) => Ok(()),
            AttributeType::Bool if matches!(value, Value::Bool(_)) => Ok(()),
            _ => Err(self.mismatch(value)),
        }
    }

    fn mismatch(&self, value: &Value) -> TypeError {
        TypeError::TypeMismatch {
            expected: self.to_string(),
            got: value_kind(value).to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("String"),
            AttributeType::Int => f.write_str("Int"),
            AttributeType::Bool => f.write_str("Bool"),
            AttributeType::Enum(variants) => write!(f, "Enum({})", variants.join(" | ")),
            AttributeType::Constrained { name, .. } => f.write_str(name),
            AttributeType::Set(inner) => write!(f, "Set<{inner}>"),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Unknown => "Unknown",
        Value::String(_) => "String",
        Value::Int(_) => "Int",
        Value::Bool(_) => "Bool",
        Value::Set(_) => "Set",
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant { value: String, expected: Vec<String> },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is read-only and cannot be configured")]
    ReadOnly { name: String },

    #[error("Set item '{item}': {inner}")]
    SetItemError { item: String, inner: Box<TypeError> },

    #[error("Attribute '{name}': {inner}")]
    Attribute { name: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    /// Must be set in configuration
    pub required: bool,
    /// May be set in configuration
    pub optional: bool,
    /// Filled from the server when not configured
    pub computed: bool,
    /// Changing this attribute replaces the object instead of patching it
    pub requires_replace: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Provider-side property name (e.g., "identityMapper" in the configuration API)
    pub provider_name: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: true,
            computed: false,
            requires_replace: false,
            default: None,
            description: None,
            provider_name: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Optional attribute whose value is computed by the server when unset
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Attribute that is only ever set by the provider
    pub fn read_only(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self.required = false;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// True when the attribute can only be set by the provider
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Resource schema
///
/// Attributes are kept sorted by name, which fixes the order in which
/// requests and update operations are produced.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Type checks configured attributes. Errors come back sorted by attribute name,
    /// missing required attributes first.
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors: Vec<TypeError> = self
            .attributes
            .values()
            .filter(|schema| schema.required && schema.default.is_none())
            .filter(|schema| {
                attributes
                    .get(&schema.name)
                    .is_none_or(Value::is_empty_string)
            })
            .map(|schema| TypeError::MissingRequired {
                name: schema.name.clone(),
            })
            .collect();

        let configured: BTreeMap<&String, &Value> = attributes.iter().collect();
        for (name, value) in configured {
            let Some(schema) = self.attributes.get(name) else {
                errors.push(TypeError::UnknownAttribute { name: name.clone() });
                continue;
            };
            if schema.is_read_only() {
                if !value.is_null() {
                    errors.push(TypeError::ReadOnly { name: name.clone() });
                }
                continue;
            }
            if let Err(e) = schema.attr_type.validate(value) {
                errors.push(TypeError::Attribute {
                    name: name.clone(),
                    inner: Box::new(e),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Constrained types shared by the configuration object schemas
pub mod types {
    use super::{AttributeType, Value, validate_duration};

    fn int_where(name: &'static str, check: fn(&Value) -> Result<(), String>) -> AttributeType {
        AttributeType::Constrained {
            name,
            base: Box::new(AttributeType::Int),
            check,
        }
    }

    pub fn positive_int() -> AttributeType {
        int_where("PositiveInt", |value| match value {
            Value::Int(n) if *n <= 0 => Err("Value must be positive".to_string()),
            _ => Ok(()),
        })
    }

    pub fn non_negative_int() -> AttributeType {
        int_where("NonNegativeInt", |value| match value {
            Value::Int(n) if *n < 0 => Err("Value must not be negative".to_string()),
            _ => Ok(()),
        })
    }

    /// "<amount> <unit>" strings such as "30 s" or "5 minutes"; empty means unset
    pub fn duration() -> AttributeType {
        AttributeType::Constrained {
            name: "Duration",
            base: Box::new(AttributeType::String),
            check: |value| match value {
                Value::String(s) if !s.is_empty() => validate_duration(s),
                _ => Ok(()),
            },
        }
    }
}

const DURATION_UNITS: &[&str] = &[
    "ms",
    "millisecond",
    "milliseconds",
    "s",
    "second",
    "seconds",
    "m",
    "minute",
    "minutes",
    "h",
    "hour",
    "hours",
    "d",
    "day",
    "days",
    "w",
    "week",
    "weeks",
];

/// Validate a duration in the configuration API's "<amount> <unit>" form
pub fn validate_duration(duration: &str) -> Result<(), String> {
    let trimmed = duration.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);

    if amount.is_empty() {
        return Err(format!(
            "Invalid duration '{}': expected a number followed by a unit",
            duration
        ));
    }

    let unit = unit.trim();
    if DURATION_UNITS.contains(&unit) {
        Ok(())
    } else {
        Err(format!(
            "Invalid duration unit '{}' in '{}': expected one of {}",
            unit,
            duration,
            DURATION_UNITS.join(", ")
        ))
    }
}
