//! Configuration object families and their per-type attribute tables
//!
//! A family (e.g. identity mappers) is one REST endpoint whose objects come
//! in several variants, selected by the `type` attribute. The family schema
//! is the union of every variant's attributes; the variant table says which
//! of them apply, which are required and which get a server default.

pub mod extended_operation_handler;
pub mod identity_mapper;

use heck::ToLowerCamelCase;
use pingdirectory_core::resource::Value;
use pingdirectory_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::client::ConfigObject;
use crate::version::ProductVersion;

/// Attributes present on every object regardless of its type
pub const COMMON_ATTRIBUTES: &[&str] = &[
    "id",
    "type",
    "description",
    "enabled",
    "notifications",
    "required_actions",
    "last_updated",
];

/// A default applied at plan time when the configuration leaves the attribute unset
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    String(&'static str),
    Set(&'static [&'static str]),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(n) => Value::Int(n),
            DefaultValue::String(s) => Value::string(s),
            DefaultValue::Set(items) => Value::set(items.iter().copied()),
        }
    }
}

/// One value of the `type` discriminator
#[derive(Debug)]
pub struct Variant {
    pub type_name: &'static str,
    /// Type-specific attributes, in addition to [`COMMON_ATTRIBUTES`]
    pub attributes: &'static [&'static str],
    pub required: &'static [&'static str],
    pub defaults: &'static [(&'static str, DefaultValue)],
    /// False for types the server exposes but never lets clients create
    pub creatable: bool,
    pub min_version: Option<ProductVersion>,
}

impl Variant {
    pub const fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            attributes: &[],
            required: &[],
            defaults: &[],
            creatable: true,
            min_version: None,
        }
    }

    pub const fn attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.attributes = attributes;
        self
    }

    pub const fn required(mut self, required: &'static [&'static str]) -> Self {
        self.required = required;
        self
    }

    pub const fn defaults(mut self, defaults: &'static [(&'static str, DefaultValue)]) -> Self {
        self.defaults = defaults;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.creatable = false;
        self
    }

    pub const fn since(mut self, version: ProductVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn applies(&self, attribute: &str) -> bool {
        COMMON_ATTRIBUTES.contains(&attribute) || self.attributes.contains(&attribute)
    }

    pub fn default_for(&self, attribute: &str) -> Option<Value> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, value)| value.to_value())
    }

    pub fn is_supported_by(&self, version: ProductVersion) -> bool {
        self.min_version.is_none_or(|min| version >= min)
    }
}

/// A REST endpoint and the variants of the objects it holds
pub struct ConfigFamily {
    /// Suffix of the Terraform type names, e.g. "identity_mapper"
    pub resource_type: &'static str,
    /// Human readable name used in error messages
    pub display_name: &'static str,
    pub endpoint: &'static str,
    /// Property naming the object in an add request
    pub name_property: &'static str,
    /// Schema URN prefix; the variant name completes it
    pub schema_urn_prefix: &'static str,
    pub variants: &'static [Variant],
    pub schema: ResourceSchema,
}

impl ConfigFamily {
    pub fn variant(&self, type_name: &str) -> Option<&'static Variant> {
        self.variants.iter().find(|v| v.type_name == type_name)
    }

    /// Resolve the variant of a server object from its schema URNs
    pub fn variant_of(&self, object: &ConfigObject) -> Option<&'static Variant> {
        object
            .discriminator(self.schema_urn_prefix)
            .and_then(|type_name| self.variant(type_name))
    }

    pub fn schema_urn(&self, variant: &Variant) -> String {
        format!("{}{}", self.schema_urn_prefix, variant.type_name)
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.type_name).collect()
    }

    /// Schema of the single-object data source: `id` in, everything else computed
    pub fn data_source_schema(&self, name: &str) -> ResourceSchema {
        let mut schema = ResourceSchema::new(name);
        schema.description = self.schema.description.clone();
        for (attr_name, attr) in &self.schema.attributes {
            let attr = if attr_name == "id" {
                AttributeSchema::new("id", AttributeType::String)
                    .required()
                    .with_description(attr.description.clone().unwrap_or_default())
            } else {
                let mut computed = attr.clone();
                computed.required = false;
                computed.requires_replace = false;
                computed.default = None;
                computed.read_only()
            };
            schema = schema.attribute(attr);
        }
        schema
    }

    /// Schema of the list data source
    pub fn list_data_source_schema(&self, name: &str) -> ResourceSchema {
        ResourceSchema::new(name)
            .with_description(format!("Lists {} objects.", self.display_name))
            .attribute(
                AttributeSchema::new("filter", AttributeType::String)
                    .with_description("SCIM filter used when searching the configuration."),
            )
            .attribute(
                AttributeSchema::new("ids", AttributeType::string_set())
                    .read_only()
                    .with_description(format!(
                        "{} objects found in the configuration",
                        self.display_name
                    )),
            )
    }
}

/// Schema with the attributes every family shares
pub fn base_schema(resource_type: &str, type_names: &[&str], description: &str) -> ResourceSchema {
    ResourceSchema::new(resource_type)
        .with_description(description)
        .attribute(
            AttributeSchema::new("id", AttributeType::String)
                .required()
                .requires_replace()
                .with_description("Name of this config object."),
        )
        .attribute(
            AttributeSchema::new("type", AttributeType::enumeration(type_names))
                .required()
                .requires_replace()
                .with_description("The type of the config object."),
        )
        .attribute(property("description", AttributeType::String).with_description(
            "A description for this object.",
        ))
        .attribute(
            property("enabled", AttributeType::Bool)
                .required()
                .with_description("Indicates whether this object is enabled for use."),
        )
        .attribute(
            AttributeSchema::new("notifications", AttributeType::string_set())
                .read_only()
                .with_description("Notifications returned by the server."),
        )
        .attribute(
            AttributeSchema::new("required_actions", AttributeType::string_set())
                .read_only()
                .with_description("Required actions returned by the server."),
        )
        .attribute(
            AttributeSchema::new("last_updated", AttributeType::String)
                .read_only()
                .with_description("Timestamp of the last apply that changed this object."),
        )
}

/// Mark every type-specific attribute computed: the server fills those left unset
pub fn with_server_defaults(mut schema: ResourceSchema) -> ResourceSchema {
    for (name, attr) in schema.attributes.iter_mut() {
        if !COMMON_ATTRIBUTES.contains(&name.as_str()) {
            attr.computed = true;
        }
    }
    schema
}

/// Attribute backed by an API property named after it in lowerCamelCase
pub fn property(name: &str, attr_type: AttributeType) -> AttributeSchema {
    AttributeSchema::new(name, attr_type).with_provider_name(name.to_lower_camel_case())
}

/// Every supported family
pub fn families() -> Vec<ConfigFamily> {
    vec![
        extended_operation_handler::family(),
        identity_mapper::family(),
    ]
}
