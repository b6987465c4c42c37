//! Configuration file loading
//!
//! Configuration uses the Terraform JSON syntax:
//!
//! ```json
//! {
//!   "provider": { "pingdirectory": { "https_host": "https://localhost:1443" } },
//!   "resource": { "pingdirectory_identity_mapper": { "email": { "id": "Email" } } },
//!   "data": { "pingdirectory_identity_mappers": { "all": {} } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use pingdirectory_core::resource::{Resource, Value};
use serde_json::Map;
use thiserror::Error;

pub const PROVIDER_NAME: &str = "pingdirectory";

/// Block arguments handled by the host rather than the provider
const META_ARGUMENTS: &[&str] = &["depends_on", "lifecycle"];

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration at '{path}': {message}")]
    Invalid { path: String, message: String },
}

fn invalid(path: impl Into<String>, message: impl Into<String>) -> ConfigFileError {
    ConfigFileError::Invalid {
        path: path.into(),
        message: message.into(),
    }
}

/// A parsed configuration file
#[derive(Debug, Default)]
pub struct ConfigFile {
    /// Attributes of the `provider.pingdirectory` block
    pub provider: HashMap<String, Value>,
    pub resources: Vec<Resource>,
    pub data_sources: Vec<Resource>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigFileError> {
        let root: serde_json::Value = serde_json::from_str(content)?;
        let root = root
            .as_object()
            .ok_or_else(|| invalid("$", "expected a JSON object"))?;

        let mut file = ConfigFile::default();

        for (key, value) in root {
            match key.as_str() {
                "provider" => file.provider = parse_provider(value)?,
                "resource" => file.resources = parse_blocks("resource", value, false)?,
                "data" => file.data_sources = parse_blocks("data", value, true)?,
                "terraform" | "variable" | "output" | "locals" => {
                    log::debug!("ignoring top-level '{}' block", key);
                }
                other => return Err(invalid(other, "unknown top-level block")),
            }
        }

        Ok(file)
    }

    /// Resources followed by data sources, each section in address order
    pub fn all_blocks(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().chain(self.data_sources.iter())
    }
}

fn parse_provider(value: &serde_json::Value) -> Result<HashMap<String, Value>, ConfigFileError> {
    let providers = value
        .as_object()
        .ok_or_else(|| invalid("provider", "expected an object"))?;

    let mut attributes = HashMap::new();
    for (name, block) in providers {
        if name != PROVIDER_NAME {
            return Err(invalid(
                format!("provider.{}", name),
                format!("only the '{}' provider is supported", PROVIDER_NAME),
            ));
        }
        let path = format!("provider.{}", name);
        attributes = parse_attributes(&path, single_block(&path, block)?)?;
    }
    Ok(attributes)
}

fn parse_blocks(
    section: &str,
    value: &serde_json::Value,
    data_source: bool,
) -> Result<Vec<Resource>, ConfigFileError> {
    let types = value
        .as_object()
        .ok_or_else(|| invalid(section, "expected an object keyed by type"))?;

    let mut resources = Vec::new();
    for (resource_type, named) in types {
        let type_path = format!("{}.{}", section, resource_type);
        let named = named
            .as_object()
            .ok_or_else(|| invalid(&type_path, "expected an object keyed by name"))?;

        for (name, block) in named {
            let path = format!("{}.{}", type_path, name);
            let attributes = parse_attributes(&path, single_block(&path, block)?)?;
            let mut resource = Resource::new(resource_type.clone(), name.clone())
                .with_read_only(data_source);
            resource.attributes = attributes;
            resources.push(resource);
        }
    }
    resources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(resources)
}

/// Terraform JSON allows a block to be written as a one-element array
fn single_block<'a>(
    path: &str,
    block: &'a serde_json::Value,
) -> Result<&'a Map<String, serde_json::Value>, ConfigFileError> {
    match block {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Array(items) if items.len() == 1 => single_block(path, &items[0]),
        _ => Err(invalid(path, "expected a block object")),
    }
}

fn parse_attributes(
    path: &str,
    block: &Map<String, serde_json::Value>,
) -> Result<HashMap<String, Value>, ConfigFileError> {
    let mut attributes = HashMap::new();
    for (key, json) in block {
        if META_ARGUMENTS.contains(&key.as_str()) {
            continue;
        }
        let value = Value::from_json(json).ok_or_else(|| {
            invalid(
                format!("{}.{}", path, key),
                "expected a string, number, boolean, null or list of strings",
            )
        })?;
        attributes.insert(key.clone(), value);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "provider": {
            "pingdirectory": {
                "https_host": "https://localhost:1443",
                "username": "cn=administrator",
                "insecure_trust_all_tls": true,
                "product_version": "9.3.0.0"
            }
        },
        "resource": {
            "pingdirectory_identity_mapper": {
                "email": {
                    "id": "Email",
                    "type": "exact-match",
                    "match_attribute": ["mail"],
                    "depends_on": ["pingdirectory_identity_mapper.uid"]
                }
            },
            "pingdirectory_default_extended_operation_handler": {
                "tls": [{ "id": "StartTLS", "type": "start-tls", "enabled": false }]
            }
        },
        "data": {
            "pingdirectory_identity_mappers": { "all": { "filter": "enabled eq true" } }
        }
    }"#;

    #[test]
    fn parses_provider_resources_and_data_sources() {
        let file = ConfigFile::parse(EXAMPLE).unwrap();

        assert_eq!(
            file.provider.get("https_host"),
            Some(&Value::string("https://localhost:1443"))
        );
        assert_eq!(
            file.provider.get("insecure_trust_all_tls"),
            Some(&Value::Bool(true))
        );

        assert_eq!(file.resources.len(), 2);
        let email = file
            .resources
            .iter()
            .find(|r| r.id.name == "email")
            .unwrap();
        assert_eq!(email.attribute("match_attribute"), &Value::set(["mail"]));
        assert!(!email.attributes.contains_key("depends_on"));
        assert!(!email.is_data_source());

        let tls = file.resources.iter().find(|r| r.id.name == "tls").unwrap();
        assert_eq!(tls.attribute("enabled"), &Value::Bool(false));

        assert_eq!(file.data_sources.len(), 1);
        assert!(file.data_sources[0].is_data_source());
        assert_eq!(file.all_blocks().count(), 3);
    }

    #[test]
    fn blocks_come_in_address_order() {
        let file = ConfigFile::parse(
            r#"{
                "resource": {
                    "pingdirectory_identity_mapper": {
                        "zeta": { "id": "Zeta" },
                        "alpha": { "id": "Alpha" }
                    },
                    "pingdirectory_extended_operation_handler": {
                        "pm": { "id": "Password Modify" }
                    }
                },
                "data": {
                    "pingdirectory_identity_mappers": { "all": {} }
                }
            }"#,
        )
        .unwrap();

        let addresses: Vec<String> = file.all_blocks().map(|r| r.id.to_string()).collect();
        assert_eq!(
            addresses,
            vec![
                "pingdirectory_extended_operation_handler.pm",
                "pingdirectory_identity_mapper.alpha",
                "pingdirectory_identity_mapper.zeta",
                "pingdirectory_identity_mappers.all",
            ]
        );
    }

    #[test]
    fn rejects_other_providers() {
        let err = ConfigFile::parse(r#"{"provider": {"aws": {}}}"#).unwrap_err();
        assert!(err.to_string().contains("provider.aws"));
    }

    #[test]
    fn rejects_nested_objects() {
        let err = ConfigFile::parse(
            r#"{"resource": {"pingdirectory_identity_mapper": {"x": {"match_attribute": {"a": 1}}}}}"#,
        )
        .unwrap_err();
        assert!(
            err.to_string()
                .contains("resource.pingdirectory_identity_mapper.x.match_attribute")
        );
    }

    #[test]
    fn rejects_unknown_sections_and_bad_json() {
        assert!(matches!(
            ConfigFile::parse(r#"{"module": {}}"#),
            Err(ConfigFileError::Invalid { .. })
        ));
        assert!(matches!(
            ConfigFile::parse("{"),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.tf.json");
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.tf.json"));
    }
}
