//! Provider configuration
//!
//! Values come from the `provider "pingdirectory"` block; anything left unset
//! there is looked up in `PINGDIRECTORY_PROVIDER_*` environment variables.

use std::collections::HashMap;
use std::fmt;

use pingdirectory_core::resource::Value;
use pingdirectory_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use thiserror::Error;

use crate::version::ProductVersion;

pub const ENV_HTTPS_HOST: &str = "PINGDIRECTORY_PROVIDER_HTTPS_HOST";
pub const ENV_USERNAME: &str = "PINGDIRECTORY_PROVIDER_USERNAME";
pub const ENV_PASSWORD: &str = "PINGDIRECTORY_PROVIDER_PASSWORD";
pub const ENV_INSECURE_TRUST_ALL_TLS: &str = "PINGDIRECTORY_PROVIDER_INSECURE_TRUST_ALL_TLS";
pub const ENV_CA_CERTIFICATE_PEM_FILES: &str = "PINGDIRECTORY_PROVIDER_CA_CERTIFICATE_PEM_FILES";
pub const ENV_PRODUCT_VERSION: &str = "PINGDIRECTORY_PROVIDER_PRODUCT_VERSION";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing provider attribute '{attribute}': set it in the provider block or via {env}")]
    Missing {
        attribute: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for provider attribute '{attribute}': {message}")]
    Invalid {
        attribute: &'static str,
        message: String,
    },

    #[error("Invalid provider block: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },
}

/// Connection settings for one PingDirectory server
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL, e.g. `https://localhost:1443`
    pub https_host: String,
    pub username: String,
    pub password: String,
    pub insecure_trust_all_tls: bool,
    pub ca_certificate_pem_files: Vec<String>,
    pub product_version: ProductVersion,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("https_host", &self.https_host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure_trust_all_tls", &self.insecure_trust_all_tls)
            .field("ca_certificate_pem_files", &self.ca_certificate_pem_files)
            .field("product_version", &self.product_version)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(
        https_host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        product_version: ProductVersion,
    ) -> Self {
        Self {
            https_host: https_host.into(),
            username: username.into(),
            password: password.into(),
            insecure_trust_all_tls: false,
            ca_certificate_pem_files: Vec::new(),
            product_version,
        }
    }

    pub fn with_insecure_trust_all_tls(mut self, insecure: bool) -> Self {
        self.insecure_trust_all_tls = insecure;
        self
    }

    pub fn with_ca_certificate_pem_file(mut self, path: impl Into<String>) -> Self {
        self.ca_certificate_pem_files.push(path.into());
        self
    }

    /// Resolve configuration from provider block attributes and the process environment
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        Self::resolve(attributes, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup
    pub fn resolve(
        attributes: &HashMap<String, Value>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        provider_schema()
            .validate(attributes)
            .map_err(|errors| ConfigError::Schema {
                errors: errors.iter().map(ToString::to_string).collect(),
            })?;

        let string = |attribute: &'static str, var: &'static str| -> Result<String, ConfigError> {
            attributes
                .get(attribute)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| env(var).filter(|s| !s.is_empty()))
                .ok_or(ConfigError::Missing {
                    attribute,
                    env: var,
                })
        };

        let https_host = string("https_host", ENV_HTTPS_HOST)?;
        let username = string("username", ENV_USERNAME)?;
        let password = string("password", ENV_PASSWORD)?;

        let product_version = string("product_version", ENV_PRODUCT_VERSION)?
            .parse::<ProductVersion>()
            .map_err(|message| ConfigError::Invalid {
                attribute: "product_version",
                message,
            })?;

        let insecure_trust_all_tls = match attributes
            .get("insecure_trust_all_tls")
            .and_then(Value::as_bool)
        {
            Some(b) => b,
            None => match env(ENV_INSECURE_TRUST_ALL_TLS) {
                Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                    attribute: "insecure_trust_all_tls",
                    message: format!("expected true or false, got '{}'", raw),
                })?,
                None => false,
            },
        };

        let ca_certificate_pem_files = match attributes
            .get("ca_certificate_pem_files")
            .and_then(Value::as_set)
        {
            Some(files) => files.iter().cloned().collect(),
            None => env(ENV_CA_CERTIFICATE_PEM_FILES)
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(Self {
            https_host,
            username,
            password,
            insecure_trust_all_tls,
            ca_certificate_pem_files,
            product_version,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Schema of the provider block
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new("pingdirectory")
        .with_description("Connection settings for the PingDirectory configuration API")
        .attribute(
            AttributeSchema::new("https_host", AttributeType::String)
                .with_description("URI for PingDirectory HTTPS port."),
        )
        .attribute(
            AttributeSchema::new("username", AttributeType::String)
                .with_description("Username for PingDirectory admin user."),
        )
        .attribute(
            AttributeSchema::new("password", AttributeType::String)
                .with_description("Password for PingDirectory admin user."),
        )
        .attribute(
            AttributeSchema::new("insecure_trust_all_tls", AttributeType::Bool)
                .with_description("Set to true to trust any certificate when connecting."),
        )
        .attribute(
            AttributeSchema::new("ca_certificate_pem_files", AttributeType::string_set())
                .with_description("Paths to PEM files containing trusted CA certificates."),
        )
        .attribute(
            AttributeSchema::new("product_version", AttributeType::String)
                .with_description("Version of the PingDirectory server being configured."),
        )
}
