//! PingDirectory provider implementation
//!
//! This module contains the provider that validates and plans resources
//! locally and talks to the configuration API to manage them.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info, warn};
use pingdirectory_core::diagnostics::Diagnostics;
use pingdirectory_core::operations::Operation;
use pingdirectory_core::provider::{ProviderError, ProviderResult};
use pingdirectory_core::resource::{Resource, ResourceId, State, Value};
use pingdirectory_core::schema::TypeError;

use crate::client::{ApiError, ConfigApiClient, ConfigObject, UpdateRequest};
use crate::config::ProviderConfig;
use crate::mapping::{build_add_request, read_config_object, resolve_variant, update_operations};
use crate::resources::{BindingKind, TypeBinding, binding};
use crate::schemas::{self, ConfigFamily, Variant};

/// PingDirectory configuration API provider
pub struct PingDirectoryProvider {
    client: ConfigApiClient,
    config: ProviderConfig,
    families: Vec<ConfigFamily>,
}

impl PingDirectoryProvider {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let client = ConfigApiClient::new(&config).map_err(|e| {
            ProviderError::new(format!("Unable to create configuration API client: {}", e))
                .with_cause(e)
        })?;

        Ok(Self {
            client,
            config,
            families: schemas::families(),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Binding and family serving a resource or data source type
    fn lookup(
        &self,
        id: &ResourceId,
        data_source: bool,
    ) -> ProviderResult<(&'static TypeBinding, &ConfigFamily)> {
        let unknown = || {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        };
        let binding = binding(&id.resource_type, data_source).ok_or_else(unknown)?;
        let family = self
            .families
            .iter()
            .find(|f| f.resource_type == binding.family)
            .ok_or_else(unknown)?;
        Ok((binding, family))
    }

    fn variant_for(
        &self,
        id: &ResourceId,
        family: &ConfigFamily,
        attributes: &HashMap<String, Value>,
    ) -> ProviderResult<&'static Variant> {
        resolve_variant(family, attributes)
            .map_err(|message| ProviderError::new(message).for_resource(id.clone()))
    }

    /// Variant of an object returned by the server
    fn variant_of_object(
        &self,
        id: &ResourceId,
        family: &ConfigFamily,
        object: &ConfigObject,
    ) -> ProviderResult<&'static Variant> {
        family.variant_of(object).ok_or_else(|| {
            ProviderError::new(format!(
                "Unrecognized {} type in response schemas {:?}",
                family.display_name, object.schemas
            ))
            .for_resource(id.clone())
        })
    }

    // =========================================================================
    // Validation and planning
    // =========================================================================

    /// Check a resource against its schema and the rules of its type
    pub fn validate_resource(&self, resource: &Resource) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Ok((binding, family)) = self.lookup(&resource.id, resource.is_data_source()) else {
            diags.add_error(
                "Unsupported type",
                format!(
                    "{} is not supported by this provider",
                    resource.id.resource_type
                ),
            );
            return diags;
        };

        let schema = binding.schema_for(family);
        if let Err(errors) = schema.validate(&resource.attributes) {
            for error in errors {
                push_type_error(&mut diags, error);
            }
        }

        if binding.is_data_source() {
            return diags;
        }

        // Without a known type the per-type rules cannot be checked yet
        let Some(type_name) = resource.attribute("type").as_str() else {
            return diags;
        };
        let Some(variant) = family.variant(type_name) else {
            return diags;
        };

        for (name, value) in &resource.attributes {
            if !value.is_null() && !variant.applies(name) {
                diags.add_attribute_error(
                    name.clone(),
                    "Invalid Attribute Combination",
                    format!(
                        "Attribute '{}' is not allowed when type is '{}'",
                        name, type_name
                    ),
                );
            }
        }

        if binding.kind == BindingKind::Resource {
            for required in variant.required {
                if resource.attribute(required).is_empty_string() {
                    diags.add_attribute_error(
                        *required,
                        "Missing Attribute Configuration",
                        format!(
                            "Attribute '{}' must be set when type is '{}'",
                            required, type_name
                        ),
                    );
                }
            }

            if !variant.creatable {
                diags.add_attribute_error(
                    "type",
                    "Unsupported Type",
                    format!(
                        "Type '{}' cannot be created; manage an existing object with the default_ resource instead",
                        type_name
                    ),
                );
            }
        }

        if !variant.is_supported_by(self.config.product_version) {
            let min = variant
                .min_version
                .map(|v| v.to_string())
                .unwrap_or_default();
            diags.add_attribute_error(
                "type",
                "Unsupported Type For Version",
                format!(
                    "Type '{}' requires PingDirectory {} or later, but the provider is configured for {}",
                    type_name, min, self.config.product_version
                ),
            );
        }

        diags
    }

    /// Fill defaults and computed values for the planned resource
    pub fn plan_resource(&self, desired: &Resource, prior: &State) -> ProviderResult<Resource> {
        if desired.is_data_source() {
            return Ok(desired.clone());
        }

        let (binding, family) = self.lookup(&desired.id, false)?;
        let variant = self.variant_for(&desired.id, family, &desired.attributes)?;
        let schema = binding.schema_for(family);

        // Changing `type`, `id` or any other replace-only attribute creates a
        // fresh object, so nothing carries over from the old one
        let replaced = schema
            .attributes
            .values()
            .filter(|attr| attr.requires_replace)
            .any(|attr| {
                !desired
                    .attribute(&attr.name)
                    .equivalent(prior.attribute(&attr.name))
            });
        let carry_prior = prior.exists && !replaced;

        let mut planned = desired.clone();
        for (name, attr) in &schema.attributes {
            if attr.is_read_only() {
                continue;
            }
            let configured = desired.attribute(name);
            if !configured.is_null() {
                continue;
            }

            let value = if !variant.applies(name) {
                Value::Null
            } else if let Some(default) = variant.default_for(name) {
                default
            } else if attr.computed {
                if carry_prior {
                    prior.attribute(name).clone()
                } else {
                    Value::Unknown
                }
            } else {
                Value::Null
            };
            planned.attributes.insert(name.clone(), value);
        }

        let will_change = !carry_prior
            || schema.attributes.iter().any(|(name, attr)| {
                let planned_value = planned.attribute(name);
                !attr.is_read_only()
                    && !planned_value.is_unknown()
                    && !planned_value.equivalent(prior.attribute(name))
            });

        for name in ["notifications", "required_actions", "last_updated"] {
            let value = if will_change {
                Value::Unknown
            } else {
                prior.attribute(name).clone()
            };
            planned.attributes.insert(name.to_string(), value);
        }

        Ok(planned)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Refresh a resource from the server
    pub async fn read_resource(&self, prior: &State) -> ProviderResult<State> {
        let id = &prior.id;
        let (_, family) = self.lookup(id, false)?;

        let Some(identifier) = prior.identifier.as_deref() else {
            return Ok(State::not_found(id.clone()));
        };

        let object = match self.client.get(family.endpoint, identifier).await {
            Ok(Some(object)) => object,
            Ok(None) => {
                warn!(
                    "{} '{}' not found on the server",
                    family.display_name, identifier
                );
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(api_error("reading", family, id, e)),
        };

        let variant = self.variant_of_object(id, family, &object)?;
        Ok(read_config_object(
            family,
            variant,
            &object,
            id.clone(),
            Some(&prior.attributes),
        ))
    }

    /// Create a resource, or take over an existing object for edit-only types
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let id = &resource.id;
        let (binding, family) = self.lookup(id, false)?;
        let variant = self.variant_for(id, family, &resource.attributes)?;
        let name = object_name(resource)?;

        if binding.is_edit_only() {
            return self.adopt_existing(family, variant, resource, &name).await;
        }

        let request = build_add_request(family, variant, &name, &resource.attributes);
        debug!(
            "Add request for {}: {}",
            id,
            serde_json::to_string(&request).unwrap_or_default()
        );

        let object = self
            .client
            .add(family.endpoint, &request)
            .await
            .map_err(|e| api_error("creating", family, id, e))?;
        info!("Created {} '{}'", family.display_name, object.id);

        let state = read_config_object(
            family,
            variant,
            &object,
            id.clone(),
            Some(&resource.attributes),
        );
        Ok(touch(state))
    }

    /// Edit-only create: read the existing object and patch it toward the plan
    async fn adopt_existing(
        &self,
        family: &ConfigFamily,
        variant: &Variant,
        resource: &Resource,
        name: &str,
    ) -> ProviderResult<State> {
        let id = &resource.id;
        let existing = self
            .client
            .get(family.endpoint, name)
            .await
            .map_err(|e| api_error("reading", family, id, e))?
            .ok_or_else(|| {
                ProviderError::new(format!(
                    "{} '{}' does not exist; default_ resources can only manage existing objects",
                    family.display_name, name
                ))
                .for_resource(id.clone())
            })?;

        let actual = self.variant_of_object(id, family, &existing)?;
        if actual.type_name != variant.type_name {
            return Err(ProviderError::new(format!(
                "{} '{}' has type '{}', but the configuration declares '{}'",
                family.display_name, name, actual.type_name, variant.type_name
            ))
            .for_resource(id.clone()));
        }

        let current = read_config_object(
            family,
            variant,
            &existing,
            id.clone(),
            Some(&resource.attributes),
        );
        let operations =
            update_operations(family, variant, &resource.attributes, &current.attributes);

        if operations.is_empty() {
            debug!("{} already matches the configuration", id);
            return Ok(touch(current));
        }

        self.patch(family, variant, resource, name, operations, "updating")
            .await
    }

    /// Apply configuration changes with PATCH
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let (_, family) = self.lookup(id, false)?;
        let variant = self.variant_for(id, family, &to.attributes)?;

        let operations = update_operations(family, variant, &to.attributes, &from.attributes);
        if operations.is_empty() {
            debug!("No update operations for {}", id);
            let object = self
                .client
                .get(family.endpoint, identifier)
                .await
                .map_err(|e| api_error("reading", family, id, e))?
                .ok_or_else(|| {
                    ProviderError::new(format!(
                        "{} '{}' no longer exists",
                        family.display_name, identifier
                    ))
                    .for_resource(id.clone())
                })?;
            return Ok(touch(read_config_object(
                family,
                variant,
                &object,
                id.clone(),
                Some(&to.attributes),
            )));
        }

        self.patch(family, variant, to, identifier, operations, "updating")
            .await
    }

    async fn patch(
        &self,
        family: &ConfigFamily,
        variant: &Variant,
        planned: &Resource,
        identifier: &str,
        operations: Vec<Operation>,
        action: &str,
    ) -> ProviderResult<State> {
        let id = &planned.id;
        for op in &operations {
            debug!("{}: {}", id, op);
        }

        let object = self
            .client
            .update(family.endpoint, identifier, &UpdateRequest { operations })
            .await
            .map_err(|e| api_error(action, family, id, e))?;
        info!("Updated {} '{}'", family.display_name, object.id);

        let state = read_config_object(
            family,
            variant,
            &object,
            id.clone(),
            Some(&planned.attributes),
        );
        Ok(touch(state))
    }

    /// Delete a resource; edit-only objects are only dropped from state
    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let (binding, family) = self.lookup(id, false)?;

        if binding.is_edit_only() {
            info!(
                "{} '{}' cannot be deleted; removing it from state only",
                family.display_name, identifier
            );
            return Ok(());
        }

        match self.client.delete(family.endpoint, identifier).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!(
                    "{} '{}' was already deleted",
                    family.display_name, identifier
                );
                Ok(())
            }
            Err(e) => Err(api_error("deleting", family, id, e)),
        }
    }

    /// Read an existing object with every optional attribute taken from the server
    pub async fn import_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let (_, family) = self.lookup(id, false)?;

        let object = self
            .client
            .get(family.endpoint, identifier)
            .await
            .map_err(|e| api_error("importing", family, id, e))?
            .ok_or_else(|| {
                ProviderError::new(format!(
                    "Cannot import non-existent {} '{}'",
                    family.display_name, identifier
                ))
                .for_resource(id.clone())
            })?;

        let variant = self.variant_of_object(id, family, &object)?;
        Ok(read_config_object(family, variant, &object, id.clone(), None))
    }

    /// Read a single-object or list data source
    pub async fn read_data_source_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let id = &resource.id;
        let (binding, family) = self.lookup(id, true)?;

        if binding.kind == BindingKind::ListDataSource {
            let filter = resource
                .attribute("filter")
                .as_str()
                .filter(|f| !f.is_empty());
            let list = self
                .client
                .list(family.endpoint, filter)
                .await
                .map_err(|e| api_error("listing", family, id, e))?;

            let mut attributes = HashMap::new();
            attributes.insert(
                "filter".to_string(),
                resource.attribute("filter").clone(),
            );
            attributes.insert(
                "ids".to_string(),
                Value::set(list.resources.into_iter().map(|o| o.id)),
            );
            return Ok(State::existing(id.clone(), attributes));
        }

        let name = object_name(resource)?;
        let object = self
            .client
            .get(family.endpoint, &name)
            .await
            .map_err(|e| api_error("reading", family, id, e))?
            .ok_or_else(|| {
                ProviderError::new(format!(
                    "{} '{}' does not exist",
                    family.display_name, name
                ))
                .for_resource(id.clone())
            })?;

        let variant = self.variant_of_object(id, family, &object)?;
        let mut state = read_config_object(family, variant, &object, id.clone(), None);
        state.attributes.remove("last_updated");
        Ok(state)
    }
}

/// Configuration object name taken from the `id` attribute
fn object_name(resource: &Resource) -> ProviderResult<String> {
    resource
        .attribute("id")
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::new("Attribute 'id' must be set").for_resource(resource.id.clone())
        })
}

/// Record the time of a successful change
fn touch(mut state: State) -> State {
    state.attributes.insert(
        "last_updated".to_string(),
        Value::string(Utc::now().to_rfc2822()),
    );
    state
}

/// Wrap an API failure with the fixed message prefix for the action
fn api_error(action: &str, family: &ConfigFamily, id: &ResourceId, e: ApiError) -> ProviderError {
    ProviderError::new(format!(
        "An error occurred while {} the {}: {}",
        action, family.display_name, e
    ))
    .for_resource(id.clone())
    .with_cause(e)
}

fn push_type_error(diags: &mut Diagnostics, error: TypeError) {
    match error {
        TypeError::Attribute { name, inner } => {
            diags.add_attribute_error(name, "Invalid Attribute Value", inner.to_string())
        }
        TypeError::MissingRequired { name } => diags.add_attribute_error(
            name.clone(),
            "Missing required argument",
            format!("The argument \"{}\" is required, but no definition was found.", name),
        ),
        TypeError::UnknownAttribute { name } => diags.add_attribute_error(
            name.clone(),
            "Unsupported argument",
            format!("An argument named \"{}\" is not expected here.", name),
        ),
        TypeError::ReadOnly { name } => diags.add_attribute_error(
            name.clone(),
            "Invalid Configuration for Read-Only Attribute",
            format!("Cannot set \"{}\": it is computed by the provider.", name),
        ),
        other => diags.add_error("Invalid configuration", other.to_string()),
    }
}
