//! State file structures

use std::collections::{BTreeMap, HashMap};

use pingdirectory_core::resource::{ResourceId, State, Value};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, BackendResult};

/// The persisted state file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Incremented on every write
    pub serial: u64,
    /// Identifies this state history; a backend refuses to overwrite a different lineage
    pub lineage: String,
    /// Version of the tool that last wrote this state
    pub tool_version: String,
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self::with_lineage(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_lineage(lineage: String) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.tool_version = env!("CARGO_PKG_VERSION").to_string();
    }

    pub fn find_resource(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    /// Add or replace the entry for the resource's type and name
    pub fn upsert_resource(&mut self, resource: ResourceState) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.resource_type == resource.resource_type && r.name == resource.name)
        {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    pub fn remove_resource(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        let pos = self
            .resources
            .iter()
            .position(|r| r.resource_type == resource_type && r.name == name)?;
        Some(self.resources.remove(pos))
    }

    /// Record a state returned by the provider. Missing states are removed.
    pub fn record(&mut self, state: &State) {
        if state.exists {
            self.upsert_resource(ResourceState::from_state(state));
        } else {
            self.remove_resource(&state.id.resource_type, &state.id.name);
        }
    }

    /// Every managed resource as a provider state, keyed by id
    pub fn states(&self) -> BackendResult<HashMap<ResourceId, State>> {
        self.resources
            .iter()
            .map(|r| r.to_state().map(|state| (state.id.clone(), state)))
            .collect()
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a single managed configuration object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type, e.g. "pingdirectory_identity_mapper"
    pub resource_type: String,
    /// Local name from the configuration file
    pub name: String,
    /// Name of the configuration object on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            identifier: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Unknown values are not persisted
    pub fn from_state(state: &State) -> Self {
        let attributes = state
            .attributes
            .iter()
            .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
            .collect();

        Self {
            resource_type: state.id.resource_type.clone(),
            name: state.id.name.clone(),
            identifier: state.identifier.clone(),
            attributes,
        }
    }

    pub fn to_state(&self) -> BackendResult<State> {
        let mut attributes: HashMap<String, Value> = HashMap::new();
        for (key, json) in &self.attributes {
            let value = Value::from_json(json).ok_or_else(|| {
                BackendError::InvalidState(format!(
                    "attribute '{}' of {}.{} has an unsupported value: {}",
                    key, self.resource_type, self.name, json
                ))
            })?;
            attributes.insert(key.clone(), value);
        }

        let state = State::existing(
            ResourceId::new(self.resource_type.clone(), self.name.clone()),
            attributes,
        );
        Ok(match &self.identifier {
            Some(identifier) => state.with_identifier(identifier.clone()),
            None => state,
        })
    }
}
