//! PingDirectory Provider
//!
//! Manages PingDirectory configuration objects through the server's REST
//! configuration API.
//!
//! ## Module Structure
//!
//! - `client` - HTTP client and wire types of the configuration API
//! - `config` - Provider block and environment configuration
//! - `schemas` - Configuration object families and per-type attribute tables
//! - `resources` - Resource and data source type names
//! - `mapping` - Request building, response reading and PATCH operations
//! - `provider` - PingDirectoryProvider implementation

pub mod client;
pub mod config;
pub mod mapping;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod version;

// Re-export main types
pub use config::ProviderConfig;
pub use provider::PingDirectoryProvider;
pub use version::ProductVersion;

use pingdirectory_core::diagnostics::Diagnostics;
use pingdirectory_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use pingdirectory_core::resource::{Resource, ResourceId, State};

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for PingDirectoryProvider {
    fn name(&self) -> &'static str {
        "pingdirectory"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resources::resource_types()
    }

    fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
        resources::data_source_types()
    }

    fn validate(&self, resource: &Resource) -> Diagnostics {
        self.validate_resource(resource)
    }

    fn plan(&self, desired: &Resource, prior: &State) -> ProviderResult<Resource> {
        self.plan_resource(desired, prior)
    }

    fn read(&self, prior: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let prior = prior.clone();
        Box::pin(async move { self.read_resource(&prior).await })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.read_data_source_resource(&resource).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }

    fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.import_resource(&id, &identifier).await })
    }
}
