//! Provider - The seam between planning and a configuration API
//!
//! Validation and planning are pure. Reads and writes go to the server and
//! return boxed futures so the trait stays object safe.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a provider call, optionally tied to one resource
#[derive(Debug, Error)]
#[error("{}{}", address_prefix(.resource_id), .message)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    #[source]
    pub cause: Option<Cause>,
}

fn address_prefix(id: &Option<ResourceId>) -> String {
    id.as_ref().map(|id| format!("{}: ", id)).unwrap_or_default()
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A resource or data source type served by a provider
pub trait ResourceType: Send + Sync {
    /// Type name (e.g., "pingdirectory_identity_mapper")
    fn name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;
}

/// Lifecycle of the resources one configuration API exposes
pub trait Provider: Send + Sync {
    /// Provider block name, e.g. "pingdirectory"
    fn name(&self) -> &'static str;

    /// Managed resource types
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Read-only data source types
    fn data_source_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Check a configured resource or data source without contacting the server
    fn validate(&self, resource: &Resource) -> Diagnostics;

    /// Compute the planned resource from configuration and prior state
    ///
    /// Fills type-specific defaults and carries computed values that the
    /// configuration leaves unset.
    fn plan(&self, desired: &Resource, prior: &State) -> ProviderResult<Resource>;

    /// Refresh a resource from the server
    ///
    /// The prior state supplies the identifier and tells the provider which
    /// optional values were configured. Returns `State::not_found()` if the
    /// resource no longer exists.
    fn read(&self, prior: &State) -> BoxFuture<'_, ProviderResult<State>>;

    /// Read a data source
    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// The returned state's identifier is the configuration object's name
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>>;

    /// Bring an existing object under management
    fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>>;
}
