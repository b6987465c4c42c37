//! Resource and data source type definitions
//!
//! Every family is exposed four ways: a managed resource, an edit-only
//! `default_` resource for objects that ship with the server, a data source
//! reading one object and a data source listing object names.

use pingdirectory_core::provider::ResourceType;
use pingdirectory_core::schema::ResourceSchema;

use crate::schemas::{self, ConfigFamily, extended_operation_handler, identity_mapper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Created and deleted through the API
    Resource,
    /// Existing object that can only be edited; destroy just forgets it
    DefaultResource,
    /// One object looked up by `id`
    DataSource,
    /// Names of all objects of the family
    ListDataSource,
}

/// Ties a type name to the family that serves it
#[derive(Debug, Clone, Copy)]
pub struct TypeBinding {
    pub name: &'static str,
    /// `ConfigFamily::resource_type` of the backing family
    pub family: &'static str,
    pub kind: BindingKind,
}

impl TypeBinding {
    const fn new(name: &'static str, family: &'static str, kind: BindingKind) -> Self {
        Self { name, family, kind }
    }

    pub fn is_data_source(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::DataSource | BindingKind::ListDataSource
        )
    }

    pub fn is_edit_only(&self) -> bool {
        self.kind == BindingKind::DefaultResource
    }

    /// Schema of this type derived from the family schema
    pub fn schema_for(&self, family: &ConfigFamily) -> ResourceSchema {
        match self.kind {
            BindingKind::Resource => {
                let mut schema = family.schema.clone();
                schema.resource_type = self.name.to_string();
                schema
            }
            BindingKind::DefaultResource => {
                let mut schema = family.schema.clone();
                schema.resource_type = self.name.to_string();
                for (name, attr) in schema.attributes.iter_mut() {
                    if name == "id" || name == "type" || attr.is_read_only() {
                        continue;
                    }
                    attr.required = false;
                    attr.optional = true;
                    attr.computed = true;
                }
                schema
            }
            BindingKind::DataSource => family.data_source_schema(self.name),
            BindingKind::ListDataSource => family.list_data_source_schema(self.name),
        }
    }
}

impl ResourceType for TypeBinding {
    fn name(&self) -> &'static str {
        self.name
    }

    fn schema(&self) -> ResourceSchema {
        match schemas::families()
            .into_iter()
            .find(|f| f.resource_type == self.family)
        {
            Some(family) => self.schema_for(&family),
            None => ResourceSchema::new(self.name),
        }
    }
}

pub const BINDINGS: &[TypeBinding] = &[
    TypeBinding::new(
        "pingdirectory_extended_operation_handler",
        extended_operation_handler::RESOURCE_TYPE,
        BindingKind::Resource,
    ),
    TypeBinding::new(
        "pingdirectory_default_extended_operation_handler",
        extended_operation_handler::RESOURCE_TYPE,
        BindingKind::DefaultResource,
    ),
    TypeBinding::new(
        "pingdirectory_identity_mapper",
        identity_mapper::RESOURCE_TYPE,
        BindingKind::Resource,
    ),
    TypeBinding::new(
        "pingdirectory_default_identity_mapper",
        identity_mapper::RESOURCE_TYPE,
        BindingKind::DefaultResource,
    ),
    TypeBinding::new(
        "pingdirectory_extended_operation_handler",
        extended_operation_handler::RESOURCE_TYPE,
        BindingKind::DataSource,
    ),
    TypeBinding::new(
        "pingdirectory_extended_operation_handlers",
        extended_operation_handler::RESOURCE_TYPE,
        BindingKind::ListDataSource,
    ),
    TypeBinding::new(
        "pingdirectory_identity_mapper",
        identity_mapper::RESOURCE_TYPE,
        BindingKind::DataSource,
    ),
    TypeBinding::new(
        "pingdirectory_identity_mappers",
        identity_mapper::RESOURCE_TYPE,
        BindingKind::ListDataSource,
    ),
];

/// Look up a binding; resources and data sources may share a name
pub fn binding(name: &str, data_source: bool) -> Option<&'static TypeBinding> {
    BINDINGS
        .iter()
        .find(|b| b.name == name && b.is_data_source() == data_source)
}

/// Returns all managed resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    BINDINGS
        .iter()
        .filter(|b| !b.is_data_source())
        .map(|b| Box::new(*b) as Box<dyn ResourceType>)
        .collect()
}

/// Returns all data source types supported by this provider
pub fn data_source_types() -> Vec<Box<dyn ResourceType>> {
    BINDINGS
        .iter()
        .filter(|b| b.is_data_source())
        .map(|b| Box::new(*b) as Box<dyn ResourceType>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_and_data_sources_share_names() {
        let resource = binding("pingdirectory_identity_mapper", false).unwrap();
        let data_source = binding("pingdirectory_identity_mapper", true).unwrap();
        assert_eq!(resource.kind, BindingKind::Resource);
        assert_eq!(data_source.kind, BindingKind::DataSource);
        assert!(binding("pingdirectory_identity_mappers", false).is_none());
    }

    #[test]
    fn default_resource_makes_enabled_optional() {
        let schema = binding("pingdirectory_default_identity_mapper", false)
            .unwrap()
            .schema();
        assert_eq!(schema.resource_type, "pingdirectory_default_identity_mapper");
        let enabled = schema.get("enabled").unwrap();
        assert!(!enabled.required);
        assert!(enabled.computed);
        assert!(schema.get("type").unwrap().required);
    }

    #[test]
    fn type_lists() {
        assert_eq!(resource_types().len(), 4);
        assert_eq!(data_source_types().len(), 4);
    }
}
