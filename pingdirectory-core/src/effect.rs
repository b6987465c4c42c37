//! Effect - A single side effect to be performed against the server
//!
//! Effects are plain values. Nothing happens until an Interpreter runs them.

use crate::resource::{Resource, ResourceId, State};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Read a data source
    Read(Resource),
    /// Create a configuration object (or adopt an edit-only one)
    Create(Resource),
    /// Patch an existing object in place
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// Delete the existing object, then create it again
    Replace {
        id: ResourceId,
        from: State,
        to: Resource,
    },
    /// Delete an object that is no longer configured
    Delete { id: ResourceId, identifier: String },
}

impl Effect {
    /// Whether this Effect changes anything on the server or in state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Effect::Read(_))
    }

    pub fn resource_id(&self) -> &ResourceId {
        match self {
            Effect::Read(r) | Effect::Create(r) => &r.id,
            Effect::Update { id, .. } | Effect::Replace { id, .. } | Effect::Delete { id, .. } => {
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_not_mutating() {
        let read = Effect::Read(Resource::new("pingdirectory_identity_mappers", "all"));
        let delete = Effect::Delete {
            id: ResourceId::new("pingdirectory_identity_mapper", "old"),
            identifier: "Old Mapper".to_string(),
        };
        assert!(!read.is_mutating());
        assert!(delete.is_mutating());
        assert_eq!(delete.resource_id().name, "old");
    }
}
