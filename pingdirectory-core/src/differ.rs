//! Differ - Compare configured resources with recorded state
//!
//! The recorded state has been refreshed from the server before diffing, so
//! drift made outside this tool shows up as an update.

use std::collections::{HashMap, HashSet};

use crate::effect::Effect;
use crate::plan::Plan;
use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::ResourceSchema;

/// How one configured resource relates to its recorded state
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// Nothing recorded yet
    Create(Resource),
    /// Recorded object differs; `replace` is set when a changed attribute
    /// cannot be patched in place
    Modify {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
        replace: bool,
    },
    NoChange(ResourceId),
}

impl Diff {
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange(_))
    }

    pub fn into_effect(self) -> Option<Effect> {
        match self {
            Diff::Create(resource) => Some(Effect::Create(resource)),
            Diff::Modify {
                id,
                from,
                to,
                replace: true,
                ..
            } => Some(Effect::Replace { id, from, to }),
            Diff::Modify {
                id,
                from,
                to,
                changed_attributes,
                replace: false,
            } => Some(Effect::Update {
                id,
                from,
                to,
                changed_attributes,
            }),
            Diff::NoChange(_) => None,
        }
    }
}

pub fn diff(desired: &Resource, current: &State, schema: Option<&ResourceSchema>) -> Diff {
    if !current.exists {
        return Diff::Create(desired.clone());
    }

    let changed_attributes = changed_attributes(desired, current, schema);
    if changed_attributes.is_empty() {
        return Diff::NoChange(desired.id.clone());
    }

    let replace = changed_attributes.iter().any(|name| {
        schema
            .and_then(|s| s.get(name))
            .is_some_and(|attr| attr.requires_replace)
    });

    Diff::Modify {
        id: desired.id.clone(),
        from: current.clone(),
        to: desired.clone(),
        changed_attributes,
        replace,
    }
}

/// Sorted names of configured attributes whose value differs from the state.
/// Unknown values and read-only attributes never count as changes.
fn changed_attributes(
    desired: &Resource,
    current: &State,
    schema: Option<&ResourceSchema>,
) -> Vec<String> {
    let read_only = |name: &str| {
        schema
            .and_then(|s| s.get(name))
            .is_some_and(|attr| attr.is_read_only())
    };

    let mut changed: Vec<String> = desired
        .attributes
        .iter()
        .filter(|(name, value)| !value.is_unknown() && !read_only(name.as_str()))
        .filter(|(name, value)| {
            let recorded = current.attributes.get(*name).unwrap_or(&Value::Null);
            !value.equivalent(recorded)
        })
        .map(|(name, _)| name.clone())
        .collect();
    changed.sort();
    changed
}

/// Builds the plan for a whole configuration.
///
/// Data sources are always read. Recorded objects that are no longer
/// configured are deleted, in address order.
pub fn create_plan(
    desired: &[Resource],
    current_states: &HashMap<ResourceId, State>,
    schemas: &HashMap<String, ResourceSchema>,
) -> Plan {
    let mut plan: Plan = desired
        .iter()
        .filter_map(|resource| {
            if resource.is_data_source() {
                return Some(Effect::Read(resource.clone()));
            }
            let current = current_states
                .get(&resource.id)
                .cloned()
                .unwrap_or_else(|| State::not_found(resource.id.clone()));
            diff(resource, &current, schemas.get(&resource.id.resource_type)).into_effect()
        })
        .collect();

    let configured: HashSet<&ResourceId> = desired.iter().map(|r| &r.id).collect();
    let mut orphans: Vec<&State> = current_states
        .values()
        .filter(|state| state.exists && !configured.contains(&state.id))
        .collect();
    orphans.sort_by(|a, b| a.id.cmp(&b.id));

    for state in orphans {
        if let Some(identifier) = &state.identifier {
            plan.add(Effect::Delete {
                id: state.id.clone(),
                identifier: identifier.clone(),
            });
        }
    }

    plan
}
