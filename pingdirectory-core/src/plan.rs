//! Plan - Ordered Effects produced by the differ
//!
//! Effects follow configuration order. Deletions of resources that are no
//! longer configured come last.

use std::fmt;

use crate::effect::Effect;

#[derive(Debug, Clone, Default)]
pub struct Plan {
    effects: Vec<Effect>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects that call a write endpoint
    pub fn changes(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.is_mutating())
    }

    pub fn mutation_count(&self) -> usize {
        self.changes().count()
    }

    /// Only data source reads, or nothing at all
    pub fn has_no_changes(&self) -> bool {
        self.changes().next().is_none()
    }

    pub fn summary(&self) -> PlanSummary {
        self.effects
            .iter()
            .fold(PlanSummary::default(), |mut summary, effect| {
                let counter = match effect {
                    Effect::Read(_) => &mut summary.read,
                    Effect::Create(_) => &mut summary.create,
                    Effect::Update { .. } => &mut summary.update,
                    Effect::Replace { .. } => &mut summary.replace,
                    Effect::Delete { .. } => &mut summary.delete,
                };
                *counter += 1;
                summary
            })
    }
}

impl FromIterator<Effect> for Plan {
    fn from_iter<I: IntoIterator<Item = Effect>>(iter: I) -> Self {
        Self {
            effects: iter.into_iter().collect(),
        }
    }
}

/// Effect counts by kind
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub read: usize,
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
}

impl fmt::Display for PlanSummary {
    /// A replacement counts as one add and one destroy
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plan: {} to add, {} to change, {} to destroy",
            self.create + self.replace,
            self.update,
            self.delete + self.replace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Resource, ResourceId, State};

    const MAPPER: &str = "pingdirectory_identity_mapper";

    fn list_read() -> Effect {
        Effect::Read(Resource::new("pingdirectory_identity_mappers", "all"))
    }

    #[test]
    fn reads_alone_are_not_changes() {
        let plan: Plan = [list_read()].into_iter().collect();
        assert!(!plan.is_empty());
        assert!(plan.has_no_changes());
        assert_eq!(plan.summary().to_string(), "Plan: 0 to add, 0 to change, 0 to destroy");
    }

    #[test]
    fn replacement_counts_as_add_and_destroy() {
        let id = ResourceId::new(MAPPER, "email");
        let plan: Plan = [
            list_read(),
            Effect::Create(Resource::new(MAPPER, "uid")),
            Effect::Replace {
                id: id.clone(),
                from: State::existing(id, Default::default()).with_identifier("Email"),
                to: Resource::new(MAPPER, "email"),
            },
            Effect::Delete {
                id: ResourceId::new(MAPPER, "old"),
                identifier: "Old".to_string(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(plan.mutation_count(), 3);
        assert_eq!(
            plan.summary(),
            PlanSummary {
                read: 1,
                create: 1,
                update: 0,
                replace: 1,
                delete: 1,
            }
        );
        assert_eq!(plan.summary().to_string(), "Plan: 2 to add, 0 to change, 2 to destroy");
    }
}
