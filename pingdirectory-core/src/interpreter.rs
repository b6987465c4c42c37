//! Interpreter - Carry out a Plan through a Provider
//!
//! Effects run one at a time in plan order. Every effect yields an
//! [`AppliedEffect`], so callers can update their state record for exactly the
//! resources that changed, even when a later effect fails.

use crate::effect::Effect;
use crate::plan::Plan;
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::{ResourceId, State};

/// How a single effect ended
#[derive(Debug)]
pub enum EffectOutcome {
    Read { state: State },
    Created { state: State },
    Updated { state: State },
    /// Deleted and created again
    Replaced { state: State },
    Deleted { id: ResourceId },
    /// Not executed
    Skipped { reason: String },
}

impl EffectOutcome {
    /// State left on the server, for outcomes that produce one
    pub fn state(&self) -> Option<&State> {
        match self {
            EffectOutcome::Read { state }
            | EffectOutcome::Created { state }
            | EffectOutcome::Updated { state }
            | EffectOutcome::Replaced { state } => Some(state),
            EffectOutcome::Deleted { .. } | EffectOutcome::Skipped { .. } => None,
        }
    }
}

/// An effect paired with its result
#[derive(Debug)]
pub struct AppliedEffect {
    pub id: ResourceId,
    pub result: ProviderResult<EffectOutcome>,
}

impl AppliedEffect {
    fn ran(&self) -> bool {
        !matches!(self.result, Ok(EffectOutcome::Skipped { .. }))
    }
}

/// One entry per effect of the plan, in plan order
#[derive(Debug, Default)]
pub struct ApplyResult {
    pub applied: Vec<AppliedEffect>,
}

impl ApplyResult {
    /// Effects that ran and succeeded
    pub fn succeeded(&self) -> usize {
        self.applied
            .iter()
            .filter(|a| a.ran() && a.result.is_ok())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.applied.iter().filter(|a| a.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// What to do with the remaining effects once one fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnFailure {
    /// Skip everything after the failed effect
    #[default]
    SkipRemaining,
    /// Keep going; only the failed resource is left behind
    Continue,
}

#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    /// Report every effect as skipped without calling the provider
    pub dry_run: bool,
    pub on_failure: OnFailure,
}

pub struct Interpreter<P: Provider> {
    provider: P,
    config: InterpreterConfig,
}

impl<P: Provider> Interpreter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: InterpreterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn apply(&self, plan: &Plan) -> ApplyResult {
        let mut result = ApplyResult::default();
        let mut halted = false;

        for effect in plan.effects() {
            let outcome = if halted {
                Ok(EffectOutcome::Skipped {
                    reason: "an earlier change failed".to_string(),
                })
            } else {
                self.execute_effect(effect).await
            };

            if outcome.is_err() && self.config.on_failure == OnFailure::SkipRemaining {
                halted = true;
            }

            result.applied.push(AppliedEffect {
                id: effect.resource_id().clone(),
                result: outcome,
            });
        }

        result
    }

    pub async fn execute_effect(&self, effect: &Effect) -> ProviderResult<EffectOutcome> {
        if self.config.dry_run {
            return Ok(EffectOutcome::Skipped {
                reason: "dry run".to_string(),
            });
        }

        let provider = &self.provider;
        match effect {
            Effect::Read(resource) => Ok(EffectOutcome::Read {
                state: provider.read_data_source(resource).await?,
            }),
            Effect::Create(resource) => Ok(EffectOutcome::Created {
                state: provider.create(resource).await?,
            }),
            Effect::Update { id, from, to, .. } => {
                let identifier = server_identifier(id, from)?;
                Ok(EffectOutcome::Updated {
                    state: provider.update(id, identifier, from, to).await?,
                })
            }
            Effect::Replace { id, from, to } => {
                // The new object may reuse the old name, so it must be gone first
                provider.delete(id, server_identifier(id, from)?).await?;
                Ok(EffectOutcome::Replaced {
                    state: provider.create(to).await?,
                })
            }
            Effect::Delete { id, identifier } => {
                provider.delete(id, identifier).await?;
                Ok(EffectOutcome::Deleted { id: id.clone() })
            }
        }
    }
}

fn server_identifier<'a>(id: &ResourceId, state: &'a State) -> ProviderResult<&'a str> {
    state.identifier.as_deref().ok_or_else(|| {
        ProviderError::new("State has no server identifier").for_resource(id.clone())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::provider::{BoxFuture, ResourceType};
    use crate::resource::Resource;

    const MAPPER: &str = "pingdirectory_identity_mapper";

    /// Records every call; deleting "Locked" fails
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Provider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            Vec::new()
        }

        fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
            Vec::new()
        }

        fn validate(&self, _resource: &Resource) -> Diagnostics {
            Diagnostics::new()
        }

        fn plan(&self, desired: &Resource, _prior: &State) -> ProviderResult<Resource> {
            Ok(desired.clone())
        }

        fn read(&self, prior: &State) -> BoxFuture<'_, ProviderResult<State>> {
            let prior = prior.clone();
            Box::pin(async move { Ok(prior) })
        }

        fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            self.log(format!("list {}", resource.id.name));
            let state = State::existing(resource.id.clone(), resource.attributes.clone());
            Box::pin(async move { Ok(state) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let name = resource.attribute("id").as_str().unwrap_or_default().to_string();
            self.log(format!("add {}", name));
            let state = State::existing(resource.id.clone(), resource.attributes.clone())
                .with_identifier(name);
            Box::pin(async move { Ok(state) })
        }

        fn update(
            &self,
            id: &ResourceId,
            identifier: &str,
            _from: &State,
            to: &Resource,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            self.log(format!("patch {}", identifier));
            let state =
                State::existing(id.clone(), to.attributes.clone()).with_identifier(identifier);
            Box::pin(async move { Ok(state) })
        }

        fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
            self.log(format!("delete {}", identifier));
            let result = if identifier == "Locked" {
                Err(ProviderError::new("object is in use").for_resource(id.clone()))
            } else {
                Ok(())
            };
            Box::pin(async move { result })
        }

        fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
            let state = State::existing(id.clone(), Default::default()).with_identifier(identifier);
            Box::pin(async move { Ok(state) })
        }
    }

    fn mapper(name: &str, object: &str) -> Resource {
        Resource::new(MAPPER, name).with_attribute("id", crate::resource::Value::string(object))
    }

    fn recorded(name: &str, object: &str) -> State {
        State::existing(ResourceId::new(MAPPER, name), Default::default()).with_identifier(object)
    }

    #[tokio::test]
    async fn empty_plan_succeeds_without_calls() {
        let interpreter = Interpreter::new(RecordingProvider::default());
        let result = interpreter.apply(&Plan::new()).await;

        assert!(result.is_success());
        assert!(result.applied.is_empty());
        assert!(interpreter.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn created_state_carries_server_name() {
        let interpreter = Interpreter::new(RecordingProvider::default());
        let mut plan = Plan::new();
        plan.add(Effect::Create(mapper("email", "Email")));

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.succeeded(), 1);
        let applied = &result.applied[0];
        assert_eq!(applied.id, ResourceId::new(MAPPER, "email"));
        let state = applied.result.as_ref().unwrap().state().unwrap();
        assert_eq!(state.identifier.as_deref(), Some("Email"));
    }

    #[tokio::test]
    async fn replace_deletes_old_object_first() {
        let interpreter = Interpreter::new(RecordingProvider::default());
        let mut plan = Plan::new();
        plan.add(Effect::Replace {
            id: ResourceId::new(MAPPER, "email"),
            from: recorded("email", "Old Email"),
            to: mapper("email", "Email"),
        });

        let result = interpreter.apply(&plan).await;

        assert!(matches!(
            result.applied[0].result,
            Ok(EffectOutcome::Replaced { .. })
        ));
        assert_eq!(interpreter.provider().calls(), vec!["delete Old Email", "add Email"]);
    }

    #[tokio::test]
    async fn update_needs_a_server_identifier() {
        let interpreter = Interpreter::new(RecordingProvider::default());
        let id = ResourceId::new(MAPPER, "email");
        let mut plan = Plan::new();
        plan.add(Effect::Update {
            id: id.clone(),
            from: State::existing(id, Default::default()),
            to: mapper("email", "Email"),
            changed_attributes: vec!["enabled".to_string()],
        });

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failed(), 1);
        assert!(interpreter.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn failure_skips_remaining_effects_by_default() {
        let mut plan = Plan::new();
        plan.add(Effect::Delete {
            id: ResourceId::new(MAPPER, "locked"),
            identifier: "Locked".to_string(),
        });
        plan.add(Effect::Create(mapper("email", "Email")));

        let interpreter = Interpreter::new(RecordingProvider::default());
        let result = interpreter.apply(&plan).await;

        assert_eq!(result.applied.len(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.succeeded(), 0);
        assert!(matches!(
            result.applied[1].result,
            Ok(EffectOutcome::Skipped { .. })
        ));
        assert_eq!(interpreter.provider().calls(), vec!["delete Locked"]);
    }

    #[tokio::test]
    async fn continue_policy_applies_the_rest() {
        let mut plan = Plan::new();
        plan.add(Effect::Delete {
            id: ResourceId::new(MAPPER, "locked"),
            identifier: "Locked".to_string(),
        });
        plan.add(Effect::Create(mapper("email", "Email")));

        let interpreter = Interpreter::new(RecordingProvider::default()).with_config(
            InterpreterConfig {
                on_failure: OnFailure::Continue,
                ..Default::default()
            },
        );
        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failed(), 1);
        assert_eq!(result.succeeded(), 1);
        assert_eq!(interpreter.provider().calls(), vec!["delete Locked", "add Email"]);
    }

    #[tokio::test]
    async fn dry_run_calls_nothing() {
        let interpreter = Interpreter::new(RecordingProvider::default()).with_config(
            InterpreterConfig {
                dry_run: true,
                ..Default::default()
            },
        );
        let mut plan = Plan::new();
        plan.add(Effect::Create(mapper("email", "Email")));
        plan.add(Effect::Read(Resource::new("pingdirectory_identity_mappers", "all")));

        let result = interpreter.apply(&plan).await;

        assert!(result.is_success());
        assert_eq!(result.succeeded(), 0);
        assert!(interpreter.provider().calls().is_empty());
    }
}
