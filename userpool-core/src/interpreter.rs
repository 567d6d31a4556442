//! Interpreter - Execute Effects using a Provider
//!
//! The Interpreter executes Effects contained in a Plan in order,
//! collecting the results. This is where side effects actually occur.

use crate::effect::Effect;
use crate::plan::Plan;
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::{ResourceId, State};

/// Result of executing each Effect
#[derive(Debug)]
pub enum EffectOutcome {
    /// Create succeeded
    Created { state: State },
    /// Update succeeded
    Updated { state: State },
    /// Delete and re-create succeeded
    Replaced { state: State },
    /// Delete succeeded
    Deleted { id: ResourceId },
}

/// Result of executing the entire Plan
#[derive(Debug)]
pub struct ApplyResult {
    pub outcomes: Vec<Result<EffectOutcome, ProviderError>>,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Interpreter configuration
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    /// Continue on error
    pub continue_on_error: bool,
}

/// Interpreter that executes Effects using a Provider
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

    /// Execute a Plan, interpreting all Effects and causing side effects
    pub async fn apply(&self, plan: &Plan) -> ApplyResult {
        let mut outcomes = Vec::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for effect in plan.effects() {
            log::debug!("Executing {} for {}", effect.kind(), effect.resource_id());
            let result = self.execute_effect(effect).await;

            match &result {
                Ok(_) => success_count += 1,
                Err(e) => {
                    log::debug!("{} failed: {}", effect.kind(), e);
                    failure_count += 1;
                    if !self.config.continue_on_error {
                        outcomes.push(result);
                        break;
                    }
                }
            }

            outcomes.push(result);
        }

        ApplyResult {
            outcomes,
            success_count,
            failure_count,
        }
    }

    /// Execute a single Effect
    async fn execute_effect(&self, effect: &Effect) -> ProviderResult<EffectOutcome> {
        match effect {
            Effect::Create(resource) => {
                let state = self.provider.create(resource).await?;
                Ok(EffectOutcome::Created { state })
            }
            Effect::Update {
                id,
                from,
                to,
                changed_attributes,
            } => {
                let identifier = require_identifier(from)?;
                let state = self
                    .provider
                    .update(id, identifier, from, to, changed_attributes)
                    .await?;
                Ok(EffectOutcome::Updated { state })
            }
            Effect::Replace { from, to, .. } => {
                let identifier = require_identifier(from)?;
                self.provider.delete(&from.id, identifier).await?;
                let state = self.provider.create(to).await?;
                Ok(EffectOutcome::Replaced { state })
            }
            Effect::Delete { id, identifier } => {
                self.provider.delete(id, identifier).await?;
                Ok(EffectOutcome::Deleted { id: id.clone() })
            }
        }
    }
}

fn require_identifier(state: &State) -> ProviderResult<&str> {
    state.identifier.as_deref().ok_or_else(|| {
        ProviderError::new("No identifier recorded for existing resource")
            .for_resource(state.id.clone())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::provider::{BoxFuture, ResourceType};
    use crate::resource::{Resource, ResourceId, Value};

    /// Records every call so tests can assert on ordering
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
        fail_delete: bool,
    }

    impl RecordingProvider {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Provider for RecordingProvider {
        fn name(&self) -> &'static str {
            "test"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(
            &self,
            id: &ResourceId,
            _identifier: Option<&str>,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let id = id.clone();
            Box::pin(async move { Ok(State::not_found(id)) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create {}", resource.id.name));
            let state = State::existing(resource.id.clone(), resource.attributes.clone())
                .with_identifier("pool/new");
            Box::pin(async move { Ok(state) })
        }

        fn update(
            &self,
            id: &ResourceId,
            identifier: &str,
            _from: &State,
            to: &Resource,
            changed: &[String],
        ) -> BoxFuture<'_, ProviderResult<State>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update {} [{}]", identifier, changed.join(",")));
            let state = State::existing(id.clone(), to.attributes.clone());
            Box::pin(async move { Ok(state) })
        }

        fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete {}", identifier));
            let result = if self.fail_delete {
                Err(ProviderError::new("boom").for_resource(id.clone()))
            } else {
                Ok(())
            };
            Box::pin(async move { result })
        }
    }

    fn existing_state(name: &str) -> State {
        State::existing(
            ResourceId::new("cognito.user_pool_client", name),
            Default::default(),
        )
        .with_identifier("pool/old")
    }

    #[tokio::test]
    async fn apply_empty_plan() {
        let provider = RecordingProvider::default();
        let interpreter = Interpreter::new(&provider);
        let result = interpreter.apply(&Plan::new()).await;

        assert_eq!(result.failure_count, 0);
        assert_eq!(result.success_count, 0);
    }

    #[tokio::test]
    async fn apply_update_passes_changed_attributes() {
        let provider = RecordingProvider::default();
        let interpreter = Interpreter::new(&provider);
        let mut plan = Plan::new();
        plan.add(Effect::Update {
            id: ResourceId::new("cognito.user_pool_client", "web"),
            from: existing_state("web"),
            to: Resource::new("cognito.user_pool_client", "web")
                .with_attribute("refresh_token_validity", Value::Int(5)),
            changed_attributes: vec!["refresh_token_validity".to_string()],
        });

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failure_count, 0);
        assert_eq!(
            provider.calls(),
            vec!["update pool/old [refresh_token_validity]".to_string()]
        );
    }

    #[tokio::test]
    async fn replace_deletes_before_create() {
        let provider = RecordingProvider::default();
        let interpreter = Interpreter::new(&provider);
        let mut plan = Plan::new();
        plan.add(Effect::Replace {
            from: existing_state("web"),
            to: Resource::new("cognito.user_pool_client", "web"),
            changed_attributes: vec!["name".to_string()],
        });

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failure_count, 0);
        assert!(matches!(
            result.outcomes[0],
            Ok(EffectOutcome::Replaced { .. })
        ));
        assert_eq!(
            provider.calls(),
            vec!["delete pool/old".to_string(), "create web".to_string()]
        );
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let provider = RecordingProvider {
            fail_delete: true,
            ..Default::default()
        };
        let interpreter = Interpreter::new(&provider);
        let mut plan = Plan::new();
        plan.add(Effect::Delete {
            id: ResourceId::new("cognito.user_pool_client", "a"),
            identifier: "pool/a".to_string(),
        });
        plan.add(Effect::Create(Resource::new("cognito.user_pool_client", "b")));

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failure_count, 1);
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(provider.calls(), vec!["delete pool/a".to_string()]);
    }

    #[tokio::test]
    async fn continue_on_error_runs_remaining_effects() {
        let provider = RecordingProvider {
            fail_delete: true,
            ..Default::default()
        };
        let config = InterpreterConfig {
            continue_on_error: true,
        };
        let interpreter = Interpreter::new(&provider).with_config(config);
        let mut plan = Plan::new();
        plan.add(Effect::Delete {
            id: ResourceId::new("cognito.user_pool_client", "a"),
            identifier: "pool/a".to_string(),
        });
        plan.add(Effect::Create(Resource::new("cognito.user_pool_client", "b")));

        let result = interpreter.apply(&plan).await;

        assert_eq!(result.failure_count, 1);
        assert_eq!(result.success_count, 1);
        assert!(matches!(
            result.outcomes[1],
            Ok(EffectOutcome::Created { .. })
        ));
        assert_eq!(
            provider.calls(),
            vec!["delete pool/a".to_string(), "create b".to_string()]
        );
    }
}
