//! Suites: the actions of one scenario set plus the initial model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::error::IntegratorResult;
use crate::graph;
use crate::registry::ActionRegistry;
use crate::runner::Runner;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteOptions {
    /// A declared phase returning `null` fails instead of wiping the model.
    /// Side-effect-only phases should be wrapped in [`effect`](crate::effect).
    #[serde(default = "default_strict_models")]
    pub strict_models: bool,
}

fn default_strict_models() -> bool {
    true
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            strict_models: default_strict_models(),
        }
    }
}

/// A set of actions and the model the subject starts from.
///
/// Suites are plain values: build as many as needed, nothing is registered
/// globally.
pub struct Suite<S> {
    registry: ActionRegistry<S>,
    initial_model: Value,
    options: SuiteOptions,
}

impl<S> Suite<S> {
    pub fn new<I>(actions: I, initial_model: Value) -> IntegratorResult<Self>
    where
        I: IntoIterator<Item = Action<S>>,
    {
        Ok(Self {
            registry: ActionRegistry::from_actions(actions)?,
            initial_model,
            options: SuiteOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SuiteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ActionRegistry<S> {
        &self.registry
    }

    pub fn initial_model(&self) -> &Value {
        &self.initial_model
    }

    pub fn options(&self) -> &SuiteOptions {
        &self.options
    }

    pub fn action(&self, name: &str) -> Option<&Arc<Action<S>>> {
        self.registry.get(name)
    }

    pub fn actions(&self) -> std::slice::Iter<'_, Arc<Action<S>>> {
        self.registry.iter()
    }

    /// Plan a runner for `target`: resolves its action path and fixtures.
    pub fn runner(&self, target: &str) -> IntegratorResult<Runner<S>> {
        Runner::new(self, target)
    }

    /// One runner per action, in definition order.
    pub fn runners(&self) -> IntegratorResult<Vec<Runner<S>>> {
        self.registry
            .names()
            .map(|name| Runner::new(self, name))
            .collect()
    }

    /// Graphviz rendering of the dependency graph.
    pub fn to_dot(&self) -> String {
        graph::to_dot(&self.registry)
    }
}

impl<S> std::fmt::Debug for Suite<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("actions", &self.registry)
            .field("initial_model", &self.initial_model)
            .field("options", &self.options)
            .finish()
    }
}
