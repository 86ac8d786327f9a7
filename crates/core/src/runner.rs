//! Runners: one target action bound to its path, fixtures, model and history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{Action, PhaseName};
use crate::error::IntegratorResult;
use crate::fixtures::{build_fixtures, Fixtures};
use crate::path::build_action_path;
use crate::suite::Suite;

/// One completed phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RanEntry {
    pub action: String,
    pub phase: PhaseName,
    pub before: Value,
    pub after: Value,
}

/// Serializable snapshot of a runner, without the action definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerState {
    pub target_name: String,
    pub action_path: Vec<String>,
    pub fixtures: Fixtures,
    pub model: Value,
    pub ran: Vec<RanEntry>,
}

/// A planned run towards one target action.
///
/// Running a phase consumes the runner and yields the next snapshot; keep the
/// latest one and pass it on as the "previous" runner for the next target.
pub struct Runner<S> {
    target_name: String,
    target: Arc<Action<S>>,
    action_path: Vec<Arc<Action<S>>>,
    fixtures: Arc<Fixtures>,
    model: Value,
    ran: Vec<RanEntry>,
    strict_models: bool,
}

impl<S> Runner<S> {
    /// Resolve the action path and fixtures for `target`.
    ///
    /// Fails with a structural error (unknown action, cycle, fixture conflict)
    /// before anything touches the subject.
    pub fn new(suite: &Suite<S>, target: &str) -> IntegratorResult<Self> {
        let registry = suite.registry();
        let names = build_action_path(registry, target)?;
        let action_path = names
            .iter()
            .map(|name| registry.require(name).cloned())
            .collect::<IntegratorResult<Vec<_>>>()?;
        let fixtures = build_fixtures(&action_path)?;
        let target = registry.require(target)?.clone();

        Ok(Self {
            target_name: target.name().to_string(),
            target,
            action_path,
            fixtures: Arc::new(fixtures),
            model: suite.initial_model().clone(),
            ran: Vec::new(),
            strict_models: suite.options().strict_models,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target(&self) -> &Arc<Action<S>> {
        &self.target
    }

    pub fn action_path(&self) -> &[Arc<Action<S>>] {
        &self.action_path
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.action_path.iter().map(|action| action.name()).collect()
    }

    pub fn fixtures(&self) -> &Arc<Fixtures> {
        &self.fixtures
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    pub fn ran(&self) -> &[RanEntry] {
        &self.ran
    }

    pub fn strict_models(&self) -> bool {
        self.strict_models
    }

    /// Continue from where `previous` left the subject: its model and history.
    pub fn resume_from(mut self, previous: Runner<S>) -> Self {
        self.model = previous.model;
        self.ran = previous.ran;
        self
    }

    /// Drop all but the `keep` most recent history entries.
    pub fn trim_history(mut self, keep: usize) -> Self {
        let excess = self.ran.len().saturating_sub(keep);
        self.ran.drain(..excess);
        self
    }

    /// Record a completed phase and move the model on.
    pub(crate) fn advance(mut self, entry: RanEntry) -> Self {
        self.model = entry.after.clone();
        self.ran.push(entry);
        self
    }

    pub fn state(&self) -> RunnerState {
        RunnerState {
            target_name: self.target_name.clone(),
            action_path: self.action_path.iter().map(|a| a.name().to_string()).collect(),
            fixtures: self.fixtures.as_ref().clone(),
            model: self.model.clone(),
            ran: self.ran.clone(),
        }
    }
}

impl<S> Clone for Runner<S> {
    fn clone(&self) -> Self {
        Self {
            target_name: self.target_name.clone(),
            target: Arc::clone(&self.target),
            action_path: self.action_path.clone(),
            fixtures: Arc::clone(&self.fixtures),
            model: self.model.clone(),
            ran: self.ran.clone(),
            strict_models: self.strict_models,
        }
    }
}

impl<S> std::fmt::Debug for Runner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("target_name", &self.target_name)
            .field("action_path", &self.action_names())
            .field("fixtures", &self.fixtures)
            .field("model", &self.model)
            .field("ran", &self.ran.len())
            .finish()
    }
}
