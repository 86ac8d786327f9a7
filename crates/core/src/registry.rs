//! Named action lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::Action;
use crate::error::{IntegratorError, IntegratorResult};

/// Actions of one suite, in definition order, addressable by name.
pub struct ActionRegistry<S> {
    actions: Vec<Arc<Action<S>>>,
    by_name: HashMap<String, usize>,
}

impl<S> ActionRegistry<S> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register(&mut self, action: Action<S>) -> IntegratorResult<()> {
        if self.by_name.contains_key(action.name()) {
            return Err(IntegratorError::DuplicateAction(action.name().to_string()));
        }
        self.by_name.insert(action.name().to_string(), self.actions.len());
        self.actions.push(Arc::new(action));
        Ok(())
    }

    pub fn from_actions<I>(actions: I) -> IntegratorResult<Self>
    where
        I: IntoIterator<Item = Action<S>>,
    {
        let mut registry = Self::new();
        for action in actions {
            registry.register(action)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Action<S>>> {
        self.by_name.get(name).map(|&i| &self.actions[i])
    }

    /// Like [`get`](Self::get), failing with `UnknownAction`.
    pub fn require(&self, name: &str) -> IntegratorResult<&Arc<Action<S>>> {
        self.get(name).ok_or_else(|| IntegratorError::UnknownAction {
            name: name.to_string(),
            required_by: None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Action<S>>> {
        self.actions.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|action| action.name())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<S> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for ActionRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.iter()).finish()
    }
}
