//! Minimal transition planning between two runners.

use std::sync::Arc;

use serde_json::Value;

use crate::action::Action;
use crate::runner::Runner;

/// Length of the longest leading run of pairwise-equal elements.
pub fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// The longest leading run shared by `a` and `b`. Strictly a prefix: stops at
/// the first mismatch.
pub fn common_prefix<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a[..common_prefix_len(a, b)].to_vec()
}

/// Actions to reverse out of and actions to run forward into.
pub struct ActionPaths<S> {
    /// Most recently entered action first.
    pub teardown: Vec<Arc<Action<S>>>,
    pub setup: Vec<Arc<Action<S>>>,
}

impl<S> ActionPaths<S> {
    pub fn is_empty(&self) -> bool {
        self.teardown.is_empty() && self.setup.is_empty()
    }

    pub fn teardown_names(&self) -> Vec<String> {
        self.teardown.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn setup_names(&self) -> Vec<String> {
        self.setup.iter().map(|a| a.name().to_string()).collect()
    }
}

/// An action on a path together with the fixture values it declared. The
/// same action under different fixture values counts as a different step.
#[derive(Debug, PartialEq)]
struct PathStep<'a> {
    name: &'a str,
    fixtures: Vec<(String, Option<Value>)>,
}

fn path_steps<S>(runner: &Runner<S>) -> Vec<PathStep<'_>> {
    runner
        .action_path()
        .iter()
        .map(|action| PathStep {
            name: action.name(),
            fixtures: runner.fixtures().relevant_to(action),
        })
        .collect()
}

/// Work out the least work needed to get from `previous` to `target`.
///
/// Without a previous runner everything on the target path is set up. With
/// one, the shared prefix of both paths is left alone: what follows it on the
/// previous path is torn down in reverse, what follows it on the target path
/// is set up.
pub fn minimal_action_paths<S>(target: &Runner<S>, previous: Option<&Runner<S>>) -> ActionPaths<S> {
    let Some(previous) = previous else {
        return ActionPaths {
            teardown: Vec::new(),
            setup: target.action_path().to_vec(),
        };
    };

    let shared = common_prefix_len(&path_steps(target), &path_steps(previous));

    ActionPaths {
        teardown: previous.action_path()[shared..].iter().rev().cloned().collect(),
        setup: target.action_path()[shared..].to_vec(),
    }
}
