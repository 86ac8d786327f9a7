//! Dependency-ordered action paths.

use crate::error::{IntegratorError, IntegratorResult};
use crate::ordered_set::OrderedSet;
use crate::registry::ActionRegistry;

/// Build the ordered set of action names that must run to reach `target`.
///
/// Dependencies are resolved left to right, depth first, each contributing
/// its own resolved path before the action itself is appended. An action
/// reachable by several routes keeps the position of its first occurrence,
/// so the result is topologically ordered and duplicate-free.
pub fn build_action_path<S>(
    registry: &ActionRegistry<S>,
    target: &str,
) -> IntegratorResult<OrderedSet<String>> {
    let mut in_progress = Vec::new();
    resolve(registry, target, None, &mut in_progress)
}

fn resolve<S>(
    registry: &ActionRegistry<S>,
    name: &str,
    required_by: Option<&str>,
    in_progress: &mut Vec<String>,
) -> IntegratorResult<OrderedSet<String>> {
    if let Some(start) = in_progress.iter().position(|n| n == name) {
        let mut cycle = in_progress[start..].to_vec();
        cycle.push(name.to_string());
        return Err(IntegratorError::DependencyCycle { cycle });
    }

    let action = registry
        .get(name)
        .ok_or_else(|| IntegratorError::UnknownAction {
            name: name.to_string(),
            required_by: required_by.map(str::to_string),
        })?;

    in_progress.push(name.to_string());
    let mut path = OrderedSet::new();
    for dependency in action.dependencies() {
        path.extend(resolve(registry, dependency, Some(name), in_progress)?);
    }
    in_progress.pop();

    path.insert(name.to_string());
    Ok(path)
}
