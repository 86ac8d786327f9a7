//! Moving the subject from one target to the next.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::action::PhaseName;
use crate::error::IntegratorResult;
use crate::phase::walk_action_path;
use crate::plan::minimal_action_paths;
use crate::runner::Runner;

/// Run `target`, reusing whatever `previous` already set up.
///
/// `target` picks up the model and history `previous` left behind. Actions
/// the two paths do not share are then torn down, most recent first, and the
/// rest of the target's path is set up. Every phase sees the target's
/// fixtures. The first failing phase ends the transition.
pub async fn go<S>(
    target: Runner<S>,
    previous: Option<Runner<S>>,
    session: &S,
) -> IntegratorResult<Runner<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let paths = minimal_action_paths(&target, previous.as_ref());

    info!(action = %target.target_name(), "Going to target");

    let runner = match previous {
        Some(previous) => {
            info!(teardown = ?paths.teardown_names(), "Teardown path");
            let resumed = target.resume_from(previous);
            walk_action_path(&PhaseName::REVERSE, &paths.teardown, resumed, session).await?
        }
        None => target,
    };

    info!(fixtures = %runner.fixtures().to_value(), "Fixtures");
    info!(setup = ?paths.setup_names(), "Setup path");

    walk_action_path(&PhaseName::FORWARD, &paths.setup, runner, session).await
}

/// What [`go`] would do, without running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub target: String,
    /// Most recent first.
    pub teardown: Vec<String>,
    pub setup: Vec<String>,
}

pub fn plan<S>(target: &Runner<S>, previous: Option<&Runner<S>>) -> TransitionPlan {
    let paths = minimal_action_paths(target, previous);
    TransitionPlan {
        target: target.target_name().to_string(),
        teardown: paths.teardown_names(),
        setup: paths.setup_names(),
    }
}
