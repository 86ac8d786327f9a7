//! Phase execution.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use serde_json::Value;
use tracing::debug;

use crate::action::{Action, Phase, PhaseContext, PhaseName};
use crate::error::{IntegratorResult, PhaseFailure};
use crate::runner::{RanEntry, Runner};

/// Run one phase of `action` and return the next runner snapshot.
///
/// A phase the action does not define leaves the model as it is. Errors and
/// panics raised by the phase come back as a [`PhaseFailure`] carrying the
/// runner state from just before the phase.
pub async fn run_phase<S>(
    action: &Arc<Action<S>>,
    phase: PhaseName,
    runner: Runner<S>,
    session: &S,
) -> IntegratorResult<Runner<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let before = runner.model().clone();

    let outcome = match action.phases().get(phase) {
        None => Ok(before.clone()),
        Some(f) => {
            let ctx = PhaseContext {
                model: before.clone(),
                fixtures: Arc::clone(runner.fixtures()),
                session: session.clone(),
            };
            call_phase(f.as_ref(), phase, ctx, runner.strict_models()).await
        }
    };

    match outcome {
        Ok(after) => {
            debug!(action = %action.name(), phase = %phase, "Phase complete");
            Ok(runner.advance(RanEntry {
                action: action.name().to_string(),
                phase,
                before,
                after,
            }))
        }
        Err(source) => {
            Err(PhaseFailure::new(action.name(), phase, source, runner.state()).into())
        }
    }
}

async fn call_phase<S>(
    f: &dyn Phase<S>,
    phase: PhaseName,
    ctx: PhaseContext<S>,
    strict_models: bool,
) -> anyhow::Result<Value> {
    match AssertUnwindSafe(f.run(ctx)).catch_unwind().await {
        Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
        Ok(Err(e)) => Err(e),
        Ok(Ok(Value::Null)) if strict_models => Err(anyhow!(
            "Phase \"{}\" did not return a model. Perhaps it should be wrapped in `effect`?",
            phase
        )),
        Ok(Ok(model)) => Ok(model),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Run `phases` in order for each action of `path`, one action at a time.
/// Stops at the first failure.
pub async fn walk_action_path<S>(
    phases: &[PhaseName],
    path: &[Arc<Action<S>>],
    mut runner: Runner<S>,
    session: &S,
) -> IntegratorResult<Runner<S>>
where
    S: Clone + Send + Sync + 'static,
{
    for action in path {
        for &phase in phases {
            runner = run_phase(action, phase, runner, session).await?;
        }
    }
    Ok(runner)
}
