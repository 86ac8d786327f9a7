//! Random exploration of the action graph.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::error::IntegratorResult;
use crate::orchestrator::go;
use crate::runner::Runner;

#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Stop after this many transitions. `None` walks until a phase fails.
    pub max_steps: Option<usize>,
    /// Wait between two transitions.
    pub pause: Duration,
    /// Keep only this many of the most recent history entries after each
    /// transition. The history of an unbounded walk otherwise grows with
    /// every step.
    pub keep_history: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_steps: None,
            pause: Duration::from_millis(500),
            keep_history: None,
        }
    }
}

/// Keep moving the subject to randomly chosen targets.
///
/// Only runners whose target has dependencies are picked, and never the
/// target the subject is already at. Returns the latest runner once nothing
/// is eligible or `max_steps` is reached; the first phase failure ends the
/// walk with that error.
pub async fn random_walk<S>(
    runners: &[Runner<S>],
    previous: Option<Runner<S>>,
    session: &S,
    options: &WalkOptions,
) -> IntegratorResult<Option<Runner<S>>>
where
    S: Clone + Send + Sync + 'static,
{
    let mut rng = StdRng::from_entropy();
    random_walk_with_rng(runners, previous, session, options, &mut rng).await
}

/// [`random_walk`] with a caller-supplied random source, for reproducible
/// walks.
pub async fn random_walk_with_rng<S, R>(
    runners: &[Runner<S>],
    mut previous: Option<Runner<S>>,
    session: &S,
    options: &WalkOptions,
    rng: &mut R,
) -> IntegratorResult<Option<Runner<S>>>
where
    S: Clone + Send + Sync + 'static,
    R: Rng + Send,
{
    let mut steps = 0;

    loop {
        if options.max_steps.is_some_and(|max| steps >= max) {
            info!(steps, "Walk finished");
            return Ok(previous);
        }

        let next = {
            let current = previous.as_ref().map(Runner::target_name);
            let eligible: Vec<&Runner<S>> = runners
                .iter()
                .filter(|runner| !runner.target().is_root())
                .filter(|runner| Some(runner.target_name()) != current)
                .collect();
            eligible.choose(rng).map(|runner| (*runner).clone())
        };

        let Some(next) = next else {
            warn!(steps, "No eligible targets left, ending walk");
            return Ok(previous);
        };

        if steps > 0 && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }

        steps += 1;
        info!(step = steps, action = %next.target_name(), "Walking");
        let runner = go(next, previous, session).await?;
        previous = Some(match options.keep_history {
            Some(keep) => runner.trim_history(keep),
            None => runner,
        });
    }
}
