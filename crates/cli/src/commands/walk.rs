//! Walk Command

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use integrator_core::{random_walk, random_walk_with_rng, RunReport, WalkOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::{GlobalOptions, Outcome};
use crate::config::IntegratorConfig;
use crate::demo::{self, DemoSettings, ListAppSession};
use crate::fanout::describe_error;
use crate::output::{print_error, print_info, print_item, print_success, print_warning, TableDisplay};

#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Environment whose first target configures the session
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Stop after this many transitions (walks until a failure when unset)
    #[arg(long)]
    pub steps: Option<usize>,

    /// Seed for a reproducible walk
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pause between transitions in milliseconds
    #[arg(long, default_value_t = 500)]
    pub pause_ms: u64,

    /// Keep only this many recent history entries
    #[arg(long)]
    pub keep_history: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WalkSummary {
    pub target: Option<String>,
    pub phases: usize,
    pub passed: bool,
    pub error: Option<String>,
    pub report: Option<RunReport>,
}

impl TableDisplay for WalkSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Last Target", "Phases", "Result"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.target.clone().unwrap_or_else(|| "-".to_string()),
            self.phases.to_string(),
            if self.passed { "passed" } else { "failed" }.to_string(),
        ]
    }
}

pub async fn execute(args: WalkArgs, options: &GlobalOptions) -> Result<Outcome> {
    let config = IntegratorConfig::load(&options.config)?;
    let target = config
        .targets(args.environment.as_deref())?
        .into_iter()
        .next()
        .context("No target configured")?;

    let suite = demo::suite()?;
    let runners = suite.runners()?;
    let session = ListAppSession::new(DemoSettings::from_target(&target));
    let walk_options = WalkOptions {
        max_steps: args.steps,
        pause: Duration::from_millis(args.pause_ms),
        keep_history: args.keep_history,
    };

    print_info(&format!("Walking the demo suite on {}", target.label()));

    let outcome = match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            random_walk_with_rng(&runners, None, &session, &walk_options, &mut rng).await
        }
        None => random_walk(&runners, None, &session, &walk_options).await,
    };

    let summary = match &outcome {
        Ok(last) => WalkSummary {
            target: last.as_ref().map(|r| r.target_name().to_string()),
            phases: last.as_ref().map_or(0, |r| r.ran().len()),
            passed: true,
            error: None,
            report: last.as_ref().map(|r| RunReport::from_state(&r.state())),
        },
        Err(e) => WalkSummary {
            target: e.as_phase_failure().map(|f| f.state.target_name.clone()),
            phases: e.as_phase_failure().map_or(0, |f| f.ran().len()),
            passed: false,
            error: Some(describe_error(e)),
            report: e.as_phase_failure().map(|f| RunReport::from_state(&f.state)),
        },
    };

    print_item(&summary, options.format);

    if let (true, Some(report)) = (options.verbose, &summary.report) {
        eprint!("{}", report.transcript());
    }

    match outcome {
        Ok(None) => {
            print_warning("No eligible target to walk to");
            Ok(Outcome::Passed)
        }
        Ok(Some(_)) => {
            print_success("Walk finished");
            Ok(Outcome::Passed)
        }
        Err(e) if e.is_structural() => Err(e.into()),
        Err(_) => {
            print_error(summary.error.as_deref().unwrap_or("Walk failed"));
            Ok(Outcome::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[tokio::test]
    async fn test_bounded_seeded_walk_passes() {
        let dir = tempfile::tempdir().unwrap();
        let options = GlobalOptions {
            config: dir.path().join("missing.toml"),
            format: OutputFormat::Json,
            verbose: false,
        };
        let args = WalkArgs {
            environment: None,
            steps: Some(10),
            seed: Some(3),
            pause_ms: 0,
            keep_history: Some(8),
        };

        assert_eq!(execute(args, &options).await.unwrap(), Outcome::Passed);
    }
}
