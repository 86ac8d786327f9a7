//! Run Command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{GlobalOptions, Outcome};
use crate::config::{select_actions, IntegratorConfig};
use crate::demo;
use crate::fanout::{run_targets, write_results, RunResults, TargetResult};
use crate::output::{print_error, print_info, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run targets of this environment
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Only run this action
    #[arg(long)]
    pub only: Option<String>,

    /// Directory for the results file
    #[arg(short, long, default_value = "target/integrator")]
    pub output: PathBuf,
}

impl TableDisplay for TargetResult {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "Target", "Result", "Steps", "Duration", "Failure"]
    }

    fn row(&self) -> Vec<String> {
        let failure = match (&self.failed_action, self.failed_phase) {
            (Some(action), Some(phase)) => format!("{} ({})", action, phase),
            _ => self.error.clone().unwrap_or_default(),
        };
        vec![
            self.environment.clone(),
            self.target.clone(),
            if self.passed { "passed" } else { "failed" }.to_string(),
            self.steps.to_string(),
            format!("{} ms", self.duration_ms),
            failure,
        ]
    }
}

pub async fn execute(args: RunArgs, options: &GlobalOptions) -> Result<Outcome> {
    let config = IntegratorConfig::load(&options.config)?;
    let targets = config.targets(args.environment.as_deref())?;

    let suite = demo::suite()?;
    let actions = select_actions(&suite, args.only.as_deref())?;

    print_info(&format!(
        "Running {} action(s) in {} target(s)",
        actions.len(),
        targets.len()
    ));
    for target in &targets {
        print_info(&format!("  {}", target.label()));
    }

    let results = run_targets(targets, args.only.as_deref()).await;

    print_list(&results.results, options.format);
    if options.format == OutputFormat::Table || options.format == OutputFormat::Plain {
        report_failures(&results, options.verbose);
    }

    let path = write_results(&results, &args.output)
        .with_context(|| format!("writing results to {}", args.output.display()))?;

    if results.success() {
        print_success(&format!(
            "{} target(s) passed, results in {}",
            results.passed,
            path.display()
        ));
        Ok(Outcome::Passed)
    } else {
        print_error(&format!(
            "{} of {} target(s) failed, results in {}",
            results.failed,
            results.total,
            path.display()
        ));
        Ok(Outcome::Failed)
    }
}

fn report_failures(results: &RunResults, verbose: bool) {
    for result in results.results.iter().filter(|r| !r.passed) {
        eprintln!();
        eprintln!("{} {}", "Failed:".red().bold(), result.label());
        if let Some(error) = &result.error {
            eprintln!("  {}", error);
        }

        match &result.report {
            Some(report) if verbose => {
                eprintln!("{}", "History:".bold());
                eprint!("{}", report.transcript());
            }
            Some(report) => {
                let ran: Vec<String> = report
                    .entries
                    .iter()
                    .map(|e| format!("{} ({})", e.action, e.phase))
                    .collect();
                eprintln!("  after: {}", ran.join(", ").dimmed());
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(config: PathBuf) -> GlobalOptions {
        GlobalOptions {
            config,
            format: OutputFormat::Json,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_run_writes_results_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("integrator.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[[environments.local.targets]]
latency_ms = 1

[[environments.local.targets]]
accept_long_items = true
"#
        )
        .unwrap();

        let args = RunArgs {
            environment: Some("local".to_string()),
            only: None,
            output: dir.path().join("out"),
        };

        let outcome = execute(args, &options(config_path)).await.unwrap();
        assert_eq!(outcome, Outcome::Failed);

        let written = std::fs::read_to_string(dir.path().join("out").join("integrator-results.json")).unwrap();
        let results: RunResults = serde_json::from_str(&written).unwrap();
        assert_eq!(results.total, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.results[1].target, "accept_long_items=true");
    }

    #[tokio::test]
    async fn test_unknown_environment_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            environment: Some("staging".to_string()),
            only: None,
            output: dir.path().to_path_buf(),
        };

        let err = execute(args, &options(dir.path().join("missing.toml"))).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown environment \"staging\"");
        assert!(!dir.path().join("integrator-results.json").exists());
    }

    #[tokio::test]
    async fn test_config_without_targets_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("integrator.toml");
        std::fs::write(&config_path, "[defaults]\nlatency_ms = 1\n").unwrap();
        let args = RunArgs {
            environment: None,
            only: None,
            output: dir.path().to_path_buf(),
        };

        let err = execute(args, &options(config_path)).await.unwrap_err();
        assert_eq!(err.to_string(), "No targets configured");
        assert!(!dir.path().join("integrator-results.json").exists());
    }

    #[tokio::test]
    async fn test_passing_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            environment: None,
            only: Some("remove the last list item".to_string()),
            output: dir.path().to_path_buf(),
        };

        let outcome = execute(args, &options(dir.path().join("missing.toml"))).await.unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }
}
