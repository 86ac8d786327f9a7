//! Running the demo suite against every selected target at once.
//!
//! Each target gets its own session and walks the selected actions one after
//! another, handing each runner on to the next `go`. Targets run
//! concurrently; nothing is shared between them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use integrator_core::{go, IntegratorError, PhaseName, RunReport, Runner};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{select_actions, TargetConfig};
use crate::demo::{self, DemoSettings, ListAppSession};

pub const RESULTS_FILE: &str = "integrator-results.json";

/// Outcome of one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    pub environment: String,
    pub target: String,
    pub passed: bool,
    pub duration_ms: u64,
    /// Actions reached successfully.
    pub steps: usize,
    pub failed_action: Option<String>,
    pub failed_phase: Option<PhaseName>,
    pub error: Option<String>,
    pub report: Option<RunReport>,
}

impl TargetResult {
    pub fn label(&self) -> String {
        format!("{}/{}", self.environment, self.target)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResults {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TargetResult>,
}

impl RunResults {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Run every target concurrently and collect their results in target order.
pub async fn run_targets(targets: Vec<TargetConfig>, only: Option<&str>) -> RunResults {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let start = Instant::now();

    info!(%run_id, "Running {} target(s)", targets.len());
    let results = join_all(targets.iter().map(|target| run_target(target, only))).await;

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Run finished: {} passed, {} failed ({} ms)",
        passed, failed, duration_ms
    );

    RunResults {
        run_id,
        started_at,
        total: results.len(),
        passed,
        failed,
        duration_ms,
        results,
    }
}

/// Run the selected actions of the demo suite against one target.
pub async fn run_target(target: &TargetConfig, only: Option<&str>) -> TargetResult {
    let start = Instant::now();
    let session = ListAppSession::new(DemoSettings::from_target(target));

    let mut steps = 0;
    let outcome = dispatch(target, only, &session, &mut steps).await;

    if let Err(e) = session.close().await {
        warn!(target = %target.label(), "Failed to close session: {}", e);
    }

    let mut result = TargetResult {
        environment: target.environment.clone(),
        target: target.target_name.clone(),
        passed: false,
        duration_ms: start.elapsed().as_millis() as u64,
        steps,
        failed_action: None,
        failed_phase: None,
        error: None,
        report: None,
    };

    match outcome {
        Ok(runner) => {
            info!(target = %target.label(), "Passed");
            result.passed = true;
            result.report = runner.map(|runner| RunReport::from_state(&runner.state()));
        }
        Err(e) => {
            error!(target = %target.label(), "Failed: {}", e);
            result.error = Some(describe_error(&e));
            if let Some(failure) = e.as_phase_failure() {
                result.failed_action = Some(failure.action.clone());
                result.failed_phase = Some(failure.phase);
                result.report = Some(RunReport::from_state(&failure.state));
            }
        }
    }

    result
}

async fn dispatch(
    target: &TargetConfig,
    only: Option<&str>,
    session: &ListAppSession,
    steps: &mut usize,
) -> Result<Option<Runner<ListAppSession>>, IntegratorError> {
    let suite = demo::suite()?;
    let actions = select_actions(&suite, only)?;

    let mut previous = None;
    for action in actions {
        info!(action = %action.name(), target = %target.label(), "Running");
        let runner = suite.runner(action.name())?;
        previous = Some(go(runner, previous, session).await?);
        *steps += 1;
    }

    Ok(previous)
}

/// The error message with the full cause chain of a phase failure.
pub fn describe_error(err: &IntegratorError) -> String {
    match err.as_phase_failure() {
        Some(failure) => format!("{} ({}): {:#}", failure.action, failure.phase, failure.source),
        None => err.to_string(),
    }
}

/// Write the results as pretty JSON into `output_dir`.
pub fn write_results(results: &RunResults, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn target(name: &str, settings: Value) -> TargetConfig {
        TargetConfig {
            environment: "local".to_string(),
            target_name: name.to_string(),
            settings: settings.as_object().cloned().unwrap_or_else(Map::new),
        }
    }

    #[tokio::test]
    async fn test_targets_run_independently() {
        let targets = vec![
            target("healthy", json!({ "latency_ms": 1 })),
            target("faulty", json!({ "accept_long_items": true })),
        ];

        let results = run_targets(targets, None).await;
        assert_eq!(results.total, 2);
        assert_eq!(results.passed, 1);
        assert!(!results.success());

        let healthy = &results.results[0];
        assert!(healthy.passed);
        assert_eq!(healthy.steps, 6);
        assert!(healthy.error.is_none());

        let faulty = &results.results[1];
        assert!(!faulty.passed);
        assert_eq!(faulty.steps, 4);
        assert_eq!(faulty.failed_action.as_deref(), Some("add new list item"));
        assert_eq!(faulty.failed_phase, Some(PhaseName::Assert));
        assert!(faulty
            .error
            .as_deref()
            .unwrap()
            .starts_with("add new list item (assert): Create text is wrong"));
        assert!(faulty.report.is_some());
    }

    #[tokio::test]
    async fn test_only_runs_one_action() {
        let result = run_target(&target("default", json!({})), Some("add new list item")).await;
        assert!(result.passed);
        assert_eq!(result.steps, 1);

        let report = result.report.unwrap();
        assert_eq!(report.target, "add new list item");
        assert_eq!(
            report.action_path,
            vec!["open app", "write a new list item", "add new list item"]
        );
    }

    #[tokio::test]
    async fn test_unknown_only_action_fails_the_target() {
        let result = run_target(&target("default", json!({})), Some("log in")).await;
        assert!(!result.passed);
        assert_eq!(result.steps, 0);
        assert_eq!(result.error.as_deref(), Some("Unknown action \"log in\""));
    }

    #[tokio::test]
    async fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let results = run_targets(vec![target("default", json!({}))], None).await;

        let path = write_results(&results, &dir.path().join("out")).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(RESULTS_FILE));

        let written: RunResults =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.run_id, results.run_id);
        assert_eq!(written.total, 1);
        assert!(written.results[0].passed);
    }
}
