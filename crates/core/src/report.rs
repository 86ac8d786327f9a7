//! Human and machine readable views of a runner's history.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::PhaseName;
use crate::runner::RunnerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub index: usize,
    pub action: String,
    pub phase: PhaseName,
    pub before: Value,
    pub after: Value,
    /// The phase changed the model.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub target: String,
    pub action_path: Vec<String>,
    pub fixtures: Value,
    pub final_model: Value,
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn from_state(state: &RunnerState) -> Self {
        Self {
            target: state.target_name.clone(),
            action_path: state.action_path.clone(),
            fixtures: state.fixtures.to_value(),
            final_model: state.model.clone(),
            entries: state
                .ran
                .iter()
                .enumerate()
                .map(|(index, entry)| ReportEntry {
                    index,
                    action: entry.action.clone(),
                    phase: entry.phase,
                    before: entry.before.clone(),
                    after: entry.after.clone(),
                    changed: entry.before != entry.after,
                })
                .collect(),
        }
    }

    /// Phases that changed the model.
    pub fn changes(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| entry.changed)
    }

    /// Plain-text walk through every phase that ran.
    pub fn transcript(&self) -> String {
        let mut out = String::new();

        for entry in &self.entries {
            let _ = writeln!(out, "=== {} ({}) ===", entry.action, entry.phase);
            if entry.changed {
                let _ = writeln!(out, "before: {}", entry.before);
                let _ = writeln!(out, "after:  {}", entry.after);
            } else {
                let _ = writeln!(out, "model unchanged: {}", entry.after);
            }
        }

        let _ = writeln!(out, "=== final model ===");
        let _ = writeln!(out, "{:#}", self.final_model);
        let _ = writeln!(out, "=== fixtures ===");
        let _ = writeln!(out, "{:#}", self.fixtures);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, FixtureSpec, PhaseContext};
    use crate::orchestrator::go;
    use crate::suite::Suite;
    use serde_json::json;

    #[tokio::test]
    async fn test_report_marks_changes() {
        let suite: Suite<()> = Suite::new(
            [Action::new("open app")
                .fixture("user", FixtureSpec::literal("tom"))
                .setup(|ctx: PhaseContext<()>| async move {
                    let mut model = ctx.model;
                    model["open"] = json!(true);
                    Ok(model)
                })],
            json!({ "open": false }),
        )
        .unwrap();

        let runner = go(suite.runner("open app").unwrap(), None, &()).await.unwrap();
        let report = RunReport::from_state(&runner.state());

        assert_eq!(report.target, "open app");
        assert_eq!(report.fixtures, json!({ "user": "tom" }));
        assert_eq!(report.entries.len(), 2);
        assert!(report.entries[0].changed);
        assert!(!report.entries[1].changed);
        assert_eq!(report.changes().count(), 1);

        let transcript = report.transcript();
        assert!(transcript.starts_with("=== open app (setup) ===\nbefore: {\"open\":false}\nafter:  {\"open\":true}\n"));
        assert!(transcript.contains("=== open app (assert) ===\nmodel unchanged: {\"open\":true}\n"));
        assert!(transcript.contains("=== fixtures ===\n{\n  \"user\": \"tom\"\n}\n"));
    }
}
