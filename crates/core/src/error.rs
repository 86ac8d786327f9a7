//! Error types for Integrator

use thiserror::Error;

use crate::action::PhaseName;
use crate::runner::{RanEntry, RunnerState};

/// Result type alias using [`IntegratorError`]
pub type IntegratorResult<T> = Result<T, IntegratorError>;

#[derive(Error, Debug)]
pub enum IntegratorError {
    /// A target or dependency names an action the suite does not define.
    #[error("{}", unknown_action_message(.name, .required_by.as_deref()))]
    UnknownAction {
        name: String,
        required_by: Option<String>,
    },

    #[error("Action \"{0}\" is defined more than once")]
    DuplicateAction(String),

    #[error("Dependency cycle: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    /// Two actions on one path require different values for the same fixture.
    #[error("The required \"{key}\" fixture for action \"{conflicting}\" conflicts with action \"{owner}\"")]
    FixtureConflict {
        key: String,
        owner: String,
        conflicting: String,
    },

    #[error(transparent)]
    PhaseFailure(#[from] Box<PhaseFailure>),
}

fn unknown_action_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!("Unknown action \"{}\" (required by \"{}\")", name, parent),
        None => format!("Unknown action \"{}\"", name),
    }
}

impl IntegratorError {
    /// Structural errors are found while planning, before any phase runs.
    pub fn is_structural(&self) -> bool {
        !matches!(self, IntegratorError::PhaseFailure(_))
    }

    pub fn as_phase_failure(&self) -> Option<&PhaseFailure> {
        match self {
            IntegratorError::PhaseFailure(failure) => Some(failure.as_ref()),
            _ => None,
        }
    }
}

/// A phase function failed.
///
/// The message is prefixed with the action and phase; the error the phase
/// produced stays reachable through `source()` with its own context chain and
/// backtrace, and the runner state at the moment of failure is kept for
/// reporting.
#[derive(Error, Debug)]
#[error("{action} ({phase}): {source}")]
pub struct PhaseFailure {
    pub action: String,
    pub phase: PhaseName,
    #[source]
    pub source: anyhow::Error,
    pub state: RunnerState,
}

impl PhaseFailure {
    pub fn new(
        action: impl Into<String>,
        phase: PhaseName,
        source: anyhow::Error,
        state: RunnerState,
    ) -> Self {
        Self {
            action: action.into(),
            phase,
            source,
            state,
        }
    }

    /// Phases that completed before this one, oldest first.
    pub fn ran(&self) -> &[RanEntry] {
        &self.state.ran
    }
}

impl From<PhaseFailure> for IntegratorError {
    fn from(failure: PhaseFailure) -> Self {
        IntegratorError::PhaseFailure(Box::new(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;
    use serde_json::json;

    fn empty_state() -> RunnerState {
        RunnerState {
            target_name: "C".to_string(),
            action_path: vec!["A".to_string(), "C".to_string()],
            fixtures: Fixtures::default(),
            model: json!({}),
            ran: Vec::new(),
        }
    }

    #[test]
    fn test_phase_failure_message_is_prefixed() {
        let failure = PhaseFailure::new(
            "login",
            PhaseName::Assert,
            anyhow::anyhow!("title is wrong"),
            empty_state(),
        );
        assert_eq!(failure.to_string(), "login (assert): title is wrong");

        let err = IntegratorError::from(failure);
        assert_eq!(err.to_string(), "login (assert): title is wrong");
        assert!(!err.is_structural());
        assert_eq!(err.as_phase_failure().map(|f| f.action.as_str()), Some("login"));
    }

    #[test]
    fn test_phase_failure_keeps_source_chain() {
        let source = anyhow::anyhow!("element not found").context("clicking submit");
        let failure = PhaseFailure::new("add item", PhaseName::Setup, source, empty_state());

        let inner = std::error::Error::source(&failure).map(|e| e.to_string());
        assert_eq!(inner.as_deref(), Some("clicking submit"));
        assert_eq!(format!("{:#}", failure.source), "clicking submit: element not found");
    }

    #[test]
    fn test_structural_error_messages() {
        let err = IntegratorError::UnknownAction {
            name: "Z".to_string(),
            required_by: Some("F".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown action \"Z\" (required by \"F\")");
        assert!(err.is_structural());

        let err = IntegratorError::DependencyCycle {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(err.to_string(), "Dependency cycle: A -> B -> A");
    }
}
