//! Actions Command

use anyhow::Result;
use integrator_core::{Action, PhaseName};
use serde::Serialize;

use crate::demo;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct ActionDisplay {
    pub name: String,
    pub dependencies: Vec<String>,
    pub fixtures: Vec<String>,
    pub phases: Vec<PhaseName>,
}

impl<S> From<&Action<S>> for ActionDisplay {
    fn from(action: &Action<S>) -> Self {
        Self {
            name: action.name().to_string(),
            dependencies: action.dependencies().iter().cloned().collect(),
            fixtures: action.fixture_keys().map(str::to_string).collect(),
            phases: action.phases().defined(),
        }
    }
}

impl TableDisplay for ActionDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Action", "Depends On", "Fixtures", "Phases"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.dependencies.join(", "),
            self.fixtures.join(", "),
            self.phases
                .iter()
                .map(PhaseName::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ]
    }
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let suite = demo::suite()?;
    let actions: Vec<ActionDisplay> = suite
        .actions()
        .map(|action| ActionDisplay::from(action.as_ref()))
        .collect();
    print_list(&actions, format);
    Ok(())
}
