//! Plan Command

use anyhow::Result;
use clap::Args;
use integrator_core::{plan, TransitionPlan};
use serde::Serialize;

use crate::demo;
use crate::output::{print_list, print_message, print_value, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Action to go to
    #[arg(long)]
    pub to: String,

    /// Action the subject is currently at
    #[arg(long)]
    pub from: Option<String>,
}

/// One row of a transition plan.
#[derive(Debug, Serialize)]
pub struct PlanStep {
    pub order: usize,
    pub direction: &'static str,
    pub action: String,
}

impl TableDisplay for PlanStep {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Direction", "Action"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.order.to_string(),
            self.direction.to_string(),
            self.action.clone(),
        ]
    }
}

pub fn steps(plan: &TransitionPlan) -> Vec<PlanStep> {
    let teardown = plan.teardown.iter().map(|action| ("teardown", action));
    let setup = plan.setup.iter().map(|action| ("setup", action));

    teardown
        .chain(setup)
        .enumerate()
        .map(|(i, (direction, action))| PlanStep {
            order: i + 1,
            direction,
            action: action.clone(),
        })
        .collect()
}

pub fn execute(args: PlanArgs, format: OutputFormat) -> Result<()> {
    let suite = demo::suite()?;
    let target = suite.runner(&args.to)?;
    let previous = args.from.as_deref().map(|name| suite.runner(name)).transpose()?;

    let plan = plan(&target, previous.as_ref());

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_value(&plan, format),
        _ if plan.teardown.is_empty() && plan.setup.is_empty() => {
            print_message(&format!("Already at \"{}\", nothing to do", plan.target), format);
        }
        _ => print_list(&steps(&plan), format),
    }

    Ok(())
}
