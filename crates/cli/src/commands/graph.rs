//! Graph Command

use anyhow::Result;

use crate::demo;

/// Print the demo suite's dependency graph in Graphviz DOT format.
pub fn execute() -> Result<()> {
    let suite = demo::suite()?;
    print!("{}", suite.to_dot());
    Ok(())
}
