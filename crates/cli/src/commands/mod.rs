//! CLI Commands

use std::path::PathBuf;

use crate::output::OutputFormat;

pub mod actions;
pub mod graph;
pub mod plan;
pub mod run;
pub mod walk;

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: PathBuf,
    pub format: OutputFormat,
    pub verbose: bool,
}

/// How a command ended. Setup and configuration errors are returned as `Err`
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Passed => 0,
            Outcome::Failed => 1,
        }
    }
}

/// Exit code for errors raised before anything ran.
pub const SETUP_ERROR_EXIT_CODE: i32 = 2;
