//! Integrator CLI - Main Entry Point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use integrator_cli::commands::{
    actions, graph, plan, run, walk, GlobalOptions, Outcome, SETUP_ERROR_EXIT_CODE,
};
use integrator_cli::output::{self, print_error};

/// Integrator - action-graph scenario runner
#[derive(Parser)]
#[command(name = "integrator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(long, default_value = "integrator.toml", env = "INTEGRATOR_CONFIG", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite against every selected target
    Run(run::RunArgs),

    /// Move between random targets until a phase fails
    Walk(walk::WalkArgs),

    /// Show what going to an action would tear down and set up
    Plan(plan::PlanArgs),

    /// Print the action graph in Graphviz DOT format
    Graph,

    /// List actions with their dependencies and fixtures
    Actions,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = GlobalOptions {
        config: cli.config,
        format: cli.format,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, &options).await,
        Commands::Walk(args) => walk::execute(args, &options).await,
        Commands::Plan(args) => plan::execute(args, options.format).map(|_| Outcome::Passed),
        Commands::Graph => graph::execute().map(|_| Outcome::Passed),
        Commands::Actions => actions::execute(options.format).map(|_| Outcome::Passed),
    };

    match result {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            print_error(&format!("{:#}", e));
            std::process::exit(SETUP_ERROR_EXIT_CODE);
        }
    }
}
