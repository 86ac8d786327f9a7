//! Integrator Core
//!
//! Plans and runs end-to-end test scenarios modelled as a graph of named
//! actions. Each action declares the actions it depends on, the fixtures it
//! needs and up to four phase functions that act on a live subject (a
//! browser session, a simulated app, ...) while keeping an in-memory model
//! of what the subject should look like.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Suite (actions + initial model)                            │
//! │    └── Runner::new(suite, target)                           │
//! │          ├── build_action_path()  -> [A, B, E, C, F]        │
//! │          └── build_fixtures()     -> { user: "tom", ... }   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  go(runner, previous, session)                              │
//! │    ├── minimal_action_paths()  -> (teardown, setup)         │
//! │    ├── teardown path: [teardown, done] per action, reversed │
//! │    └── setup path:    [setup, assert]  per action           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  random_walk(runners, previous, session, options)           │
//! │    └── go() to a random eligible target, forever            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod error;
pub mod fixtures;
pub mod graph;
pub mod orchestrator;
pub mod ordered_set;
pub mod path;
pub mod phase;
pub mod plan;
pub mod registry;
pub mod report;
pub mod runner;
pub mod suite;
pub mod walk;

pub use action::{effect, Action, FixtureSpec, Phase, PhaseContext, PhaseName, PhaseSet};
pub use error::{IntegratorError, IntegratorResult, PhaseFailure};
pub use fixtures::{build_fixtures, Fixtures};
pub use orchestrator::{go, plan, TransitionPlan};
pub use ordered_set::OrderedSet;
pub use path::build_action_path;
pub use phase::{run_phase, walk_action_path};
pub use plan::{common_prefix, common_prefix_len, minimal_action_paths, ActionPaths};
pub use registry::ActionRegistry;
pub use report::{ReportEntry, RunReport};
pub use runner::{RanEntry, Runner, RunnerState};
pub use suite::{Suite, SuiteOptions};
pub use walk::{random_walk, random_walk_with_rng, WalkOptions};

/// Integrator version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
