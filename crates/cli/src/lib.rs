//! Integrator CLI
//!
//! Runs the demo list-app suite against configured environments and targets,
//! plans transitions and explores the action graph.

pub mod commands;
pub mod config;
pub mod demo;
pub mod fanout;
pub mod output;
