//! Graphviz export of the action graph.

use std::fmt::Write;

use crate::registry::ActionRegistry;

/// Render the dependency graph as a DOT `digraph`, edges pointing from a
/// dependency to the action that needs it.
pub fn to_dot<S>(registry: &ActionRegistry<S>) -> String {
    let mut out = String::from("digraph G {\n");

    for action in registry.iter() {
        let _ = writeln!(
            out,
            "  {} [label=\"{}\"];",
            node_id(action.name()),
            action.name().replace('"', "\\\"")
        );
    }

    out.push('\n');

    for action in registry.iter() {
        for dependency in action.dependencies() {
            let _ = writeln!(out, "  {} -> {};", node_id(dependency), node_id(action.name()));
        }
    }

    out.push_str("}\n");
    out
}

fn node_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}
