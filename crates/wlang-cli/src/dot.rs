//! Graphviz `digraph` rendering for the `cfg` subcommand (§4.6).

use std::fmt::Write;

use wlang_analysis::{Cfg, Command};
use wlang_core::VarTable;

/// Renders `cfg` as a `digraph { ... }` block. Node labels are `P0..Pk-1`;
/// edges are labeled with the pretty-printed command/guard, HTML-escaped.
pub fn render(cfg: &Cfg, vars: &VarTable) -> String {
    let mut out = String::new();
    writeln!(out, "digraph {{").unwrap();
    for node in cfg.nodes() {
        let shape = if cfg.is_loop_head(node) { "doublecircle" } else { "circle" };
        writeln!(out, "  P{} [shape={shape}];", node.index()).unwrap();
    }
    for node in cfg.nodes() {
        for (target, command) in cfg.successors(node) {
            writeln!(
                out,
                "  P{} -> P{} [label=\"{}\"];",
                node.index(),
                target.index(),
                escape(&label(command, vars))
            )
            .unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
    out
}

fn label(command: &Command, vars: &VarTable) -> String {
    match command {
        Command::Assign(var, expr) => format!("{} := {expr}", vars.name_of(*var)),
        Command::Skip => "skip".to_string(),
        Command::Guard(expr, polarity) => {
            if *polarity {
                expr.to_string()
            } else {
                format!("!({expr})")
            }
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
