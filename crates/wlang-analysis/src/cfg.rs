//! Control-flow graph construction.
//!
//! The CFG is built with one recursive pass over the [`Stmt`] tree (mirroring
//! its shape exactly, per the grammar), threading a "pending tails" list of
//! `(node, command)` pairs whose destination isn't known yet -- the node that
//! performs the command, plus the command itself, is recorded and wired to
//! whichever CFG node gets built next. Predecessors are NOT tracked during
//! this pass; they are computed in a single second pass once every edge
//! exists, since a node (an `if`/`while` condition) can gain predecessors
//! from two different branches that are discovered at different times.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use smallvec::SmallVec;

use wlang_core::{AExpr, BExpr, Domain, Stmt, VarId, VarTable};

/// Index of a node in the control-flow graph.
pub type CfgNode = NodeIndex<u32>;

/// Per-node data. Populated incrementally during construction (`is_while`),
/// then completed by a dedicated predecessor pass. Almost every node has at
/// most two predecessors (only a loop head with a long-fused body can exceed
/// that), hence `SmallVec<[_; 2]>` over a plain `Vec`.
#[derive(Debug, Clone, Default)]
pub struct CfgNodeData {
    pub is_while: bool,
    pub predecessors: SmallVec<[CfgNode; 2]>,
}

/// The action executed when control flows along a CFG edge (§4, Edge_Type in
/// the reference CFG construction).
#[derive(Debug, Clone)]
pub enum Command {
    Assign(VarId, AExpr),
    /// `polarity = true` is the edge taken when the guard holds; `false` the
    /// edge taken when it doesn't. `if`/`while` nodes have exactly one of
    /// each among their outgoing edges.
    Guard(BExpr, bool),
    Skip,
}

impl Command {
    /// Dispatches to the matching transfer function on `domain`.
    pub fn apply<D: Domain>(&self, domain: &D, state: &D::State) -> D::State {
        match self {
            Command::Assign(var, expr) => domain.transfer_assign(state, *var, expr),
            Command::Guard(expr, polarity) => domain.transfer_guard(state, expr, *polarity),
            Command::Skip => domain.transfer_skip(state),
        }
    }
}

/// A control-flow graph together with its designated entry and exit nodes.
#[derive(Debug)]
pub struct Cfg {
    graph: StableDiGraph<CfgNodeData, Command>,
    entry: CfgNode,
    exit: CfgNode,
}

impl Cfg {
    pub fn entry(&self) -> CfgNode {
        self.entry
    }

    pub fn exit(&self) -> CfgNode {
        self.exit
    }

    pub fn is_loop_head(&self, node: CfgNode) -> bool {
        self.graph[node].is_while
    }

    pub fn predecessors(&self, node: CfgNode) -> &[CfgNode] {
        &self.graph[node].predecessors
    }

    pub fn nodes(&self) -> impl Iterator<Item = CfgNode> + '_ {
        self.graph.node_indices()
    }

    /// Outgoing `(target, command)` pairs for `node`, in no particular order
    /// (guard nodes always yield exactly the true-edge and the false-edge).
    pub fn successors(&self, node: CfgNode) -> Vec<(CfgNode, &Command)> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Re-checks the structural invariants construction is supposed to
    /// uphold (§4.3): every guard node (`if`/`while` condition) has exactly
    /// two outgoing edges, every non-entry node has at least one
    /// predecessor, and the loop head is never the entry node. `build()`
    /// asserts this via `debug_assert!`; it's also exposed here so tests can
    /// call it directly against hand-picked programs.
    pub fn validate(&self) -> Result<(), String> {
        for node in self.nodes() {
            let succs = self.successors(node);
            let has_guard = succs.iter().any(|(_, c)| matches!(c, Command::Guard(_, _)));
            if has_guard && succs.len() != 2 {
                return Err(format!(
                    "node {} has a guard edge but {} outgoing edge(s) (expected 2)",
                    node.index(),
                    succs.len()
                ));
            }
            if node != self.entry && self.predecessors(node).is_empty() {
                return Err(format!(
                    "node {} is not the entry node but has no predecessors",
                    node.index()
                ));
            }
        }
        if self.is_loop_head(self.entry) {
            return Err("loop head must never be the entry node".to_string());
        }
        Ok(())
    }
}

/// Builds the CFG for `program`. `vars` resolves assigned variable names to
/// their stable [`VarId`] (it must already have been built from the whole
/// program, so every assigned name is present).
pub fn build(program: &Stmt, vars: &VarTable) -> Cfg {
    let mut graph: StableDiGraph<CfgNodeData, Command> = StableDiGraph::new();
    let mut entry: Option<CfgNode> = None;
    let mut pending: Vec<(CfgNode, Command)> = Vec::new();

    lower(&mut graph, program, vars, &mut pending, &mut entry);

    let exit = new_node(&mut graph, &mut entry, false);
    wire(&mut graph, pending, exit);

    compute_predecessors(&mut graph);

    let cfg = Cfg {
        graph,
        entry: entry.expect("lower() always creates at least one node"),
        exit,
    };
    debug_assert!(cfg.validate().is_ok(), "{}", cfg.validate().unwrap_err());
    cfg
}

fn new_node(
    graph: &mut StableDiGraph<CfgNodeData, Command>,
    entry: &mut Option<CfgNode>,
    is_while: bool,
) -> CfgNode {
    let node = graph.add_node(CfgNodeData {
        is_while,
        predecessors: SmallVec::new(),
    });
    entry.get_or_insert(node);
    node
}

fn wire(
    graph: &mut StableDiGraph<CfgNodeData, Command>,
    pending: Vec<(CfgNode, Command)>,
    target: CfgNode,
) {
    for (src, cmd) in pending {
        graph.add_edge(src, target, cmd);
    }
}

fn lower(
    graph: &mut StableDiGraph<CfgNodeData, Command>,
    stmt: &Stmt,
    vars: &VarTable,
    pending: &mut Vec<(CfgNode, Command)>,
    entry: &mut Option<CfgNode>,
) {
    match stmt {
        Stmt::Assign(name, expr) => {
            let node = new_node(graph, entry, false);
            wire(graph, std::mem::take(pending), node);
            pending.push((node, Command::Assign(vars.id_of(name), expr.clone())));
        }
        Stmt::Skip => {
            let node = new_node(graph, entry, false);
            wire(graph, std::mem::take(pending), node);
            pending.push((node, Command::Skip));
        }
        Stmt::Seq(first, second) => {
            lower(graph, first, vars, pending, entry);
            lower(graph, second, vars, pending, entry);
        }
        Stmt::If(cond, then_branch, else_branch) => {
            let node = new_node(graph, entry, false);
            wire(graph, std::mem::take(pending), node);

            let mut then_pending = vec![(node, Command::Guard(cond.clone(), true))];
            lower(graph, then_branch, vars, &mut then_pending, entry);

            let mut else_pending = vec![(node, Command::Guard(cond.clone(), false))];
            lower(graph, else_branch, vars, &mut else_pending, entry);

            then_pending.extend(else_pending);
            *pending = then_pending;
        }
        Stmt::While(cond, body) => {
            if entry.is_none() {
                // A loop head must never be node 0 (node 0 is pinned to the
                // initial state and never widened against); emit a synthetic
                // skip ahead of it so the head always has a predecessor.
                let synthetic = new_node(graph, entry, false);
                wire(graph, std::mem::take(pending), synthetic);
                pending.push((synthetic, Command::Skip));
            }
            let head = new_node(graph, entry, true);
            wire(graph, std::mem::take(pending), head);

            let mut body_pending = vec![(head, Command::Guard(cond.clone(), true))];
            lower(graph, body, vars, &mut body_pending, entry);
            wire(graph, body_pending, head);

            pending.push((head, Command::Guard(cond.clone(), false)));
        }
    }
}

/// Single pass over every edge, recording each target's incoming sources.
/// Run once construction is complete -- an `if`/`while` condition node can
/// receive predecessors discovered in two different recursive calls (its two
/// branches), so there is no single point during `lower` where its full
/// predecessor set is known.
fn compute_predecessors(graph: &mut StableDiGraph<CfgNodeData, Command>) {
    let edges: Vec<(CfgNode, CfgNode)> = graph
        .edge_indices()
        .map(|e| graph.edge_endpoints(e).unwrap())
        .collect();
    for (src, dst) in edges {
        graph[dst].predecessors.push(src);
    }
}
