//! The worklist fixpoint engine (§4.5).
//!
//! Generic over [`Domain`] so the exact same code path drives both the
//! user-facing analysis and the constant-propagation threshold pre-pass of
//! [`crate::threshold`].

use std::collections::VecDeque;

use wlang_core::Domain;

use crate::cfg::Cfg;

/// Tuning knobs from §4.5/§6. `widening_delay = None` disables widening --
/// only sound to pass when the domain's own lattice already guarantees
/// termination (e.g. the constant-propagation pre-pass).
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub widening_delay: Option<u32>,
    pub descending_steps: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            widening_delay: Some(0),
            descending_steps: 2,
        }
    }
}

/// The per-node state vector produced by a completed analysis, indexed by
/// CFG node id (`petgraph::graph::NodeIndex`'s internal index).
pub struct StateVector<S> {
    states: Vec<S>,
}

impl<S> StateVector<S> {
    pub fn get(&self, node: crate::cfg::CfgNode) -> &S {
        &self.states[node.index()]
    }
}

/// Runs the worklist algorithm to a fixpoint and returns the resulting state
/// vector. `init` overrides the entry node's initial state when `Some`
/// (otherwise it starts at `domain.top()`, per §4.5).
pub fn analyze<D: Domain>(
    cfg: &Cfg,
    domain: &D,
    options: &AnalysisOptions,
    init: Option<D::State>,
) -> StateVector<D::State> {
    let n = cfg.node_count();
    let mut states: Vec<D::State> = (0..n).map(|_| domain.bottom()).collect();
    states[cfg.entry().index()] = init.unwrap_or_else(|| domain.top());

    let mut steps = vec![0u32; n];
    let mut worklist: VecDeque<crate::cfg::CfgNode> = cfg.nodes().collect();

    while let Some(j) = worklist.pop_front() {
        steps[j.index()] += 1;
        tracing::trace!(node = j.index(), step = steps[j.index()], "dequeued");

        if j == cfg.entry() {
            continue;
        }

        let preds = cfg.predecessors(j);
        let mut joined: Option<D::State> = None;
        for &p in preds {
            let (_, cmd) = cfg
                .successors(p)
                .into_iter()
                .find(|(dst, _)| *dst == j)
                .expect("predecessor edge must exist");
            let transferred = cmd.apply(domain, &states[p.index()]);
            joined = Some(match joined {
                None => transferred,
                Some(acc) => domain.join(&acc, &transferred),
            });
        }
        let joined = joined.unwrap_or_else(|| domain.bottom());

        let candidate = match options.widening_delay {
            Some(wdelay) if cfg.is_loop_head(j) && steps[j.index()] > wdelay => {
                domain.widen(&states[j.index()], &joined)
            }
            _ => joined,
        };

        let unchanged = domain.leq(&candidate, &states[j.index()])
            && domain.leq(&states[j.index()], &candidate);
        if !unchanged {
            states[j.index()] = candidate;
            for (succ, _) in cfg.successors(j) {
                tracing::trace!(node = succ.index(), from = j.index(), "requeued");
                worklist.push_back(succ);
            }
        }
    }

    narrow(cfg, domain, &mut states, options.descending_steps);

    StateVector { states }
}

/// Descending narrowing iterations (§4.5): at every loop head, meet the
/// current state with the join of its predecessors' transferred states, then
/// re-propagate that tightened state forward (plain join, no widening) so
/// nodes downstream of the loop head -- in particular the loop's exit --
/// reflect the narrowed invariant instead of the stale value the ascending
/// phase left behind.
fn narrow<D: Domain>(
    cfg: &Cfg,
    domain: &D,
    states: &mut [D::State],
    descending_steps: u32,
) {
    let joined_from_preds = |j: crate::cfg::CfgNode, states: &[D::State]| -> Option<D::State> {
        let mut joined: Option<D::State> = None;
        for &p in cfg.predecessors(j) {
            let (_, cmd) = cfg
                .successors(p)
                .into_iter()
                .find(|(dst, _)| *dst == j)
                .expect("predecessor edge must exist");
            let transferred = cmd.apply(domain, &states[p.index()]);
            joined = Some(match joined {
                None => transferred,
                Some(acc) => domain.join(&acc, &transferred),
            });
        }
        joined
    };

    for _ in 0..descending_steps {
        let mut worklist: VecDeque<crate::cfg::CfgNode> =
            cfg.nodes().filter(|&j| cfg.is_loop_head(j)).collect();

        while let Some(j) = worklist.pop_front() {
            let Some(joined) = joined_from_preds(j, states) else {
                continue;
            };
            let candidate = if cfg.is_loop_head(j) {
                domain.meet(&states[j.index()], &joined)
            } else {
                joined
            };
            let unchanged = domain.leq(&candidate, &states[j.index()])
                && domain.leq(&states[j.index()], &candidate);
            if !unchanged {
                states[j.index()] = candidate;
                for (succ, _) in cfg.successors(j) {
                    worklist.push_back(succ);
                }
            }
        }
    }
}
