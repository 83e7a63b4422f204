//! Widening threshold collection (§4.4): every literal in the source, plus
//! every constant discovered by running the *same* fixpoint engine over the
//! program with the constant-propagation domain (`m=1, n=-1`).
//!
//! This is why [`crate::worklist::analyze`] is generic over [`Domain`]
//! rather than hardcoding the interval domain: the pre-pass here is not
//! special-cased, it is the engine running with a different domain
//! instance.

use wlang_core::{Bound, Interval, IntervalDomain, Params, Stmt, Thresholds, VarTable};

use crate::cfg;
use crate::worklist::{self, AnalysisOptions};

/// `Int(1,-1)`: the degenerate parameters that collapse the interval domain
/// to constant propagation (only `Bottom`, singletons, and `Top` survive
/// `mk`, see `wlang_core::interval`).
fn constant_propagation_params() -> Params {
    Params::new(Bound::Finite(1), Bound::Finite(-1))
}

/// Collects the threshold set for `program`: literal scan plus the
/// constant-propagation pre-pass.
pub fn collect(program: &Stmt, vars: &VarTable) -> Thresholds {
    let mut literals = Vec::new();
    program.literals(&mut literals);

    let cfg = cfg::build(program, vars);
    let cp_thresholds = Thresholds::new([]);
    let cp_domain = IntervalDomain::new(constant_propagation_params(), vars, &cp_thresholds);

    // The constant-propagation lattice has height 2: widening is never
    // actually invoked to extrapolate, it only needs to be well-typed.
    let options = AnalysisOptions {
        widening_delay: Some(0),
        descending_steps: 0,
    };
    let result = worklist::analyze(&cfg, &cp_domain, &options, None);

    for node in cfg.nodes() {
        for interval in result.get(node).iter() {
            if let Interval::Std(Bound::Finite(k), Bound::Finite(j)) = interval {
                if k == j {
                    literals.push(*k);
                }
            }
        }
    }

    Thresholds::new(literals)
}
