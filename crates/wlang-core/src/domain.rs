//! The abstract domain layer: abstract states (vectors of intervals indexed
//! by variable) and the transfer functions that interpret While commands
//! over them.
//!
//! The fixpoint engine (in `wlang-analysis`) is generic over the [`Domain`]
//! trait -- it never names [`IntervalDomain`] directly, so the same engine
//! can drive the threshold pre-pass (§4.4) with a constant-propagation
//! instance and the user-facing analysis with whatever `(m, n)` the CLI was
//! given.

use std::ops::{Index, IndexMut};

use crate::ast::{AExpr, BExpr};
use crate::id::VarId;
use crate::interval::{self, Bound, Interval, Params, Thresholds};
use crate::vars::VarTable;

/// A fixed-length vector of intervals, one slot per variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractState(Vec<Interval>);

impl AbstractState {
    pub fn bottom(var_count: usize) -> Self {
        AbstractState(vec![Interval::Bottom; var_count])
    }

    pub fn top(var_count: usize) -> Self {
        AbstractState(vec![Interval::TOP; var_count])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.0.iter()
    }

    pub fn is_all_bottom(&self) -> bool {
        self.0.iter().all(|i| i.is_bottom())
    }
}

impl Index<VarId> for AbstractState {
    type Output = Interval;
    fn index(&self, id: VarId) -> &Interval {
        &self.0[id.index()]
    }
}

impl IndexMut<VarId> for AbstractState {
    fn index_mut(&mut self, id: VarId) -> &mut Interval {
        &mut self.0[id.index()]
    }
}

/// The operation set the fixpoint engine depends on (§4.2, §9's
/// trait-object design note). `State` is the abstract domain's element type
/// ([`AbstractState`] for [`IntervalDomain`]).
pub trait Domain {
    type State: Clone + PartialEq;

    fn bottom(&self) -> Self::State;
    fn top(&self) -> Self::State;
    fn leq(&self, a: &Self::State, b: &Self::State) -> bool;
    fn join(&self, a: &Self::State, b: &Self::State) -> Self::State;
    fn meet(&self, a: &Self::State, b: &Self::State) -> Self::State;
    fn widen(&self, a: &Self::State, b: &Self::State) -> Self::State;

    fn transfer_assign(&self, state: &Self::State, var: VarId, expr: &AExpr) -> Self::State;
    /// `polarity = true` interprets `expr` as asserted; `false` as its
    /// negation (the false-branch of a guard).
    fn transfer_guard(&self, state: &Self::State, expr: &BExpr, polarity: bool) -> Self::State;
    fn transfer_skip(&self, state: &Self::State) -> Self::State {
        state.clone()
    }
}

/// The parametric interval domain `Int(m,n)`, instantiated with a variable
/// table and a widening threshold set.
#[derive(Debug, Clone, Copy)]
pub struct IntervalDomain<'a> {
    pub params: Params,
    pub vars: &'a VarTable,
    pub thresholds: &'a Thresholds,
}

impl<'a> IntervalDomain<'a> {
    pub fn new(params: Params, vars: &'a VarTable, thresholds: &'a Thresholds) -> Self {
        IntervalDomain {
            params,
            vars,
            thresholds,
        }
    }

    fn eval(&self, state: &AbstractState, e: &AExpr) -> Interval {
        match e {
            AExpr::Num(n) => interval::mk(self.params, Bound::Finite(*n), Bound::Finite(*n)),
            AExpr::Var(name) => state[self.vars.id_of(name)],
            AExpr::Add(l, r) => interval::add(self.params, self.eval(state, l), self.eval(state, r)),
            AExpr::Sub(l, r) => interval::sub(self.params, self.eval(state, l), self.eval(state, r)),
            AExpr::Mul(l, r) => interval::mul(self.params, self.eval(state, l), self.eval(state, r)),
            AExpr::Div(l, r) => interval::div(self.params, self.eval(state, l), self.eval(state, r)),
        }
    }

    /// Backward-propagates a refined target interval for `e` down to its
    /// variable leaves, meeting each leaf's contribution into `acc` (§4.2
    /// step 3). `state` supplies the forward values needed by the backward
    /// operators.
    fn back_propagate(&self, e: &AExpr, state: &AbstractState, target: Interval, acc: &mut AbstractState) {
        match e {
            AExpr::Num(_) => {}
            AExpr::Var(name) => {
                let id = self.vars.id_of(name);
                acc[id] = interval::meet(self.params, acc[id], target);
            }
            AExpr::Add(l, r) => {
                let (vl, vr) = (self.eval(state, l), self.eval(state, r));
                let nl = interval::meet(self.params, vl, interval::sub(self.params, target, vr));
                let nr = interval::meet(self.params, vr, interval::sub(self.params, target, vl));
                self.back_propagate(l, state, nl, acc);
                self.back_propagate(r, state, nr, acc);
            }
            AExpr::Sub(l, r) => {
                let (vl, vr) = (self.eval(state, l), self.eval(state, r));
                let nl = interval::meet(self.params, vl, interval::add(self.params, target, vr));
                let nr = interval::meet(self.params, vr, interval::sub(self.params, vl, target));
                self.back_propagate(l, state, nl, acc);
                self.back_propagate(r, state, nr, acc);
            }
            AExpr::Mul(l, r) => {
                let (vl, vr) = (self.eval(state, l), self.eval(state, r));
                let nl = interval::meet(self.params, vl, interval::div(self.params, target, vr));
                let nr = interval::meet(self.params, vr, interval::div(self.params, target, vl));
                self.back_propagate(l, state, nl, acc);
                self.back_propagate(r, state, nr, acc);
            }
            AExpr::Div(l, r) => {
                let (vl, vr) = (self.eval(state, l), self.eval(state, r));
                let slack = Interval::Std(Bound::Finite(-1), Bound::Finite(1));
                let target_pm1 = interval::add(self.params, target, slack);
                let nl = interval::meet(self.params, vl, interval::mul(self.params, target_pm1, vr));
                let nr_candidate = interval::join(
                    self.params,
                    interval::div(self.params, vl, target_pm1),
                    Interval::singleton(0),
                );
                let nr = interval::meet(self.params, vr, nr_candidate);
                self.back_propagate(l, state, nl, acc);
                self.back_propagate(r, state, nr, acc);
            }
        }
    }
}

/// A boolean guard normalized so that negation has been pushed down to the
/// comparison leaves (De Morgan), and every comparison reflects the polarity
/// it must hold under. Built once per `transfer_guard` call.
enum NormGuard {
    True,
    False,
    Eq(AExpr, AExpr),
    /// `!=` refines nothing (an equality's negation doesn't bound an
    /// interval) -- carries no data.
    Neq,
    Leq(AExpr, AExpr),
    Gt(AExpr, AExpr),
    And(Box<NormGuard>, Box<NormGuard>),
    /// A disjunction: information from either disjunct alone isn't sound to
    /// combine into a single refinement, so it is not narrowed further and
    /// carries no data.
    Or,
}

fn normalize(e: &BExpr, polarity: bool) -> NormGuard {
    match e {
        BExpr::True => {
            if polarity {
                NormGuard::True
            } else {
                NormGuard::False
            }
        }
        BExpr::False => {
            if polarity {
                NormGuard::False
            } else {
                NormGuard::True
            }
        }
        BExpr::Eq(a, b) => {
            if polarity {
                NormGuard::Eq(a.clone(), b.clone())
            } else {
                NormGuard::Neq
            }
        }
        BExpr::Leq(a, b) => {
            if polarity {
                NormGuard::Leq(a.clone(), b.clone())
            } else {
                NormGuard::Gt(a.clone(), b.clone())
            }
        }
        BExpr::Not(inner) => normalize(inner, !polarity),
        BExpr::And(l, r) => {
            if polarity {
                NormGuard::And(Box::new(normalize(l, true)), Box::new(normalize(r, true)))
            } else {
                NormGuard::Or
            }
        }
    }
}

impl<'a> Domain for IntervalDomain<'a> {
    type State = AbstractState;

    fn bottom(&self) -> AbstractState {
        AbstractState::bottom(self.vars.len())
    }

    fn top(&self) -> AbstractState {
        AbstractState::top(self.vars.len())
    }

    fn leq(&self, a: &AbstractState, b: &AbstractState) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| interval::leq(*x, *y))
    }

    fn join(&self, a: &AbstractState, b: &AbstractState) -> AbstractState {
        AbstractState(
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| interval::join(self.params, *x, *y))
                .collect(),
        )
    }

    fn meet(&self, a: &AbstractState, b: &AbstractState) -> AbstractState {
        AbstractState(
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| interval::meet(self.params, *x, *y))
                .collect(),
        )
    }

    fn widen(&self, a: &AbstractState, b: &AbstractState) -> AbstractState {
        AbstractState(
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| interval::widen(self.params, self.thresholds, *x, *y))
                .collect(),
        )
    }

    fn transfer_assign(&self, state: &AbstractState, var: VarId, expr: &AExpr) -> AbstractState {
        let mut next = state.clone();
        next[var] = self.eval(state, expr);
        next
    }

    fn transfer_guard(&self, state: &AbstractState, expr: &BExpr, polarity: bool) -> AbstractState {
        let norm = normalize(expr, polarity);
        let refined = self.refine(&norm, state);
        if refined.is_all_bottom() {
            AbstractState::bottom(self.vars.len())
        } else {
            refined
        }
    }
}

impl<'a> IntervalDomain<'a> {
    fn refine(&self, guard: &NormGuard, state: &AbstractState) -> AbstractState {
        match guard {
            NormGuard::True => state.clone(),
            NormGuard::False => AbstractState::bottom(self.vars.len()),
            NormGuard::Neq => state.clone(),
            NormGuard::Eq(a, b) => {
                let (va, vb) = (self.eval(state, a), self.eval(state, b));
                let refined = interval::meet(self.params, va, vb);
                let mut acc = state.clone();
                self.back_propagate(a, state, refined, &mut acc);
                self.back_propagate(b, state, refined, &mut acc);
                acc
            }
            NormGuard::Leq(a, b) => {
                let (va, vb) = (self.eval(state, a), self.eval(state, b));
                let (upper_b, lower_a) = bounds(vb, va);
                let target_a = interval::meet(self.params, va, Interval::Std(Bound::NegInf, upper_b));
                let target_b = interval::meet(self.params, vb, Interval::Std(lower_a, Bound::PosInf));
                let mut acc = state.clone();
                self.back_propagate(a, state, target_a, &mut acc);
                self.back_propagate(b, state, target_b, &mut acc);
                acc
            }
            NormGuard::Gt(a, b) => {
                // a > b  <=>  b <= a - 1, i.e. Leq(b, a-1): reuse the Leq rule
                // with a shifted by one.
                let (va, vb) = (self.eval(state, a), self.eval(state, b));
                let a_minus_one = interval::sub(self.params, va, Interval::singleton(1));
                let (upper_a_minus_one, lower_b) = bounds(a_minus_one, vb);
                let target_b = interval::meet(self.params, vb, Interval::Std(Bound::NegInf, upper_a_minus_one));
                let target_a_minus_one =
                    interval::meet(self.params, a_minus_one, Interval::Std(lower_b, Bound::PosInf));
                let target_a = interval::add(self.params, target_a_minus_one, Interval::singleton(1));
                let mut acc = state.clone();
                self.back_propagate(b, state, target_b, &mut acc);
                self.back_propagate(a, state, target_a, &mut acc);
                acc
            }
            NormGuard::And(l, r) => {
                let left = self.refine(l, state);
                if left.is_all_bottom() {
                    return left;
                }
                self.refine(r, &left)
            }
            NormGuard::Or => state.clone(),
        }
    }
}

/// Extracts `(upper bound, lower bound)` from a `Std` interval, treating
/// `Bottom` as contributing no information (the tightest/widest sentinel so
/// the resulting meet collapses to `Bottom` downstream).
fn bounds(upper_of: Interval, lower_of: Interval) -> (Bound, Bound) {
    let upper = match upper_of {
        Interval::Std(_, b) => b,
        Interval::Bottom => Bound::NegInf,
    };
    let lower = match lower_of {
        Interval::Std(a, _) => a,
        Interval::Bottom => Bound::PosInf,
    };
    (upper, lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;

    fn setup(program: &Stmt) -> (VarTable, Thresholds) {
        let vars = VarTable::from_program(program);
        let thresholds = Thresholds::new([]);
        (vars, thresholds)
    }

    fn unbounded() -> Params {
        Params::new(Bound::NegInf, Bound::PosInf)
    }

    #[test]
    fn assign_constant() {
        let program = Stmt::Assign("x".into(), AExpr::Num(5));
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let state = domain.top();
        let next = domain.transfer_assign(&state, vars.id_of("x"), &AExpr::Num(5));
        assert_eq!(next[vars.id_of("x")], Interval::singleton(5));
    }

    #[test]
    fn guard_leq_narrows_both_sides() {
        // x <= 9, x starts as TOP -> x narrowed to (-inf, 9]
        let program = Stmt::Assign("x".into(), AExpr::Var("x".into()));
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let state = domain.top();
        let guard = BExpr::Leq(AExpr::Var("x".into()), AExpr::Num(9));
        let refined = domain.transfer_guard(&state, &guard, true);
        assert_eq!(refined[vars.id_of("x")], Interval::Std(Bound::NegInf, Bound::Finite(9)));
    }

    #[test]
    fn guard_negated_leq_narrows_to_strictly_greater() {
        let program = Stmt::Assign("x".into(), AExpr::Var("x".into()));
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let state = domain.top();
        let guard = BExpr::Leq(AExpr::Var("x".into()), AExpr::Num(9));
        // false edge of `x <= 9` is `x > 9`, i.e. x >= 10
        let refined = domain.transfer_guard(&state, &guard, false);
        assert_eq!(refined[vars.id_of("x")], Interval::Std(Bound::Finite(10), Bound::PosInf));
    }

    #[test]
    fn guard_eq_narrows_both_variables_together() {
        let program = Stmt::Seq(
            Box::new(Stmt::Assign("x".into(), AExpr::Num(0))),
            Box::new(Stmt::Assign("y".into(), AExpr::Num(0))),
        );
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let mut state = domain.top();
        state[vars.id_of("x")] = Interval::Std(Bound::Finite(0), Bound::Finite(5));
        state[vars.id_of("y")] = Interval::Std(Bound::Finite(3), Bound::Finite(10));
        let guard = BExpr::Eq(AExpr::Var("x".into()), AExpr::Var("y".into()));
        let refined = domain.transfer_guard(&state, &guard, true);
        assert_eq!(refined[vars.id_of("x")], Interval::Std(Bound::Finite(3), Bound::Finite(5)));
        assert_eq!(refined[vars.id_of("y")], Interval::Std(Bound::Finite(3), Bound::Finite(5)));
    }

    #[test]
    fn contradictory_guard_yields_bottom_state() {
        let program = Stmt::Assign("x".into(), AExpr::Num(0));
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let mut state = domain.top();
        state[vars.id_of("x")] = Interval::singleton(5);
        let guard = BExpr::Leq(AExpr::Var("x".into()), AExpr::Num(2));
        let refined = domain.transfer_guard(&state, &guard, true);
        assert!(refined.is_all_bottom());
    }

    #[test]
    fn skip_is_identity() {
        let program = Stmt::Assign("x".into(), AExpr::Num(0));
        let (vars, thresholds) = setup(&program);
        let domain = IntervalDomain::new(unbounded(), &vars, &thresholds);
        let state = domain.top();
        assert_eq!(domain.transfer_skip(&state), state);
    }
}
