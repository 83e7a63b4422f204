//! Sound interval arithmetic over `ℤ ∪ {−∞, +∞}`.
//!
//! Every operation here is a pure function of its operands (plus, for
//! canonicalization and widening, the ambient domain parameters/thresholds).
//! None of them touch the variable table or the CFG -- that lives one layer
//! up, in [`crate::domain`].

use std::cmp::Ordering;
use std::fmt;

/// An interval endpoint: a finite integer or one of the two infinities.
///
/// Kept as an explicit variant rather than sentinel `i64::MIN`/`MAX` values so
/// that saturating arithmetic can never be confused with a real extreme
/// value the analyzed program computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    NegInf,
    Finite(i64),
    PosInf,
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        use Bound::*;
        match (self, other) {
            (NegInf, NegInf) | (PosInf, PosInf) => Ordering::Equal,
            (NegInf, _) => Ordering::Less,
            (_, NegInf) => Ordering::Greater,
            (PosInf, _) => Ordering::Greater,
            (_, PosInf) => Ordering::Less,
            (Finite(a), Finite(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInf => write!(f, "-INF"),
            Bound::PosInf => write!(f, "+INF"),
            Bound::Finite(n) => write!(f, "{n}"),
        }
    }
}

impl Bound {
    fn is_zero(self) -> bool {
        matches!(self, Bound::Finite(0))
    }

    fn sign(self) -> i64 {
        match self {
            Bound::NegInf => -1,
            Bound::PosInf => 1,
            Bound::Finite(n) => n.signum(),
        }
    }

    pub fn neg(self) -> Bound {
        match self {
            Bound::NegInf => Bound::PosInf,
            Bound::PosInf => Bound::NegInf,
            Bound::Finite(n) => n.checked_neg().map_or(Bound::PosInf, Bound::Finite),
        }
    }

    /// Saturating addition. Sound for any combination produced by canonical
    /// intervals (never combines `NegInf` with `PosInf`, see module tests).
    pub fn add(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => {
                a.checked_add(b)
                    .map(Bound::Finite)
                    .unwrap_or(if a > 0 { Bound::PosInf } else { Bound::NegInf })
            }
            (Bound::NegInf, Bound::PosInf) | (Bound::PosInf, Bound::NegInf) => {
                // Cannot arise from two canonical intervals (see module docs);
                // treat conservatively as the widest possible result.
                Bound::PosInf
            }
            (Bound::NegInf, _) | (_, Bound::NegInf) => Bound::NegInf,
            (Bound::PosInf, _) | (_, Bound::PosInf) => Bound::PosInf,
        }
    }

    pub fn sub(self, other: Bound) -> Bound {
        self.add(other.neg())
    }

    /// Saturating multiplication, with `±∞ · 0 = 0` as required by §4.1.
    pub fn mul(self, other: Bound) -> Bound {
        if self.is_zero() || other.is_zero() {
            return Bound::Finite(0);
        }
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => a
                .checked_mul(b)
                .map(Bound::Finite)
                .unwrap_or(if a.signum() * b.signum() > 0 {
                    Bound::PosInf
                } else {
                    Bound::NegInf
                }),
            _ => {
                if self.sign() * other.sign() > 0 {
                    Bound::PosInf
                } else {
                    Bound::NegInf
                }
            }
        }
    }

    /// Division, defined only when `other` is a nonzero finite divisor
    /// (callers split divisor intervals containing zero before calling this).
    fn div(self, other: i64) -> Bound {
        debug_assert_ne!(other, 0);
        match self {
            Bound::NegInf => {
                if other > 0 {
                    Bound::NegInf
                } else {
                    Bound::PosInf
                }
            }
            Bound::PosInf => {
                if other > 0 {
                    Bound::PosInf
                } else {
                    Bound::NegInf
                }
            }
            Bound::Finite(a) => Bound::Finite(a / other),
        }
    }
}

/// A canonical interval in `Int(m,n)`: either the empty set, or a standard
/// interval `[a,b]` with `a ≤ b` (where `Std(NegInf, PosInf)` is `Top`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Bottom,
    Std(Bound, Bound),
}

impl Interval {
    pub const TOP: Interval = Interval::Std(Bound::NegInf, Bound::PosInf);

    pub fn singleton(k: i64) -> Interval {
        Interval::Std(Bound::Finite(k), Bound::Finite(k))
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Interval::Bottom)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Bottom => write!(f, "BOTTOM"),
            Interval::Std(Bound::NegInf, Bound::PosInf) => write!(f, "TOP"),
            Interval::Std(Bound::NegInf, b) => write!(f, "(-INF, {b}]"),
            Interval::Std(a, Bound::PosInf) => write!(f, "[{a}, +INF)"),
            Interval::Std(a, b) => write!(f, "[{a}, {b}]"),
        }
    }
}

/// Domain parameters `(m, n)`. `m > n` collapses `Int(m,n)` to the
/// constant-propagation lattice (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub m: Bound,
    pub n: Bound,
}

impl Params {
    pub fn new(m: Bound, n: Bound) -> Self {
        Params { m, n }
    }

    fn is_constant_propagation(self) -> bool {
        self.m > self.n
    }

    fn in_mn(self, k: Bound) -> bool {
        self.m <= k && k <= self.n
    }
}

/// Canonicalization: the smallest canonical interval in `Int(m,n)` containing
/// `[a,b]` (§4.1). The raw `[a,b]` need not itself be canonical -- this is
/// how every other operation below produces a legal result.
pub fn mk(params: Params, a: Bound, b: Bound) -> Interval {
    if a > b {
        return Interval::Bottom;
    }
    if a == Bound::NegInf && b == Bound::PosInf {
        return Interval::TOP;
    }
    if a == Bound::PosInf && b == Bound::PosInf {
        return Interval::TOP;
    }
    if a == Bound::NegInf && b == Bound::NegInf {
        return Interval::TOP;
    }
    if a == b {
        // singleton [k,k] is always canonical, regardless of (m,n)
        return Interval::Std(a, b);
    }
    if params.is_constant_propagation() {
        // only Bottom, singletons, Top are canonical; anything wider collapses to Top
        return Interval::TOP;
    }
    // a < b, not already a singleton: check if [a,b] ⊆ [m,n]
    if a >= params.m && b <= params.n {
        return Interval::Std(a, b);
    }
    if b < params.m {
        return Interval::Std(Bound::NegInf, params.m);
    }
    if a > params.n {
        return Interval::Std(params.n, Bound::PosInf);
    }
    if a < params.m && params.in_mn(b) {
        return Interval::Std(Bound::NegInf, b);
    }
    if params.in_mn(a) && b > params.n {
        return Interval::Std(a, Bound::PosInf);
    }
    Interval::TOP
}

/// `i1 ⊑ i2`.
pub fn leq(i1: Interval, i2: Interval) -> bool {
    match (i1, i2) {
        (Interval::Bottom, _) => true,
        (_, Interval::Bottom) => false,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => a1 >= a2 && b1 <= b2,
    }
}

/// `i1 ∪# i2`.
pub fn join(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, x) | (x, Interval::Bottom) => x,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            mk(params, a1.min(a2), b1.max(b2))
        }
    }
}

/// `i1 ∩# i2`.
pub fn meet(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, _) | (_, Interval::Bottom) => Interval::Bottom,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            mk(params, a1.max(a2), b1.min(b2))
        }
    }
}

pub fn add(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, _) | (_, Interval::Bottom) => Interval::Bottom,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            mk(params, a1.add(a2), b1.add(b2))
        }
    }
}

pub fn sub(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, _) | (_, Interval::Bottom) => Interval::Bottom,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            mk(params, a1.sub(b2), b1.sub(a2))
        }
    }
}

pub fn mul(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, _) | (_, Interval::Bottom) => Interval::Bottom,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            let products = [a1.mul(a2), a1.mul(b2), b1.mul(a2), b1.mul(b2)];
            let lo = *products.iter().min().unwrap();
            let hi = *products.iter().max().unwrap();
            mk(params, lo, hi)
        }
    }
}

/// `[a,b] /# [c,d]`, per §4.1. `[c,d] = [0,0]` yields `Bottom` (no feasible
/// concrete divisor). The internal split of a divisor straddling zero does
/// NOT canonicalize, to avoid non-terminating recursion in the collapsed
/// (constant-propagation) domain.
pub fn div(params: Params, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, _) | (_, Interval::Bottom) => Interval::Bottom,
        (Interval::Std(a, b), Interval::Std(c, d)) => div_std(params, a, b, c, d),
    }
}

fn div_std(params: Params, a: Bound, b: Bound, c: Bound, d: Bound) -> Interval {
    if c >= Bound::Finite(1) {
        let (c, d) = (finite(c), finite(d));
        let lo = a.div(c).min(a.div(d));
        let hi = b.div(c).max(b.div(d));
        return mk(params, lo, hi);
    }
    if d <= Bound::Finite(-1) {
        let (c, d) = (finite(c), finite(d));
        let lo = b.div(c).min(b.div(d));
        let hi = a.div(c).max(a.div(d));
        return mk(params, lo, hi);
    }
    // [c,d] straddles zero: split into the positive and negative halves,
    // recurse on each raw (un-canonicalized) half, and join the results.
    let pos_half = raw_meet(c, d, Bound::Finite(1), Bound::PosInf);
    let neg_half = raw_meet(c, d, Bound::NegInf, Bound::Finite(-1));

    let left = match pos_half {
        Some((c, d)) => div_std(params, a, b, c, d),
        None => Interval::Bottom,
    };
    let right = match neg_half {
        Some((c, d)) => div_std(params, a, b, c, d),
        None => Interval::Bottom,
    };
    join(params, left, right)
}

/// Meet of two raw (possibly non-canonical) bound pairs, without invoking
/// `mk`. `None` if the result is empty.
fn raw_meet(a1: Bound, b1: Bound, a2: Bound, b2: Bound) -> Option<(Bound, Bound)> {
    let lo = a1.max(a2);
    let hi = b1.min(b2);
    if lo > hi {
        None
    } else {
        Some((lo, hi))
    }
}

fn finite(b: Bound) -> i64 {
    match b {
        Bound::Finite(n) => n,
        _ => unreachable!("finite() called on an infinite bound"),
    }
}

/// A finite, sorted, deduplicated set of widening thresholds, always
/// containing both infinities (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds(Vec<Bound>);

impl Thresholds {
    /// Builds the threshold set from an arbitrary collection of finite
    /// literals, always including both infinities.
    pub fn new(literals: impl IntoIterator<Item = i64>) -> Self {
        let mut values: Vec<Bound> = literals.into_iter().map(Bound::Finite).collect();
        values.push(Bound::NegInf);
        values.push(Bound::PosInf);
        values.sort();
        values.dedup();
        Thresholds(values)
    }

    fn at_most(&self, k: Bound) -> Bound {
        self.0
            .iter()
            .copied()
            .filter(|t| *t <= k)
            .max()
            .expect("thresholds always contain -INF")
    }

    fn at_least(&self, k: Bound) -> Bound {
        self.0
            .iter()
            .copied()
            .filter(|t| *t >= k)
            .min()
            .expect("thresholds always contain +INF")
    }
}

/// `i1 ▽ i2` with thresholds `W` (§4.1).
pub fn widen(params: Params, thresholds: &Thresholds, i1: Interval, i2: Interval) -> Interval {
    match (i1, i2) {
        (Interval::Bottom, x) | (x, Interval::Bottom) => x,
        (Interval::Std(a1, b1), Interval::Std(a2, b2)) => {
            let lo = if a1 <= a2 { a1 } else { thresholds.at_most(a2) };
            let hi = if b1 >= b2 { b1 } else { thresholds.at_least(b2) };
            mk(params, lo, hi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(m: i64, n: i64) -> Params {
        Params::new(Bound::Finite(m), Bound::Finite(n))
    }

    fn unbounded() -> Params {
        Params::new(Bound::NegInf, Bound::PosInf)
    }

    #[test]
    fn mk_empty_is_bottom() {
        assert_eq!(mk(unbounded(), Bound::Finite(5), Bound::Finite(1)), Interval::Bottom);
    }

    #[test]
    fn mk_full_is_top() {
        assert_eq!(mk(unbounded(), Bound::NegInf, Bound::PosInf), Interval::TOP);
    }

    #[test]
    fn mk_same_infinity_twice_is_top() {
        assert_eq!(mk(unbounded(), Bound::PosInf, Bound::PosInf), Interval::TOP);
        assert_eq!(mk(unbounded(), Bound::NegInf, Bound::NegInf), Interval::TOP);
    }

    #[test]
    fn overflowing_multiplication_collapses_to_top_not_malformed_std() {
        // 4_000_000_000 * 4_000_000_000 overflows i64 on both ends, saturating
        // to PosInf four times over; the result must canonicalize to Top, not
        // the malformed Std(PosInf, PosInf).
        let huge = Interval::Std(Bound::Finite(4_000_000_000), Bound::Finite(4_000_000_000));
        assert_eq!(mul(unbounded(), huge, huge), Interval::TOP);
    }

    #[test]
    fn mk_singleton_always_canonical() {
        // even far outside [m,n], a singleton is canonical.
        assert_eq!(
            mk(p(0, 10), Bound::Finite(100), Bound::Finite(100)),
            Interval::singleton(100)
        );
    }

    #[test]
    fn mk_widens_below_m() {
        assert_eq!(
            mk(p(0, 10), Bound::Finite(-5), Bound::Finite(3)),
            Interval::Std(Bound::NegInf, Bound::Finite(3))
        );
    }

    #[test]
    fn mk_widens_above_n() {
        assert_eq!(
            mk(p(0, 10), Bound::Finite(5), Bound::Finite(20)),
            Interval::Std(Bound::Finite(5), Bound::PosInf)
        );
    }

    #[test]
    fn mk_inside_mn_is_exact() {
        assert_eq!(
            mk(p(0, 10), Bound::Finite(2), Bound::Finite(7)),
            Interval::Std(Bound::Finite(2), Bound::Finite(7))
        );
    }

    #[test]
    fn constant_propagation_collapses_bounded_ranges() {
        let cp = p(1, -1);
        assert_eq!(mk(cp, Bound::Finite(2), Bound::Finite(7)), Interval::TOP);
        assert_eq!(mk(cp, Bound::Finite(3), Bound::Finite(3)), Interval::singleton(3));
    }

    #[test]
    fn leq_bottom_is_least() {
        assert!(leq(Interval::Bottom, Interval::TOP));
        assert!(leq(Interval::Bottom, Interval::Bottom));
        assert!(!leq(Interval::TOP, Interval::Bottom));
    }

    #[test]
    fn division_by_zero_interval_is_bottom() {
        let zero = Interval::singleton(0);
        assert_eq!(div(unbounded(), Interval::singleton(10), zero), Interval::Bottom);
    }

    #[test]
    fn division_splits_straddling_divisor() {
        // [10,10] / [-1,1] = ([10,10]/[1,1]) join ([10,10]/[-1,-1])
        let ten = Interval::singleton(10);
        let straddling = Interval::Std(Bound::Finite(-1), Bound::Finite(1));
        let result = div(unbounded(), ten, straddling);
        assert_eq!(result, Interval::Std(Bound::Finite(-10), Bound::Finite(10)));
    }

    #[test]
    fn widening_picks_threshold_below() {
        let thresholds = Thresholds::new([0, 100]);
        let i1 = Interval::Std(Bound::Finite(0), Bound::Finite(5));
        let i2 = Interval::Std(Bound::Finite(-1), Bound::Finite(6));
        let widened = widen(unbounded(), &thresholds, i1, i2);
        assert_eq!(widened, Interval::Std(Bound::NegInf, Bound::Finite(100)));
    }

    #[test]
    fn widening_keeps_stable_bound() {
        let thresholds = Thresholds::new([]);
        let i1 = Interval::Std(Bound::Finite(0), Bound::Finite(5));
        let i2 = Interval::Std(Bound::Finite(0), Bound::Finite(3));
        assert_eq!(widen(unbounded(), &thresholds, i1, i2), i1);
    }

    #[test]
    fn widening_from_bottom_is_identity() {
        let thresholds = Thresholds::new([]);
        let i2 = Interval::Std(Bound::Finite(0), Bound::Finite(3));
        assert_eq!(widen(unbounded(), &thresholds, Interval::Bottom, i2), i2);
        assert_eq!(widen(unbounded(), &thresholds, i2, Interval::Bottom), i2);
    }

    fn small_interval() -> impl Strategy<Value = Interval> {
        (-5i64..=5, -5i64..=5).prop_map(|(a, b)| mk(unbounded(), Bound::Finite(a.min(b)), Bound::Finite(a.max(b))))
    }

    fn concretize(i: Interval) -> Vec<i64> {
        match i {
            Interval::Bottom => vec![],
            Interval::Std(a, b) => {
                let lo = match a {
                    Bound::Finite(n) => n,
                    Bound::NegInf => -20,
                    Bound::PosInf => unreachable!(),
                };
                let hi = match b {
                    Bound::Finite(n) => n,
                    Bound::PosInf => 20,
                    Bound::NegInf => unreachable!(),
                };
                (lo..=hi).collect()
            }
        }
    }

    proptest! {
        #[test]
        fn leq_is_reflexive(i in small_interval()) {
            prop_assert!(leq(i, i));
        }

        #[test]
        fn leq_respects_bottom_and_top(i in small_interval()) {
            prop_assert!(leq(Interval::Bottom, i));
            prop_assert!(leq(i, Interval::TOP));
        }

        #[test]
        fn join_is_commutative(i in small_interval(), j in small_interval()) {
            prop_assert_eq!(join(unbounded(), i, j), join(unbounded(), j, i));
        }

        #[test]
        fn join_is_idempotent(i in small_interval()) {
            prop_assert_eq!(join(unbounded(), i, i), i);
        }

        #[test]
        fn meet_is_commutative(i in small_interval(), j in small_interval()) {
            prop_assert_eq!(meet(unbounded(), i, j), meet(unbounded(), j, i));
        }

        #[test]
        fn meet_is_idempotent(i in small_interval()) {
            prop_assert_eq!(meet(unbounded(), i, i), i);
        }

        #[test]
        fn mk_result_is_canonical_under_self_join(a in -8i64..=8, b in -8i64..=8) {
            let i = mk(p(-3, 3), Bound::Finite(a), Bound::Finite(b));
            // canonical intervals are fixed points of mk on their own endpoints
            if let Interval::Std(lo, hi) = i {
                prop_assert_eq!(mk(p(-3, 3), lo, hi), i);
            }
        }

        #[test]
        fn constant_propagation_only_yields_three_shapes(a in -8i64..=8, b in -8i64..=8) {
            let i = mk(p(1, -1), Bound::Finite(a.min(b)), Bound::Finite(a.max(b)));
            let ok = matches!(i, Interval::Bottom | Interval::TOP)
                || matches!(i, Interval::Std(x, y) if x == y);
            prop_assert!(ok);
        }

        #[test]
        fn addition_is_sound(i in small_interval(), j in small_interval()) {
            let sum = add(unbounded(), i, j);
            for x in concretize(i) {
                for y in concretize(j) {
                    prop_assert!(leq(Interval::singleton(x + y), sum));
                }
            }
        }

        #[test]
        fn subtraction_is_sound(i in small_interval(), j in small_interval()) {
            let diff = sub(unbounded(), i, j);
            for x in concretize(i) {
                for y in concretize(j) {
                    prop_assert!(leq(Interval::singleton(x - y), diff));
                }
            }
        }

        #[test]
        fn multiplication_is_sound(i in small_interval(), j in small_interval()) {
            let prod = mul(unbounded(), i, j);
            for x in concretize(i) {
                for y in concretize(j) {
                    prop_assert!(leq(Interval::singleton(x * y), prod));
                }
            }
        }

        #[test]
        fn division_is_sound(i in small_interval(), j in small_interval()) {
            let quot = div(unbounded(), i, j);
            for x in concretize(i) {
                for y in concretize(j) {
                    if y != 0 {
                        prop_assert!(leq(Interval::singleton(x / y), quot));
                    }
                }
            }
        }

        #[test]
        fn widening_stabilizes_monotone_increasing_sequence(bump in 1i64..=4) {
            // x_0 = Bottom, x_{n+1} = x_n ▽ F(x_n), for a monotone F that grows
            // the upper bound. Must stabilize in finitely many steps (§8).
            let thresholds = Thresholds::new([10]);
            let params = unbounded();
            let f = |x: Interval| match x {
                Interval::Bottom => Interval::singleton(0),
                Interval::Std(a, b) => mk(params, a, b.add(Bound::Finite(bump))),
            };
            let mut x = Interval::Bottom;
            let mut stabilized = false;
            for _ in 0..64 {
                let next = widen(params, &thresholds, x, f(x));
                if next == x {
                    stabilized = true;
                    break;
                }
                x = next;
            }
            prop_assert!(stabilized);
        }
    }
}
