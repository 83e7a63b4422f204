//! Parser for the `--init` initial-state file (§6): one `«var»: TOP` |
//! `«var»: BOTTOM` | `«var»: [LO,HI]` entry per line. Unknown variables are
//! ignored; malformed lines are skipped and logged rather than aborting the
//! run -- the format is advisory, not authoritative.

use wlang_core::{interval, AbstractState, Interval, Params, VarTable};

/// Applies every well-formed, known-variable line in `content` to `state`,
/// overwriting that variable's slot. Returns `state` for chaining.
pub fn apply(content: &str, vars: &VarTable, params: Params, mut state: AbstractState) -> AbstractState {
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line, params) {
            Some((name, value)) => match vars.iter().find(|(_, n)| *n == name) {
                Some((id, _)) => state[id] = value,
                None => tracing::warn!(line = lineno + 1, %name, "unknown variable in --init file, ignored"),
            },
            None => tracing::warn!(line = lineno + 1, text = line, "malformed --init line, skipped"),
        }
    }
    state
}

fn parse_line(line: &str, params: Params) -> Option<(String, Interval)> {
    let (name, rhs) = line.split_once(':')?;
    let name = name.trim().to_string();
    let rhs = rhs.trim();
    let value = match rhs {
        "TOP" => Interval::TOP,
        "BOTTOM" => Interval::Bottom,
        bracketed => parse_bracketed(bracketed, params)?,
    };
    Some((name, value))
}

fn parse_bracketed(s: &str, params: Params) -> Option<Interval> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    let (lo, hi) = inner.split_once(',')?;
    let lo = crate::bound::parse_bound(lo.trim()).ok()?;
    let hi = crate::bound::parse_bound(hi.trim()).ok()?;
    Some(interval::mk(params, lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlang_core::{parse, Bound, VarTable};

    fn unbounded() -> Params {
        Params::new(Bound::NegInf, Bound::PosInf)
    }

    fn vars_for(src: &str) -> VarTable {
        VarTable::from_program(&parse(src).unwrap())
    }

    #[test]
    fn applies_top_bottom_and_bracketed_entries() {
        let vars = vars_for("x := 0; y := 0; z := 0");
        let state = AbstractState::bottom(vars.len());
        let content = "x: TOP\ny: BOTTOM\nz: [0,10]\n";
        let state = apply(content, &vars, unbounded(), state);
        assert_eq!(state[vars.id_of("x")], Interval::TOP);
        assert_eq!(state[vars.id_of("y")], Interval::Bottom);
        assert_eq!(
            state[vars.id_of("z")],
            Interval::Std(Bound::Finite(0), Bound::Finite(10))
        );
    }

    #[test]
    fn ignores_unknown_variables_and_skips_malformed_lines() {
        let vars = vars_for("x := 0");
        let state = AbstractState::top(vars.len());
        let content = "nope: TOP\nthis is not a line\nx: [1,1]\n";
        let state = apply(content, &vars, unbounded(), state);
        assert_eq!(state[vars.id_of("x")], Interval::singleton(1));
    }
}
