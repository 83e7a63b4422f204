//! `Display` impls for the AST, rendered back into the concrete syntax of
//! §6 so printed output round-trips through the parser. Used both for the
//! Graphviz edge labels and for error messages.

use std::fmt;

use crate::ast::{AExpr, BExpr};

impl fmt::Display for AExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AExpr::Num(n) => write!(f, "{n}"),
            AExpr::Var(name) => write!(f, "{name}"),
            AExpr::Add(l, r) => write!(f, "({l} + {r})"),
            AExpr::Sub(l, r) => write!(f, "({l} - {r})"),
            AExpr::Mul(l, r) => write!(f, "({l} * {r})"),
            AExpr::Div(l, r) => write!(f, "({l} / {r})"),
        }
    }
}

impl fmt::Display for BExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BExpr::True => write!(f, "true"),
            BExpr::False => write!(f, "false"),
            BExpr::Eq(l, r) => write!(f, "{l} = {r}"),
            BExpr::Leq(l, r) => write!(f, "{l} <= {r}"),
            BExpr::Not(b) => write!(f, "!{b}"),
            BExpr::And(l, r) => write!(f, "({l} & {r})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_arithmetic() {
        let e = AExpr::Add(Box::new(AExpr::Var("x".into())), Box::new(AExpr::Num(2)));
        assert_eq!(e.to_string(), "(x + 2)");
    }

    #[test]
    fn renders_boolean() {
        let e = BExpr::Leq(AExpr::Var("x".into()), AExpr::Num(9));
        assert_eq!(e.to_string(), "x <= 9");
    }

    #[test]
    fn renders_negation() {
        let e = BExpr::Not(Box::new(BExpr::True));
        assert_eq!(e.to_string(), "!true");
    }
}
