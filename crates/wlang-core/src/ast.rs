//! Abstract syntax tree for the While language.
//!
//! Parenthesization (`a ::= (a)`) is absorbed during parsing -- there is no
//! `Paren` node, since it carries no semantic meaning once precedence has
//! been resolved.

/// Arithmetic expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AExpr {
    Num(i64),
    Var(String),
    Add(Box<AExpr>, Box<AExpr>),
    Sub(Box<AExpr>, Box<AExpr>),
    Mul(Box<AExpr>, Box<AExpr>),
    Div(Box<AExpr>, Box<AExpr>),
}

/// Boolean expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BExpr {
    True,
    False,
    Eq(AExpr, AExpr),
    Leq(AExpr, AExpr),
    Not(Box<BExpr>),
    And(Box<BExpr>, Box<BExpr>),
}

/// Statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign(String, AExpr),
    Skip,
    Seq(Box<Stmt>, Box<Stmt>),
    If(BExpr, Box<Stmt>, Box<Stmt>),
    While(BExpr, Box<Stmt>),
}

impl AExpr {
    /// Every variable name mentioned anywhere in this expression, in the
    /// order first encountered (duplicates included -- callers dedupe).
    pub fn variables(&self, out: &mut Vec<String>) {
        match self {
            AExpr::Num(_) => {}
            AExpr::Var(name) => out.push(name.clone()),
            AExpr::Add(l, r) | AExpr::Sub(l, r) | AExpr::Mul(l, r) | AExpr::Div(l, r) => {
                l.variables(out);
                r.variables(out);
            }
        }
    }

    /// Every numeric literal mentioned anywhere in this expression.
    pub fn literals(&self, out: &mut Vec<i64>) {
        match self {
            AExpr::Num(n) => out.push(*n),
            AExpr::Var(_) => {}
            AExpr::Add(l, r) | AExpr::Sub(l, r) | AExpr::Mul(l, r) | AExpr::Div(l, r) => {
                l.literals(out);
                r.literals(out);
            }
        }
    }
}

impl BExpr {
    pub fn variables(&self, out: &mut Vec<String>) {
        match self {
            BExpr::True | BExpr::False => {}
            BExpr::Eq(l, r) | BExpr::Leq(l, r) => {
                l.variables(out);
                r.variables(out);
            }
            BExpr::Not(b) => b.variables(out),
            BExpr::And(l, r) => {
                l.variables(out);
                r.variables(out);
            }
        }
    }

    pub fn literals(&self, out: &mut Vec<i64>) {
        match self {
            BExpr::True | BExpr::False => {}
            BExpr::Eq(l, r) | BExpr::Leq(l, r) => {
                l.literals(out);
                r.literals(out);
            }
            BExpr::Not(b) => b.literals(out),
            BExpr::And(l, r) => {
                l.literals(out);
                r.literals(out);
            }
        }
    }
}

impl Stmt {
    pub fn variables(&self, out: &mut Vec<String>) {
        match self {
            Stmt::Assign(name, e) => {
                out.push(name.clone());
                e.variables(out);
            }
            Stmt::Skip => {}
            Stmt::Seq(a, b) => {
                a.variables(out);
                b.variables(out);
            }
            Stmt::If(cond, t, e) => {
                cond.variables(out);
                t.variables(out);
                e.variables(out);
            }
            Stmt::While(cond, body) => {
                cond.variables(out);
                body.variables(out);
            }
        }
    }

    pub fn literals(&self, out: &mut Vec<i64>) {
        match self {
            Stmt::Assign(_, e) => e.literals(out),
            Stmt::Skip => {}
            Stmt::Seq(a, b) => {
                a.literals(out);
                b.literals(out);
            }
            Stmt::If(cond, t, e) => {
                cond.literals(out);
                t.literals(out);
                e.literals(out);
            }
            Stmt::While(cond, body) => {
                cond.literals(out);
                body.literals(out);
            }
        }
    }
}
