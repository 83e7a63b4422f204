pub mod ast;
pub mod domain;
pub mod error;
pub mod id;
pub mod interval;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod span;
pub mod vars;

pub use ast::{AExpr, BExpr, Stmt};
pub use domain::{AbstractState, Domain, IntervalDomain};
pub use error::{LexError, ParseError};
pub use id::VarId;
pub use interval::{Bound, Interval, Params, Thresholds};
pub use parser::parse;
pub use span::Span;
pub use vars::VarTable;
