//! CLI-level errors (§7): bad flags, unreadable files, syntax errors in the
//! analyzed source. Each variant is matchable; `main` is the only place that
//! turns one into a process exit code.

use std::path::PathBuf;

use thiserror::Error;
use wlang_core::ParseError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("invalid bound '{0}': expected an integer, \"-INF\", or \"+INF\"")]
    InvalidBound(String),

    #[error("the argument '--{0}' cannot be used multiple times")]
    RepeatedFlag(String),
}
