//! Shared `-INF`/`+INF`/integer parsing for `--m`/`--n` flags and `--init`
//! file entries (§6).

use wlang_core::Bound;

use crate::error::CliError;

pub fn parse_bound(s: &str) -> Result<Bound, CliError> {
    match s.trim() {
        "-INF" => Ok(Bound::NegInf),
        "+INF" => Ok(Bound::PosInf),
        other => other
            .parse::<i64>()
            .map(Bound::Finite)
            .map_err(|_| CliError::InvalidBound(s.to_string())),
    }
}
