//! Errors specific to assembling a grid out of regex groups (§7
//! `GridStructureError`). Per-regex parse/structure errors come straight out
//! of `regexp` and are just propagated through `?`.

pub use failure::{err_msg, format_err};

pub type Error = failure::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The number of regexes handed to a grid constructor didn't match what its
/// declared line counts require, or a hexagonal line count isn't of the
/// required form `3 * (2s - 1)` (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridStructureError {
    WrongRegexCount {
        expected: usize,
        found: usize,
        detail: String,
    },
    NotDivisible {
        total_lines: usize,
        num_regexes_per_line: usize,
    },
    InvalidHexagonalLineCount {
        total_lines: usize,
    },
}

impl std::fmt::Display for GridStructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::WrongRegexCount {
                expected,
                found,
                detail,
            } => write!(
                f,
                "expected {} regexes ({}) but found {}",
                expected, detail, found
            ),
            Self::NotDivisible {
                total_lines,
                num_regexes_per_line,
            } => write!(
                f,
                "{} regexes is not divisible by num_regexes_per_line = {}",
                total_lines, num_regexes_per_line
            ),
            Self::InvalidHexagonalLineCount { total_lines } => write!(
                f,
                "hexagonal grid needs 3*(2s-1) lines for some s >= 1, got {} lines",
                total_lines
            ),
        }
    }
}
