//! Error taxonomy for the regex engine.
//!
//! Mirrors `common::errors` in spirit: a single `Error`/`Result` alias built
//! on top of `failure`, with plain enums for each error family. `failure`'s
//! blanket `impl Fail for T where T: Display + Debug + Send + Sync + 'static`
//! means none of these need to derive anything beyond `Debug`.

pub use failure::{err_msg, format_err};

pub type Error = failure::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The alphabet is empty, or the grid's regexes need more distinct explicit
/// characters than the alphabet's fixed capacity allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    Empty,
    CapacityExceeded { capacity: usize, needed: usize },
}

impl std::fmt::Display for AlphabetError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "alphabet is empty"),
            Self::CapacityExceeded { capacity, needed } => write!(
                f,
                "alphabet needs {} characters but capacity is {}",
                needed, capacity
            ),
        }
    }
}

/// A token-level failure while lexing or parsing a regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexParseError {
    pub message: String,
    pub source: String,
    pub byte_offset: usize,
}

impl std::fmt::Display for RegexParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "failed to parse regex '{}' at byte {}: {}",
            self.source, self.byte_offset, self.message
        )
    }
}

/// A semantic violation discovered only after a regex has fully parsed (a
/// self-referencing group, or a backreference reaching into a lookahead from
/// outside it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexStructureError {
    pub message: String,
}

impl std::fmt::Display for RegexStructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "invalid regex structure: {}", self.message)
    }
}

impl RegexStructureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
