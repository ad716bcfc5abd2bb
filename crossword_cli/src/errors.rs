//! `InputFileError` and `CommandLineError` (§7), the two error values that
//! originate outside `regexp`/`crossword` entirely.

pub type Error = failure::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFileError {
    Io { detail: String },
    MissingKey { key: String, line: usize },
    UnparseableInteger { key: String, value: String, line: usize },
    MissingQuotes { line: usize, text: String },
    UnknownShape { shape: String, line: usize },
}

impl std::fmt::Display for InputFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "failed to read grid file: {}", detail),
            Self::MissingKey { key, line } => {
                write!(f, "line {}: missing required key `{}`", line, key)
            }
            Self::UnparseableInteger { key, value, line } => write!(
                f,
                "line {}: `{} = {}` is not a positive integer",
                line, key, value
            ),
            Self::MissingQuotes { line, text } => write!(
                f,
                "line {}: regex line must be quoted with single quotes, got `{}`",
                line, text
            ),
            Self::UnknownShape { shape, line } => {
                write!(f, "line {}: unknown shape `{}`", line, shape)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLineError {
    InvalidStopAfter { value: String },
}

impl std::fmt::Display for CommandLineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidStopAfter { value } => {
                write!(f, "--stop-after must be a positive integer, got `{}`", value)
            }
        }
    }
}
