use thiserror::Error;

/// Malformed template source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Failure while executing a parsed namespace
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("incomplete or empty template")]
    Incomplete,

    #[error("no such template {0:?}")]
    UnknownTemplate(String),

    #[error("line {line}: error calling {name}: {message}")]
    Func {
        name: String,
        line: usize,
        message: String,
    },

    #[error("line {line}: range can't iterate over {value}")]
    NotIterable { line: usize, value: String },

    #[error("exceeded maximum template depth ({0})")]
    TooDeep(usize),

    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by template functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FuncError(pub String);

impl FuncError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for FuncError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for FuncError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
