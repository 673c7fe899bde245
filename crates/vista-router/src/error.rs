use thiserror::Error;

/// Errors produced while building links from named routes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("alias {0} not found")]
    AliasNotFound(String),

    #[error("not enough arguments to build path {pattern}: got {given}")]
    InsufficientArguments { pattern: String, given: usize },

    #[error("links are not installed")]
    LinksNotInstalled,

    #[error("pattern {pattern} has segments after wildcard *{wildcard}")]
    UnreachableSegments { pattern: String, wildcard: String },
}
