use thiserror::Error;
use vista_parser::{ExecError, ParseError};
use vista_router::LinkError;

use crate::store::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from compiling or rendering a view
///
/// Every variant names the file or template it concerns.
#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("execute {name}: {source}")]
    Exec {
        name: String,
        #[source]
        source: ExecError,
    },

    #[error("render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{0} is a layout file and cannot be rendered")]
    NotRenderable(String),

    #[error("template {0:?} is not registered")]
    NotRegistered(String),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("serialize view data: {0}")]
    Data(#[from] serde_json::Error),
}

impl Error {
    /// True when a file or registration is missing; the same call may
    /// succeed once it exists
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Read {
                source: StoreError::NotFound(_),
                ..
            }
            | Error::NotRegistered(_) => true,
            Error::Render { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
