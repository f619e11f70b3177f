//! Error types shared by the registries, the loaders and the views.

use std::fmt;

use thiserror::Error;

use crate::tree_sequence::QueryError;

/// The kind of entity an id refers to, used in `NotFound` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    SampleSet,
    Individual,
    Sample,
    Tree,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::SampleSet => "sample set",
            Entity::Individual => "individual",
            Entity::Sample => "sample",
            Entity::Tree => "tree",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A user supplied parameter is out of range or malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An id does not exist in the registry it was looked up in.
    #[error("{kind} {id} not found")]
    NotFound { kind: Entity, id: u64 },

    /// The registry enforces unique sample set names and this one is taken.
    #[error("sample set name {0:?} is already in use")]
    DuplicateName(String),

    /// A sample set can't be deleted while individuals still reference it.
    #[error("sample set {id} is still referenced by {count} individual(s)")]
    InUse { id: u32, count: usize },

    /// A view needs more non-empty sample sets than are currently selected.
    #[error(
        "select at least {required} sample set(s) to see this plot ({selected} selected); \
         sample sets are selected on the individuals page"
    )]
    InsufficientSelection { required: usize, selected: usize },

    /// The genomics backend rejected a query.
    #[error("upstream query failed: {0}")]
    UpstreamQueryFailure(#[from] QueryError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(kind: Entity, id: impl Into<u64>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
