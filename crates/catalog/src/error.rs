//! Error types shared by every crate of the film catalog.
//!
//! The domain distinguishes two failure kinds that callers react to:
//! a reference to an unregistered entity (`NotFound`) and malformed
//! domain input (`InvalidInput`). Loading a catalog from disk adds a few
//! I/O and parse variants on top of those.

use std::fmt;
use thiserror::Error;

/// Kind of entity an id refers to. Used to build `NotFound` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Film,
    Genre,
    Director,
    Mpa,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Film => "Film",
            Entity::Genre => "Genre",
            Entity::Director => "Director",
            Entity::Mpa => "Mpa rating",
        };
        f.write_str(name)
    }
}

/// Errors produced by catalog, relation and query operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The operation referenced an id that is absent from the store
    #[error("{entity} with id {id} is not registered")]
    NotFound { entity: Entity, id: u32 },

    /// Malformed domain input (bad login, unknown selector, unknown genre in a film write)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Seed file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a seed file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line in a seed file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },
}

/// Coarse classification a boundary layer maps onto response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Load,
}

impl CatalogError {
    pub fn not_found(entity: Entity, id: u32) -> Self {
        CatalogError::NotFound { entity, id }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        CatalogError::InvalidInput(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::InvalidInput(_) => ErrorKind::InvalidInput,
            CatalogError::FileNotFound { .. } | CatalogError::Io(_) | CatalogError::Parse { .. } => {
                ErrorKind::Load
            }
        }
    }
}

/// Convenience type alias for Results across the workspace
pub type Result<T> = std::result::Result<T, CatalogError>;
