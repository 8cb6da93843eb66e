//! Domain error taxonomy.
//!
//! Every operation either succeeds or rejects its input without touching
//! state. `Validation` covers malformed or out-of-range fields; `NotFound`
//! covers references to rows that do not exist.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Malformed or out-of-range input (empty name, amount <= 0,
    /// percent outside the open interval (0, 100), unknown ledger kind).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced collaborator/service/product/ledger row does not exist.
    #[error("{what} #{id} not found")]
    NotFound { what: &'static str, id: i64 },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(what: &'static str, id: i64) -> Self {
        Error::NotFound { what, id }
    }
}
