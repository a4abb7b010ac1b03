//! Domain error types for game and user operations.

use derive_more::{Display, Error};

use crate::db::DbError;

/// Errors surfaced by game and user operations.
///
/// Every variant except [`GameError::Db`] is client-caused and is returned
/// to the caller directly; nothing is recovered silently and the service
/// never retries on the caller's behalf.
#[derive(Debug, Clone, Display, Error)]
pub enum GameError {
    /// A referenced user or session does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The operation is illegal for the session's current status.
    #[display("invalid state: {_0}")]
    InvalidState(#[error(not(source))] String),
    /// A game rule was violated (wrong turn, not a participant, self-play,
    /// occupied cell).
    #[display("invalid operation: {_0}")]
    InvalidOperation(#[error(not(source))] String),
    /// Malformed input such as out-of-range coordinates or an unknown
    /// ranking key.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] String),
    /// Underlying persistence failure.
    #[display("{_0}")]
    Db(DbError),
}

impl GameError {
    /// Creates a [`GameError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a [`GameError::InvalidState`].
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a [`GameError::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Creates a [`GameError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}
