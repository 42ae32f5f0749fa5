//! Roster store error types.

use crease_types::{PlayerId, TeamId};
use thiserror::Error;

/// Errors that can occur in the roster store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Infrastructure failure in the backing store. Callers must treat the
    /// attempted mutation as not applied.
    #[error("Store backend failure: {0}")]
    Backend(String),
}
