//! Auction engine error types.
//!
//! These cover precondition violations and infrastructure failures only.
//! Ordinary bid/pass rejections are returned as [`crate::BidOutcome`]
//! values, never as errors.

use thiserror::Error;

use crate::engine::EnginePhase;
use crease_store::StoreError;
use crease_types::TeamId;

/// Errors that can occur in the auction engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Auction queue is empty")]
    EmptyQueue,

    #[error("No teams registered")]
    NoTeams,

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Invalid phase. Expected: {expected:?}, Got: {got:?}")]
    InvalidPhase {
        expected: EnginePhase,
        got: EnginePhase,
    },

    #[error("Round already settled")]
    AlreadySettled,

    #[error("Settlement has not completed")]
    SettlementPending,

    #[error("Timer duration must be at least one second")]
    InvalidTimerDuration,

    #[error(transparent)]
    Store(#[from] StoreError),
}
