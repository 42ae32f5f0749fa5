//! Auction turn-engine for the crease player auction.
//!
//! This crate implements the state machine at the heart of the system:
//!
//! - Queue of players awaiting auction, plus the final-unsold pool
//! - Turn rotation among teams with pass tracking
//! - Bid validation against the floor price and team budgets
//! - Per-turn countdown with forced pass on expiry
//! - Exactly-once settlement (sold to a team, or unsold)
//!
//! # Architecture
//!
//! - `queue`: ordered player queue and unsold pool
//! - `scheduler`: whose turn it is, and when bidding must close
//! - `ledger`: bid validation and the structured accept/reject result
//! - `timer`: tick-driven countdown emitting explicit expiry events
//! - `engine`: the orchestrating phase machine and settlement authority
//! - `queries`: read-only snapshot of the live round
//! - `config`: engine configuration
//! - `error`: error types
//!
//! # Example
//!
//! ```ignore
//! use crease_engine::{AuctionEngine, EngineConfig, TurnChoice};
//!
//! let mut engine = AuctionEngine::new(store, EngineConfig::default());
//! engine.enqueue_players(&player_ids)?;
//! engine.start_round()?;
//! engine.assign_turn(TurnChoice::Random)?;
//! let outcome = engine.place_bid(&team_id, 50_000)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod queries;
pub mod queue;
pub mod scheduler;
pub mod timer;

pub use config::{ConfigValidationError, EngineConfig};
pub use engine::{AuctionEngine, EnginePhase, TurnChoice};
pub use error::AuctionError;
pub use ledger::{evaluate_bid, BidOutcome, BidRejection, EvaluatedBid};
pub use queries::RoundSnapshot;
pub use queue::AuctionQueue;
pub use scheduler::{TurnOutcome, TurnScheduler};
pub use timer::{CountdownTimer, TimerEvent};
