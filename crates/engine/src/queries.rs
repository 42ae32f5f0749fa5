//! Read-only views of the live auction round.

use serde::{Deserialize, Serialize};

use crease_types::{Bid, Player, PlayerId, TeamId};

use crate::engine::EnginePhase;

/// Snapshot of the current round for UI collaborators.
///
/// Produced by [`crate::AuctionEngine::snapshot`]; everything a live
/// auction view needs in one read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: EnginePhase,
    /// True while bids are being accepted.
    pub round_active: bool,
    /// The player under the hammer, or the next player queued when idle.
    pub current_player: Option<Player>,
    /// Current winning bid for the active round.
    pub current_bid: Option<Bid>,
    /// The team currently permitted to bid or pass.
    pub turn_team: Option<TeamId>,
    pub timer_remaining_secs: u32,
    pub timer_enabled: bool,
    /// Set once the round has settled as sold.
    pub winning_team: Option<TeamId>,
    /// Players still awaiting auction, including the current one.
    pub queue_remaining: usize,
    /// Final-unsold pool, in the order players landed there.
    pub unsold_pool: Vec<PlayerId>,
}
