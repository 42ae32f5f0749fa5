//! Roster store for the crease player auction.
//!
//! The store holds the durable records the auction engine works against:
//! teams (with budgets and rosters), the player catalog, the append-only bid
//! log, and owners. Consumers that render live state subscribe to
//! change notifications; the engine uses point reads, point writes, and a
//! transactional team update for settlement.
//!
//! [`MemoryRosterStore`] is the in-process implementation. The [`RosterStore`]
//! trait is the seam a persistent backend would implement.

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryRosterStore;

use crease_types::{Bid, BidId, Owner, OwnerId, Player, PlayerId, Team, TeamId};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification published after a mutation.
///
/// Granularity is per collection, mirroring subscribe-on-change snapshot
/// semantics: subscribers re-read the collection they care about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    TeamsChanged,
    PlayersChanged,
    BidsChanged,
    OwnersChanged,
}

/// Access to team, player, bid and owner records.
///
/// All methods are synchronous and non-blocking; implementations back them
/// with in-memory tables or an equivalently fast local cache. Infrastructure
/// failures surface as [`StoreError::Backend`].
pub trait RosterStore: Send + Sync {
    // === Teams ===

    fn team(&self, id: &TeamId) -> StoreResult<Option<Team>>;

    /// All teams in stable creation order. Turn order derives from this.
    fn teams(&self) -> StoreResult<Vec<Team>>;

    fn put_team(&self, team: Team) -> StoreResult<()>;

    fn delete_team(&self, id: &TeamId) -> StoreResult<()>;

    /// Atomic read-modify-write on a single team, keyed by id.
    ///
    /// Settlement uses this so the budget deduction and roster append cannot
    /// race a concurrent update to the same team.
    fn transact_team(
        &self,
        id: &TeamId,
        f: &mut dyn FnMut(&mut Team) -> StoreResult<()>,
    ) -> StoreResult<()>;

    // === Players ===

    fn player(&self, id: &PlayerId) -> StoreResult<Option<Player>>;

    fn players(&self) -> StoreResult<Vec<Player>>;

    fn put_player(&self, player: Player) -> StoreResult<()>;

    fn delete_player(&self, id: &PlayerId) -> StoreResult<()>;

    // === Bids ===

    /// Append a bid to the ledger. The store assigns the id.
    fn append_bid(&self, bid: Bid) -> StoreResult<BidId>;

    /// Bids recorded for one player, in append order.
    fn bids_for_player(&self, id: &PlayerId) -> StoreResult<Vec<Bid>>;

    // === Owners ===

    fn owners(&self) -> StoreResult<Vec<Owner>>;

    fn put_owner(&self, owner: Owner) -> StoreResult<()>;

    fn delete_owner(&self, id: &OwnerId) -> StoreResult<()>;
}
