//! In-memory roster store.
//!
//! Tables live behind a single `parking_lot::RwLock`; every mutation
//! publishes a [`StoreEvent`] on a broadcast channel so observers can
//! re-read the affected collection.

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crease_types::{Bid, BidId, Owner, OwnerId, Player, PlayerId, Team, TeamId};

use crate::{RosterStore, StoreError, StoreEvent, StoreResult};

/// Capacity of the change-notification channel. Lagging subscribers drop
/// old notifications and re-read on the next one.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct Tables {
    /// Teams in creation order; turn order derives from this.
    teams: Vec<Team>,
    players: Vec<Player>,
    bids: Vec<Bid>,
    owners: Vec<Owner>,
    next_bid_id: u64,
}

/// In-memory [`RosterStore`] implementation.
pub struct MemoryRosterStore {
    tables: RwLock<Tables>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryRosterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tables: RwLock::new(Tables {
                next_bid_id: 1,
                ..Default::default()
            }),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        // No receivers is fine; notifications are best-effort.
        let _ = self.events.send(event);
    }
}

impl RosterStore for MemoryRosterStore {
    fn team(&self, id: &TeamId) -> StoreResult<Option<Team>> {
        let tables = self.tables.read();
        Ok(tables.teams.iter().find(|t| &t.id == id).cloned())
    }

    fn teams(&self) -> StoreResult<Vec<Team>> {
        Ok(self.tables.read().teams.clone())
    }

    fn put_team(&self, team: Team) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            match tables.teams.iter_mut().find(|t| t.id == team.id) {
                Some(existing) => *existing = team,
                None => tables.teams.push(team),
            }
        }
        self.publish(StoreEvent::TeamsChanged);
        Ok(())
    }

    fn delete_team(&self, id: &TeamId) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            let before = tables.teams.len();
            tables.teams.retain(|t| &t.id != id);
            if tables.teams.len() == before {
                return Err(StoreError::TeamNotFound(id.clone()));
            }
        }
        self.publish(StoreEvent::TeamsChanged);
        Ok(())
    }

    fn transact_team(
        &self,
        id: &TeamId,
        f: &mut dyn FnMut(&mut Team) -> StoreResult<()>,
    ) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            let team = tables
                .teams
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| StoreError::TeamNotFound(id.clone()))?;

            // Apply against a copy so a failed closure leaves the record
            // untouched.
            let mut staged = team.clone();
            f(&mut staged)?;
            *team = staged;
        }
        debug!(team = %id, "team transaction committed");
        self.publish(StoreEvent::TeamsChanged);
        Ok(())
    }

    fn player(&self, id: &PlayerId) -> StoreResult<Option<Player>> {
        let tables = self.tables.read();
        Ok(tables.players.iter().find(|p| &p.id == id).cloned())
    }

    fn players(&self) -> StoreResult<Vec<Player>> {
        Ok(self.tables.read().players.clone())
    }

    fn put_player(&self, player: Player) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            match tables.players.iter_mut().find(|p| p.id == player.id) {
                Some(existing) => *existing = player,
                None => tables.players.push(player),
            }
        }
        self.publish(StoreEvent::PlayersChanged);
        Ok(())
    }

    fn delete_player(&self, id: &PlayerId) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            let before = tables.players.len();
            tables.players.retain(|p| &p.id != id);
            if tables.players.len() == before {
                return Err(StoreError::PlayerNotFound(id.clone()));
            }
        }
        self.publish(StoreEvent::PlayersChanged);
        Ok(())
    }

    fn append_bid(&self, mut bid: Bid) -> StoreResult<BidId> {
        let id = {
            let mut tables = self.tables.write();
            let id = format!("bid-{}", tables.next_bid_id);
            tables.next_bid_id += 1;
            bid.id = id.clone();
            tables.bids.push(bid);
            id
        };
        self.publish(StoreEvent::BidsChanged);
        Ok(id)
    }

    fn bids_for_player(&self, id: &PlayerId) -> StoreResult<Vec<Bid>> {
        let tables = self.tables.read();
        Ok(tables
            .bids
            .iter()
            .filter(|b| &b.player_id == id)
            .cloned()
            .collect())
    }

    fn owners(&self) -> StoreResult<Vec<Owner>> {
        Ok(self.tables.read().owners.clone())
    }

    fn put_owner(&self, owner: Owner) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            match tables.owners.iter_mut().find(|o| o.id == owner.id) {
                Some(existing) => *existing = owner,
                None => tables.owners.push(owner),
            }
        }
        self.publish(StoreEvent::OwnersChanged);
        Ok(())
    }

    fn delete_owner(&self, id: &OwnerId) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            tables.owners.retain(|o| &o.id != id);
        }
        self.publish(StoreEvent::OwnersChanged);
        Ok(())
    }
}
