//! Ordered queue of players awaiting auction, plus the final-unsold pool.
//!
//! The queue keeps settled entries in place and moves a cursor past them;
//! when the cursor runs off the end the queue resets to its empty state.
//! A player is a member of at most one of {queue, unsold pool} here; the
//! engine keeps sold players out at admission time.

use crease_types::{Player, PlayerId};

/// The auction queue. Ephemeral session state, never persisted.
#[derive(Debug, Default)]
pub struct AuctionQueue {
    players: Vec<Player>,
    cursor: usize,
    final_unsold: Vec<Player>,
}

impl AuctionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player currently up for auction, if any.
    pub fn current(&self) -> Option<&Player> {
        self.players.get(self.cursor)
    }

    /// Append a player. No-op (returning `false`) when the player is
    /// already queued or sits in the unsold pool.
    pub fn enqueue(&mut self, player: Player) -> bool {
        if self.contains(&player.id) || self.in_unsold_pool(&player.id) {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Remove the settled player from rotation and advance to the next.
    /// When the queue is exhausted it resets to the empty state.
    pub fn advance_past_current(&mut self) {
        if self.cursor + 1 >= self.players.len() {
            self.players.clear();
            self.cursor = 0;
        } else {
            self.cursor += 1;
        }
    }

    /// Move the current player into the final-unsold pool. The queue
    /// cursor is advanced separately via [`Self::advance_past_current`].
    pub fn move_current_to_unsold(&mut self) {
        if let Some(player) = self.current().cloned() {
            if !self.in_unsold_pool(&player.id) {
                self.final_unsold.push(player);
            }
        }
    }

    /// Move the given players from the unsold pool back onto the queue
    /// tail (re-auction). Returns how many players moved.
    pub fn requeue_from_unsold(&mut self, ids: &[PlayerId]) -> usize {
        let mut moved = 0;
        let mut kept = Vec::with_capacity(self.final_unsold.len());
        for player in self.final_unsold.drain(..) {
            if ids.contains(&player.id) {
                self.players.push(player);
                moved += 1;
            } else {
                kept.push(player);
            }
        }
        self.final_unsold = kept;
        moved
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players still awaiting auction, including the current one.
    pub fn remaining(&self) -> usize {
        self.players.len().saturating_sub(self.cursor)
    }

    pub fn unsold_pool(&self) -> &[Player] {
        &self.final_unsold
    }

    fn contains(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    fn in_unsold_pool(&self, id: &PlayerId) -> bool {
        self.final_unsold.iter().any(|p| &p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_types::{PlayerStats, Position};

    fn player(id: &str) -> Player {
        Player {
            id: id.into(),
            name: format!("Player {id}"),
            nationality: "India".into(),
            position: Position::Bowler,
            base_price: 100_000,
            stats: PlayerStats::default(),
        }
    }

    #[test]
    fn test_enqueue_skips_duplicates() {
        let mut queue = AuctionQueue::new();
        assert!(queue.enqueue(player("p1")));
        assert!(!queue.enqueue(player("p1")));
        assert_eq!(queue.remaining(), 1);
    }

    #[test]
    fn test_advance_walks_queue_then_resets() {
        let mut queue = AuctionQueue::new();
        queue.enqueue(player("p1"));
        queue.enqueue(player("p2"));

        assert_eq!(queue.current().unwrap().id, "p1");
        queue.advance_past_current();
        assert_eq!(queue.current().unwrap().id, "p2");
        queue.advance_past_current();

        assert!(queue.is_empty());
        assert!(queue.current().is_none());
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_unsold_round_trip() {
        let mut queue = AuctionQueue::new();
        queue.enqueue(player("p1"));
        queue.enqueue(player("p2"));

        queue.move_current_to_unsold();
        queue.advance_past_current();
        queue.move_current_to_unsold();
        queue.advance_past_current();

        assert!(queue.is_empty());
        let pool: Vec<_> = queue.unsold_pool().iter().map(|p| p.id.clone()).collect();
        assert_eq!(pool, vec!["p1", "p2"]);
    }

    #[test]
    fn test_requeue_from_unsold_moves_exactly_once() {
        let mut queue = AuctionQueue::new();
        queue.enqueue(player("p1"));
        queue.move_current_to_unsold();
        queue.advance_past_current();
        assert!(queue.is_empty());

        assert_eq!(queue.requeue_from_unsold(&["p1".to_string()]), 1);
        assert_eq!(queue.current().unwrap().id, "p1");
        assert!(queue.unsold_pool().is_empty());

        // Second requeue finds nothing to move.
        assert_eq!(queue.requeue_from_unsold(&["p1".to_string()]), 0);
        assert_eq!(queue.remaining(), 1);
    }

    #[test]
    fn test_enqueue_rejects_player_in_unsold_pool() {
        let mut queue = AuctionQueue::new();
        queue.enqueue(player("p1"));
        queue.move_current_to_unsold();
        queue.advance_past_current();

        assert!(!queue.enqueue(player("p1")));
        assert_eq!(queue.unsold_pool().len(), 1);
    }
}
