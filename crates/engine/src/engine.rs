//! The auction engine: orchestrating phase machine and settlement
//! authority.
//!
//! Exactly one round is active at a time. All state-mutating entry points
//! (`place_bid`, `pass`, `tick`, `close_bidding`, ...) take `&mut self`, so
//! a caller holding the engine behind a single-writer lock gets atomic
//! turn checks and turn-advance side effects for free.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crease_store::{RosterStore, StoreResult};
use crease_types::{now_millis, Bid, Coins, Player, PlayerId, TeamId};

use crate::config::EngineConfig;
use crate::error::AuctionError;
use crate::ledger::{self, BidOutcome, MSG_OUT_OF_TURN, MSG_TEAM_NOT_FOUND};
use crate::queries::RoundSnapshot;
use crate::queue::AuctionQueue;
use crate::scheduler::{TurnOutcome, TurnScheduler};
use crate::timer::{CountdownTimer, TimerEvent};

/// Top-level lifecycle of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    /// No round active; the queue may hold players.
    Idle,
    /// Countdown running, turn rotating, bids accepted.
    RoundActive,
    /// Terminal condition reached; outcome applied (or retrying), on
    /// display until the queue advances.
    Settling,
    /// The queue ran out of players.
    QueueExhausted,
}

/// How the admin picks the first bidder for a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnChoice {
    Team(TeamId),
    Random,
}

/// Working state for the player currently under the hammer.
#[derive(Debug)]
struct RoundState {
    player: Player,
    current_bid: Option<Bid>,
    winning_team: Option<TeamId>,
    settled: bool,
}

/// The auction engine.
pub struct AuctionEngine {
    store: Arc<dyn RosterStore>,
    config: EngineConfig,
    phase: EnginePhase,
    queue: AuctionQueue,
    scheduler: TurnScheduler,
    timer: CountdownTimer,
    round: Option<RoundState>,
}

impl AuctionEngine {
    pub fn new(store: Arc<dyn RosterStore>, config: EngineConfig) -> Self {
        let timer = CountdownTimer::new(config.timer_duration_secs, config.timer_enabled);
        Self {
            store,
            config,
            phase: EnginePhase::Idle,
            queue: AuctionQueue::new(),
            scheduler: TurnScheduler::new(),
            timer,
            round: None,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the current round has applied its settlement outcome.
    pub fn is_settled(&self) -> bool {
        self.round.as_ref().map(|r| r.settled).unwrap_or(false)
    }

    // === Admission ===

    /// Admit players to the auction queue. Unknown ids, ids already
    /// queued, and ids already on a team roster (sold) are skipped.
    /// Returns the number of players actually admitted.
    pub fn enqueue_players(&mut self, ids: &[PlayerId]) -> Result<usize, AuctionError> {
        let catalog = self.store.players()?;
        let sold: HashSet<PlayerId> = self
            .store
            .teams()?
            .iter()
            .flat_map(|t| t.players.iter().map(|p| p.id.clone()))
            .collect();

        let mut admitted = 0;
        for id in ids {
            if sold.contains(id) {
                continue;
            }
            let Some(player) = catalog.iter().find(|p| &p.id == id) else {
                continue;
            };
            if self.queue.enqueue(player.clone()) {
                admitted += 1;
            }
        }

        if self.phase == EnginePhase::QueueExhausted && !self.queue.is_empty() {
            self.phase = EnginePhase::Idle;
        }
        info!(admitted, "players admitted to auction queue");
        Ok(admitted)
    }

    /// Re-auction: move players from the final-unsold pool back onto the
    /// queue. Returns how many moved.
    pub fn requeue_from_unsold(&mut self, ids: &[PlayerId]) -> Result<usize, AuctionError> {
        let moved = self.queue.requeue_from_unsold(ids);
        if self.phase == EnginePhase::QueueExhausted && !self.queue.is_empty() {
            self.phase = EnginePhase::Idle;
        }
        info!(moved, "players requeued from unsold pool");
        Ok(moved)
    }

    // === Round lifecycle ===

    /// Open a round for the player at the head of the queue.
    ///
    /// Does not assign a turn holder; the admin announces the player
    /// first and then calls [`Self::assign_turn`].
    pub fn start_round(&mut self) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::Idle {
            return Err(AuctionError::InvalidPhase {
                expected: EnginePhase::Idle,
                got: self.phase,
            });
        }
        let player = self.queue.current().cloned().ok_or(AuctionError::EmptyQueue)?;

        let order: Vec<TeamId> = self.store.teams()?.into_iter().map(|t| t.id).collect();
        self.scheduler.reset(order);
        self.timer.arm();
        info!(player = %player.id, name = %player.name, "round opened");
        self.round = Some(RoundState {
            player,
            current_bid: None,
            winning_team: None,
            settled: false,
        });
        self.phase = EnginePhase::RoundActive;
        Ok(())
    }

    /// Assign the first bidder, explicitly or at random. Empties the
    /// passed-set and re-arms the countdown, so a mid-round re-assignment
    /// restarts the rotation with every team active.
    pub fn assign_turn(&mut self, choice: TurnChoice) -> Result<TeamId, AuctionError> {
        if self.phase != EnginePhase::RoundActive {
            return Err(AuctionError::InvalidPhase {
                expected: EnginePhase::RoundActive,
                got: self.phase,
            });
        }
        let assigned = match choice {
            TurnChoice::Team(team) => {
                if !self.scheduler.assign_turn(team.clone()) {
                    return Err(AuctionError::TeamNotFound(team));
                }
                team
            }
            TurnChoice::Random => self
                .scheduler
                .assign_random_turn(&mut rand::thread_rng())
                .ok_or(AuctionError::NoTeams)?,
        };
        self.timer.arm();
        info!(team = %assigned, "bidding turn assigned");
        Ok(assigned)
    }

    /// Attempt a bid on behalf of a team.
    ///
    /// Ordinary rejections come back as a [`BidOutcome`] with
    /// `success: false` and change no state. `Err` is reserved for
    /// infrastructure failures (ledger write, settlement write).
    pub fn place_bid(
        &mut self,
        team_id: &TeamId,
        increment: Coins,
    ) -> Result<BidOutcome, AuctionError> {
        if self.phase != EnginePhase::RoundActive
            || self.scheduler.turn() != Some(team_id)
            || self.round.is_none()
        {
            return Ok(BidOutcome::rejected(MSG_OUT_OF_TURN));
        }

        let (player, current_bid) = {
            let round = self.round.as_ref().ok_or(AuctionError::SettlementPending)?;
            (round.player.clone(), round.current_bid.clone())
        };

        let team = match self.store.team(team_id)? {
            Some(team) => team,
            None => return Ok(BidOutcome::rejected(MSG_TEAM_NOT_FOUND)),
        };

        let evaluated = match ledger::evaluate_bid(&team, &player, current_bid.as_ref(), increment)
        {
            Ok(evaluated) => evaluated,
            Err(rejection) => return Ok(rejection.into_outcome()),
        };

        let mut bid = Bid {
            id: String::new(),
            team_id: team_id.clone(),
            player_id: player.id.clone(),
            amount: evaluated.amount,
            timestamp: now_millis(),
        };
        // Ledger write first; a failure here propagates with no in-memory
        // state change.
        bid.id = self.store.append_bid(bid.clone())?;

        if let Some(round) = self.round.as_mut() {
            round.current_bid = Some(bid);
        }
        info!(
            team = %team_id,
            amount = evaluated.amount,
            opening = evaluated.opening,
            "bid accepted"
        );

        self.advance_turn()?;
        Ok(BidOutcome::accepted())
    }

    /// Pass on behalf of a team. A caller that does not hold the turn is
    /// a silent no-op, mirroring bid rejection semantics.
    pub fn pass(&mut self, team_id: &TeamId) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::RoundActive {
            return Ok(());
        }
        if self.scheduler.pass(team_id) {
            info!(team = %team_id, "team passed");
            self.advance_turn()?;
        }
        Ok(())
    }

    /// One-second tick from the external scheduler. No-op unless a round
    /// is active and the timer is enabled.
    pub fn tick(&mut self) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::RoundActive {
            return Ok(());
        }
        match self.timer.tick(self.scheduler.turn()) {
            Some(TimerEvent::TurnTimedOut(team)) => {
                info!(team = %team, "turn timed out; passing on their behalf");
                self.pass(&team)
            }
            Some(TimerEvent::BiddingTimedOut) => {
                info!("countdown expired with no turn holder; closing bidding");
                self.begin_settlement()
            }
            None => Ok(()),
        }
    }

    /// Admin override: force the round closed regardless of timer or
    /// turn state, settling with the current highest bidder if any.
    pub fn close_bidding(&mut self) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::RoundActive {
            return Err(AuctionError::InvalidPhase {
                expected: EnginePhase::RoundActive,
                got: self.phase,
            });
        }
        self.begin_settlement()
    }

    /// Re-run a settlement whose transactional write failed. Valid only
    /// while the round is `Settling` and unsettled.
    pub fn retry_settlement(&mut self) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::Settling {
            return Err(AuctionError::InvalidPhase {
                expected: EnginePhase::Settling,
                got: self.phase,
            });
        }
        if self.is_settled() {
            return Err(AuctionError::AlreadySettled);
        }
        self.try_settle()
    }

    /// Advance past the settled player once the display hold has elapsed.
    pub fn finish_round(&mut self) -> Result<(), AuctionError> {
        if self.phase != EnginePhase::Settling {
            return Err(AuctionError::InvalidPhase {
                expected: EnginePhase::Settling,
                got: self.phase,
            });
        }
        if !self.is_settled() {
            return Err(AuctionError::SettlementPending);
        }

        self.queue.advance_past_current();
        self.round = None;
        self.phase = if self.queue.is_empty() {
            info!("auction queue exhausted");
            EnginePhase::QueueExhausted
        } else {
            EnginePhase::Idle
        };
        Ok(())
    }

    // === Timer configuration ===

    /// Reconfigure the countdown. The new duration applies from the next
    /// arm; the enabled flag applies immediately.
    pub fn configure_timer(&mut self, duration_secs: u32, enabled: bool) -> Result<(), AuctionError> {
        if duration_secs == 0 {
            return Err(AuctionError::InvalidTimerDuration);
        }
        self.config.timer_duration_secs = duration_secs;
        self.config.timer_enabled = enabled;
        self.timer.set_duration(duration_secs);
        self.timer.set_enabled(enabled);
        Ok(())
    }

    // === Queries ===

    /// Read-only view of the live round for UI collaborators.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            round_active: self.phase == EnginePhase::RoundActive,
            current_player: self
                .round
                .as_ref()
                .map(|r| r.player.clone())
                .or_else(|| self.queue.current().cloned()),
            current_bid: self.round.as_ref().and_then(|r| r.current_bid.clone()),
            turn_team: self.scheduler.turn().cloned(),
            timer_remaining_secs: self.timer.remaining_secs(),
            timer_enabled: self.timer.is_enabled(),
            winning_team: self.round.as_ref().and_then(|r| r.winning_team.clone()),
            queue_remaining: self.queue.remaining(),
            unsold_pool: self
                .queue
                .unsold_pool()
                .iter()
                .map(|p| p.id.clone())
                .collect(),
        }
    }

    // === Internal ===

    fn advance_turn(&mut self) -> Result<(), AuctionError> {
        match self.scheduler.advance() {
            TurnOutcome::Next(team) => {
                info!(team = %team, "turn advanced");
                self.timer.arm();
                Ok(())
            }
            TurnOutcome::RoundOver => self.begin_settlement(),
        }
    }

    fn begin_settlement(&mut self) -> Result<(), AuctionError> {
        self.phase = EnginePhase::Settling;
        self.scheduler.clear_turn();
        self.try_settle()
    }

    /// Apply the settlement outcome exactly once.
    ///
    /// The winning bid's owner is authoritative for the award, even when
    /// bidding was forced closed while more than one team was still
    /// active. A failed transactional write leaves the round in
    /// `Settling` for [`Self::retry_settlement`]; the queue never
    /// advances past an unsettled player.
    fn try_settle(&mut self) -> Result<(), AuctionError> {
        let (winner, player, amount) = {
            let round = self.round.as_ref().ok_or(AuctionError::SettlementPending)?;
            if round.settled {
                return Err(AuctionError::AlreadySettled);
            }
            match &round.current_bid {
                Some(bid) => (Some(bid.team_id.clone()), round.player.clone(), bid.amount),
                None => (None, round.player.clone(), 0),
            }
        };

        match winner {
            Some(team_id) => {
                let result = self.store.transact_team(&team_id, &mut |team| {
                    team.coins = checked_deduct(team.coins, amount, &team.id)?;
                    team.players.push(player.clone());
                    Ok(())
                });
                if let Err(err) = result {
                    warn!(
                        team = %team_id,
                        player = %player.id,
                        error = %err,
                        "settlement write failed; round held for retry"
                    );
                    return Err(err.into());
                }
                info!(player = %player.id, team = %team_id, amount, "player sold");
                if let Some(round) = self.round.as_mut() {
                    round.winning_team = Some(team_id);
                    round.settled = true;
                }
            }
            None => {
                self.queue.move_current_to_unsold();
                info!(player = %player.id, "player unsold");
                if let Some(round) = self.round.as_mut() {
                    round.settled = true;
                }
            }
        }
        Ok(())
    }
}

/// Budget deduction that can never go negative. Bid validation makes an
/// overdraft unreachable; a concurrent external budget edit surfaces as a
/// conflict instead of wrapping.
fn checked_deduct(coins: Coins, amount: Coins, team_id: &TeamId) -> StoreResult<Coins> {
    coins.checked_sub(amount).ok_or_else(|| {
        crease_store::StoreError::Conflict(format!(
            "budget underflow for team {team_id}: {coins} < {amount}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_store::{MemoryRosterStore, StoreError};
    use crease_types::{PlayerStats, Position, Team};

    fn player(id: &str, base_price: Coins) -> Player {
        Player {
            id: id.into(),
            name: format!("Player {id}"),
            nationality: "India".into(),
            position: Position::Batsman,
            base_price,
            stats: PlayerStats::default(),
        }
    }

    fn setup(teams: &[(&str, Coins)], players: &[(&str, Coins)]) -> (Arc<MemoryRosterStore>, AuctionEngine) {
        let store = Arc::new(MemoryRosterStore::new());
        for (id, coins) in teams {
            store.put_team(Team::new(*id, *id, *coins)).unwrap();
        }
        for (id, base) in players {
            store.put_player(player(id, *base)).unwrap();
        }
        let engine = AuctionEngine::new(store.clone(), EngineConfig::default());
        (store, engine)
    }

    fn start_with_turn(engine: &mut AuctionEngine, turn: &str) {
        engine.start_round().unwrap();
        engine
            .assign_turn(TurnChoice::Team(turn.to_string()))
            .unwrap();
    }

    #[test]
    fn test_start_round_requires_players() {
        let (_, mut engine) = setup(&[("a", 100)], &[]);
        assert_eq!(engine.start_round(), Err(AuctionError::EmptyQueue));
    }

    #[test]
    fn test_start_round_does_not_assign_turn() {
        let (_, mut engine) = setup(&[("a", 100)], &[("p1", 10)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        engine.start_round().unwrap();

        let snap = engine.snapshot();
        assert_eq!(snap.phase, EnginePhase::RoundActive);
        assert!(snap.turn_team.is_none());
    }

    #[test]
    fn test_bid_out_of_turn_rejected_without_state_change() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000)], &[("p1", 100)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        let outcome = engine.place_bid(&"b".to_string(), 10).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Not your turn or auction is inactive.");
        assert!(engine.snapshot().current_bid.is_none());

        // Identical retry, identical rejection.
        let retry = engine.place_bid(&"b".to_string(), 10).unwrap();
        assert_eq!(retry, outcome);
    }

    #[test]
    fn test_bid_amounts_strictly_increase() {
        let (_, mut engine) = setup(&[("a", 10_000), ("b", 10_000)], &[("p1", 100)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);
        assert_eq!(engine.snapshot().current_bid.unwrap().amount, 100);

        // Turn rotated to b.
        assert!(engine.place_bid(&"b".to_string(), 50).unwrap().success);
        assert_eq!(engine.snapshot().current_bid.unwrap().amount, 150);

        let outcome = engine.place_bid(&"a".to_string(), 0).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Bid must be higher than the current bid.");
    }

    #[test]
    fn test_bid_beyond_budget_rejected() {
        let (_, mut engine) = setup(&[("a", 90), ("b", 1000)], &[("p1", 100)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        let outcome = engine.place_bid(&"a".to_string(), 0).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Not enough coins.");
    }

    #[test]
    fn test_two_passes_settle_to_sole_bidder() {
        let (store, mut engine) =
            setup(&[("a", 10_000_000), ("b", 10_000_000), ("c", 10_000_000)], &[("p1", 250_000)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "c");

        assert!(engine.place_bid(&"c".to_string(), 0).unwrap().success);
        // Rotation after c: a, then b.
        engine.pass(&"a".to_string()).unwrap();
        engine.pass(&"b".to_string()).unwrap();

        assert_eq!(engine.phase(), EnginePhase::Settling);
        assert!(engine.is_settled());
        assert_eq!(engine.snapshot().winning_team, Some("c".to_string()));

        let winner = store.team(&"c".to_string()).unwrap().unwrap();
        assert_eq!(winner.coins, 9_750_000);
        assert_eq!(winner.players.len(), 1);
        assert_eq!(winner.players[0].id, "p1");
    }

    #[test]
    fn test_all_pass_without_bid_goes_unsold() {
        let (_, mut engine) = setup(&[("a", 100), ("b", 100)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        engine.pass(&"a".to_string()).unwrap();
        // Only b remains and nobody bid: unsold.
        assert_eq!(engine.phase(), EnginePhase::Settling);
        assert!(engine.is_settled());
        assert!(engine.snapshot().winning_team.is_none());
        assert_eq!(engine.snapshot().unsold_pool, vec!["p1".to_string()]);

        engine.finish_round().unwrap();
        assert_eq!(engine.phase(), EnginePhase::QueueExhausted);
    }

    #[test]
    fn test_timer_expiry_equals_pass() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000), ("c", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        engine.configure_timer(2, true).unwrap();
        start_with_turn(&mut engine, "a");

        engine.tick().unwrap();
        assert_eq!(engine.snapshot().turn_team, Some("a".to_string()));
        engine.tick().unwrap();

        // a was passed for; the turn moved on and the timer re-armed.
        let snap = engine.snapshot();
        assert_eq!(snap.turn_team, Some("b".to_string()));
        assert_eq!(snap.timer_remaining_secs, 2);
    }

    #[test]
    fn test_disabled_timer_never_forces_pass() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        engine.configure_timer(1, false).unwrap();
        start_with_turn(&mut engine, "a");

        for _ in 0..5 {
            engine.tick().unwrap();
        }
        assert_eq!(engine.snapshot().turn_team, Some("a".to_string()));
        assert_eq!(engine.phase(), EnginePhase::RoundActive);
    }

    #[test]
    fn test_close_bidding_awards_bid_owner() {
        let (store, mut engine) =
            setup(&[("a", 1_000_000), ("b", 1_000_000), ("c", 1_000_000)], &[("p1", 100_000)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");
        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);

        // Forced close while b and c are still technically active: the
        // bid owner wins.
        engine.close_bidding().unwrap();
        assert_eq!(engine.snapshot().winning_team, Some("a".to_string()));
        assert_eq!(
            store.team(&"a".to_string()).unwrap().unwrap().coins,
            900_000
        );
    }

    #[test]
    fn test_settlement_exactly_once() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");
        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);
        engine.close_bidding().unwrap();

        assert_eq!(
            engine.close_bidding(),
            Err(AuctionError::InvalidPhase {
                expected: EnginePhase::RoundActive,
                got: EnginePhase::Settling,
            })
        );
        assert_eq!(engine.retry_settlement(), Err(AuctionError::AlreadySettled));
    }

    #[test]
    fn test_finish_round_advances_to_next_player() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000)], &[("p1", 50), ("p2", 60)]);
        engine
            .enqueue_players(&["p1".to_string(), "p2".to_string()])
            .unwrap();
        start_with_turn(&mut engine, "a");
        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);
        engine.close_bidding().unwrap();
        engine.finish_round().unwrap();

        assert_eq!(engine.phase(), EnginePhase::Idle);
        assert_eq!(engine.snapshot().current_player.unwrap().id, "p2");
        // Prior round's bid and winner are gone.
        assert!(engine.snapshot().current_bid.is_none());
        assert!(engine.snapshot().winning_team.is_none());
    }

    #[test]
    fn test_enqueue_skips_sold_players() {
        let (store, mut engine) = setup(&[("a", 1000)], &[("p1", 50)]);
        let mut team = store.team(&"a".to_string()).unwrap().unwrap();
        team.players.push(player("p1", 50));
        store.put_team(team).unwrap();

        assert_eq!(engine.enqueue_players(&["p1".to_string()]).unwrap(), 0);
        assert!(engine.snapshot().current_player.is_none());
    }

    #[test]
    fn test_requeue_reopens_exhausted_queue() {
        let (_, mut engine) = setup(&[("a", 10), ("b", 10)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");
        engine.pass(&"a".to_string()).unwrap();
        engine.finish_round().unwrap();
        assert_eq!(engine.phase(), EnginePhase::QueueExhausted);

        assert_eq!(engine.requeue_from_unsold(&["p1".to_string()]).unwrap(), 1);
        assert_eq!(engine.phase(), EnginePhase::Idle);
        assert_eq!(engine.snapshot().current_player.unwrap().id, "p1");
        assert!(engine.snapshot().unsold_pool.is_empty());
    }

    #[test]
    fn test_pass_out_of_turn_has_no_effect() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000), ("c", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        engine.pass(&"b".to_string()).unwrap();
        engine.pass(&"b".to_string()).unwrap();
        assert_eq!(engine.snapshot().turn_team, Some("a".to_string()));
        assert_eq!(engine.phase(), EnginePhase::RoundActive);
    }

    #[test]
    fn test_reassign_turn_restores_passed_team_to_rotation() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000), ("c", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");
        engine.pass(&"a".to_string()).unwrap();

        // Re-assignment clears a's pass, so its bid is accepted and the
        // full three-team rotation resumes after it.
        engine
            .assign_turn(TurnChoice::Team("a".to_string()))
            .unwrap();
        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);
        assert_eq!(engine.snapshot().turn_team, Some("b".to_string()));
        assert_eq!(engine.phase(), EnginePhase::RoundActive);
    }

    #[test]
    fn test_oversized_increment_rejected_without_state_change() {
        let (_, mut engine) = setup(&[("a", 1000), ("b", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");

        let outcome = engine.place_bid(&"a".to_string(), Coins::MAX).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Bid must be higher than the current bid.");
        assert!(engine.snapshot().current_bid.is_none());
        assert_eq!(engine.snapshot().turn_team, Some("a".to_string()));
    }

    #[test]
    fn test_assign_turn_unknown_team_is_fatal() {
        let (_, mut engine) = setup(&[("a", 1000)], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        engine.start_round().unwrap();

        assert_eq!(
            engine.assign_turn(TurnChoice::Team("zz".to_string())),
            Err(AuctionError::TeamNotFound("zz".to_string()))
        );
    }

    #[test]
    fn test_random_turn_with_no_teams_is_fatal() {
        let (_, mut engine) = setup(&[], &[("p1", 50)]);
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        engine.start_round().unwrap();
        assert_eq!(
            engine.assign_turn(TurnChoice::Random),
            Err(AuctionError::NoTeams)
        );
    }

    /// Store wrapper that fails team transactions until told otherwise.
    struct FlakyStore {
        inner: MemoryRosterStore,
        fail_transactions: std::sync::atomic::AtomicBool,
    }

    impl FlakyStore {
        fn new(inner: MemoryRosterStore) -> Self {
            Self {
                inner,
                fail_transactions: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn set_failing(&self, failing: bool) {
            self.fail_transactions
                .store(failing, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl RosterStore for FlakyStore {
        fn team(&self, id: &TeamId) -> crease_store::StoreResult<Option<Team>> {
            self.inner.team(id)
        }
        fn teams(&self) -> crease_store::StoreResult<Vec<Team>> {
            self.inner.teams()
        }
        fn put_team(&self, team: Team) -> crease_store::StoreResult<()> {
            self.inner.put_team(team)
        }
        fn delete_team(&self, id: &TeamId) -> crease_store::StoreResult<()> {
            self.inner.delete_team(id)
        }
        fn transact_team(
            &self,
            id: &TeamId,
            f: &mut dyn FnMut(&mut Team) -> crease_store::StoreResult<()>,
        ) -> crease_store::StoreResult<()> {
            if self.fail_transactions.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Backend("injected failure".into()));
            }
            self.inner.transact_team(id, f)
        }
        fn player(&self, id: &PlayerId) -> crease_store::StoreResult<Option<Player>> {
            self.inner.player(id)
        }
        fn players(&self) -> crease_store::StoreResult<Vec<Player>> {
            self.inner.players()
        }
        fn put_player(&self, p: Player) -> crease_store::StoreResult<()> {
            self.inner.put_player(p)
        }
        fn delete_player(&self, id: &PlayerId) -> crease_store::StoreResult<()> {
            self.inner.delete_player(id)
        }
        fn append_bid(&self, bid: Bid) -> crease_store::StoreResult<crease_types::BidId> {
            self.inner.append_bid(bid)
        }
        fn bids_for_player(&self, id: &PlayerId) -> crease_store::StoreResult<Vec<Bid>> {
            self.inner.bids_for_player(id)
        }
        fn owners(&self) -> crease_store::StoreResult<Vec<crease_types::Owner>> {
            self.inner.owners()
        }
        fn put_owner(&self, owner: crease_types::Owner) -> crease_store::StoreResult<()> {
            self.inner.put_owner(owner)
        }
        fn delete_owner(&self, id: &crease_types::OwnerId) -> crease_store::StoreResult<()> {
            self.inner.delete_owner(id)
        }
    }

    #[test]
    fn test_failed_settlement_is_retryable() {
        let inner = MemoryRosterStore::new();
        inner.put_team(Team::new("a", "a", 1000)).unwrap();
        inner.put_team(Team::new("b", "b", 1000)).unwrap();
        inner.put_player(player("p1", 50)).unwrap();
        let store = Arc::new(FlakyStore::new(inner));

        let mut engine = AuctionEngine::new(store.clone(), EngineConfig::default());
        engine.enqueue_players(&["p1".to_string()]).unwrap();
        start_with_turn(&mut engine, "a");
        assert!(engine.place_bid(&"a".to_string(), 0).unwrap().success);

        store.set_failing(true);
        assert!(matches!(
            engine.close_bidding(),
            Err(AuctionError::Store(StoreError::Backend(_)))
        ));

        // Round held in Settling, unsettled; finishing is refused.
        assert_eq!(engine.phase(), EnginePhase::Settling);
        assert!(!engine.is_settled());
        assert_eq!(engine.finish_round(), Err(AuctionError::SettlementPending));

        store.set_failing(false);
        engine.retry_settlement().unwrap();
        assert!(engine.is_settled());
        engine.finish_round().unwrap();

        let winner = store.team(&"a".to_string()).unwrap().unwrap();
        assert_eq!(winner.coins, 950);
        assert_eq!(winner.players.len(), 1);
    }
}
