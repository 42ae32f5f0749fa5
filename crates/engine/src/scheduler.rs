//! Turn scheduling: which team bids next, and when bidding must close.
//!
//! Turn order follows the stable enumeration order of teams (creation
//! order), not bid history. Given the same order and passed-set the
//! rotation is deterministic; only the explicit random initial pick is not.

use std::collections::HashSet;

use rand::Rng;

use crease_types::TeamId;

/// Result of advancing the rotation after a bid or a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The named team now holds the turn.
    Next(TeamId),
    /// One or zero active bidders remain; the round must settle.
    RoundOver,
}

/// Tracks the turn holder and the set of teams that have passed in the
/// current round.
#[derive(Debug, Default)]
pub struct TurnScheduler {
    order: Vec<TeamId>,
    passed: HashSet<TeamId>,
    turn: Option<TeamId>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new round over the given team order: empty passed-set,
    /// no turn holder.
    pub fn reset(&mut self, order: Vec<TeamId>) {
        self.order = order;
        self.passed.clear();
        self.turn = None;
    }

    pub fn turn(&self) -> Option<&TeamId> {
        self.turn.as_ref()
    }

    pub fn has_passed(&self, team: &TeamId) -> bool {
        self.passed.contains(team)
    }

    /// Explicitly assign the turn holder, emptying the passed-set so every
    /// team is back in rotation. Returns `false` for a team id outside the
    /// rotation.
    pub fn assign_turn(&mut self, team: TeamId) -> bool {
        if !self.order.contains(&team) {
            return false;
        }
        self.passed.clear();
        self.turn = Some(team);
        true
    }

    /// Assign the turn uniformly at random among all teams, emptying the
    /// passed-set.
    pub fn assign_random_turn<R: Rng>(&mut self, rng: &mut R) -> Option<TeamId> {
        if self.order.is_empty() {
            return None;
        }
        let pick = self.order[rng.gen_range(0..self.order.len())].clone();
        self.passed.clear();
        self.turn = Some(pick.clone());
        Some(pick)
    }

    /// Record a pass. Only the current turn holder can pass; any other
    /// caller is a silent no-op, mirroring bid rejection semantics.
    pub fn pass(&mut self, team: &TeamId) -> bool {
        if self.turn.as_ref() != Some(team) {
            return false;
        }
        self.passed.insert(team.clone());
        true
    }

    /// Advance to the next active bidder, cyclically after the current
    /// holder. A holder that just passed maps to the first active team.
    /// Signals [`TurnOutcome::RoundOver`] once at most one bidder remains.
    pub fn advance(&mut self) -> TurnOutcome {
        let active: Vec<&TeamId> = self
            .order
            .iter()
            .filter(|t| !self.passed.contains(*t))
            .collect();

        if active.len() <= 1 {
            self.turn = None;
            return TurnOutcome::RoundOver;
        }

        let next = match self
            .turn
            .as_ref()
            .and_then(|cur| active.iter().position(|t| *t == cur))
        {
            Some(i) => active[(i + 1) % active.len()].clone(),
            None => active[0].clone(),
        };
        self.turn = Some(next.clone());
        TurnOutcome::Next(next)
    }

    /// Drop the turn holder without touching the passed-set (used when a
    /// round closes).
    pub fn clear_turn(&mut self) {
        self.turn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn scheduler(teams: &[&str]) -> TurnScheduler {
        let mut s = TurnScheduler::new();
        s.reset(teams.iter().map(|t| t.to_string()).collect());
        s
    }

    #[test]
    fn test_rotation_follows_creation_order() {
        let mut s = scheduler(&["a", "b", "c"]);
        assert!(s.assign_turn("a".into()));

        assert_eq!(s.advance(), TurnOutcome::Next("b".into()));
        assert_eq!(s.advance(), TurnOutcome::Next("c".into()));
        assert_eq!(s.advance(), TurnOutcome::Next("a".into()));
    }

    #[test]
    fn test_passed_holder_maps_to_first_active() {
        let mut s = scheduler(&["a", "b", "c"]);
        s.assign_turn("b".into());
        assert!(s.pass(&"b".into()));

        // b is out; the next holder is the first active team.
        assert_eq!(s.advance(), TurnOutcome::Next("a".into()));
        assert_eq!(s.advance(), TurnOutcome::Next("c".into()));
        assert_eq!(s.advance(), TurnOutcome::Next("a".into()));
    }

    #[test]
    fn test_round_over_when_one_bidder_remains() {
        let mut s = scheduler(&["a", "b", "c"]);
        s.assign_turn("a".into());
        s.pass(&"a".into());
        assert_eq!(s.advance(), TurnOutcome::Next("b".into()));
        s.pass(&"b".into());

        assert_eq!(s.advance(), TurnOutcome::RoundOver);
        assert!(s.turn().is_none());
    }

    #[test]
    fn test_pass_by_non_holder_is_silent_and_idempotent() {
        let mut s = scheduler(&["a", "b"]);
        s.assign_turn("a".into());

        assert!(!s.pass(&"b".into()));
        assert!(!s.pass(&"b".into()));
        assert_eq!(s.turn(), Some(&"a".to_string()));
        assert!(!s.has_passed(&"b".to_string()));
    }

    #[test]
    fn test_assign_turn_resets_passed_set() {
        let mut s = scheduler(&["a", "b", "c"]);
        s.assign_turn("a".into());
        assert!(s.pass(&"a".into()));

        // Re-assignment puts every team back in rotation, including the
        // new holder.
        assert!(s.assign_turn("a".into()));
        assert!(!s.has_passed(&"a".to_string()));
        assert_eq!(s.turn(), Some(&"a".to_string()));
    }

    #[test]
    fn test_assign_turn_rejects_unknown_team() {
        let mut s = scheduler(&["a"]);
        assert!(!s.assign_turn("zz".into()));
        assert!(s.turn().is_none());
    }

    #[test]
    fn test_random_assignment_picks_from_order() {
        let mut s = scheduler(&["a", "b", "c"]);
        let mut rng = StepRng::new(0, 1);
        let pick = s.assign_random_turn(&mut rng).unwrap();
        assert!(["a", "b", "c"].contains(&pick.as_str()));
        assert_eq!(s.turn(), Some(&pick));
    }

    #[test]
    fn test_random_assignment_with_no_teams() {
        let mut s = TurnScheduler::new();
        let mut rng = StepRng::new(0, 1);
        assert!(s.assign_random_turn(&mut rng).is_none());
    }
}
