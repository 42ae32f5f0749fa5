//! Core type definitions for the crease player auction.
//!
//! This crate provides the shared data structures used across the auction
//! system: the player catalog, team rosters and budgets, and the append-only
//! bid records the turn-engine produces.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =========================
// IDENTITY & CURRENCY
// =========================

/// Stable player identifier assigned at intake.
pub type PlayerId = String;

/// Stable team identifier.
pub type TeamId = String;

/// Stable bid identifier, allocated by the roster store.
pub type BidId = String;

/// Stable owner identifier.
pub type OwnerId = String;

/// Abstract currency unit of team budgets.
pub type Coins = u64;

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// =========================
// PLAYERS
// =========================

/// Playing position of a cricketer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Batsman,
    Bowler,
    AllRounder,
    Wicketkeeper,
}

/// Career statistics block. Opaque to the auction engine; surfaced to
/// dashboards and the CLI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches: u32,
    pub innings: u32,
    pub runs: u32,
    pub batting_average: f64,
    pub strike_rate: f64,
    pub fifties: u32,
    pub hundreds: u32,
    pub wickets: u32,
    pub economy_rate: f64,
    /// Wicketkeeping: catches taken.
    pub catches: u32,
    /// Wicketkeeping: stumpings effected.
    pub stumpings: u32,
}

/// A player in the auction catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub nationality: String,
    pub position: Position,
    /// Minimum price floor for this player, set at intake.
    pub base_price: Coins,
    pub stats: PlayerStats,
}

// =========================
// TEAMS & OWNERS
// =========================

/// A franchise owner or official attached to a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub role: String,
}

/// A participating team.
///
/// `coins` is mutated only by the auction engine at settlement time and is
/// monotonically non-increasing across an auction run. `players` is the
/// roster of players won so far, append-only during a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub coins: Coins,
    pub players: Vec<Player>,
    pub owners: Vec<OwnerId>,
}

impl Team {
    /// Create a team with an empty roster.
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, coins: Coins) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coins,
            players: Vec::new(),
            owners: Vec::new(),
        }
    }
}

// =========================
// BIDS
// =========================

/// A recorded bid. Append-only: within one player's round, accepted amounts
/// strictly increase except the opening bid, which may equal the base price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub amount: Coins,
    /// Unix milliseconds at acceptance.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> Player {
        Player {
            id: "p1".into(),
            name: "R. Sharma".into(),
            nationality: "India".into(),
            position: Position::Batsman,
            base_price: 200_000,
            stats: PlayerStats {
                matches: 48,
                innings: 45,
                runs: 1764,
                batting_average: 42.5,
                strike_rate: 139.2,
                fifties: 14,
                hundreds: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_player_round_trips_through_json() {
        let player = sample_player();
        let encoded = serde_json::to_string(&player).unwrap();
        let decoded: Player = serde_json::from_str(&encoded).unwrap();
        assert_eq!(player, decoded);
    }

    #[test]
    fn test_new_team_has_empty_roster() {
        let team = Team::new("t1", "Strikers", 10_000_000);
        assert!(team.players.is_empty());
        assert_eq!(team.coins, 10_000_000);
    }
}
