//! Parameter types for the auction RPC surface.

use serde::{Deserialize, Serialize};

use crease_types::{Coins, OwnerId, PlayerId, PlayerStats, Position, TeamId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignTurnParams {
    /// Explicit team pick; omit for a uniform random pick.
    pub team: Option<TeamId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceBidParams {
    pub team: TeamId,
    /// Raise over the current floor; `0` places the opening bid at the
    /// player's base price.
    pub increment: Coins,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigureTimerParams {
    pub duration_secs: u32,
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerIdsParams {
    pub player_ids: Vec<PlayerId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddTeamParams {
    /// Defaults to a slug of the name.
    pub id: Option<TeamId>,
    pub name: String,
    pub coins: Coins,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateTeamParams {
    pub id: TeamId,
    pub name: Option<String>,
    pub coins: Option<Coins>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddPlayerParams {
    /// Defaults to a slug of the name.
    pub id: Option<PlayerId>,
    pub name: String,
    pub nationality: String,
    /// One of `batsman`, `bowler`, `all-rounder`, `wicketkeeper`.
    pub position: String,
    pub base_price: Coins,
    #[serde(default)]
    pub stats: PlayerStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddOwnerParams {
    pub id: Option<OwnerId>,
    pub name: String,
    pub role: String,
}

/// Parse a position keyword as accepted by `roster_addPlayer`.
pub fn parse_position(s: &str) -> Option<Position> {
    match s.to_ascii_lowercase().as_str() {
        "batsman" => Some(Position::Batsman),
        "bowler" => Some(Position::Bowler),
        "all-rounder" | "allrounder" => Some(Position::AllRounder),
        "wicketkeeper" | "wicket-keeper" => Some(Position::Wicketkeeper),
        _ => None,
    }
}

/// Derive a stable id from a display name.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
