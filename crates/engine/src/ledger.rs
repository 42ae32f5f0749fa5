//! Bid validation: computing the floor a new bid must clear and the
//! structured accept/reject result returned to callers.
//!
//! Validation is pure and synchronous; recording the accepted bid and
//! rotating the turn is the engine's job.

use serde::{Deserialize, Serialize};

use crease_types::{Bid, Coins, Player, Team};

pub const MSG_BID_PLACED: &str = "Bid placed.";
pub const MSG_OUT_OF_TURN: &str = "Not your turn or auction is inactive.";
pub const MSG_TEAM_NOT_FOUND: &str = "Team not found.";
pub const MSG_BID_TOO_LOW: &str = "Bid must be higher than the current bid.";
pub const MSG_NOT_ENOUGH_COINS: &str = "Not enough coins.";

/// Structured result of a bid attempt. Ordinary rejections are carried
/// here, never as errors; retrying an identical rejected call produces
/// the identical rejection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOutcome {
    pub success: bool,
    pub message: String,
}

impl BidOutcome {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: MSG_BID_PLACED.to_string(),
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

/// A validated bid amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatedBid {
    pub amount: Coins,
    /// The distinguished first bid at the unmodified base price
    /// (`increment == 0` with no prior bid).
    pub opening: bool,
}

/// Why a bid attempt was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BidRejection {
    TooLow,
    NotEnoughCoins,
}

impl BidRejection {
    pub fn message(&self) -> &'static str {
        match self {
            BidRejection::TooLow => MSG_BID_TOO_LOW,
            BidRejection::NotEnoughCoins => MSG_NOT_ENOUGH_COINS,
        }
    }

    pub fn into_outcome(self) -> BidOutcome {
        BidOutcome::rejected(self.message())
    }
}

/// Validate a bid attempt against the current winning bid and the team's
/// remaining budget.
///
/// The floor is the current bid amount when one exists, otherwise the
/// player's base price. A positive increment raises the floor by that
/// much; a zero increment is only meaningful as the opening bid, which is
/// accepted verbatim at the base price.
pub fn evaluate_bid(
    team: &Team,
    player: &Player,
    current_bid: Option<&Bid>,
    increment: Coins,
) -> Result<EvaluatedBid, BidRejection> {
    let last_amount = current_bid.map(|b| b.amount).unwrap_or(0);
    let base_amount = if last_amount > 0 {
        last_amount
    } else {
        player.base_price
    };
    // Checked: the increment is caller-supplied, so an overflowing sum is
    // rejected rather than wrapped below the floor.
    let new_amount = if increment > 0 {
        match base_amount.checked_add(increment) {
            Some(amount) => amount,
            None => return Err(BidRejection::TooLow),
        }
    } else {
        player.base_price
    };

    let opening = last_amount == 0 && increment == 0;
    if !opening && new_amount <= last_amount {
        return Err(BidRejection::TooLow);
    }

    if team.coins < new_amount {
        return Err(BidRejection::NotEnoughCoins);
    }

    Ok(EvaluatedBid {
        amount: new_amount,
        opening,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_types::{PlayerStats, Position};

    fn player(base_price: Coins) -> Player {
        Player {
            id: "p1".into(),
            name: "Player".into(),
            nationality: "India".into(),
            position: Position::AllRounder,
            base_price,
            stats: PlayerStats::default(),
        }
    }

    fn bid(amount: Coins) -> Bid {
        Bid {
            id: "bid-1".into(),
            team_id: "t1".into(),
            player_id: "p1".into(),
            amount,
            timestamp: 0,
        }
    }

    #[test]
    fn test_opening_bid_at_base_price() {
        let team = Team::new("t1", "Strikers", 1_000_000);
        let evaluated = evaluate_bid(&team, &player(200_000), None, 0).unwrap();
        assert_eq!(evaluated.amount, 200_000);
        assert!(evaluated.opening);
    }

    #[test]
    fn test_first_raise_starts_from_base_price() {
        let team = Team::new("t1", "Strikers", 1_000_000);
        let evaluated = evaluate_bid(&team, &player(200_000), None, 50_000).unwrap();
        assert_eq!(evaluated.amount, 250_000);
        assert!(!evaluated.opening);
    }

    #[test]
    fn test_raise_over_current_bid() {
        let team = Team::new("t1", "Strikers", 1_000_000);
        let current = bid(250_000);
        let evaluated = evaluate_bid(&team, &player(200_000), Some(&current), 25_000).unwrap();
        assert_eq!(evaluated.amount, 275_000);
    }

    #[test]
    fn test_zero_increment_after_first_bid_is_too_low() {
        let team = Team::new("t1", "Strikers", 1_000_000);
        let current = bid(250_000);
        assert_eq!(
            evaluate_bid(&team, &player(200_000), Some(&current), 0),
            Err(BidRejection::TooLow)
        );
    }

    #[test]
    fn test_bid_exceeding_budget_rejected() {
        let team = Team::new("t1", "Strikers", 240_000);
        let current = bid(230_000);
        assert_eq!(
            evaluate_bid(&team, &player(200_000), Some(&current), 20_000),
            Err(BidRejection::NotEnoughCoins)
        );
    }

    #[test]
    fn test_opening_bid_requires_budget_too() {
        let team = Team::new("t1", "Strikers", 100_000);
        assert_eq!(
            evaluate_bid(&team, &player(200_000), None, 0),
            Err(BidRejection::NotEnoughCoins)
        );
    }

    #[test]
    fn test_overflowing_increment_rejected() {
        let team = Team::new("t1", "Strikers", Coins::MAX);
        assert_eq!(
            evaluate_bid(&team, &player(100_000), None, Coins::MAX),
            Err(BidRejection::TooLow)
        );
        let current = bid(250_000);
        assert_eq!(
            evaluate_bid(&team, &player(100_000), Some(&current), Coins::MAX - 1),
            Err(BidRejection::TooLow)
        );
    }

    #[test]
    fn test_rejection_messages_are_stable() {
        assert_eq!(
            BidRejection::TooLow.into_outcome().message,
            "Bid must be higher than the current bid."
        );
        assert_eq!(
            BidRejection::NotEnoughCoins.into_outcome().message,
            "Not enough coins."
        );
    }
}
