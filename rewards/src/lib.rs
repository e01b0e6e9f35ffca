pub mod bettor;
pub mod calculation;
pub mod distribution;
pub mod simulation;
mod statearray;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use thiserror::Error;

pub use calculation::RewardSolver;
pub use distribution::{RewardDistribution, NUM_BUCKETS};
pub use statearray::{CardCount, Mode, StateArray, StateKey, NUM_RANKS};

/// A card, identified by its rank: 1 is an ace, 2..=9 are number cards and
/// 10..=13 are the ten and the face cards.
pub type Card = u8;

/// Returns the blackjack value of a card. Aces count as 11 (soft) until
/// demoted.
pub fn card_value(card: Card) -> u16 {
    match card {
        1 => 11,
        2..=9 => card as u16,
        _ => 10,
    }
}

/// The rule variation played at the table. All solvers, strategists and the
/// game environment read from one immutable record of this type.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// The number of 52-card decks in the shoe. Must stay below 25 so every
    /// per-rank count fits in two decimal digits of the state key.
    pub shoe_size: u8,
    /// The fraction of cards left below which the shoe is reshuffled.
    pub reshuffle_threshold: f64,
    /// The starting bankroll of the player.
    pub agent_chips: f64,
    /// The payout of a natural blackjack. Only 3:2 is supported.
    pub blackjack_payout: f64,
    /// Whether a ten-valued card on a split ace pays as blackjack.
    pub blackjack_with_split_aces: bool,
    /// Whether the dealer peeks at the hole card under a ten or an ace.
    /// Must be true; the solver's dealer recursion relies on it.
    pub dealer_peeks: bool,
    /// Whether doubling down is allowed on post-split hands.
    pub double_after_split: bool,
    /// Whether the player may keep drawing after splitting aces.
    pub hit_after_split_aces: bool,
    /// Whether the dealer hits a soft 17.
    pub hit_soft_17: bool,
    /// The maximum number of hands after splitting aces.
    pub resplit_aces: u8,
    /// The maximum number of hands after splitting non-aces.
    pub resplit_upto: u8,
    /// Whether any two ten-valued cards may be split, not just equal ranks.
    pub split_uneven: bool,
}

impl Rule {
    /// The Vegas Strip rule variation.
    pub fn vegas_strip() -> Rule {
        Rule {
            shoe_size: 4,
            reshuffle_threshold: 0.25,
            agent_chips: 600.0,
            blackjack_payout: 1.5,
            blackjack_with_split_aces: false,
            dealer_peeks: true,
            double_after_split: true,
            hit_after_split_aces: false,
            hit_soft_17: false,
            resplit_aces: 2,
            resplit_upto: 4,
            split_uneven: true,
        }
    }

    /// Checks that the rule stays inside the envelope the solver supports.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.blackjack_payout != 1.5 {
            return Err(RuleError::UnsupportedBlackjackPayout(
                self.blackjack_payout,
            ));
        }
        if self.shoe_size == 0 || self.shoe_size >= 25 {
            return Err(RuleError::UnsupportedShoeSize(self.shoe_size));
        }
        if !self.dealer_peeks {
            return Err(RuleError::DealerMustPeek);
        }
        if !(0.0..1.0).contains(&self.reshuffle_threshold) {
            return Err(RuleError::InvalidReshuffleThreshold(
                self.reshuffle_threshold,
            ));
        }
        Ok(())
    }
}

/// Errors raised when a rule variation falls outside the supported envelope.
/// Surfaced once, at solver or table construction.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unsupported blackjack payout {0} (only 3:2 is supported)")]
    UnsupportedBlackjackPayout(f64),

    #[error("unsupported shoe size {0} (must be between 1 and 24 decks)")]
    UnsupportedShoeSize(u8),

    #[error("the dealer must peek for blackjack under this engine")]
    DealerMustPeek,

    #[error("reshuffle threshold {0} must lie in [0, 1)")]
    InvalidReshuffleThreshold(f64),
}

/// A playing decision, as produced by a strategist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Split,
    Double,
    Hit,
    Stand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum StrategistKind {
    Basic,
    Optimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum BettorKind {
    Constant,
    Kelly,
    Vector,
}
