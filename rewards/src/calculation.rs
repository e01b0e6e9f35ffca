//! The recursive, memoized reward-distribution solver.
//!
//! Given the exact multiset of cards left in the shoe, the dealer up-card
//! and the player hand, the solver computes the full payout distribution of
//! every legal action by recursing through draws, demoting soft aces on the
//! way, and memoizing each `(shoe, hand, mode)` state under its bijective
//! 128-bit key. The shoe acts as a mutable scratch area: every transient
//! decrement is paired with a restore, so the net change across any public
//! entry is zero.

mod hit;
mod split;
mod stand;

use crate::distribution::{RewardDistribution, NUM_BUCKETS};
use crate::statearray::{CardCount, StateArray, NUM_RANKS};
use crate::{card_value, Card, Rule, RuleError};

pub struct RewardSolver {
    rule: Rule,
    utility: [f64; NUM_BUCKETS],
    shoe: CardCount,
    cache: StateArray<RewardDistribution>,
}

impl RewardSolver {
    /// Builds a solver for one rule variation and utility function. The
    /// utility callable is evaluated exactly once per payout bucket and
    /// never re-entered afterwards.
    pub fn new<F>(rule: &Rule, utility_fn: F) -> Result<RewardSolver, RuleError>
    where
        F: Fn(f64) -> f64,
    {
        rule.validate()?;
        let mut utility = [0.0; NUM_BUCKETS];
        for (bucket, entry) in utility.iter_mut().enumerate() {
            *entry = utility_fn(RewardDistribution::bucket_payout(bucket));
        }
        Ok(RewardSolver {
            rule: *rule,
            utility,
            shoe: CardCount::new(&[0; NUM_RANKS]),
            cache: StateArray::new(),
        })
    }

    /// Replaces the working shoe. Cached distributions stay valid because
    /// every key embeds the shoe counts.
    pub fn set_shoe(&mut self, shoe: &CardCount) {
        self.shoe = shoe.clone();
    }

    pub fn shoe(&self) -> &CardCount {
        &self.shoe
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Drops every cached distribution.
    pub fn free_mem(&mut self) {
        tracing::debug!(entries = self.cache.len(), "releasing reward cache");
        self.cache.clear();
    }

    /// The expected utility of a distribution under this solver's table.
    pub fn expected_utility(&self, distribution: &RewardDistribution) -> f64 {
        distribution.expected_utility(&self.utility)
    }

    /// The probability of drawing the given card from the working shoe.
    ///
    /// A non-zero `banned_value` removes every card of that blackjack value
    /// from the draw: under the peek rule a dealer showing a ten cannot
    /// hide an ace (value 11) and a dealer showing an ace cannot hide a
    /// ten-valued card.
    pub(crate) fn card_probability(&self, card: Card, banned_value: u16) -> f64 {
        if banned_value != 0 && card_value(card) == banned_value {
            return 0.0;
        }
        let mut total = self.shoe.get_total();
        if banned_value != 0 {
            for rank in 1..=NUM_RANKS as Card {
                if card_value(rank) == banned_value {
                    total -= self.shoe[rank] as u16;
                }
            }
        }
        if total == 0 {
            return 0.0;
        }
        self.shoe[card] as f64 / total as f64
    }

    /// The choice rule: the challenger wins only with strictly larger
    /// expected utility, so ties keep the incumbent.
    fn pick(
        &self,
        challenger: RewardDistribution,
        incumbent: RewardDistribution,
    ) -> RewardDistribution {
        if challenger.expected_utility(&self.utility) > incumbent.expected_utility(&self.utility) {
            challenger
        } else {
            incumbent
        }
    }
}
