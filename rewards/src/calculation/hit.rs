//! Hitting, doubling down and the max-utility choices between them.

use super::RewardSolver;
use crate::distribution::RewardDistribution;
use crate::statearray::{Mode, StateKey, NUM_RANKS};
use crate::{card_value, Card};

impl RewardSolver {
    /// The payout distribution when the player hits once and then keeps
    /// playing optimally.
    pub fn distr_hit(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        if player_total > 21 {
            if player_aces > 0 {
                return self.distr_hit(player_total - 10, player_aces - 1, dealer_total);
            }
            return RewardDistribution::LOSE;
        }

        let key = StateKey::new(&self.shoe, player_total, dealer_total, player_aces, Mode::Hit);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let mut accumulated = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = self.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            self.shoe.remove_card(card);
            let drawn = self.distr_hit_stand(
                player_total + value,
                player_aces + u16::from(value == 11),
                dealer_total,
            );
            self.shoe.add_card(card);
            accumulated.add_scaled(&drawn, p);
        }

        self.cache[key] = accumulated;
        accumulated
    }

    /// The payout distribution of doubling down: exactly one more card,
    /// a forced stand and a doubled payout.
    pub fn distr_double(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        let key = StateKey::new(
            &self.shoe,
            player_total,
            dealer_total,
            player_aces,
            Mode::Double,
        );
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let dealer_aces = u16::from(dealer_total == 11);
        let mut accumulated = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = self.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            let mut total = player_total + value;
            let mut aces = player_aces + u16::from(value == 11);
            while total > 21 && aces > 0 {
                total -= 10;
                aces -= 1;
            }
            self.shoe.remove_card(card);
            let drawn = if total > 21 {
                RewardDistribution::LOSE
            } else {
                self.distr_stand(total, dealer_aces, dealer_total, true)
            };
            self.shoe.add_card(card);
            accumulated.add_scaled(&drawn, p);
        }

        let doubled = accumulated.double_payout();
        self.cache[key] = doubled;
        doubled
    }

    /// The better of hitting and standing, under the solver's utility.
    pub fn distr_hit_stand(
        &mut self,
        mut player_total: u16,
        mut player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        while player_total > 21 && player_aces > 0 {
            player_total -= 10;
            player_aces -= 1;
        }
        if player_total > 21 {
            return RewardDistribution::LOSE;
        }
        let stand = self.distr_stand(
            player_total,
            u16::from(dealer_total == 11),
            dealer_total,
            true,
        );
        let hit = self.distr_hit(player_total, player_aces, dealer_total);
        self.pick(hit, stand)
    }

    /// The best of hitting, standing and doubling down. A two-card 21 is a
    /// natural and resolves through the blackjack entry instead.
    pub fn distr_hit_stand_double(
        &mut self,
        mut player_total: u16,
        mut player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        while player_total > 21 && player_aces > 0 {
            player_total -= 10;
            player_aces -= 1;
        }
        if player_total > 21 {
            return RewardDistribution::LOSE;
        }
        if player_total == 21 {
            return self.distr_blackjack(dealer_total);
        }
        let mut best = self.distr_stand(
            player_total,
            u16::from(dealer_total == 11),
            dealer_total,
            true,
        );
        let hit = self.distr_hit(player_total, player_aces, dealer_total);
        best = self.pick(hit, best);
        let doubled = self.distr_double(player_total, player_aces, dealer_total);
        best = self.pick(doubled, best);
        best
    }
}
