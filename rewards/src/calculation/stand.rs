//! Standing: the dealer draws to completion against a fixed player total.

use std::cmp::Ordering;

use super::RewardSolver;
use crate::distribution::RewardDistribution;
use crate::statearray::{Mode, StateKey, NUM_RANKS};
use crate::{card_value, Card};

impl RewardSolver {
    /// The payout distribution when the player stands on `player_total` and
    /// the dealer, holding `dealer_total` with `dealer_aces` soft aces,
    /// draws until the rules stop her.
    ///
    /// `first_call` marks the hidden-card draw. Because the dealer has
    /// already peeked, a ten up-card cannot hide an ace and an ace up-card
    /// cannot hide a ten: the corresponding value is banned from the first
    /// draw and the remaining probabilities are renormalized.
    pub fn distr_stand(
        &mut self,
        player_total: u16,
        dealer_aces: u16,
        dealer_total: u16,
        first_call: bool,
    ) -> RewardDistribution {
        if dealer_total > 21 {
            if dealer_aces > 0 {
                return self.distr_stand(player_total, dealer_aces - 1, dealer_total - 10, false);
            }
            return RewardDistribution::WIN;
        }

        let dealer_stands = dealer_total > 17
            || dealer_total == 17 && (dealer_aces == 0 || !self.rule.hit_soft_17);
        if dealer_stands {
            return match player_total.cmp(&dealer_total) {
                Ordering::Less => RewardDistribution::LOSE,
                Ordering::Equal => RewardDistribution::TIE,
                Ordering::Greater => RewardDistribution::WIN,
            };
        }

        let mode = if first_call {
            Mode::StandFirst
        } else {
            Mode::StandRest
        };
        let key = StateKey::new(&self.shoe, player_total, dealer_total, dealer_aces, mode);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let banned_value = match dealer_total {
            10 if first_call => 11,
            11 if first_call => 10,
            _ => 0,
        };

        let mut accumulated = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = self.card_probability(card, banned_value);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            self.shoe.remove_card(card);
            let drawn = self.distr_stand(
                player_total,
                dealer_aces + u16::from(value == 11),
                dealer_total + value,
                false,
            );
            self.shoe.add_card(card);
            accumulated.add_scaled(&drawn, p);
        }

        self.cache[key] = accumulated;
        accumulated
    }

    /// The payout distribution of a two-card 21.
    ///
    /// Against a small up-card the natural simply pays 3:2. Against a ten
    /// or an ace the peek already ruled the dealer natural out for this
    /// round, but the pre-peek chance of it still discounts the payout:
    /// with probability `p` the round would have ended in a push instead.
    pub fn distr_blackjack(&mut self, dealer_total: u16) -> RewardDistribution {
        if dealer_total < 10 {
            return RewardDistribution::BLACKJACK;
        }

        let key = StateKey::new(&self.shoe, 21, dealer_total, 1, Mode::Blackjack);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let total = self.shoe.get_total() as f64;
        let matching = if dealer_total == 10 {
            self.shoe[1] as u16
        } else {
            (10..=NUM_RANKS as Card).map(|card| self.shoe[card] as u16).sum()
        };
        let p_natural = if total == 0.0 {
            0.0
        } else {
            matching as f64 / total
        };

        let mut distribution = RewardDistribution::empty();
        distribution.add_scaled(&RewardDistribution::TIE, p_natural);
        distribution.add_scaled(&RewardDistribution::BLACKJACK, 1.0 - p_natural);
        self.cache[key] = distribution;
        distribution
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{single_deck_without, solver_with_decks};
    use super::*;
    use crate::statearray::CardCount;
    use crate::Rule;
    use approx::assert_relative_eq;

    #[test]
    fn standing_dealer_compares_totals() {
        let mut solver = solver_with_decks(1);
        assert_eq!(
            solver.distr_stand(20, 0, 18, true),
            RewardDistribution::WIN
        );
        assert_eq!(
            solver.distr_stand(18, 0, 18, true),
            RewardDistribution::TIE
        );
        assert_eq!(
            solver.distr_stand(17, 0, 18, true),
            RewardDistribution::LOSE
        );
    }

    #[test]
    fn busted_dealer_demotes_aces_before_losing() {
        let mut solver = solver_with_decks(1);
        // Soft 22 is really a hard 12, which keeps drawing; only a hard
        // bust pays the player outright.
        assert_eq!(
            solver.distr_stand(20, 0, 22, false),
            RewardDistribution::WIN
        );
        let soft = solver.distr_stand(20, 1, 22, false);
        assert!(soft.expected_payout() < 1.0);
        assert_relative_eq!(soft.total_mass(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn draw_distributions_carry_unit_mass() {
        let mut solver = solver_with_decks(1);
        for dealer_up in [2, 6, 10, 11] {
            let aces = u16::from(dealer_up == 11);
            let distribution = solver.distr_stand(18, aces, dealer_up, true);
            assert_relative_eq!(distribution.total_mass(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn shoe_is_restored_after_standing() {
        let mut solver = solver_with_decks(2);
        let before = solver.shoe().clone();
        let _ = solver.distr_stand(19, 0, 7, true);
        assert_eq!(*solver.shoe(), before);
    }

    #[test]
    fn soft_17_rule_changes_the_outcome() {
        let shoe = CardCount::with_decks(1);
        let mut stand_17 = RewardSolver::new(&Rule::vegas_strip(), |x| x).unwrap();
        stand_17.set_shoe(&shoe);
        // Standing on a soft 17 pushes against the player's 17.
        assert_eq!(
            stand_17.distr_stand(17, 1, 17, false),
            RewardDistribution::TIE
        );

        let mut rule = Rule::vegas_strip();
        rule.hit_soft_17 = true;
        let mut hit_17 = RewardSolver::new(&rule, |x| x).unwrap();
        hit_17.set_shoe(&shoe);
        let drawn = hit_17.distr_stand(17, 1, 17, false);
        assert_ne!(drawn, RewardDistribution::TIE);
        assert_relative_eq!(drawn.total_mass(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn peek_ban_empties_an_all_ten_shoe() {
        // Every remaining card is ten-valued and the dealer shows an ace:
        // the peek rule rules them all out of the first draw, so the branch
        // contributes nothing at all.
        let mut solver = solver_with_decks(1);
        let mut counts = [0; NUM_RANKS];
        counts[9] = 4;
        counts[12] = 4;
        solver.set_shoe(&CardCount::new(&counts));
        let distribution = solver.distr_stand(18, 1, 11, true);
        assert_eq!(distribution.total_mass(), 0.0);
    }

    #[test]
    fn blackjack_against_small_up_card_pays_full() {
        let mut solver = solver_with_decks(1);
        for dealer_up in 2..=9 {
            assert_eq!(
                solver.distr_blackjack(dealer_up),
                RewardDistribution::BLACKJACK
            );
        }
    }

    #[test]
    fn blackjack_against_ace_discounts_by_the_peek_chance() {
        let mut solver = solver_with_decks(1);
        solver.set_shoe(&single_deck_without(&[1, 10, 1]));
        let distribution = solver.distr_blackjack(11);
        // 15 ten-valued cards remain out of 49.
        let p_push = 15.0 / 49.0;
        assert_relative_eq!(distribution.get(8), p_push, epsilon = 1e-12);
        assert_relative_eq!(distribution.get(11), 1.0 - p_push, epsilon = 1e-12);
        assert_relative_eq!(distribution.total_mass(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn blackjack_against_ten_discounts_by_the_ace_chance() {
        let mut solver = solver_with_decks(1);
        solver.set_shoe(&single_deck_without(&[1, 13, 10]));
        let distribution = solver.distr_blackjack(10);
        let p_push = 3.0 / 49.0;
        assert_relative_eq!(distribution.get(8), p_push, epsilon = 1e-12);
        assert_relative_eq!(distribution.get(11), 1.0 - p_push, epsilon = 1e-12);
    }
}
