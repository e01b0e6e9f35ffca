//! Splitting a pair into two sub-hands.
//!
//! A single sub-hand distribution is accumulated over the card drawn onto
//! the split card, then self-convolved: given the post-deal shoe the two
//! sub-hands are treated as independent and identically distributed. The
//! sub-hands really share one shoe drawn sequentially, so the convolution
//! is an approximation, inherited knowingly from the reference treatment.

use super::RewardSolver;
use crate::distribution::RewardDistribution;
use crate::statearray::{Mode, StateKey, NUM_RANKS};
use crate::{card_value, Card};

impl RewardSolver {
    /// Dispatches a splittable hand to the right specialized entry: aces,
    /// tens, or a general pair holding twice `player_total / 2`.
    pub fn distr_split(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        if player_aces > 0 {
            return self.distr_split_aces(dealer_total);
        }
        if player_total == 20 {
            return self.distr_split_tens(dealer_total);
        }
        debug_assert!(
            player_total % 2 == 0,
            "only even totals describe a splittable pair"
        );
        self.distr_split_general(player_total / 2, dealer_total)
    }

    /// Splitting a pair of equal-valued cards other than aces and tens.
    pub fn distr_split_general(
        &mut self,
        split_value: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        let key = StateKey::new(&self.shoe, split_value, dealer_total, 0, Mode::Split);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let mut sub_hand = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = self.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            self.shoe.remove_card(card);
            let drawn = self.play_split_hand(split_value + value, u16::from(value == 11), dealer_total);
            self.shoe.add_card(card);
            sub_hand.add_scaled(&drawn, p);
        }

        let split = sub_hand.self_convolve();
        self.cache[key] = split;
        split
    }

    /// Splitting two ten-valued cards. An ace drawn onto a ten makes a
    /// blackjack and is credited before the convolution; every other card
    /// plays out as an ordinary hand.
    pub fn distr_split_tens(&mut self, dealer_total: u16) -> RewardDistribution {
        let key = StateKey::new(&self.shoe, 10, dealer_total, 0, Mode::Split);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let mut sub_hand = RewardDistribution::empty();
        sub_hand.add_scaled(&RewardDistribution::BLACKJACK, self.card_probability(1, 0));
        for card in 2..=NUM_RANKS as Card {
            let p = self.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            self.shoe.remove_card(card);
            let drawn = self.play_split_hand(10 + value, 0, dealer_total);
            self.shoe.add_card(card);
            sub_hand.add_scaled(&drawn, p);
        }

        let split = sub_hand.self_convolve();
        self.cache[key] = split;
        split
    }

    /// Splitting a pair of aces. Most variations force a stand after the
    /// one drawn card; a ten-valued card completes either a blackjack
    /// payout or a plain 21, depending on the rule.
    pub fn distr_split_aces(&mut self, dealer_total: u16) -> RewardDistribution {
        let key = StateKey::new(&self.shoe, 11, dealer_total, 1, Mode::Split);
        if self.cache.contains_state(key) {
            return self.cache[key];
        }

        let dealer_aces = u16::from(dealer_total == 11);
        let mut sub_hand = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = self.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);

            if value == 10 {
                if self.rule.blackjack_with_split_aces {
                    sub_hand.add_scaled(&RewardDistribution::BLACKJACK, p);
                } else {
                    self.shoe.remove_card(card);
                    let drawn = self.distr_stand(21, dealer_aces, dealer_total, true);
                    self.shoe.add_card(card);
                    sub_hand.add_scaled(&drawn, p);
                }
                continue;
            }

            self.shoe.remove_card(card);
            let drawn = if self.rule.hit_after_split_aces {
                self.play_split_hand(11 + value, 1 + u16::from(value == 11), dealer_total)
            } else {
                let mut total = 11 + value;
                let mut aces = 1 + u16::from(value == 11);
                while total > 21 && aces > 0 {
                    total -= 10;
                    aces -= 1;
                }
                self.distr_stand(total, dealer_aces, dealer_total, true)
            };
            self.shoe.add_card(card);
            sub_hand.add_scaled(&drawn, p);
        }

        let split = sub_hand.self_convolve();
        self.cache[key] = split;
        split
    }

    /// Plays out one sub-hand after a split: with doubling if the rule
    /// allows doubling after splits, plain hit-or-stand otherwise.
    fn play_split_hand(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
    ) -> RewardDistribution {
        if self.rule.double_after_split {
            self.distr_hit_stand_double(player_total, player_aces, dealer_total)
        } else {
            self.distr_hit_stand(player_total, player_aces, dealer_total)
        }
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
    fn split_mass_stays_within_one() {
        let mut solver = solver_with_decks(1);
        for split_value in [2, 6, 8] {
            let split = solver.distr_split_general(split_value, 10);
            let mass = split.total_mass();
            assert!(mass <= 1.0 + 1e-9, "mass {mass} exceeds one");
            assert_relative_eq!(mass, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn shoe_is_restored_after_splitting() {
        let mut solver = solver_with_decks(1);
        let before = solver.shoe().clone();
        let _ = solver.distr_split(16, 0, 10);
        let _ = solver.distr_split_tens(6);
        let _ = solver.distr_split_aces(11);
        assert_eq!(*solver.shoe(), before);
    }

    #[test]
    fn split_expectation_doubles_the_sub_hand() {
        let mut solver = solver_with_decks(1);
        solver.set_shoe(&single_deck_without(&[8, 8, 6]));

        // Rebuild the single sub-hand mixture through the public entries.
        let mut sub_hand = RewardDistribution::empty();
        for card in 1..=NUM_RANKS as Card {
            let p = solver.card_probability(card, 0);
            if p == 0.0 {
                continue;
            }
            let value = card_value(card);
            let mut shoe = solver.shoe().clone();
            shoe.remove_card(card);
            solver.set_shoe(&shoe);
            let drawn =
                solver.distr_hit_stand_double(8 + value, u16::from(value == 11), 6);
            shoe.add_card(card);
            solver.set_shoe(&shoe);
            sub_hand.add_scaled(&drawn, p);
        }

        let split = solver.distr_split_general(8, 6);
        assert_relative_eq!(
            split.expected_payout(),
            2.0 * sub_hand.expected_payout(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn eights_against_ten_beat_playing_sixteen() {
        let mut solver = solver_with_decks(1);
        solver.set_shoe(&single_deck_without(&[8, 8, 10]));
        let split = solver.distr_split(16, 0, 10);
        let played = solver.distr_hit_stand_double(16, 0, 10);
        assert!(split.expected_payout() > played.expected_payout());
    }

    #[test]
    fn splitting_tens_is_worse_than_standing_on_twenty() {
        let mut solver = solver_with_decks(1);
        solver.set_shoe(&single_deck_without(&[10, 10, 10]));
        let split = solver.distr_split_tens(10);
        let played = solver.distr_hit_stand_double(20, 0, 10);
        assert!(played.expected_payout() > split.expected_payout());
    }

    #[test]
    fn split_aces_dominate_playing_soft_twelve() {
        let mut solver = solver_with_decks(1);
        for dealer_up in 2..=11 {
            solver.free_mem();
            let mut shoe = CardCount::with_decks(1);
            shoe.remove_card(1);
            shoe.remove_card(1);
            solver.set_shoe(&shoe);
            let split = solver.distr_split_aces(dealer_up);
            let played = solver.distr_hit_stand_double(12, 1, dealer_up);
            assert!(
                split.expected_payout() > played.expected_payout(),
                "split aces should dominate against {dealer_up}"
            );
        }
    }

    #[test]
    fn double_after_split_never_hurts() {
        let shoe = single_deck_without(&[6, 6, 9]);

        let mut with_das = RewardSolver::new(&Rule::vegas_strip(), |x| x).unwrap();
        with_das.set_shoe(&shoe);
        let das = with_das.distr_split(12, 0, 9).expected_payout();

        let mut rule = Rule::vegas_strip();
        rule.double_after_split = false;
        let mut without_das = RewardSolver::new(&rule, |x| x).unwrap();
        without_das.set_shoe(&shoe);
        let no_das = without_das.distr_split(12, 0, 9).expected_payout();

        assert!(das >= no_das - 1e-12);
    }

    #[test]
    fn blackjack_with_split_aces_raises_the_payout() {
        let shoe = single_deck_without(&[1, 1, 6]);

        let mut rule = Rule::vegas_strip();
        rule.blackjack_with_split_aces = true;
        let mut premium = RewardSolver::new(&rule, |x| x).unwrap();
        premium.set_shoe(&shoe);
        let with_bonus = premium.distr_split_aces(6).expected_payout();

        let mut plain = RewardSolver::new(&Rule::vegas_strip(), |x| x).unwrap();
        plain.set_shoe(&shoe);
        let without_bonus = plain.distr_split_aces(6).expected_payout();

        assert!(with_bonus > without_bonus);
    }
}
