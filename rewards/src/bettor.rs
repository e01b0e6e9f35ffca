//! Bettors: sizing the next bet from the bankroll and the remaining shoe.

use crate::calculation::RewardSolver;
use crate::distribution::{RewardDistribution, NUM_BUCKETS};
use crate::statearray::{CardCount, NUM_RANKS};
use crate::{card_value, BettorKind, Card, Rule, RuleError};

/// Produces bet sizes from the player's chips and the distribution of cards
/// remaining in the shoe.
pub trait Bettor {
    fn get_bet_size(&mut self, chips: f64, shoe: &CardCount) -> f64;
}

/// Builds the bettor registered under the given name.
pub fn create_bettor(kind: BettorKind, rule: &Rule) -> Result<Box<dyn Bettor>, RuleError> {
    match kind {
        BettorKind::Constant => Ok(Box::new(ConstantBettor)),
        BettorKind::Kelly => Ok(Box::new(KellyBettor::new(rule)?)),
        BettorKind::Vector => Ok(Box::new(VectorBettor::hi_lo(rule.shoe_size))),
    }
}

/// Always bets the table minimum.
pub struct ConstantBettor;

impl Bettor for ConstantBettor {
    fn get_bet_size(&mut self, _chips: f64, _shoe: &CardCount) -> f64 {
        1.0
    }
}

/// Bets the true count of a card-counting vector, minus one.
///
/// The running count weighs every card already removed from the shoe; the
/// true count divides by the number of decks left. Callers clamp the result
/// into their own bet limits, so negative values simply mean "minimum".
pub struct VectorBettor {
    shoe_size: u8,
    vector: [f64; NUM_RANKS + 1],
}

impl VectorBettor {
    pub fn new(shoe_size: u8, vector: [f64; NUM_RANKS + 1]) -> VectorBettor {
        VectorBettor { shoe_size, vector }
    }

    /// The classic Hi-Lo count: low cards +1, neutral 7..9, tens and aces -1.
    pub fn hi_lo(shoe_size: u8) -> VectorBettor {
        let mut vector = [0.0; NUM_RANKS + 1];
        for rank in 2..=6 {
            vector[rank] = 1.0;
        }
        vector[1] = -1.0;
        for rank in 10..=13 {
            vector[rank] = -1.0;
        }
        VectorBettor::new(shoe_size, vector)
    }

    fn running_count(&self, shoe: &CardCount) -> f64 {
        let full = (self.shoe_size as f64) * 4.0;
        (1..=NUM_RANKS as Card)
            .map(|card| self.vector[card as usize] * (full - shoe[card] as f64))
            .sum()
    }

    fn true_count(&self, shoe: &CardCount) -> f64 {
        let decks_left = shoe.get_total() as f64 / 52.0;
        self.running_count(shoe) / decks_left
    }
}

impl Bettor for VectorBettor {
    fn get_bet_size(&mut self, _chips: f64, shoe: &CardCount) -> f64 {
        if shoe.get_total() == 0 {
            return 1.0;
        }
        self.true_count(shoe) - 1.0
    }
}

/// Bets the Kelly-optimal fraction of the bankroll.
///
/// The bettor integrates the solver over every possible initial deal to get
/// the pre-deal payout distribution of one optimally played round, then
/// maximizes expected log-wealth over the bet size.
pub struct KellyBettor {
    solver: RewardSolver,
}

impl KellyBettor {
    pub fn new(rule: &Rule) -> Result<KellyBettor, RuleError> {
        Ok(KellyBettor {
            solver: RewardSolver::new(rule, |x| x)?,
        })
    }

    /// The payout distribution of the next round before any card is dealt.
    ///
    /// Every ordered triple (player's first and second card, dealer
    /// up-card) is weighed by its sequential draw probability. The dealer's
    /// chance of a natural is taken over the full pre-deal shoe: the peek
    /// happens at deal time, before any further decision.
    fn pre_deal_distribution(&mut self, shoe: &CardCount) -> RewardDistribution {
        let mut aggregate = RewardDistribution::empty();
        let full_total = shoe.get_total();
        if full_total < 3 {
            return aggregate;
        }
        let split_uneven = self.solver.rule().split_uneven;

        let mut working = shoe.clone();
        for first in 1..=NUM_RANKS as Card {
            if working[first] == 0 {
                continue;
            }
            let p_first = working[first] as f64 / full_total as f64;
            working.remove_card(first);
            for second in 1..=NUM_RANKS as Card {
                if working[second] == 0 {
                    continue;
                }
                let p_second = working[second] as f64 / (full_total - 1) as f64;
                working.remove_card(second);
                for shown in 1..=NUM_RANKS as Card {
                    if working[shown] == 0 {
                        continue;
                    }
                    let p_shown = working[shown] as f64 / (full_total - 2) as f64;
                    working.remove_card(shown);
                    let p = p_first * p_second * p_shown;

                    let first_value = card_value(first);
                    let second_value = card_value(second);
                    let mut player_total = first_value + second_value;
                    let mut player_aces =
                        u16::from(first_value == 11) + u16::from(second_value == 11);
                    while player_total > 21 && player_aces > 0 {
                        player_total -= 10;
                        player_aces -= 1;
                    }
                    let dealer_total = card_value(shown);

                    self.solver.set_shoe(&working);
                    let mut played =
                        self.solver
                            .distr_hit_stand_double(player_total, player_aces, dealer_total);
                    let splittable =
                        first == second || split_uneven && first_value == second_value;
                    if splittable {
                        let split =
                            self.solver
                                .distr_split(player_total, player_aces, dealer_total);
                        if self.solver.expected_utility(&split)
                            > self.solver.expected_utility(&played)
                        {
                            played = split;
                        }
                    }

                    let q = dealer_blackjack_probability(shoe, dealer_total);
                    aggregate.add_scaled(&played, p * (1.0 - q));
                    let early_end = if player_total == 21 {
                        RewardDistribution::TIE
                    } else {
                        RewardDistribution::LOSE
                    };
                    aggregate.add_scaled(&early_end, p * q);

                    working.add_card(shown);
                }
                working.add_card(second);
            }
            working.add_card(first);
        }
        aggregate
    }
}

impl Bettor for KellyBettor {
    fn get_bet_size(&mut self, chips: f64, shoe: &CardCount) -> f64 {
        let aggregate = self.pre_deal_distribution(shoe);
        self.solver.free_mem();
        optimal_bet(&aggregate, chips)
    }
}

/// The probability that the dealer's two cards form a natural, given the
/// shown card.
fn dealer_blackjack_probability(shoe: &CardCount, dealer_value: u16) -> f64 {
    let total = shoe.get_total() as f64;
    match dealer_value {
        11 => (10..=NUM_RANKS as Card)
            .map(|card| shoe[card] as f64)
            .sum::<f64>()
            / total,
        10 => shoe[1] as f64 / total,
        _ => 0.0,
    }
}

/// Maximizes `E[ln(1 + chips + w * x)]` over bet sizes `x` in `[1, chips]`.
///
/// Every log term is concave in `x`, so the derivative decreases and at
/// most one stationary point exists where the objective is defined; it is
/// bracketed by bisection and compared against the interval ends. A bet of
/// one is the default whenever nothing better is admissible.
fn optimal_bet(distribution: &RewardDistribution, chips: f64) -> f64 {
    if chips <= 1.0 {
        return 1.0;
    }
    let base = 1.0 + chips;

    let objective = |x: f64| -> f64 {
        let mut value = 0.0;
        for bucket in 0..NUM_BUCKETS {
            let mass = distribution.get(bucket);
            if mass == 0.0 {
                continue;
            }
            let argument = base + RewardDistribution::bucket_payout(bucket) * x;
            if argument <= 0.0 {
                return f64::NEG_INFINITY;
            }
            value += mass * argument.ln();
        }
        value
    };
    let derivative = |x: f64| -> f64 {
        let mut slope = 0.0;
        for bucket in 0..NUM_BUCKETS {
            let mass = distribution.get(bucket);
            if mass == 0.0 {
                continue;
            }
            let payout = RewardDistribution::bucket_payout(bucket);
            slope += mass * payout / (base + payout * x);
        }
        slope
    };

    // The objective is only defined while the wealth stays positive in the
    // worst losing bucket, which caps the searchable interval.
    let mut upper = chips;
    for bucket in 0..NUM_BUCKETS {
        if distribution.get(bucket) == 0.0 {
            continue;
        }
        let payout = RewardDistribution::bucket_payout(bucket);
        if payout < 0.0 {
            upper = upper.min(-base / payout * (1.0 - 1e-12));
        }
    }
    if upper <= 1.0 {
        return 1.0;
    }

    let mut candidates = vec![upper];
    if derivative(1.0) > 0.0 && derivative(upper) < 0.0 {
        let (mut low, mut high) = (1.0, upper);
        for _ in 0..128 {
            let mid = 0.5 * (low + high);
            if derivative(mid) > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
        }
        candidates.push(0.5 * (low + high));
    }

    let mut best = 1.0;
    let mut best_value = objective(1.0);
    for &candidate in &candidates {
        let value = objective(candidate);
        if value.is_finite() && value > best_value {
            best = candidate;
            best_value = value;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constant_bettor_bets_the_minimum() {
        let mut bettor = ConstantBettor;
        assert_eq!(bettor.get_bet_size(500.0, &CardCount::with_decks(4)), 1.0);
    }

    #[test]
    fn vector_bettor_counts_removed_cards() {
        let mut vector = [0.0; NUM_RANKS + 1];
        vector[1] = -1.0;
        for rank in 2..=6 {
            vector[rank] = 1.0;
        }
        for rank in 10..=13 {
            vector[rank] = -1.0;
        }
        let mut bettor = VectorBettor::new(4, vector);

        // Nothing removed: the true count is zero and the bet is -1.
        assert_relative_eq!(
            bettor.get_bet_size(500.0, &CardCount::with_decks(4)),
            -1.0
        );

        // All twos through sixes gone: running count 80 over 128/52 decks.
        let stripped =
            CardCount::from_distribution(&[0, 16, 0, 0, 0, 0, 0, 16, 16, 16, 16, 16, 16, 16]);
        assert_relative_eq!(bettor.get_bet_size(500.0, &stripped), 31.5);
    }

    #[test]
    fn hi_lo_matches_the_handwritten_vector() {
        let mut preset = VectorBettor::hi_lo(4);
        let mut handwritten = [0.0; NUM_RANKS + 1];
        handwritten[1] = -1.0;
        for rank in 2..=6 {
            handwritten[rank] = 1.0;
        }
        for rank in 10..=13 {
            handwritten[rank] = -1.0;
        }
        let mut by_hand = VectorBettor::new(4, handwritten);
        let mut counts = [16; NUM_RANKS];
        counts[0] = 3;
        counts[4] = 9;
        let shoe = CardCount::new(&counts);
        assert_relative_eq!(
            preset.get_bet_size(100.0, &shoe),
            by_hand.get_bet_size(100.0, &shoe)
        );
    }

    #[test]
    fn kelly_fraction_on_a_fair_coin_with_edge() {
        // 60/40 on even money: the stationary point is 0.2 * (1 + chips).
        let mut distribution = RewardDistribution::empty();
        distribution.add_scaled(&RewardDistribution::WIN, 0.6);
        distribution.add_scaled(&RewardDistribution::LOSE, 0.4);
        assert_relative_eq!(optimal_bet(&distribution, 100.0), 20.2, epsilon = 1e-6);
    }

    #[test]
    fn hopeless_games_bet_the_minimum() {
        let mut distribution = RewardDistribution::empty();
        distribution.add_scaled(&RewardDistribution::WIN, 0.4);
        distribution.add_scaled(&RewardDistribution::LOSE, 0.6);
        assert_eq!(optimal_bet(&distribution, 100.0), 1.0);
        assert_eq!(optimal_bet(&RewardDistribution::LOSE, 100.0), 1.0);
    }

    #[test]
    fn sure_wins_bet_everything() {
        assert_relative_eq!(optimal_bet(&RewardDistribution::WIN, 50.0), 50.0);
    }

    #[test]
    fn deep_losses_cap_the_candidate_interval() {
        // Mass at -4 makes any bet beyond (1 + chips) / 4 lose more than
        // the whole bankroll; the optimum must stay inside that bound.
        let mut distribution = RewardDistribution::empty();
        distribution.add_scaled(&RewardDistribution::WIN, 0.9);
        distribution.add_scaled(&RewardDistribution::constant(-4.0), 0.1);
        let bet = optimal_bet(&distribution, 100.0);
        assert!(bet > 1.0);
        assert!(bet < 101.0 / 4.0);
    }

    #[test]
    fn tiny_bankrolls_bet_the_minimum() {
        assert_eq!(optimal_bet(&RewardDistribution::WIN, 0.5), 1.0);
    }

    #[test]
    fn pre_deal_distribution_on_a_small_shoe() {
        let mut bettor = KellyBettor::new(&Rule::vegas_strip()).unwrap();
        let mut counts = [0; NUM_RANKS];
        counts[4] = 2; // fives
        counts[8] = 2; // nines
        counts[12] = 2; // kings
        let shoe = CardCount::new(&counts);
        let aggregate = bettor.pre_deal_distribution(&shoe);
        assert_relative_eq!(aggregate.total_mass(), 1.0, epsilon = 1e-9);
        bettor.solver.free_mem();
    }

    #[test]
    fn kelly_bet_stays_in_bounds_on_a_small_shoe() {
        let mut bettor = KellyBettor::new(&Rule::vegas_strip()).unwrap();
        let mut counts = [0; NUM_RANKS];
        counts[0] = 2;
        counts[6] = 3;
        counts[9] = 3;
        let shoe = CardCount::new(&counts);
        let bet = bettor.get_bet_size(40.0, &shoe);
        assert!(bet >= 1.0);
        assert!(bet <= 40.0);
    }

    #[test]
    #[ignore]
    fn kelly_bets_the_minimum_on_a_neutral_shoe() {
        let mut bettor = KellyBettor::new(&Rule::vegas_strip()).unwrap();
        let bet = bettor.get_bet_size(500.0, &CardCount::with_decks(4));
        assert_eq!(bet, 1.0);
    }

    #[test]
    #[ignore]
    fn kelly_raises_on_an_ace_ten_rich_shoe() {
        let mut bettor = KellyBettor::new(&Rule::vegas_strip()).unwrap();
        let shoe =
            CardCount::from_distribution(&[0, 16, 0, 0, 0, 0, 0, 16, 16, 16, 16, 16, 16, 16]);
        let bet = bettor.get_bet_size(500.0, &shoe);
        assert!(bet > 10.0);
        assert!(bet < 500.0);
    }
}
