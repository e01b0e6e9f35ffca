//! Strategists: deciding whether to split, double down or hit.

use crate::calculation::RewardSolver;
use crate::statearray::CardCount;
use crate::{Decision, Rule, RuleError, StrategistKind};

/// Produces playing decisions from the player hand, the dealer up-card and
/// the distribution of cards remaining in the shoe.
pub trait Strategist {
    /// Whether splitting beats playing the hand as dealt.
    fn should_split(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool;

    /// Whether doubling down beats hitting and standing.
    fn should_double(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool;

    /// Whether hitting beats standing.
    fn should_hit(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool;

    /// Releases any state cached across queries.
    fn free_mem(&mut self);
}

/// Builds the strategist registered under the given name.
pub fn create_strategist(
    kind: StrategistKind,
    rule: &Rule,
) -> Result<Box<dyn Strategist>, RuleError> {
    match kind {
        StrategistKind::Basic => Ok(Box::new(BasicStrategist::new())),
        StrategistKind::Optimal => Ok(Box::new(OptimalStrategist::new(rule, |x| x)?)),
    }
}

/// A thin layer over the reward-distribution solver: each query sets the
/// shoe, compares the two relevant action distributions under the solver's
/// utility, and keeps the cache warm until `free_mem`.
pub struct OptimalStrategist {
    solver: RewardSolver,
}

impl OptimalStrategist {
    pub fn new<F>(rule: &Rule, utility_fn: F) -> Result<OptimalStrategist, RuleError>
    where
        F: Fn(f64) -> f64,
    {
        Ok(OptimalStrategist {
            solver: RewardSolver::new(rule, utility_fn)?,
        })
    }

    fn check_preconditions(player_total: u16, dealer_total: u16) {
        assert!(player_total <= 31, "player total {player_total} out of range");
        assert!(
            (2..=11).contains(&dealer_total),
            "dealer total {dealer_total} out of range"
        );
    }
}

impl Strategist for OptimalStrategist {
    fn should_split(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool {
        Self::check_preconditions(player_total, dealer_total);
        self.solver.set_shoe(shoe);
        let split = self.solver.distr_split(player_total, player_aces, dealer_total);
        let played = self
            .solver
            .distr_hit_stand_double(player_total, player_aces, dealer_total);
        self.solver.expected_utility(&split) > self.solver.expected_utility(&played)
    }

    fn should_double(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool {
        Self::check_preconditions(player_total, dealer_total);
        self.solver.set_shoe(shoe);
        let doubled = self
            .solver
            .distr_double(player_total, player_aces, dealer_total);
        let played = self
            .solver
            .distr_hit_stand(player_total, player_aces, dealer_total);
        self.solver.expected_utility(&doubled) > self.solver.expected_utility(&played)
    }

    fn should_hit(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        shoe: &CardCount,
    ) -> bool {
        Self::check_preconditions(player_total, dealer_total);
        self.solver.set_shoe(shoe);
        let hit = self.solver.distr_hit(player_total, player_aces, dealer_total);
        let stand = self.solver.distr_stand(
            player_total,
            u16::from(dealer_total == 11),
            dealer_total,
            true,
        );
        self.solver.expected_utility(&hit) > self.solver.expected_utility(&stand)
    }

    fn free_mem(&mut self) {
        self.solver.free_mem();
    }
}

const H: Decision = Decision::Hit;
const S: Decision = Decision::Stand;
const D: Decision = Decision::Double;

/// Soft totals 12..=21 against dealer 2..=11.
#[rustfmt::skip]
static BASIC_ACE_CHART: [[Decision; 10]; 10] = [
    // 2  3  4  5  6  7  8  9  10 A
    [H, H, H, H, H, H, H, H, H, H], // 12
    [H, H, H, H, D, H, H, H, H, H], // 13
    [H, H, H, D, D, H, H, H, H, H], // 14
    [H, H, H, D, D, H, H, H, H, H], // 15
    [H, H, D, D, D, H, H, H, H, H], // 16
    [H, D, D, D, D, H, H, H, H, H], // 17
    [S, D, D, D, D, S, S, H, H, H], // 18
    [S, S, S, S, S, S, S, S, S, S], // 19
    [S, S, S, S, S, S, S, S, S, S], // 20
    [S, S, S, S, S, S, S, S, S, S], // 21
];

/// Hard totals 3..=21 against dealer 2..=11.
#[rustfmt::skip]
static BASIC_HIT_CHART: [[Decision; 10]; 19] = [
    // 2  3  4  5  6  7  8  9  10 A
    [H, H, H, H, H, H, H, H, H, H], // 3
    [H, H, H, H, H, H, H, H, H, H], // 4
    [H, H, H, H, H, H, H, H, H, H], // 5
    [H, H, H, H, H, H, H, H, H, H], // 6
    [H, H, H, H, H, H, H, H, H, H], // 7
    [H, H, H, H, H, H, H, H, H, H], // 8
    [H, D, D, D, D, H, H, H, H, H], // 9
    [D, D, D, D, D, D, D, D, H, H], // 10
    [D, D, D, D, D, D, D, D, D, H], // 11
    [H, H, S, S, S, H, H, H, H, H], // 12
    [S, S, S, S, S, H, H, H, H, H], // 13
    [S, S, S, S, S, H, H, H, H, H], // 14
    [S, S, S, S, S, H, H, H, H, H], // 15
    [S, S, S, S, S, H, H, H, S, H], // 16
    [S, S, S, S, S, S, S, S, S, S], // 17
    [S, S, S, S, S, S, S, S, S, S], // 18
    [S, S, S, S, S, S, S, S, S, S], // 19
    [S, S, S, S, S, S, S, S, S, S], // 20
    [S, S, S, S, S, S, S, S, S, S], // 21
];

/// Pairs against dealer 2..=11: the ace row first, then totals 4..=20.
#[rustfmt::skip]
static BASIC_SPLIT_CHART: [[bool; 10]; 10] = [
    //  2      3      4      5      6      7      8      9      10     A
    [true , true , true , true , true , true , true , true , true , true ], // A,A
    [true , true , true , true , true , true , false, false, false, false], // 4
    [true , true , true , true , true , true , false, false, false, false], // 6
    [false, false, false, true , true , false, false, false, false, false], // 8
    [false, false, false, false, false, false, false, false, false, false], // 10
    [true , true , true , true , true , false, false, false, false, false], // 12
    [true , true , true , true , true , true , false, false, false, false], // 14
    [true , true , true , true , true , true , true , true , true , true ], // 16
    [true , true , true , true , true , false, true , true , false, false], // 18
    [false, false, false, false, false, false, false, false, false, false], // 20
];

/// Decides from fixed lookup charts, disregarding the shoe composition.
/// The charts were generated by querying the optimal strategist on a full
/// Vegas Strip shoe for every hand.
pub struct BasicStrategist;

impl BasicStrategist {
    pub fn new() -> BasicStrategist {
        BasicStrategist
    }

    fn preferred_move(player_total: u16, player_aces: u16, dealer_total: u16) -> Decision {
        let column = (dealer_total - 2) as usize;
        if player_aces == 1 {
            BASIC_ACE_CHART[(player_total - 12) as usize][column]
        } else {
            BASIC_HIT_CHART[(player_total - 3) as usize][column]
        }
    }
}

impl Default for BasicStrategist {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategist for BasicStrategist {
    fn should_split(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        _shoe: &CardCount,
    ) -> bool {
        let column = (dealer_total - 2) as usize;
        if player_aces == 1 {
            BASIC_SPLIT_CHART[0][column]
        } else {
            BASIC_SPLIT_CHART[(player_total / 2 - 1) as usize][column]
        }
    }

    fn should_double(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        _shoe: &CardCount,
    ) -> bool {
        Self::preferred_move(player_total, player_aces, dealer_total) == Decision::Double
    }

    fn should_hit(
        &mut self,
        player_total: u16,
        player_aces: u16,
        dealer_total: u16,
        _shoe: &CardCount,
    ) -> bool {
        Self::preferred_move(player_total, player_aces, dealer_total) != Decision::Stand
    }

    fn free_mem(&mut self) {}
}
