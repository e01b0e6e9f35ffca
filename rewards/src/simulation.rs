//! The game environment: a dealing shoe, round resolution and a
//! stage-driven table for playing bankrolled sessions.

pub mod game;
pub mod shoe;

use rewards_macros::allowed_stage;
use thiserror::Error;

use crate::statearray::CardCount;
use crate::{Rule, RuleError};
use game::Game;
use shoe::Shoe;

/// The decision the table is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    ChooseBet,
    Split,
    Double,
    HitOrStand,
}

/// Errors raised by driving the table outside its game flow.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("{method} is only allowed in the {required:?} stage")]
    WrongStage {
        method: &'static str,
        required: GameStage,
    },
}

/// A bankrolled blackjack session.
///
/// The table owns the shoe and the player's chips and walks every round
/// through the betting and playing stages. Each stage-guarded method
/// returns the settled winnings once its action finishes the round.
#[derive(Debug)]
pub struct Table {
    rule: Rule,
    shoe: Shoe,
    chips: f64,
    stage: GameStage,
    bet: f64,
    bet_multiplier: u32,
    game: Option<Game>,
}

impl Table {
    pub fn new(rule: &Rule) -> Result<Table, RuleError> {
        rule.validate()?;
        Ok(Self::with_shoe(
            rule,
            Shoe::new(rule.shoe_size, rule.reshuffle_threshold),
        ))
    }

    /// A table dealing from a prepared shoe. Useful for replaying fixed
    /// deals.
    pub fn with_shoe(rule: &Rule, shoe: Shoe) -> Table {
        Table {
            rule: *rule,
            shoe,
            chips: rule.agent_chips,
            stage: GameStage::ChooseBet,
            bet: 0.0,
            bet_multiplier: 1,
            game: None,
        }
    }

    pub fn chips(&self) -> f64 {
        self.chips
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    /// The remaining shoe, as strategists and bettors consume it.
    pub fn card_count(&self) -> &CardCount {
        self.shoe.card_count()
    }

    /// The `(player_total, player_aces, dealer_total)` observation of the
    /// hand awaiting a decision.
    pub fn observation(&self) -> Option<(u16, u16, u16)> {
        self.game.as_ref().map(Game::observation)
    }

    /// Places a bet, clamped into `[1, chips]`, and deals the next round.
    /// The shoe reshuffles first when it has run low.
    #[allowed_stage(ChooseBet)]
    pub fn place_bet(&mut self, bet: f64) -> Result<Option<f64>, TableError> {
        self.bet = bet.min(self.chips).max(1.0);
        self.bet_multiplier = 1;
        self.shoe.try_reshuffle();
        let game = Game::deal(&mut self.shoe, &self.rule);
        let can_split = game.can_split() && self.can_bet_more();
        self.game = Some(game);
        self.stage = if can_split {
            GameStage::Split
        } else if self.can_bet_more() {
            GameStage::Double
        } else {
            GameStage::HitOrStand
        };
        Ok(self.finish_step())
    }

    /// Splits as often as the rules and the bankroll allow, if asked to.
    #[allowed_stage(Split)]
    pub fn split(&mut self, want_to_split: bool) -> Result<Option<f64>, TableError> {
        if want_to_split {
            let budget = self.max_multiplier();
            if let Some(game) = self.game.as_mut() {
                self.bet_multiplier = game.split_all(budget, &mut self.shoe, &self.rule) as u32;
            }
        }
        self.stage = if self.can_bet_more() {
            GameStage::Double
        } else {
            GameStage::HitOrStand
        };
        Ok(self.finish_step())
    }

    /// Doubles down the hand in focus if asked to, then moves on to the
    /// next hand; the last hand hands over to hitting and standing.
    #[allowed_stage(Double)]
    pub fn double(&mut self, want_to_double: bool) -> Result<Option<f64>, TableError> {
        if let Some(game) = self.game.as_mut() {
            if want_to_double && game.double_focus(&mut self.shoe) {
                self.bet_multiplier += 1;
            }
            game.move_focus(None);
            if !game.player_in_focus() {
                game.move_focus(Some(0));
                self.stage = GameStage::HitOrStand;
            }
            game.try_finish(&mut self.shoe, &self.rule);
        }
        Ok(self.finish_step())
    }

    /// Hits or stands with the hand in focus.
    #[allowed_stage(HitOrStand)]
    pub fn hit_or_stand(&mut self, want_to_hit: bool) -> Result<Option<f64>, TableError> {
        if let Some(game) = self.game.as_mut() {
            if want_to_hit {
                game.hit(&mut self.shoe, &self.rule);
            } else {
                game.stand(&mut self.shoe, &self.rule);
            }
        }
        Ok(self.finish_step())
    }

    /// Settles a finished round: updates the chips, clears the game and
    /// returns the winnings.
    fn finish_step(&mut self) -> Option<f64> {
        let payout = self.game.as_ref().and_then(Game::payout)?;
        let winnings = payout * self.bet;
        self.chips += winnings;
        self.game = None;
        self.stage = GameStage::ChooseBet;
        Some(winnings)
    }

    /// How many base bets the bankroll covers: splitting and doubling may
    /// never put more than the chips at risk.
    fn max_multiplier(&self) -> u32 {
        (self.chips / self.bet) as u32
    }

    fn can_bet_more(&self) -> bool {
        self.max_multiplier() > self.bet_multiplier
    }
}
