use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::statearray::{CardCount, NUM_RANKS};
use crate::Card;

/// A dealing shoe holding several shuffled 52-card decks.
///
/// Besides dealing, the shoe keeps an exact count of the cards not yet
/// drawn, which is what strategists and bettors consume, and reshuffles
/// itself once the remaining fraction falls below the table threshold.
#[derive(Debug, Clone)]
pub struct Shoe {
    decks: u8,
    reshuffle_threshold: f64,
    cards: Vec<Card>,
    card_count: CardCount,
    current_index: usize,
}

impl Shoe {
    pub fn new(decks: u8, reshuffle_threshold: f64) -> Shoe {
        let mut cards = Vec::with_capacity(decks as usize * 52);
        for _ in 0..decks * 4 {
            for rank in 1..=NUM_RANKS as Card {
                cards.push(rank);
            }
        }
        let mut shoe = Shoe {
            decks,
            reshuffle_threshold,
            cards,
            card_count: CardCount::with_decks(decks),
            current_index: 0,
        };
        shoe.reshuffle();
        shoe
    }

    /// Builds a reshuffled shoe whose first cards are the given ranks, in
    /// order. Panics if the shoe does not contain them.
    pub fn with_top_cards(decks: u8, reshuffle_threshold: f64, firsts: &[Card]) -> Shoe {
        let mut shoe = Shoe::new(decks, reshuffle_threshold);
        let mut remaining = [4 * decks; NUM_RANKS];
        let mut index = 0;
        for &rank in firsts {
            assert!(
                remaining[(rank - 1) as usize] > 0,
                "the requested top cards are not all in the shoe"
            );
            remaining[(rank - 1) as usize] -= 1;
            shoe.cards[index] = rank;
            index += 1;
        }
        for rank in 1..=NUM_RANKS as Card {
            for _ in 0..remaining[(rank - 1) as usize] {
                shoe.cards[index] = rank;
                index += 1;
            }
        }
        shoe.cards[firsts.len()..].shuffle(&mut thread_rng());
        shoe
    }

    /// The fraction of the shoe not yet drawn.
    pub fn cards_left(&self) -> f64 {
        1.0 - self.current_index as f64 / self.cards.len() as f64
    }

    /// Deals the next card. Panics if the shoe is exhausted, which the
    /// reshuffle threshold rules out in any legal game flow.
    pub fn draw(&mut self) -> Card {
        if self.current_index >= self.cards.len() {
            panic!("the shoe is exhausted");
        }
        let card = self.cards[self.current_index];
        self.current_index += 1;
        self.card_count.remove_card(card);
        card
    }

    /// Returns every dealt card and shuffles.
    pub fn reshuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
        self.current_index = 0;
        self.card_count = CardCount::with_decks(self.decks);
    }

    /// Reshuffles once too few cards are left. Returns whether it did.
    pub fn try_reshuffle(&mut self) -> bool {
        if self.cards_left() < self.reshuffle_threshold {
            self.reshuffle();
            return true;
        }
        false
    }

    /// The exact multiset of cards still in the shoe.
    pub fn card_count(&self) -> &CardCount {
        &self.card_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_shoe_holds_full_decks() {
        let shoe = Shoe::new(3, 0.25);
        assert_eq!(shoe.cards.len(), 3 * 52);
        assert_eq!(shoe.card_count().get_total(), 3 * 52);
        for rank in 1..=NUM_RANKS as Card {
            assert_eq!(shoe.card_count()[rank], 12);
        }
        assert_eq!(shoe.cards_left(), 1.0);
    }

    #[test]
    fn top_cards_come_out_first() {
        let firsts = [1, 2, 6, 6, 9];
        let mut shoe = Shoe::with_top_cards(1, 0.25, &firsts);
        for &expected in &firsts {
            assert_eq!(shoe.draw(), expected);
        }
    }

    #[test]
    fn drawing_keeps_the_count_in_sync() {
        let mut shoe = Shoe::with_top_cards(2, 0.25, &[1, 4, 4, 10]);
        shoe.draw();
        assert_eq!(shoe.card_count()[1], 7);
        shoe.draw();
        assert_eq!(shoe.card_count()[4], 7);
        shoe.draw();
        assert_eq!(shoe.card_count()[4], 6);
        shoe.draw();
        assert_eq!(shoe.card_count()[10], 7);
        assert_eq!(shoe.card_count().get_total(), 100);
    }

    #[test]
    #[should_panic]
    fn impossible_top_cards_panic() {
        let _ = Shoe::with_top_cards(1, 0.25, &[6, 6, 6, 6, 6]);
    }

    #[test]
    fn reshuffle_triggers_below_the_threshold() {
        let mut shoe = Shoe::new(1, 0.25);
        assert!(!shoe.try_reshuffle());
        for _ in 0..40 {
            shoe.draw();
        }
        assert!(shoe.cards_left() < 0.25);
        assert!(shoe.try_reshuffle());
        assert_eq!(shoe.card_count().get_total(), 52);
        assert_eq!(shoe.cards_left(), 1.0);
    }
}
