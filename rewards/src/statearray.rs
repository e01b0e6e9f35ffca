use std::collections::HashMap;
use std::hash::Hash;
use std::ops::{Index, IndexMut};

use strum_macros::EnumIter;

use crate::Card;

/// The number of distinct card ranks (ace through king).
pub const NUM_RANKS: usize = 13;

/// Positional decimal place values of the per-rank counts inside a state
/// key. The lowest digit is reserved for the action mode, and every rank
/// count occupies the two digits above the previous rank.
const fn rank_place_values() -> [u128; NUM_RANKS] {
    let mut ret = [0; NUM_RANKS];
    let mut place: u128 = 10;
    let mut i = 0;
    while i < NUM_RANKS {
        ret[i] = place;
        place *= 100;
        i += 1;
    }
    ret
}

static RANK_PLACE: [u128; NUM_RANKS] = rank_place_values();

// Hand digits sit above the 26 digits of shoe counts plus the mode digit.
const PLAYER_TOTAL_PLACE: u128 = 10u128.pow(27);
const DEALER_TOTAL_PLACE: u128 = 10u128.pow(29);
const ACES_PLACE: u128 = 10u128.pow(31);

/// Separates cache entries whose hand shapes coincide but whose meaning
/// differs, e.g. the first dealer draw under the peek rule from later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Mode {
    Split = 0,
    Double = 1,
    Hit = 2,
    StandFirst = 3,
    StandRest = 4,
    Blackjack = 5,
}

/// The multiset of cards remaining in a shoe, by rank.
///
/// The positional-decimal digest of the counts is maintained incrementally
/// on every add/remove, so a full state key is a constant-time sum. As long
/// as every count stays below 100 (guaranteed by the shoe-size bound of the
/// rule validation) the digest is a bijection of the counts.
#[derive(Debug, Clone)]
pub struct CardCount {
    counts: [u8; NUM_RANKS],
    total: u16,
    digest: u128,
}

impl CardCount {
    pub fn new(counts: &[u8; NUM_RANKS]) -> CardCount {
        let mut card_count = CardCount {
            counts: *counts,
            total: 0,
            digest: 0,
        };
        for (i, &count) in counts.iter().enumerate() {
            debug_assert!(count < 100, "per-rank counts must fit two decimal digits");
            card_count.total += count as u16;
            card_count.digest += (count as u128) * RANK_PLACE[i];
        }
        card_count
    }

    /// Builds a count from a length-14 per-rank distribution whose index 0
    /// is unused, the layout external callers supply shoes in.
    pub fn from_distribution(distribution: &[u8; NUM_RANKS + 1]) -> CardCount {
        let mut counts = [0; NUM_RANKS];
        counts.copy_from_slice(&distribution[1..]);
        Self::new(&counts)
    }

    /// A full shoe of the given number of 52-card decks.
    pub fn with_decks(decks: u8) -> CardCount {
        Self::new(&[4 * decks; NUM_RANKS])
    }

    /// Adds one card of the given rank.
    pub fn add_card(&mut self, card: Card) {
        let index = (card - 1) as usize;
        self.counts[index] += 1;
        self.total += 1;
        self.digest += RANK_PLACE[index];
    }

    /// Removes one card of the given rank. The count must be positive.
    pub fn remove_card(&mut self, card: Card) {
        let index = (card - 1) as usize;
        debug_assert!(self.counts[index] > 0, "removing a card not in the shoe");
        self.counts[index] -= 1;
        self.total -= 1;
        self.digest -= RANK_PLACE[index];
    }

    pub fn get_total(&self) -> u16 {
        self.total
    }

    pub(crate) fn digest(&self) -> u128 {
        self.digest
    }
}

impl Index<Card> for CardCount {
    type Output = u8;
    fn index(&self, card: Card) -> &Self::Output {
        &self.counts[(card - 1) as usize]
    }
}

impl Hash for CardCount {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u128(self.digest);
    }
}

impl PartialEq for CardCount {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for CardCount {}

/// The memoization key of one solver state: shoe counts, player total,
/// dealer total, unresolved aces and action mode packed into disjoint
/// decimal digit ranges of a single 128-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateKey {
    packed: u128,
}

impl StateKey {
    pub fn new(
        shoe: &CardCount,
        player_total: u16,
        dealer_total: u16,
        aces: u16,
        mode: Mode,
    ) -> StateKey {
        debug_assert!(player_total < 100 && dealer_total < 100 && aces < 10);
        StateKey {
            packed: shoe.digest()
                + mode as u128
                + (player_total as u128) * PLAYER_TOTAL_PLACE
                + (dealer_total as u128) * DEALER_TOTAL_PLACE
                + (aces as u128) * ACES_PLACE,
        }
    }
}

/// A map from solver states to values, indexed by `StateKey`. Missing
/// entries spring into existence as `T::default()` on mutable access.
#[derive(Debug, Default, Clone)]
pub struct StateArray<T: Default> {
    data: HashMap<u128, T>,
}

impl<T: Default> StateArray<T> {
    pub fn new() -> StateArray<T> {
        StateArray {
            data: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn contains_state(&self, key: StateKey) -> bool {
        self.data.contains_key(&key.packed)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Default> Index<StateKey> for StateArray<T> {
    type Output = T;
    fn index(&self, key: StateKey) -> &Self::Output {
        &self.data[&key.packed]
    }
}

impl<T: Default> IndexMut<StateKey> for StateArray<T> {
    fn index_mut(&mut self, key: StateKey) -> &mut Self::Output {
        self.data.entry(key.packed).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    /// Recomputes the digest of a count from scratch.
    fn digest_by_hand(counts: &[u8; NUM_RANKS]) -> u128 {
        let mut digest: u128 = 0;
        for i in (0..NUM_RANKS).rev() {
            digest = digest * 100 + counts[i] as u128;
        }
        digest * 10
    }

    #[test]
    fn digest_matches_positional_layout() {
        let counts = [3, 0, 17, 4, 4, 4, 4, 4, 4, 96, 0, 1, 2];
        let card_count = CardCount::new(&counts);
        assert_eq!(card_count.digest(), digest_by_hand(&counts));
    }

    #[test]
    fn add_and_remove_restore_the_digest() {
        let mut card_count = CardCount::with_decks(2);
        let before = card_count.digest();
        for card in 1..=NUM_RANKS as Card {
            card_count.remove_card(card);
            assert_ne!(card_count.digest(), before);
            card_count.add_card(card);
        }
        assert_eq!(card_count.digest(), before);
        assert_eq!(card_count.get_total(), 104);
    }

    #[test]
    fn from_distribution_skips_index_zero() {
        let mut distribution = [7; NUM_RANKS + 1];
        distribution[0] = 99;
        let card_count = CardCount::from_distribution(&distribution);
        assert_eq!(card_count.get_total(), 7 * 13);
        assert_eq!(card_count[1], 7);
        assert_eq!(card_count[13], 7);
    }

    #[test]
    fn modes_occupy_distinct_keys() {
        let shoe = CardCount::with_decks(1);
        let keys: Vec<StateKey> = Mode::iter()
            .map(|mode| StateKey::new(&shoe, 16, 10, 0, mode))
            .collect();
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn state_array_auto_inserts_defaults() {
        let shoe = CardCount::with_decks(1);
        let mut array: StateArray<i32> = StateArray::new();
        let key = StateKey::new(&shoe, 12, 6, 1, Mode::Hit);
        assert!(!array.contains_state(key));
        array[key] = 666;
        assert!(array.contains_state(key));
        assert_eq!(array[key], 666);
        array.clear();
        assert!(array.is_empty());
    }

    fn counts_strategy() -> impl Strategy<Value = [u8; NUM_RANKS]> {
        prop::array::uniform13(0..=96u8)
    }

    proptest! {
        #[test]
        fn state_keys_are_injective(
            counts_a in counts_strategy(),
            counts_b in counts_strategy(),
            player_a in 0..32u16, player_b in 0..32u16,
            dealer_a in 2..=21u16, dealer_b in 2..=21u16,
            aces_a in 0..=2u16, aces_b in 0..=2u16,
            mode_a in 0..6usize, mode_b in 0..6usize,
        ) {
            let mode_a = Mode::iter().nth(mode_a).unwrap();
            let mode_b = Mode::iter().nth(mode_b).unwrap();
            let key_a = StateKey::new(&CardCount::new(&counts_a), player_a, dealer_a, aces_a, mode_a);
            let key_b = StateKey::new(&CardCount::new(&counts_b), player_b, dealer_b, aces_b, mode_b);
            let same_state = counts_a == counts_b
                && player_a == player_b
                && dealer_a == dealer_b
                && aces_a == aces_b
                && mode_a == mode_b;
            prop_assert_eq!(key_a == key_b, same_state);
        }

        #[test]
        fn digest_is_injective_on_counts(
            counts_a in counts_strategy(),
            counts_b in counts_strategy(),
        ) {
            let a = CardCount::new(&counts_a);
            let b = CardCount::new(&counts_b);
            prop_assert_eq!(a == b, counts_a == counts_b);
        }
    }
}
