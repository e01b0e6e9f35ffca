use super::shoe::Shoe;
use crate::{card_value, Card, Rule};

/// The payout of a finished non-blackjack hand, in units of its bet.
fn hand_payout(player_total: u16, dealer_total: u16) -> f64 {
    if player_total > 21 {
        return -1.0;
    }
    if dealer_total > 21 {
        return 1.0;
    }
    match player_total.cmp(&dealer_total) {
        std::cmp::Ordering::Less => -1.0,
        std::cmp::Ordering::Equal => 0.0,
        std::cmp::Ordering::Greater => 1.0,
    }
}

/// The dealer's hand: one shown card, one hidden, then a fixed drawing
/// rule once every player stands.
#[derive(Debug)]
pub struct Dealer {
    total: u16,
    aces: u16,
    hidden_card: Card,
    blackjack: bool,
}

impl Dealer {
    pub fn new(shown_card: Card, hidden_card: Card) -> Dealer {
        let mut dealer = Dealer {
            total: 0,
            aces: 0,
            hidden_card,
            blackjack: false,
        };
        dealer.add_card(shown_card);
        dealer.blackjack = dealer.total + card_value(hidden_card) == 21;
        dealer
    }

    fn add_card(&mut self, card: Card) {
        self.total += card_value(card);
        self.aces += u16::from(card == 1);
        if self.total > 21 && self.aces > 0 {
            self.total -= 10;
            self.aces -= 1;
        }
    }

    pub fn blackjack(&self) -> bool {
        self.blackjack
    }

    pub fn aces(&self) -> u16 {
        self.aces
    }

    pub fn total(&self) -> u16 {
        self.total
    }

    fn needs_to_draw(&self, rule: &Rule) -> bool {
        if self.total == 17 {
            return rule.hit_soft_17 && self.aces > 0;
        }
        self.total < 17
    }

    /// Reveals the hidden card and draws until the rules stop the dealer.
    pub fn stand(&mut self, shoe: &mut Shoe, rule: &Rule) {
        self.add_card(self.hidden_card);
        while self.needs_to_draw(rule) {
            let card = shoe.draw();
            self.add_card(card);
        }
    }
}

/// One player hand, with the split/double/blackjack eligibility state that
/// the table rules attach to it.
#[derive(Debug)]
pub struct Player {
    total: u16,
    aces: u16,
    can_split: bool,
    can_double: bool,
    doubled: bool,
    blackjack: bool,
    standing: bool,
}

impl Player {
    pub fn new(
        first_card: Card,
        second_card: Card,
        can_double_down: bool,
        can_blackjack: bool,
        rule: &Rule,
    ) -> Player {
        let mut player = Player {
            total: 0,
            aces: 0,
            can_split: false,
            can_double: false,
            doubled: false,
            blackjack: false,
            standing: false,
        };
        player.add_card(first_card);
        player.add_card(second_card);
        player.can_split = if rule.split_uneven {
            card_value(first_card) == card_value(second_card)
        } else {
            first_card == second_card
        };
        player.blackjack = player.total == 21 && can_blackjack;
        player.standing = player.total == 21;
        player.can_double = can_double_down && !player.standing;
        player
    }

    fn add_card(&mut self, card: Card) {
        self.total += card_value(card);
        self.aces += u16::from(card == 1);
        if self.total > 21 && self.aces > 0 {
            self.total -= 10;
            self.aces -= 1;
        }
        if self.total >= 21 {
            self.standing = true;
        }
    }

    /// Draws one card unless the hand already stands. Hitting forfeits
    /// splitting and doubling for the rest of the hand.
    pub fn hit(&mut self, shoe: &mut Shoe) -> Option<Card> {
        if self.standing {
            return None;
        }
        self.can_split = false;
        self.can_double = false;
        let card = shoe.draw();
        self.add_card(card);
        Some(card)
    }

    /// Draws exactly one card and stands, for a doubled payout.
    pub fn double_down(&mut self, shoe: &mut Shoe) -> Option<Card> {
        if !self.can_double {
            return None;
        }
        self.doubled = true;
        let card = self.hit(shoe);
        self.standing = true;
        card
    }

    /// The rank this hand would split into, if splitting is still allowed.
    pub fn split_value(&self) -> Option<Card> {
        if !self.can_split {
            return None;
        }
        if self.aces > 0 {
            return Some(1);
        }
        Some((self.total / 2) as Card)
    }

    pub fn stand(&mut self) {
        self.standing = true;
    }

    pub fn aces(&self) -> u16 {
        self.aces
    }

    pub fn blackjack(&self) -> bool {
        self.blackjack
    }

    pub fn doubled(&self) -> bool {
        self.doubled
    }

    pub fn standing(&self) -> bool {
        self.standing
    }

    pub fn total(&self) -> u16 {
        self.total
    }
}

/// One round of blackjack: the dealer, the player's hands (more than one
/// after splits), a focus cursor over them and the final payout.
#[derive(Debug)]
pub struct Game {
    players: Vec<Player>,
    dealer: Dealer,
    focus: usize,
    resplit_limit: u8,
    payout: Option<f64>,
}

impl Game {
    /// Deals a fresh round: two player cards, the dealer's shown card and
    /// her hidden card, in that order. With the peek rule on, a dealer
    /// natural ends the round before the player acts.
    pub fn deal(shoe: &mut Shoe, rule: &Rule) -> Game {
        let player_first = shoe.draw();
        let player_second = shoe.draw();
        let dealer_shown = shoe.draw();
        let dealer_hidden = shoe.draw();
        let resplit_limit = if player_first == 1 {
            rule.resplit_aces
        } else {
            rule.resplit_upto
        };
        let mut game = Game {
            players: vec![Player::new(player_first, player_second, true, true, rule)],
            dealer: Dealer::new(dealer_shown, dealer_hidden),
            focus: 0,
            resplit_limit,
            payout: None,
        };
        if rule.dealer_peeks && game.dealer.blackjack() {
            game.players[0].stand();
        }
        game.try_finish(shoe, rule);
        game
    }

    fn all_players_stand(&self) -> bool {
        self.players.iter().all(Player::standing)
    }

    fn focused_player(&self) -> Option<&Player> {
        self.players.get(self.focus)
    }

    pub fn player_in_focus(&self) -> bool {
        self.focused_player().is_some()
    }

    /// Moves the focus to the given hand, or to the next one.
    pub fn move_focus(&mut self, to: Option<usize>) {
        let to = to.unwrap_or(self.focus + 1);
        if to <= self.players.len() {
            self.focus = to;
        }
    }

    /// Whether the hand in focus may still be split.
    pub fn can_split(&self) -> bool {
        if self.players.len() >= self.resplit_limit as usize {
            return false;
        }
        match self.focused_player() {
            Some(player) => player.split_value().is_some(),
            None => false,
        }
    }

    /// Splits the hand in focus into two, each receiving a fresh card.
    /// Split aces stand immediately unless the rules let them draw.
    pub fn split_focus(&mut self, shoe: &mut Shoe, rule: &Rule) {
        if !self.can_split() {
            return;
        }
        let card = match self.players[self.focus].split_value() {
            Some(card) => card,
            None => return,
        };
        let can_double = rule.double_after_split;
        let can_blackjack = card != 1 || rule.blackjack_with_split_aces;
        let new_first = shoe.draw();
        self.players[self.focus] = Player::new(card, new_first, can_double, can_blackjack, rule);
        let new_second = shoe.draw();
        self.players
            .push(Player::new(card, new_second, can_double, can_blackjack, rule));
        if card == 1 && !rule.hit_after_split_aces {
            self.players[self.focus].stand();
            if let Some(last) = self.players.last_mut() {
                last.stand();
            }
        }
        self.try_finish(shoe, rule);
    }

    /// Splits every hand as long as the rules and the given bet budget
    /// allow it. Returns the number of hands afterwards.
    pub fn split_all(&mut self, max_hands: u32, shoe: &mut Shoe, rule: &Rule) -> usize {
        let mut budget = max_hands;
        self.move_focus(Some(0));
        while self.player_in_focus() {
            while self.can_split() && budget > 1 {
                budget -= 1;
                self.split_focus(shoe, rule);
            }
            self.move_focus(None);
        }
        self.move_focus(Some(0));
        self.players.len()
    }

    /// Hits the hand in focus; the focus moves on once the hand stands.
    pub fn hit(&mut self, shoe: &mut Shoe, rule: &Rule) {
        if self.focus < self.players.len() {
            self.players[self.focus].hit(shoe);
            if self.players[self.focus].standing() {
                self.move_focus(None);
            }
        }
        self.try_finish(shoe, rule);
    }

    /// Stands with the hand in focus and moves on.
    pub fn stand(&mut self, shoe: &mut Shoe, rule: &Rule) {
        if self.focus < self.players.len() {
            self.players[self.focus].stand();
            self.move_focus(None);
        }
        self.try_finish(shoe, rule);
    }

    /// Doubles down the hand in focus. Returns whether the table rules
    /// allowed it.
    pub fn double_focus(&mut self, shoe: &mut Shoe) -> bool {
        match self.players.get_mut(self.focus) {
            Some(player) => player.double_down(shoe).is_some(),
            None => false,
        }
    }

    pub fn payout(&self) -> Option<f64> {
        self.payout
    }

    /// The observation of the hand in focus (or the last hand once every
    /// hand is resolved), as strategists consume it.
    pub fn observation(&self) -> (u16, u16, u16) {
        let player = self
            .focused_player()
            .or_else(|| self.players.last())
            .expect("a game always holds at least one hand");
        (player.total(), player.aces(), self.dealer.total())
    }

    /// Once every hand stands, plays out the dealer and settles the round.
    pub fn try_finish(&mut self, shoe: &mut Shoe, rule: &Rule) {
        if self.payout.is_some() || !self.all_players_stand() {
            return;
        }
        self.dealer.stand(shoe, rule);
        let mut payout = 0.0;
        for player in &self.players {
            payout += if player.blackjack() {
                if self.dealer.blackjack() {
                    0.0
                } else {
                    rule.blackjack_payout
                }
            } else {
                let mut base = hand_payout(player.total(), self.dealer.total());
                if player.doubled() {
                    base *= 2.0;
                }
                base
            };
        }
        self.payout = Some(payout);
    }
}
