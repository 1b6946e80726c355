use crate::config::GameConfig;
use crate::game::action::{Action, apply_action};
use crate::game::observation::{Observation, encode};
use crate::model::bid::RoundBids;
use crate::model::deck::TreatDeck;
use crate::model::hand::{Hand, deal};
use crate::model::score::ScoreBoard;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Mutable state of one game, from the first treat to the last.
#[derive(Debug, Clone)]
pub struct Episode {
    deck: TreatDeck,
    hands: Vec<Hand>,
    max_hand_size: usize,
    scores: ScoreBoard,
    discarded: Vec<u32>,
    bids: RoundBids,
    treat_index: usize,
    turn: usize,
}

/// Result of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub treat_index: usize,
    pub treat_value: u32,
    pub bids: Vec<u32>,
    /// `None` when every player passed or the highest bid was shared.
    pub winner: Option<usize>,
}

impl Episode {
    /// Draws the treat deck, then one hand per player in seat order.
    pub fn deal<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let deck = TreatDeck::generate(rng, &config.treat_card_values, config.treat_deck_size);
        let hands = deal(
            config.number_of_players,
            config.trick_cards_per_player,
            &config.trick_card_values,
            rng,
        );
        Self::from_parts(deck, hands, config.trick_cards_per_player)
    }

    /// Builds an episode at its first turn from an explicit deck and hands.
    pub fn from_parts(deck: TreatDeck, hands: Vec<Hand>, max_hand_size: usize) -> Self {
        let players = hands.len();
        assert!(players >= 2, "an episode needs at least two players");
        assert!(
            hands.iter().all(|hand| hand.len() <= max_hand_size),
            "dealt hand exceeds {max_hand_size} cards"
        );

        Self {
            discarded: vec![0; deck.len()],
            deck,
            hands,
            max_hand_size,
            scores: ScoreBoard::new(players),
            bids: RoundBids::new(players),
            treat_index: 0,
            turn: 0,
        }
    }

    pub fn number_of_players(&self) -> usize {
        self.hands.len()
    }

    pub fn deck(&self) -> &TreatDeck {
        &self.deck
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, player: usize) -> &Hand {
        &self.hands[player]
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn discarded_treats(&self) -> &[u32] {
        &self.discarded
    }

    pub fn discarded_total(&self) -> u64 {
        self.discarded.iter().map(|&value| u64::from(value)).sum()
    }

    pub fn bids(&self) -> &RoundBids {
        &self.bids
    }

    pub fn treat_index(&self) -> usize {
        self.treat_index
    }

    /// Seat whose action is expected next.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Treat currently up for auction, if any remain.
    pub fn current_treat(&self) -> Option<u32> {
        self.deck.value(self.treat_index)
    }

    pub fn is_terminal(&self) -> bool {
        self.treat_index >= self.deck.len()
    }

    /// Awarded plus discarded value equals the value of every revealed treat.
    pub fn is_conserved(&self) -> bool {
        self.scores.total() + self.discarded_total() == self.deck.prefix_total(self.treat_index)
    }

    pub fn observe(&self, player: usize) -> Observation {
        encode(
            self.treat_index,
            self.hands[player].cards(),
            self.max_hand_size,
            self.scores.score(player),
            &self.discarded,
        )
    }

    /// Applies the acting player's (already shape-checked) action and moves
    /// the turn on. Returns the round outcome when this action closed a round.
    ///
    /// Panics when the episode is already over.
    pub fn play(&mut self, action: &Action) -> Option<RoundOutcome> {
        assert!(
            !self.is_terminal(),
            "play called on a finished episode (treat {} of {})",
            self.treat_index,
            self.deck.len()
        );

        let player = self.turn;
        let before = self.hands[player].len();
        let bid = apply_action(&mut self.hands[player], action);
        self.bids.set(player, bid);

        event!(
            target: "fatcats_core::action",
            Level::TRACE,
            player,
            treat_index = self.treat_index,
            bid,
            cards_spent = before - self.hands[player].len()
        );

        self.turn = (self.turn + 1) % self.number_of_players();
        if self.turn == 0 {
            Some(self.resolve_round())
        } else {
            None
        }
    }

    fn resolve_round(&mut self) -> RoundOutcome {
        let treat_index = self.treat_index;
        let treat_value = self.deck.values()[treat_index];
        let winner = self.bids.winner();

        match winner {
            Some(player) => self.scores.award(player, treat_value),
            None => self.discarded[treat_index] = treat_value,
        }

        let outcome = RoundOutcome {
            treat_index,
            treat_value,
            bids: self.bids.as_slice().to_vec(),
            winner,
        };

        self.bids.clear();
        self.treat_index += 1;

        event!(
            target: "fatcats_core::round",
            Level::DEBUG,
            treat_index,
            treat_value,
            bids = ?outcome.bids,
            winner = ?winner,
            terminal = self.is_terminal()
        );

        outcome
    }
}
