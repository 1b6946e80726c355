use crate::model::deck::draw;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A player's trick cards, kept in dealt order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<u32>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<u32>) -> Self {
        Self { cards }
    }

    /// Draws `size` cards with replacement from `population`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, population: &[u32], size: usize) -> Self {
        let cards = (0..size).map(|_| draw(rng, population)).collect();
        Self { cards }
    }

    /// Removes the card at `index`, or returns `None` when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<u32> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    /// Removes every in-range index of `indices` and returns the sum of the
    /// removed values. Duplicates and out-of-range entries are ignored.
    pub fn remove_many(&mut self, indices: &[usize]) -> u32 {
        let mut selected: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < self.cards.len())
            .collect();
        selected.sort_unstable_by(|a, b| b.cmp(a));
        selected.dedup();

        // Highest first so pending positions never shift.
        selected
            .into_iter()
            .map(|index| self.cards.remove(index))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[u32] {
        &self.cards
    }

    pub fn total(&self) -> u32 {
        self.cards.iter().sum()
    }
}

/// Deals one independent hand per player, in player-index order.
pub fn deal<R: Rng + ?Sized>(
    number_of_players: usize,
    trick_cards_per_player: usize,
    trick_card_values: &[u32],
    rng: &mut R,
) -> Vec<Hand> {
    (0..number_of_players)
        .map(|_| Hand::draw(rng, trick_card_values, trick_cards_per_player))
        .collect()
}
