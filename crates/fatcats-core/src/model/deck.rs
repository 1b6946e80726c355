use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Treat values revealed one per round, fixed once drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatDeck {
    values: Vec<u32>,
}

impl TreatDeck {
    /// Draws `size` treats independently, with replacement, from `population`.
    ///
    /// Every entry of `population` is equally likely, so a value listed twice
    /// is drawn twice as often.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, population: &[u32], size: usize) -> Self {
        let values = (0..size).map(|_| draw(rng, population)).collect();
        Self { values }
    }

    pub fn generate_with_seed(seed: u64, population: &[u32], size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(&mut rng, population, size)
    }

    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn value(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.prefix_total(self.values.len())
    }

    /// Sum of the first `count` treats.
    pub fn prefix_total(&self, count: usize) -> u64 {
        self.values
            .iter()
            .take(count)
            .map(|&value| u64::from(value))
            .sum()
    }
}

/// One uniform draw from a non-empty population.
pub(crate) fn draw<R: Rng + ?Sized>(rng: &mut R, population: &[u32]) -> u32 {
    assert!(!population.is_empty(), "card value population must not be empty");
    population[rng.gen_range(0..population.len())]
}

#[cfg(test)]
mod tests {
    use super::TreatDeck;

    #[test]
    fn deck_has_requested_length_and_values() {
        let values = [1, 2, 3];
        let deck = TreatDeck::generate_with_seed(123, &values, 10);
        assert_eq!(deck.len(), 10);
        assert!(deck.values().iter().all(|v| values.contains(v)));
    }

    #[test]
    fn generation_with_seed_is_deterministic() {
        let values = [7, 8, 9];
        let deck_a = TreatDeck::generate_with_seed(42, &values, 15);
        let deck_b = TreatDeck::generate_with_seed(42, &values, 15);
        assert_eq!(deck_a, deck_b);
    }

    #[test]
    fn single_value_population_fills_deck() {
        let deck = TreatDeck::generate_with_seed(5, &[11], 4);
        assert_eq!(deck.values(), &[11, 11, 11, 11]);
        assert_eq!(deck.total(), 44);
    }

    #[test]
    fn prefix_total_counts_leading_treats() {
        let deck = TreatDeck::from_values(vec![5, 10, 15]);
        assert_eq!(deck.prefix_total(0), 0);
        assert_eq!(deck.prefix_total(2), 15);
        assert_eq!(deck.prefix_total(10), 30);
        assert_eq!(deck.value(1), Some(10));
        assert_eq!(deck.value(3), None);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn empty_population_panics() {
        let _ = TreatDeck::generate_with_seed(1, &[], 3);
    }
}
