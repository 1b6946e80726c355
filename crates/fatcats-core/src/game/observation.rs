use serde::{Deserialize, Serialize};

/// Fixed-length view of the table from one player's seat.
///
/// Layout: `[treat_index, hand[0..max_hand_size], score, discards[0..treat_deck_size]]`.
/// Hand slots are left-aligned and padded with 0. Other players' hands and
/// scores, and the undrawn treats, never appear.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    values: Vec<u32>,
}

impl Observation {
    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.values
    }
}

/// Offsets into an [`Observation`] for a given table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationLayout {
    max_hand_size: usize,
    treat_deck_size: usize,
}

impl ObservationLayout {
    pub const TREAT_INDEX: usize = 0;
    pub const HAND_OFFSET: usize = 1;

    pub const fn new(max_hand_size: usize, treat_deck_size: usize) -> Self {
        Self {
            max_hand_size,
            treat_deck_size,
        }
    }

    pub const fn len(&self) -> usize {
        1 + self.max_hand_size + 1 + self.treat_deck_size
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn max_hand_size(&self) -> usize {
        self.max_hand_size
    }

    pub const fn treat_deck_size(&self) -> usize {
        self.treat_deck_size
    }

    pub const fn score_offset(&self) -> usize {
        Self::HAND_OFFSET + self.max_hand_size
    }

    pub const fn discard_offset(&self) -> usize {
        self.score_offset() + 1
    }

    pub fn treat_index(&self, obs: &Observation) -> usize {
        obs.as_slice()[Self::TREAT_INDEX] as usize
    }

    /// All hand slots, padding included.
    pub fn hand_slots<'a>(&self, obs: &'a Observation) -> &'a [u32] {
        &obs.as_slice()[Self::HAND_OFFSET..self.score_offset()]
    }

    /// Number of cards still held; the first 0 slot ends the hand.
    pub fn hand_len(&self, obs: &Observation) -> usize {
        self.hand_slots(obs)
            .iter()
            .position(|&card| card == 0)
            .unwrap_or(self.max_hand_size)
    }

    pub fn hand<'a>(&self, obs: &'a Observation) -> &'a [u32] {
        &self.hand_slots(obs)[..self.hand_len(obs)]
    }

    pub fn score(&self, obs: &Observation) -> u32 {
        obs.as_slice()[self.score_offset()]
    }

    pub fn discards<'a>(&self, obs: &'a Observation) -> &'a [u32] {
        &obs.as_slice()[self.discard_offset()..]
    }
}

/// Declared bounds of every observation: length plus a per-component range
/// of `0..=high`, where `high` is the largest configured card value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    layout: ObservationLayout,
    high: u32,
}

impl ObservationSpace {
    pub const LOW: u32 = 0;

    pub const fn new(layout: ObservationLayout, high: u32) -> Self {
        Self { layout, high }
    }

    pub const fn layout(&self) -> ObservationLayout {
        self.layout
    }

    pub const fn shape(&self) -> usize {
        self.layout.len()
    }

    pub const fn high(&self) -> u32 {
        self.high
    }

    pub fn contains(&self, obs: &Observation) -> bool {
        obs.len() == self.shape() && obs.as_slice().iter().all(|&value| value <= self.high)
    }
}

/// Encodes one player's view of the table.
///
/// Panics when `hand` holds more than `max_hand_size` cards; hands only
/// shrink, so that can only come from a mismatched caller.
pub fn encode(
    treat_index: usize,
    hand: &[u32],
    max_hand_size: usize,
    score: u32,
    discarded_treats: &[u32],
) -> Observation {
    assert!(
        hand.len() <= max_hand_size,
        "hand of {} cards exceeds the {max_hand_size} observation slots",
        hand.len()
    );

    let layout = ObservationLayout::new(max_hand_size, discarded_treats.len());
    let mut values = Vec::with_capacity(layout.len());
    values.push(treat_index as u32);
    values.extend_from_slice(hand);
    values.resize(layout.score_offset(), 0);
    values.push(score);
    values.extend_from_slice(discarded_treats);

    debug_assert_eq!(values.len(), layout.len());
    Observation { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_follows_layout() {
        let obs = encode(2, &[5, 12], 4, 30, &[0, 10, 0]);
        assert_eq!(obs.as_slice(), &[2, 5, 12, 0, 0, 30, 0, 10, 0]);

        let layout = ObservationLayout::new(4, 3);
        assert_eq!(obs.len(), layout.len());
        assert_eq!(layout.treat_index(&obs), 2);
        assert_eq!(layout.hand(&obs), &[5, 12]);
        assert_eq!(layout.hand_len(&obs), 2);
        assert_eq!(layout.score(&obs), 30);
        assert_eq!(layout.discards(&obs), &[0, 10, 0]);
    }

    #[test]
    fn full_and_empty_hands_encode() {
        let layout = ObservationLayout::new(2, 1);

        let full = encode(0, &[3, 4], 2, 0, &[0]);
        assert_eq!(layout.hand(&full), &[3, 4]);

        let empty = encode(1, &[], 2, 7, &[9]);
        assert_eq!(empty.as_slice(), &[1, 0, 0, 7, 9]);
        assert_eq!(layout.hand_len(&empty), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn oversized_hand_panics() {
        let _ = encode(0, &[1, 2, 3], 2, 0, &[0]);
    }

    #[test]
    fn space_checks_length_and_bounds() {
        let space = ObservationSpace::new(ObservationLayout::new(2, 2), 15);
        assert_eq!(space.shape(), 6);
        assert!(space.contains(&encode(0, &[15, 3], 2, 0, &[0, 0])));
        assert!(!space.contains(&encode(0, &[16], 2, 0, &[0, 0])));
        assert!(!space.contains(&encode(0, &[1], 2, 0, &[0])));
    }
}
