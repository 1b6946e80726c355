use crate::model::bid::resolve_bids;

/// Treat value collected by each player this episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: Vec<u32>,
}

impl ScoreBoard {
    pub fn new(number_of_players: usize) -> Self {
        Self {
            totals: vec![0; number_of_players],
        }
    }

    pub fn award(&mut self, player: usize, points: u32) {
        self.totals[player] += points;
    }

    pub fn score(&self, player: usize) -> u32 {
        self.totals[player]
    }

    pub fn standings(&self) -> &[u32] {
        &self.totals
    }

    pub fn total(&self) -> u64 {
        self.totals.iter().map(|&points| u64::from(points)).sum()
    }

    /// The player with the strictly highest score, if there is one.
    pub fn leading_player(&self) -> Option<usize> {
        resolve_bids(&self.totals)
    }
}
