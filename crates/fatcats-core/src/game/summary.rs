use super::env::FatCatsEnv;
use serde::{Deserialize, Serialize};

/// Read-only record of an episode, suitable for logging after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub treat_index: usize,
    pub terminated: bool,
    pub deck: Vec<u32>,
    pub scores: Vec<u32>,
    pub discarded_treats: Vec<u32>,
    pub cards_left: Vec<usize>,
    /// Strictly highest final score, if any.
    pub winner: Option<usize>,
}

impl EpisodeSummary {
    /// Returns `None` before the first reset.
    pub fn capture(env: &FatCatsEnv) -> Option<Self> {
        let episode = env.episode()?;
        Some(EpisodeSummary {
            seed: env.seed(),
            treat_index: episode.treat_index(),
            terminated: episode.is_terminal(),
            deck: episode.deck().values().to_vec(),
            scores: episode.scores().standings().to_vec(),
            discarded_treats: episode.discarded_treats().to_vec(),
            cards_left: episode.hands().iter().map(|hand| hand.len()).collect(),
            winner: episode.scores().leading_player(),
        })
    }

    pub fn deck_total(&self) -> u64 {
        self.deck.iter().map(|&value| u64::from(value)).sum()
    }

    pub fn discarded_total(&self) -> u64 {
        self.discarded_treats.iter().map(|&value| u64::from(value)).sum()
    }

    pub fn score_total(&self) -> u64 {
        self.scores.iter().map(|&value| u64::from(value)).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
