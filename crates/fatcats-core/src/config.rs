use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::action::ActionSpace;
use crate::game::observation::{ObservationLayout, ObservationSpace};

const DEFAULT_TREAT_DECK_SIZE: usize = 9;
const DEFAULT_TREAT_CARD_VALUES: [u32; 4] = [5, 10, 15, 20];
const DEFAULT_TRICK_CARD_VALUES: [u32; 4] = [5, 10, 12, 15];

/// Rules for one Fat Cats table. Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub number_of_players: usize,
    /// Initial hand size dealt to each player.
    pub trick_cards_per_player: usize,
    /// When set, a player may commit several trick cards to one bid.
    #[serde(default)]
    pub allow_multi_bid: bool,
    /// Population each treat card is drawn from (with replacement).
    #[serde(default = "default_treat_card_values")]
    pub treat_card_values: Vec<u32>,
    /// Number of treats revealed per game.
    #[serde(default = "default_treat_deck_size")]
    pub treat_deck_size: usize,
    /// Population each trick card is drawn from (with replacement).
    #[serde(default = "default_trick_card_values")]
    pub trick_card_values: Vec<u32>,
}

impl GameConfig {
    /// Config with the default card populations and deck size.
    pub fn new(number_of_players: usize, trick_cards_per_player: usize) -> Self {
        Self {
            number_of_players,
            trick_cards_per_player,
            allow_multi_bid: false,
            treat_card_values: default_treat_card_values(),
            treat_deck_size: default_treat_deck_size(),
            trick_card_values: default_trick_card_values(),
        }
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let cfg: GameConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                ConfigError::Parse {
                    source,
                    path: path_buf.clone(),
                }
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from("<inline>");
        let cfg: GameConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            source,
            path: path.clone(),
        })?;
        cfg.validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.number_of_players < 2 {
            return Err(ValidationError::field(
                "number_of_players",
                "at least two players are required",
            ));
        }
        if self.trick_cards_per_player == 0 {
            return Err(ValidationError::field(
                "trick_cards_per_player",
                "hand size must be greater than zero",
            ));
        }
        if self.treat_deck_size == 0 {
            return Err(ValidationError::field(
                "treat_deck_size",
                "deck size must be greater than zero",
            ));
        }
        validate_population(
            "treat_card_values",
            &self.treat_card_values,
            self.treat_deck_size,
        )?;
        validate_population(
            "trick_card_values",
            &self.trick_card_values,
            self.trick_cards_per_player,
        )?;
        Ok(())
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::for_config(self)
    }

    pub fn observation_layout(&self) -> ObservationLayout {
        ObservationLayout::new(self.trick_cards_per_player, self.treat_deck_size)
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::new(self.observation_layout(), self.max_card_value())
    }

    pub fn observation_len(&self) -> usize {
        self.observation_layout().len()
    }

    /// Largest face value across both card populations.
    pub fn max_card_value(&self) -> u32 {
        self.treat_card_values
            .iter()
            .chain(self.trick_card_values.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// `count` is how many cards of this population one player can accumulate:
/// a full hand in one bid, or every treat in the deck.
fn validate_population(field: &str, values: &[u32], count: usize) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::field(field, "value population must not be empty"));
    }
    // 0 marks an empty hand slot in observations.
    if values.contains(&0) {
        return Err(ValidationError::field(field, "card values must be positive"));
    }
    let max = values.iter().copied().max().unwrap_or(0);
    let fits = u32::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(max))
        .is_some();
    if !fits {
        return Err(ValidationError::field(
            field,
            "card values times card count must fit in a u32 total",
        ));
    }
    Ok(())
}

fn default_treat_card_values() -> Vec<u32> {
    DEFAULT_TREAT_CARD_VALUES.to_vec()
}

fn default_treat_deck_size() -> usize {
    DEFAULT_TREAT_DECK_SIZE
}

fn default_trick_card_values() -> Vec<u32> {
    DEFAULT_TRICK_CARD_VALUES.to_vec()
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    pub fn field(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            ValidationError::InvalidField { field, .. } => field,
        }
    }
}
