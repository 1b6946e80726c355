use crate::config::GameConfig;
use crate::model::hand::Hand;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player's move for the current treat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Single-bid mode: bid the card at this hand index. Any index at or past
    /// the end of the hand is a pass.
    Index(usize),
    /// Multi-bid mode: one flag per hand slot; set flags are bid together.
    Mask(Vec<bool>),
}

impl Action {
    /// Mask of `width` slots with the given indices set. Indices outside the
    /// width are dropped.
    pub fn mask_from_indices(width: usize, indices: &[usize]) -> Self {
        let mut mask = vec![false; width];
        for &index in indices {
            if let Some(slot) = mask.get_mut(index) {
                *slot = true;
            }
        }
        Action::Mask(mask)
    }
}

/// Shape of the actions an environment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSpace {
    /// Choices `0..n`; `n - 1` equals the full hand size and always passes.
    Discrete { n: usize },
    MultiBinary { width: usize },
}

impl ActionSpace {
    pub fn for_config(config: &GameConfig) -> Self {
        if config.allow_multi_bid {
            ActionSpace::MultiBinary {
                width: config.trick_cards_per_player,
            }
        } else {
            ActionSpace::Discrete {
                n: config.trick_cards_per_player + 1,
            }
        }
    }

    pub fn is_multi_bid(&self) -> bool {
        matches!(self, ActionSpace::MultiBinary { .. })
    }

    /// Whether `action` is a member of this space.
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (ActionSpace::Discrete { n }, Action::Index(index)) => index < n,
            (ActionSpace::MultiBinary { width }, Action::Mask(mask)) => mask.len() == *width,
            _ => false,
        }
    }

    /// An action that bids nothing regardless of the hand.
    pub fn pass_action(&self) -> Action {
        match *self {
            ActionSpace::Discrete { n } => Action::Index(n.saturating_sub(1)),
            ActionSpace::MultiBinary { width } => Action::Mask(vec![false; width]),
        }
    }

    /// Rejects actions of the wrong mode or mask width. Out-of-range indices
    /// are accepted; they resolve to a pass.
    pub fn check(&self, action: &Action) -> Result<(), ActionError> {
        match (self, action) {
            (ActionSpace::Discrete { .. }, Action::Index(_)) => Ok(()),
            (ActionSpace::MultiBinary { width }, Action::Mask(mask)) => {
                if mask.len() == *width {
                    Ok(())
                } else {
                    Err(ActionError::MaskWidth {
                        expected: *width,
                        found: mask.len(),
                    })
                }
            }
            (ActionSpace::Discrete { .. }, Action::Mask(_)) => Err(ActionError::ModeMismatch {
                expected: "single-bid",
                action: action.clone(),
            }),
            (ActionSpace::MultiBinary { .. }, Action::Index(_)) => Err(ActionError::ModeMismatch {
                expected: "multi-bid",
                action: action.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action {action:?} does not fit the {expected} action space")]
    ModeMismatch {
        expected: &'static str,
        action: Action,
    },
    #[error("bid mask has {found} slots but the action space expects {expected}")]
    MaskWidth { expected: usize, found: usize },
}

/// Spends the cards selected by `action` from `hand` and returns the bid.
///
/// The action must already have passed [`ActionSpace::check`]. Slots past the
/// end of the hand are ignored, so a stale mask from a larger hand is a pass
/// for the missing cards.
pub fn apply_action(hand: &mut Hand, action: &Action) -> u32 {
    match action {
        Action::Index(index) => hand.remove_at(*index).unwrap_or(0),
        Action::Mask(mask) => {
            let selected: Vec<usize> = mask
                .iter()
                .enumerate()
                .take(hand.len())
                .filter_map(|(index, &set)| set.then_some(index))
                .collect();
            if selected.is_empty() {
                return 0;
            }
            hand.remove_many(&selected)
        }
    }
}
