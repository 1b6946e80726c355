mod greedy;
mod random;

pub use greedy::GreedyPolicy;
pub use random::RandomPolicy;

use fatcats_core::game::action::{Action, ActionSpace};
use fatcats_core::game::env::FatCatsEnv;
use fatcats_core::game::observation::{Observation, ObservationLayout};
use thiserror::Error;

/// Context provided to policies for decision-making
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub player: usize,
    pub observation: &'a Observation,
    pub action_space: ActionSpace,
    pub layout: ObservationLayout,
}

impl<'a> PolicyContext<'a> {
    /// Context for `player` built from `env`'s spaces. The caller picks the
    /// seat; normally that is `env.episode().map(Episode::turn)`.
    pub fn for_env(env: &FatCatsEnv, player: usize, observation: &'a Observation) -> Self {
        Self {
            player,
            observation,
            action_space: env.action_space(),
            layout: env.observation_space().layout(),
        }
    }

    /// Cards the acting player still holds, in hand order.
    pub fn hand(&self) -> &'a [u32] {
        self.layout.hand(self.observation)
    }
}

/// Unified interface for agents choosing bids.
pub trait Policy: Send {
    fn name(&self) -> &str;

    /// Choose an action from the acting player's observation.
    fn act(&mut self, ctx: &PolicyContext) -> Action;

    /// Choose one action per context. Batching is only a convenience; each
    /// decision depends on its own context alone.
    fn act_batch(&mut self, contexts: &[PolicyContext]) -> Vec<Action> {
        contexts.iter().map(|ctx| self.act(ctx)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("bid probability must be strictly between 0 and 1, got {0}")]
    BidProbability(f64),
}
