use super::{Policy, PolicyContext};
use fatcats_core::game::action::{Action, ActionSpace};
use tracing::{Level, event};

/// Always bids its single highest card; passes once the hand is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn act(&mut self, ctx: &PolicyContext) -> Action {
        let hand = ctx.hand();
        // Leftmost of equal highs.
        let best = hand
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, card)| **card)
            .map(|(index, _)| index);

        let action = match (ctx.action_space, best) {
            (ActionSpace::Discrete { .. }, Some(index)) => Action::Index(index),
            (ActionSpace::MultiBinary { width }, Some(index)) => {
                Action::mask_from_indices(width, &[index])
            }
            (space, None) => space.pass_action(),
        };

        event!(
            target: "fatcats_bot::greedy",
            Level::TRACE,
            player = ctx.player,
            action = ?action
        );
        action
    }
}
