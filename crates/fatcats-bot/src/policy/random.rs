use super::{Policy, PolicyContext, PolicyError};
use fatcats_core::game::action::{Action, ActionSpace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{Level, event};

const DEFAULT_BID_PROBABILITY: f64 = 0.2;

/// Bids uniformly at random.
///
/// In single-bid mode every held card and the pass are equally likely. In
/// multi-bid mode each held card joins the bid with `bid_probability`.
pub struct RandomPolicy {
    bid_probability: f64,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(bid_probability: f64, seed: u64) -> Result<Self, PolicyError> {
        if !(bid_probability > 0.0 && bid_probability < 1.0) {
            return Err(PolicyError::BidProbability(bid_probability));
        }
        Ok(Self {
            bid_probability,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            bid_probability: DEFAULT_BID_PROBABILITY,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn bid_probability(&self) -> f64 {
        self.bid_probability
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, ctx: &PolicyContext) -> Action {
        let hand_len = ctx.hand().len();
        let action = match ctx.action_space {
            // hand_len itself is the pass.
            ActionSpace::Discrete { .. } => Action::Index(self.rng.gen_range(0..=hand_len)),
            ActionSpace::MultiBinary { width } => Action::Mask(
                (0..width)
                    .map(|slot| slot < hand_len && self.rng.gen_bool(self.bid_probability))
                    .collect(),
            ),
        };

        event!(
            target: "fatcats_bot::random",
            Level::TRACE,
            player = ctx.player,
            hand_len,
            action = ?action
        );
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatcats_core::game::observation::{ObservationLayout, encode};

    fn ctx_for<'a>(
        obs: &'a fatcats_core::game::observation::Observation,
        space: ActionSpace,
    ) -> PolicyContext<'a> {
        PolicyContext {
            player: 0,
            observation: obs,
            action_space: space,
            layout: ObservationLayout::new(4, 2),
        }
    }

    #[test]
    fn rejects_out_of_range_probability() {
        for p in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            assert!(RandomPolicy::new(p, 0).is_err(), "{p} should be rejected");
        }
        assert!(RandomPolicy::new(0.3, 0).is_ok());
    }

    #[test]
    fn single_bid_actions_stay_within_hand_or_pass() {
        let obs = encode(0, &[3, 1], 4, 0, &[0, 0]);
        let space = ActionSpace::Discrete { n: 5 };
        let mut policy = RandomPolicy::with_seed(7);
        let ctx = ctx_for(&obs, space);

        for _ in 0..200 {
            match policy.act(&ctx) {
                Action::Index(index) => assert!(index <= 2),
                other => panic!("unexpected action {other:?}"),
            }
        }
    }

    #[test]
    fn multi_bid_masks_never_select_empty_slots() {
        let obs = encode(0, &[3, 1], 4, 0, &[0, 0]);
        let space = ActionSpace::MultiBinary { width: 4 };
        let mut policy = RandomPolicy::new(0.9, 3).unwrap();
        let ctx = ctx_for(&obs, space);

        for _ in 0..200 {
            let action = policy.act(&ctx);
            assert!(space.contains(&action));
            if let Action::Mask(mask) = action {
                assert!(!mask[2] && !mask[3]);
            }
        }
    }

    #[test]
    fn batch_returns_one_action_per_context() {
        let obs = encode(0, &[3, 1, 2, 2], 4, 0, &[0, 0]);
        let space = ActionSpace::Discrete { n: 5 };
        let mut policy = RandomPolicy::with_seed(1);
        let contexts = [ctx_for(&obs, space), ctx_for(&obs, space)];

        let actions = policy.act_batch(&contexts);
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|action| space.contains(action)));
    }

    #[test]
    fn same_seed_same_choices() {
        let obs = encode(0, &[3, 1, 2, 2], 4, 0, &[0, 0]);
        let ctx = ctx_for(&obs, ActionSpace::Discrete { n: 5 });
        let mut a = RandomPolicy::with_seed(11);
        let mut b = RandomPolicy::with_seed(11);
        for _ in 0..20 {
            assert_eq!(a.act(&ctx), b.act(&ctx));
        }
    }
}
