use crate::config::{GameConfig, ValidationError};
use crate::game::action::{Action, ActionError, ActionSpace};
use crate::game::episode::{Episode, RoundOutcome};
use crate::game::observation::{Observation, ObservationSpace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{Level, event};

/// Where the environment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvPhase {
    Uninitialized,
    InRound,
    Terminal,
}

/// Single step result
#[derive(Debug, Clone)]
pub struct Step {
    pub observation: Observation,
    /// Always 0; final scores are read from the episode.
    pub reward: f32,
    pub terminated: bool,
    /// Always false; the deck size alone bounds an episode.
    pub truncated: bool,
    pub info: StepInfo,
}

/// Additional step information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Set on the step that closed a round.
    pub round: Option<RoundOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("environment has not been reset")]
    NotReset,
    #[error("episode is over; reset before stepping again")]
    EpisodeOver,
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Step-wise Fat Cats table for one acting seat at a time.
///
/// Seats act in index order; after the last seat acts, the round's bids are
/// resolved and seat 0 acts on the next treat.
#[derive(Debug, Clone)]
pub struct FatCatsEnv {
    config: GameConfig,
    action_space: ActionSpace,
    observation_space: ObservationSpace,
    rng: StdRng,
    seed: u64,
    episode: Option<Episode>,
}

impl FatCatsEnv {
    /// Create a new environment. Without a seed, one is drawn from the
    /// thread RNG.
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self, ValidationError> {
        config.validate()?;
        let seed = seed.unwrap_or_else(rand::random);

        Ok(Self {
            action_space: config.action_space(),
            observation_space: config.observation_space(),
            config,
            rng: StdRng::seed_from_u64(seed),
            seed,
            episode: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    pub fn observation_space(&self) -> ObservationSpace {
        self.observation_space
    }

    /// Seed the RNG stream was last (re)started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> EnvPhase {
        match &self.episode {
            None => EnvPhase::Uninitialized,
            Some(episode) if episode.is_terminal() => EnvPhase::Terminal,
            Some(_) => EnvPhase::InRound,
        }
    }

    /// Current (or just finished) episode.
    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    /// Scores of the current episode; stays readable after termination.
    pub fn scores(&self) -> Option<&[u32]> {
        self.episode.as_ref().map(|episode| episode.scores().standings())
    }

    /// Start a new episode. A seed restarts the RNG stream; otherwise the
    /// stream continues where the previous episode left it.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.seed = seed;
            self.rng = StdRng::seed_from_u64(seed);
        }

        let episode = Episode::deal(&self.config, &mut self.rng);
        let observation = episode.observe(0);

        event!(
            target: "fatcats_core::env",
            Level::DEBUG,
            seed = self.seed,
            deck = ?episode.deck().values(),
            "episode reset"
        );

        self.episode = Some(episode);
        (observation, StepInfo::default())
    }

    /// Apply the acting seat's action. On error nothing changes.
    pub fn step(&mut self, action: &Action) -> Result<Step, StepError> {
        let episode = self.episode.as_mut().ok_or(StepError::NotReset)?;
        if episode.is_terminal() {
            return Err(StepError::EpisodeOver);
        }
        self.action_space.check(action)?;

        let round = episode.play(action);
        let terminated = episode.is_terminal();
        let observation = episode.observe(episode.turn());

        Ok(Step {
            observation,
            reward: 0.0,
            terminated,
            truncated: false,
            info: StepInfo { round },
        })
    }

    /// Observation for the seat that acts next.
    pub fn observe_current(&self) -> Option<Observation> {
        self.episode
            .as_ref()
            .map(|episode| episode.observe(episode.turn()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_env(multi: bool) -> FatCatsEnv {
        let mut cfg = GameConfig::new(2, 4);
        cfg.trick_card_values = vec![1, 2, 3];
        cfg.treat_deck_size = 3;
        cfg.allow_multi_bid = multi;
        FatCatsEnv::new(cfg, Some(7)).expect("valid config")
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let err = FatCatsEnv::new(GameConfig::new(1, 4), Some(0)).expect_err("one player");
        assert_eq!(err.field_name(), "number_of_players");
    }

    #[test]
    fn construction_rejects_overflowing_card_values() {
        let mut cfg = GameConfig::new(2, 2);
        cfg.allow_multi_bid = true;
        cfg.trick_card_values = vec![3_000_000_000];
        let err = FatCatsEnv::new(cfg, Some(0)).expect_err("bid total overflows");
        assert_eq!(err.field_name(), "trick_card_values");
    }

    #[test]
    fn step_before_reset_errors() {
        let mut env = two_player_env(false);
        assert_eq!(env.phase(), EnvPhase::Uninitialized);
        assert_eq!(env.step(&Action::Index(0)).unwrap_err(), StepError::NotReset);
        assert!(env.scores().is_none());
    }

    #[test]
    fn reset_returns_seat_zero_view() {
        let mut env = two_player_env(false);
        let (obs, info) = env.reset(None);

        assert_eq!(env.phase(), EnvPhase::InRound);
        assert_eq!(info, StepInfo::default());
        assert_eq!(obs.len(), 1 + 4 + 1 + 3);
        assert!(env.observation_space().contains(&obs));

        let episode = env.episode().expect("episode");
        assert_eq!(&obs.as_slice()[1..5], episode.hand(0).cards());
    }

    #[test]
    fn wrong_mode_action_leaves_state_untouched() {
        let mut env = two_player_env(false);
        env.reset(None);
        let before = env.episode().cloned().expect("episode");

        let err = env.step(&Action::Mask(vec![true; 4])).unwrap_err();
        assert!(matches!(err, StepError::Action(ActionError::ModeMismatch { .. })));

        let after = env.episode().expect("episode");
        assert_eq!(after.hands(), before.hands());
        assert_eq!(after.turn(), before.turn());
    }

    #[test]
    fn wrong_mask_width_is_rejected() {
        let mut env = two_player_env(true);
        env.reset(None);
        let err = env.step(&Action::Mask(vec![true; 3])).unwrap_err();
        assert_eq!(
            err,
            StepError::Action(ActionError::MaskWidth { expected: 4, found: 3 })
        );
        assert_eq!(env.episode().map(|e| e.hand(0).len()), Some(4));
    }

    #[test]
    fn step_after_termination_errors() {
        let mut env = two_player_env(false);
        env.reset(None);
        let pass = env.action_space().pass_action();
        let mut steps = 0;
        loop {
            let step = env.step(&pass).expect("step");
            steps += 1;
            assert_eq!(step.reward, 0.0);
            assert!(!step.truncated);
            if step.terminated {
                break;
            }
        }
        assert_eq!(steps, 6);
        assert_eq!(env.phase(), EnvPhase::Terminal);
        assert_eq!(env.step(&pass).unwrap_err(), StepError::EpisodeOver);

        env.reset(None);
        assert_eq!(env.phase(), EnvPhase::InRound);
    }

    #[test]
    fn info_reports_resolved_round_only_on_wrap() {
        let mut env = two_player_env(false);
        env.reset(None);
        let first = env.step(&Action::Index(0)).expect("step");
        assert!(first.info.round.is_none());

        let second = env.step(&Action::Index(9)).expect("step");
        let round = second.info.round.expect("round resolved");
        assert_eq!(round.treat_index, 0);
        assert_eq!(round.winner, Some(0));
    }

    #[test]
    fn reseeding_reproduces_episode() {
        let mut env = two_player_env(false);
        let (obs_a, _) = env.reset(Some(99));
        let deck_a = env.episode().map(|e| e.deck().clone());
        env.reset(None);
        let (obs_b, _) = env.reset(Some(99));
        let deck_b = env.episode().map(|e| e.deck().clone());

        assert_eq!(obs_a, obs_b);
        assert_eq!(deck_a, deck_b);
        assert_eq!(env.seed(), 99);
    }
}
