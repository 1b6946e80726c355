use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fatcats_bot::policy::{GreedyPolicy, Policy, PolicyContext, PolicyError, RandomPolicy};
use fatcats_core::config::ValidationError as GameValidationError;
use fatcats_core::game::env::{FatCatsEnv, StepError};
use fatcats_core::game::summary::EpisodeSummary;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsError, ScoreboardCollector, ScoreboardSummary};
use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

/// Plays a configured number of episodes and records per-episode results.
pub struct EpisodeRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub episodes_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub scoreboard: ScoreboardSummary,
}

impl EpisodeRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != config.game.number_of_players {
            return Err(RunnerError::SeatCount {
                expected: config.game.number_of_players,
                found: agents.len(),
            });
        }
        config.game.validate()?;

        let logging_enabled = config.logging.enable_structured;
        Ok(Self {
            config,
            outputs,
            agents,
            logging_enabled,
        })
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let seed = self.config.episodes.seed_or_default();
        let mut seeds = StdRng::seed_from_u64(seed);
        let mut policies = self
            .agents
            .iter()
            .map(|agent| agent.spawn_policy(seeds.next_u64()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut env = FatCatsEnv::new(self.config.game.clone(), Some(seed))?;
        let mut scoreboard = ScoreboardCollector::new(&self.config);
        let mut rows_written = 0usize;

        for episode_index in 0..self.config.episodes.count {
            let (summary, steps) = play_episode(&mut env, &mut policies)?;
            check_conservation(episode_index, &summary)?;
            scoreboard.record_episode(&summary)?;

            event!(
                target: "fatcats_bench::runner",
                Level::INFO,
                run_id = %self.config.run_id,
                episode = episode_index,
                steps,
                scores = ?summary.scores,
                discarded = summary.discarded_total(),
                winner = ?summary.winner,
                "episode complete"
            );

            let row = EpisodeLogRow {
                run_id: &self.config.run_id,
                episode: episode_index,
                scores: &summary.scores,
                discarded_total: summary.discarded_total(),
                deck_total: summary.deck_total(),
                winner: summary
                    .winner
                    .and_then(|seat| self.agents.get(seat))
                    .map(|agent| agent.name.as_str()),
                steps,
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = scoreboard.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.telemetry_path(&self.config.run_id));

        Ok(RunSummary {
            episodes_played: self.config.episodes.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            scoreboard: summary,
        })
    }
}

/// Plays one episode to termination; returns its summary and the step count.
fn play_episode(
    env: &mut FatCatsEnv,
    policies: &mut [Box<dyn Policy>],
) -> Result<(EpisodeSummary, usize), RunnerError> {
    let (mut observation, _) = env.reset(None);
    let mut steps = 0usize;

    loop {
        let player = env
            .episode()
            .map(|episode| episode.turn())
            .ok_or_else(|| RunnerError::game("episode missing after reset".to_string()))?;
        let policy = policies
            .get_mut(player)
            .ok_or_else(|| RunnerError::game(format!("no agent seated at {player}")))?;

        let action = policy.act(&PolicyContext::for_env(env, player, &observation));
        let step = env.step(&action)?;
        steps += 1;
        observation = step.observation;

        if step.terminated || step.truncated {
            break;
        }
    }

    let summary = EpisodeSummary::capture(env)
        .ok_or_else(|| RunnerError::game("episode missing at termination".to_string()))?;
    Ok((summary, steps))
}

fn check_conservation(episode: usize, summary: &EpisodeSummary) -> Result<(), RunnerError> {
    let awarded = summary.score_total();
    let discarded = summary.discarded_total();
    let deck = summary.deck_total();
    if awarded + discarded != deck {
        return Err(RunnerError::Conservation {
            episode,
            awarded,
            discarded,
            deck,
        });
    }
    Ok(())
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct EpisodeLogRow<'a> {
    run_id: &'a str,
    episode: usize,
    scores: &'a [u32],
    discarded_total: u64,
    deck_total: u64,
    winner: Option<&'a str>,
    steps: usize,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid game configuration: {0}")]
    Config(#[from] GameValidationError),
    #[error("step rejected: {0}")]
    Step(#[from] StepError),
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration seats {expected} players but defines {found} agents")]
    SeatCount { expected: usize, found: usize },
    #[error(
        "episode {episode} lost treats: awarded {awarded} + discarded {discarded} != deck {deck}"
    )]
    Conservation {
        episode: usize,
        awarded: u64,
        discarded: u64,
        deck: u64,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid random parameter for agent '{name}': {message}")]
    InvalidRandomParam { name: String, message: String },
    #[error("agent '{name}' rejected its parameters: {source}")]
    Policy {
        name: String,
        #[source]
        source: PolicyError,
    },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Random(RandomOptions),
    Greedy,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Random => {
                AgentImplementation::Random(RandomOptions::from_params(&config.name, &config.params)?)
            }
            AgentKind::Greedy => AgentImplementation::Greedy,
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn spawn_policy(&self, seed: u64) -> Result<Box<dyn Policy>, AgentError> {
        match &self.implementation {
            AgentImplementation::Random(opts) => {
                let policy = match opts.bid_probability {
                    Some(p) => RandomPolicy::new(p, seed).map_err(|source| AgentError::Policy {
                        name: self.name.clone(),
                        source,
                    })?,
                    None => RandomPolicy::with_seed(seed),
                };
                Ok(Box::new(policy))
            }
            AgentImplementation::Greedy => Ok(Box::new(GreedyPolicy::new())),
        }
    }
}

struct RandomOptions {
    bid_probability: Option<f64>,
}

impl RandomOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        if params.is_null() {
            return Ok(Self {
                bid_probability: None,
            });
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidRandomParam {
                name: name.to_string(),
                message: "expected mapping for random params".to_string(),
            })?;

        let probability_value = mapping
            .iter()
            .find_map(|(key, value)| (key.as_str() == Some("bid_probability")).then_some(value));

        let bid_probability = match probability_value {
            Some(value) => Some(value.as_f64().ok_or_else(|| AgentError::InvalidRandomParam {
                name: name.to_string(),
                message: "bid_probability must be a number".to_string(),
            })?),
            None => None,
        };

        if let Some(p) = bid_probability {
            RandomPolicy::new(p, 0).map_err(|source| AgentError::Policy {
                name: name.to_string(),
                source,
            })?;
        }

        Ok(Self { bid_probability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &Path, agents: &str) -> BenchmarkConfig {
        let yaml = format!(
            r#"
run_id: "runner_unit"
game:
  number_of_players: 2
  trick_cards_per_player: 4
  treat_deck_size: 5
episodes:
  count: 4
  seed: 9
agents:
{agents}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
"#,
            jsonl = dir.join("episodes.jsonl").display(),
            summary = dir.join("summary.md").display(),
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    const TWO_AGENTS: &str = r#"  - name: "chancer"
    kind: "random"
    params:
      bid_probability: 0.4
  - name: "glutton"
    kind: "greedy""#;

    #[test]
    fn run_writes_one_row_per_episode() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), TWO_AGENTS);
        let outputs = cfg.resolved_outputs();
        let summary = EpisodeRunner::new(cfg, outputs).unwrap().run().unwrap();

        assert_eq!(summary.episodes_played, 4);
        assert_eq!(summary.rows_written, 4);
        assert!(summary.telemetry_path.is_none());

        let jsonl = fs::read_to_string(&summary.jsonl_path).unwrap();
        for (index, line) in jsonl.lines().enumerate() {
            let row: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(row["episode"], index);
            // 5 rounds of 2 seats each
            assert_eq!(row["steps"], 10);
            let awarded: u64 = row["scores"]
                .as_array()
                .unwrap()
                .iter()
                .map(|score| score.as_u64().unwrap())
                .sum();
            assert_eq!(
                awarded + row["discarded_total"].as_u64().unwrap(),
                row["deck_total"].as_u64().unwrap()
            );
        }
    }

    #[test]
    fn rejects_out_of_range_bid_probability() {
        let dir = tempdir().unwrap();
        let agents = TWO_AGENTS.replace("0.4", "1.5");
        let cfg = config(dir.path(), &agents);
        let outputs = cfg.resolved_outputs();
        let err = EpisodeRunner::new(cfg, outputs).err().expect("invalid probability");
        assert!(matches!(
            err,
            RunnerError::Agent(AgentError::Policy { ref name, .. }) if name == "chancer"
        ));
    }

    #[test]
    fn rejects_non_numeric_bid_probability() {
        let dir = tempdir().unwrap();
        let agents = TWO_AGENTS.replace("0.4", "\"often\"");
        let cfg = config(dir.path(), &agents);
        let outputs = cfg.resolved_outputs();
        let err = EpisodeRunner::new(cfg, outputs).err().expect("not a number");
        assert!(matches!(
            err,
            RunnerError::Agent(AgentError::InvalidRandomParam { .. })
        ));
    }

    #[test]
    fn conservation_check_flags_missing_treats() {
        let summary = EpisodeSummary {
            seed: 0,
            treat_index: 2,
            terminated: true,
            deck: vec![10, 5],
            scores: vec![10, 0],
            discarded_treats: vec![0, 0],
            cards_left: vec![0, 0],
            winner: Some(0),
        };
        let err = check_conservation(3, &summary).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Conservation { episode: 3, awarded: 10, discarded: 0, deck: 15 }
        ));
    }
}
