use std::fs;
use std::path::Path;

use fatcats_core::game::summary::EpisodeSummary;
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("episode has {found} scores but the table seats {expected}")]
    SeatCount { expected: usize, found: usize },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates final scores per seat across a run.
pub struct ScoreboardCollector {
    seats: Vec<SeatAccumulator>,
    episodes: usize,
    contested: usize,
    deck_total: u64,
    discarded_total: u64,
}

impl ScoreboardCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let seats = config
            .agents
            .iter()
            .map(|agent| SeatAccumulator {
                name: agent.name.clone(),
                kind: agent.kind.clone(),
                scores: Vec::with_capacity(config.episodes.count),
                wins: 0,
            })
            .collect();

        Self {
            seats,
            episodes: 0,
            contested: 0,
            deck_total: 0,
            discarded_total: 0,
        }
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) -> Result<(), AnalyticsError> {
        if summary.scores.len() != self.seats.len() {
            return Err(AnalyticsError::SeatCount {
                expected: self.seats.len(),
                found: summary.scores.len(),
            });
        }

        for (seat, &score) in self.seats.iter_mut().zip(&summary.scores) {
            seat.scores.push(f64::from(score));
        }
        match summary.winner.and_then(|winner| self.seats.get_mut(winner)) {
            Some(seat) => seat.wins += 1,
            None => self.contested += 1,
        }

        self.episodes += 1;
        self.deck_total += summary.deck_total();
        self.discarded_total += summary.discarded_total();
        Ok(())
    }

    pub fn finalize(self) -> ScoreboardSummary {
        let episodes = self.episodes;
        let seats = self
            .seats
            .into_iter()
            .map(SeatAccumulator::into_report)
            .collect();

        ScoreboardSummary {
            episodes,
            seats,
            contested: self.contested,
            deck_total: self.deck_total,
            discarded_total: self.discarded_total,
        }
    }
}

struct SeatAccumulator {
    name: String,
    kind: AgentKind,
    scores: Vec<f64>,
    wins: usize,
}

impl SeatAccumulator {
    fn into_report(self) -> SeatReport {
        let (mean, std_dev) = if self.scores.is_empty() {
            (0.0, 0.0)
        } else {
            (self.scores.iter().mean(), self.scores.iter().population_std_dev())
        };
        let (min, max) = if self.scores.is_empty() {
            (0.0, 0.0)
        } else {
            (
                Statistics::min(self.scores.iter()),
                Statistics::max(self.scores.iter()),
            )
        };

        SeatReport {
            ci95: confidence_interval(&self.scores),
            name: self.name,
            kind: self.kind,
            episodes: self.scores.len(),
            mean,
            std_dev,
            min,
            max,
            wins: self.wins,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatReport {
    pub name: String,
    pub kind: AgentKind,
    pub episodes: usize,
    pub mean: f64,
    /// Population standard deviation of final scores.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreboardSummary {
    pub episodes: usize,
    pub seats: Vec<SeatReport>,
    /// Episodes without a strictly highest score.
    pub contested: usize,
    pub deck_total: u64,
    pub discarded_total: u64,
}

impl ScoreboardSummary {
    /// One `name: mean ± std` line per seat.
    pub fn score_lines(&self) -> Vec<String> {
        self.seats
            .iter()
            .map(|seat| format!("{}: {:.2} ± {:.2}", seat.name, seat.mean, seat.std_dev))
            .collect()
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Fat Cats Scoreboard\n\n");
        rows.push_str(&format!("Episodes: {}\n\n", self.episodes));
        rows.push_str(&format!(
            "Treats awarded: {} of {} (discarded {})\n\n",
            self.deck_total.saturating_sub(self.discarded_total),
            self.deck_total,
            self.discarded_total
        ));
        rows.push_str("| Seat | Agent | Kind | Mean | Std Dev | 95% CI | Min | Max | Win % |\n");
        rows.push_str("|------|-------|------|------|---------|--------|-----|-----|-------|\n");

        for (index, seat) in self.seats.iter().enumerate() {
            let win_rate = if seat.episodes == 0 {
                0.0
            } else {
                seat.wins as f64 / seat.episodes as f64
            };
            rows.push_str(&format!(
                "| {index} | {name} | {kind:?} | {mean:.3} | {std:.3} | [{ci_low:.3}, {ci_high:.3}] | {min:.0} | {max:.0} | {win:.1}% |\n",
                name = seat.name,
                kind = seat.kind,
                mean = seat.mean,
                std = seat.std_dev,
                ci_low = seat.ci95.0,
                ci_high = seat.ci95.1,
                min = seat.min,
                max = seat.max,
                win = win_rate * 100.0,
            ));
        }
        rows.push_str(&format!(
            "\nEpisodes without an outright winner: {}\n",
            self.contested
        ));

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().mean();
    if points.len() == 1 {
        return (mean, mean);
    }
    let std_error = (points.iter().variance() / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config() -> BenchmarkConfig {
        let yaml = r#"
run_id: "scores"
game:
  number_of_players: 2
  trick_cards_per_player: 3
episodes:
  count: 3
agents:
  - name: "left"
    kind: "greedy"
  - name: "right"
    kind: "random"
outputs:
  jsonl: "out/{run_id}.jsonl"
  summary_md: "out/{run_id}.md"
"#;
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    fn summary(scores: Vec<u32>, winner: Option<usize>) -> EpisodeSummary {
        let awarded: u32 = scores.iter().sum();
        EpisodeSummary {
            seed: 0,
            treat_index: 2,
            terminated: true,
            deck: vec![awarded, 5],
            scores,
            discarded_treats: vec![0, 5],
            cards_left: vec![1, 1],
            winner,
        }
    }

    #[test]
    fn mean_and_population_std_dev_per_seat() {
        let mut collector = ScoreboardCollector::new(&config());
        collector.record_episode(&summary(vec![10, 0], Some(0))).unwrap();
        collector.record_episode(&summary(vec![20, 0], Some(0))).unwrap();
        collector.record_episode(&summary(vec![0, 0], None)).unwrap();

        let report = collector.finalize();
        assert_eq!(report.episodes, 3);
        assert_eq!(report.contested, 1);

        let left = &report.seats[0];
        assert!((left.mean - 10.0).abs() < 1e-9);
        // population variance of [10, 20, 0] is 200/3
        assert!((left.std_dev - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(left.wins, 2);
        assert_eq!(left.max, 20.0);

        let right = &report.seats[1];
        assert_eq!(right.mean, 0.0);
        assert_eq!(right.std_dev, 0.0);
        assert_eq!(report.score_lines()[1], "right: 0.00 ± 0.00");
    }

    #[test]
    fn rejects_mismatched_seat_count() {
        let mut collector = ScoreboardCollector::new(&config());
        let err = collector
            .record_episode(&summary(vec![1, 2, 3], None))
            .expect_err("three scores for two seats");
        assert!(matches!(err, AnalyticsError::SeatCount { expected: 2, found: 3 }));
    }

    #[test]
    fn empty_run_reports_zeroes() {
        let report = ScoreboardCollector::new(&config()).finalize();
        assert_eq!(report.seats.len(), 2);
        assert!(report.seats.iter().all(|seat| seat.mean == 0.0 && seat.std_dev == 0.0));
    }

    #[test]
    fn markdown_lists_every_seat() {
        let mut collector = ScoreboardCollector::new(&config());
        collector.record_episode(&summary(vec![15, 5], Some(0))).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.md");

        collector.finalize().write_markdown(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("| 0 | left | Greedy |"));
        assert!(text.contains("| 1 | right | Random |"));
        assert!(text.contains("discarded 5"));
    }
}
