use std::path::PathBuf;

use clap::Parser;

use fatcats_bench::config::{BenchmarkConfig, ResolvedOutputs};
use fatcats_bench::logging::init_logging;
use fatcats_bench::runner::EpisodeRunner;
use fatcats_core::AppInfo;

/// Episode harness for Fat Cats agents.
#[derive(Debug, Parser)]
#[command(
    name = "fatcats-bench",
    author,
    version,
    about = "Deterministic Fat Cats episode harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of episodes to play.
    #[arg(long, value_name = "EPISODES")]
    episodes: Option<usize>,

    /// Override the RNG seed for deals and agents.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no episodes are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(episodes) = cli.episodes {
        config.episodes.count = episodes;
    }

    if let Some(seed) = cli.seed {
        config.episodes.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let players = config.game.number_of_players;
    let episodes = config.episodes.count;

    println!(
        "{} {}: loaded '{run_id}' with {players} players ({episodes} episode{}, {})",
        AppInfo::name(),
        AppInfo::version(),
        if episodes == 1 { "" } else { "s" },
        if config.game.allow_multi_bid {
            "multi-bid"
        } else {
            "single-bid"
        }
    );

    let _telemetry = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = EpisodeRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no episodes played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run '{run_id}' complete: {} episodes → {} rows at {}",
        summary.episodes_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for line in summary.scoreboard.score_lines() {
        println!("  {line}");
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
