use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Open telemetry log for one run. Dropping it flushes pending events.
pub struct TelemetryGuard {
    _worker: WorkerGuard,
    run_id: String,
    path: PathBuf,
}

impl TelemetryGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// `<report dir>/<run_id>.telemetry.jsonl`
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Route core, bot and runner events for `run_id` into a JSON lines file.
///
/// Returns `None` when structured logging is disabled. `RUST_LOG` takes
/// precedence over `logging.tracing_level`.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<TelemetryGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let path = outputs.telemetry_path(run_id);
    let file = create_telemetry_file(&path)?;
    let (writer, worker) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(episode_filter(logging))
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Tests may install several runs into one process; the first one wins.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(TelemetryGuard {
        _worker: worker,
        run_id: run_id.to_string(),
        path,
    }))
}

fn create_telemetry_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("creating telemetry file at {}", path.display()))
}

fn episode_filter(logging: &LoggingConfig) -> EnvFilter {
    let level = logging.level().unwrap_or(Level::INFO);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
