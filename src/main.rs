use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use research_replay::graph::{now_epoch_ms, SessionSource};
use research_replay::ui::install_panic_hook;
use research_replay::{util, App, Config, JsonFileSource, SnapshotSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "research-replay", version)]
#[command(about = "Watch a research session's graph grow, or replay it once the session closes")]
struct Cli {
    /// Session export (JSON) to display
    session: PathBuf,

    /// Config file (defaults to <data-dir>/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for config and logs (defaults to ~/.research-replay)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Initial playback speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Start in replay mode (closed sessions only)
    #[arg(long)]
    replay: bool,

    /// Log filter, e.g. `debug` or `research_replay=trace` (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Print the snapshot at PROGRESS (0.0 to 1.0) as JSON and exit
    #[arg(long, value_name = "PROGRESS", value_parser = parse_progress)]
    snapshot_at: Option<f64>,
}

fn parse_progress(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("progress must be between 0 and 1, got {value}"));
    }
    Ok(value)
}

fn init_logging(log_level: Option<&str>) -> Result<()> {
    // Log to <data dir>/logs/research-replay.log; the terminal belongs to the TUI
    let layout = util::layout();
    let log_file = layout
        .open_log_file()
        .with_context(|| format!("Failed to open log file {}", layout.log_file().display()))?;

    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log filter `{level}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    util::init_data_dir(cli.data_dir.clone());
    init_logging(cli.log_level.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(speed) = cli.speed {
        config = config.with_default_speed(speed);
    }

    let source = JsonFileSource::new(&cli.session);
    let export = source
        .fetch()
        .await
        .with_context(|| format!("Failed to load session {}", cli.session.display()))?;

    if let Some(progress) = cli.snapshot_at {
        let status = export.status();
        let graph = export.into_graph();
        let summary = SnapshotSummary::at_progress(&graph, status, progress, now_epoch_ms());
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    install_panic_hook();

    // Create and run app
    let mut app = App::new(config, Arc::new(source), export);
    if cli.replay {
        if let Err(e) = app.enter_replay() {
            tracing::warn!(error = %e, "Starting in live mode");
        }
    }
    app.run().await
}
