//! ScalpDesk CLI: signal desk commands.
//!
//! Commands:
//! - `evaluate`: run the gate pipeline on a full evaluation context
//! - `submit`: quick submission from symbol, price and evidence
//! - `signals`: list cached signals with optional filters
//! - `snapshot`: market snapshot with alignment at the latest prices
//! - `pairs`: tradable universe with liquidity rating
//! - `health`: upstream source health
//! - `watch`: print `signal.update` events on the stream interval
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scalpdesk_core::clock::{Clock, SystemClock};
use scalpdesk_core::components::{Direction, EntryMetric};
use scalpdesk_core::domain::Timeframe;
use scalpdesk_core::{Signal, SignalContext, SignalOutcome};
use scalpdesk_runner::{
    init_logging, write_snapshot, DeskConfig, MarketData, SignalDesk, SignalQuery, SnapshotQuery,
    SubmitRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "scalpdesk",
    about = "ScalpDesk CLI, EMA-aligned scalping signals with gated risk"
)]
struct Cli {
    /// Desk config TOML. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Market data JSON. The seeded sample universe is used when omitted.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// JSON array of previously accepted signals to load into the cache.
    #[arg(long, global = true)]
    signals: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gate pipeline on a full evaluation context.
    Evaluate {
        /// Context as inline JSON or a path to a JSON file.
        #[arg(long)]
        context: String,
    },
    /// Build and cache a signal from a price and entry evidence.
    Submit {
        #[arg(long)]
        symbol: String,

        #[arg(long)]
        price: f64,

        /// 1m, 5m, 15m or 1h.
        #[arg(long)]
        timeframe: Timeframe,

        /// Entry metrics as an inline JSON array or a path to a JSON file.
        #[arg(long)]
        metrics: Option<String>,
    },
    /// List cached signals.
    Signals {
        #[arg(long)]
        tf: Option<Timeframe>,

        /// long or short.
        #[arg(long)]
        direction: Option<Direction>,

        /// Minimum checklist score.
        #[arg(long)]
        min_score: Option<usize>,
    },
    /// Market snapshot with alignment recomputed at the latest prices.
    Snapshot {
        #[arg(long)]
        symbol: Option<String>,

        /// Comma-separated timeframes, e.g. 1m,5m.
        #[arg(long)]
        tf: Option<String>,

        /// Write a versioned, fingerprinted export here instead of printing.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Tradable universe with liquidity rating and cached-signal flag.
    Pairs,
    /// Upstream source health.
    Health,
    /// Print signal.update events every stream interval.
    Watch {
        /// Stop after this many events. Runs until interrupted when omitted.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DeskConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DeskConfig::default(),
    };
    init_logging(config.logging.format);
    info!(config_hash = %config.config_hash(), "config loaded");

    let mut desk = build_desk(config, cli.data.as_deref(), cli.signals.as_deref())?;

    match cli.command {
        Commands::Evaluate { context } => run_evaluate(&desk, &context),
        Commands::Submit {
            symbol,
            price,
            timeframe,
            metrics,
        } => {
            let metrics: Vec<EntryMetric> = match metrics {
                Some(arg) => read_json_arg(&arg).context("invalid --metrics")?,
                None => Vec::new(),
            };
            let signal = desk.submit(SubmitRequest {
                symbol,
                price,
                timeframe,
                metrics,
            })?;
            print_json(&signal)
        }
        Commands::Signals {
            tf,
            direction,
            min_score,
        } => print_json(&desk.signals(&SignalQuery {
            timeframe: tf,
            direction,
            min_score,
        })),
        Commands::Snapshot { symbol, tf, output } => {
            let query =
                SnapshotQuery::from_parts(symbol, tf.as_deref()).context("invalid --tf")?;
            let snapshot = desk.snapshot(&query)?;
            match output {
                Some(path) => write_snapshot(&snapshot, &path),
                None => print_json(&snapshot),
            }
        }
        Commands::Pairs => print_json(&desk.pairs()?),
        Commands::Health => print_json(&desk.health()),
        Commands::Watch { ticks } => run_watch(&desk, ticks),
    }
}

fn build_desk(
    config: DeskConfig,
    data: Option<&Path>,
    signals: Option<&Path>,
) -> Result<SignalDesk> {
    let mut desk = match data {
        Some(path) => SignalDesk::new(config, MarketData::load(path)?),
        None => {
            let data = MarketData::sample(SystemClock.now_millis());
            let seed: Vec<SignalContext> = data.sample_seed_context().into_iter().collect();
            let mut desk = SignalDesk::new(config, data);
            let accepted = desk.seed(&seed);
            info!(accepted, "sample desk seeded");
            desk
        }
    };
    if let Some(path) = signals {
        let stored: Vec<Signal> = read_json_file(path)?;
        let count = desk.restore(stored)?;
        info!(count, path = %path.display(), "signals restored");
    }
    Ok(desk)
}

fn run_evaluate(desk: &SignalDesk, context: &str) -> Result<()> {
    let ctx: SignalContext = read_json_arg(context).context("invalid --context")?;
    match desk.evaluate(&ctx)? {
        SignalOutcome::Accepted(signal) => print_json(&signal),
        SignalOutcome::Rejected(gate) => print_json(&serde_json::json!({
            "accepted": false,
            "rejected_by": gate,
        })),
    }
}

fn run_watch(desk: &SignalDesk, ticks: Option<u64>) -> Result<()> {
    let interval = Duration::from_secs(desk.config().stream.interval_secs);
    let mut emitted = 0u64;
    loop {
        std::thread::sleep(interval);
        let event = desk.stream_event();
        println!("{}", serde_json::to_string(&event)?);
        emitted += 1;
        if ticks.is_some_and(|limit| emitted >= limit) {
            return Ok(());
        }
    }
}

/// Inline JSON when the argument starts with `{` or `[`, otherwise a file path.
fn read_json_arg<T: DeserializeOwned>(arg: &str) -> Result<T> {
    let trimmed = arg.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("failed to parse inline JSON")
    } else {
        read_json_file(Path::new(arg))
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
