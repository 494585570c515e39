//! ScalpDesk Runner: the collaborators around the engine.
//!
//! This crate builds on `scalpdesk-core` to provide:
//! - TOML desk configuration
//! - Boundary validation of symbols, bars, metrics, contexts and signals
//! - Market data sets (JSON files or the seeded sample universe)
//! - The last-write-wins signal cache and its query filters
//! - The signal desk service: pairs, signals, snapshot, health, submit, stream
//! - Versioned, fingerprinted snapshot export
//! - `tracing` subscriber setup

pub mod cache;
pub mod config;
pub mod desk;
pub mod export;
pub mod logging;
pub mod market_data;
pub mod query;
pub mod validate;

pub use cache::SignalCache;
pub use config::{ConfigError, DeskConfig, LogFormat, LoggingConfig, StreamConfig, SubmitDefaults};
pub use desk::{
    DeskError, HealthReport, PairSummary, SignalDesk, StreamEvent, StreamEventKind, SubmitRequest,
};
pub use export::{
    export_snapshot_json, import_snapshot, read_snapshot, write_snapshot, SnapshotEnvelope,
    SCHEMA_VERSION,
};
pub use logging::init_logging;
pub use market_data::{DataError, MarketData};
pub use query::{parse_timeframe_list, SignalQuery, SnapshotQuery};
pub use validate::ValidationError;
