//! Signal desk: the service surface around the engine.
//!
//! The desk owns the configuration, the market data set and the signal cache.
//! It validates everything it receives, runs the gate pipeline, and keeps the
//! latest accepted signal per symbol for listing, snapshots and the update
//! stream.

use rand::Rng;
use scalpdesk_core::clock::{Clock, SystemClock};
use scalpdesk_core::components::{EmaTriple, EntryMetric};
use scalpdesk_core::domain::{SourceHealth, SymbolInfo, Timeframe};
use scalpdesk_core::{
    build_snapshot, GateRejection, Signal, SignalBuilder, SignalContext, SignalOutcome, Snapshot,
    SnapshotInput,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::SignalCache;
use crate::config::DeskConfig;
use crate::market_data::MarketData;
use crate::query::{SignalQuery, SnapshotQuery};
use crate::validate::{
    validate_context, validate_metric, validate_signal, validate_symbol, ValidationError,
};

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("symbol {0} is not trading")]
    SymbolHalted(String),
    #[error("signal requirements not met: {0}")]
    RequirementsNotMet(GateRejection),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl DeskError {
    /// HTTP-style status for callers that surface errors over a request API.
    pub fn status_code(&self) -> u16 {
        match self {
            DeskError::SymbolNotFound(_) => 404,
            DeskError::SymbolHalted(_) => 409,
            DeskError::RequirementsNotMet(_) => 400,
            DeskError::Validation(_) => 422,
        }
    }
}

/// Symbol metadata enriched for the pair list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    #[serde(flatten)]
    pub info: SymbolInfo,
    /// Placeholder liquidity rating in `[0, 100)`; no liquidity model backs it yet.
    pub liquidity_score: f64,
    /// Whether the cache currently holds a signal for this symbol.
    pub ema_rule_pass: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub updated_at: i64,
    pub sources: Vec<SourceHealth>,
}

/// Quick submission: only a price and evidence, the rest of the market
/// context comes from `[submit]` in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub symbol: String,
    pub price: f64,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub metrics: Vec<EntryMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEventKind {
    #[serde(rename = "signal.update")]
    SignalUpdate,
}

/// Payload pushed to stream subscribers on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: StreamEventKind,
    pub data: Vec<Signal>,
}

pub struct SignalDesk<C: Clock = SystemClock> {
    config: DeskConfig,
    data: MarketData,
    cache: SignalCache,
    builder: SignalBuilder<C>,
    clock: C,
}

impl SignalDesk<SystemClock> {
    pub fn new(config: DeskConfig, data: MarketData) -> Self {
        Self::with_clock(config, data, SystemClock)
    }
}

impl<C: Clock + Clone> SignalDesk<C> {
    pub fn with_clock(config: DeskConfig, data: MarketData, clock: C) -> Self {
        let builder = SignalBuilder::with_clock(config.evidence.clone(), clock.clone());
        Self {
            config,
            data,
            cache: SignalCache::new(),
            builder,
            clock,
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn data(&self) -> &MarketData {
        &self.data
    }

    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    /// Evaluate `contexts` and cache the accepted ones. Returns how many were accepted.
    pub fn seed(&mut self, contexts: &[SignalContext]) -> usize {
        let mut accepted = 0;
        for ctx in contexts {
            match self.evaluate(ctx) {
                Ok(SignalOutcome::Accepted(signal)) => {
                    self.cache.upsert(*signal);
                    accepted += 1;
                }
                Ok(SignalOutcome::Rejected(gate)) => {
                    debug!(symbol = %ctx.symbol.symbol, %gate, "seed candidate rejected");
                }
                Err(err) => {
                    debug!(symbol = %ctx.symbol.symbol, error = %err, "seed candidate invalid");
                }
            }
        }
        accepted
    }

    /// Put previously accepted signals back into the cache. Nothing is cached
    /// unless every signal validates.
    pub fn restore(&mut self, signals: Vec<Signal>) -> Result<usize, DeskError> {
        signals.iter().try_for_each(validate_signal)?;
        let count = signals.len();
        for signal in signals {
            self.cache.upsert(signal);
        }
        Ok(count)
    }

    /// Tradable universe with liquidity rating and cached-signal flag.
    pub fn pairs(&self) -> Result<Vec<PairSummary>, DeskError> {
        self.pairs_with(&mut rand::thread_rng())
    }

    pub fn pairs_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<PairSummary>, DeskError> {
        self.data
            .symbols
            .iter()
            .map(|info| -> Result<PairSummary, DeskError> {
                validate_symbol(info)?;
                Ok(PairSummary {
                    info: info.clone(),
                    liquidity_score: rng.gen_range(0.0..100.0),
                    ema_rule_pass: self.cache.contains(&info.symbol),
                })
            })
            .collect()
    }

    pub fn signals(&self, query: &SignalQuery) -> Vec<Signal> {
        query.apply(self.cache.iter())
    }

    /// Snapshot of the whole desk with alignment recomputed at the latest
    /// prices; `query` narrows the signal list only.
    pub fn snapshot(&self, query: &SnapshotQuery) -> Result<Snapshot, DeskError> {
        let signals = self.cache.all();
        signals.iter().try_for_each(validate_signal)?;
        let snapshot = build_snapshot(
            SnapshotInput {
                symbols: self.data.symbols.clone(),
                ohlcv: self.data.ohlcv.clone(),
                signals,
                health: self.data.health.clone(),
            },
            &self.clock,
        );
        Ok(query.apply(snapshot))
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            updated_at: self.clock.now_millis(),
            sources: self.data.health.clone(),
        }
    }

    /// Validate and evaluate a full context without touching the cache.
    pub fn evaluate(&self, ctx: &SignalContext) -> Result<SignalOutcome, DeskError> {
        validate_context(ctx)?;
        Ok(self.builder.evaluate(ctx))
    }

    /// Build a signal from a quick submission and cache it, replacing any
    /// previous signal for the symbol.
    pub fn submit(&mut self, request: SubmitRequest) -> Result<Signal, DeskError> {
        let info = self
            .data
            .find_symbol(&request.symbol)
            .ok_or_else(|| DeskError::SymbolNotFound(request.symbol.clone()))?;
        if !info.is_trading() {
            return Err(DeskError::SymbolHalted(request.symbol));
        }
        if !request.price.is_finite() || request.price <= 0.0 {
            return Err(ValidationError::NonPositive {
                field: "price",
                value: request.price,
            }
            .into());
        }
        request.metrics.iter().try_for_each(validate_metric)?;

        let defaults = &self.config.submit;
        let [o8, o21, o50] = defaults.ema_offsets;
        let ctx = SignalContext {
            symbol: info.clone(),
            timeframe: request.timeframe,
            price: request.price,
            ema: EmaTriple::new(request.price * o8, request.price * o21, request.price * o50),
            metrics: request.metrics,
            checklist: self.data.checklist.clone(),
            btc_dominance_bias: defaults.btc_dominance_bias,
            total3_state: defaults.total3_state,
            btc_correlation: defaults.btc_correlation,
            baseline_stop_pct: defaults.baseline_stop_pct,
            recent_pullback_pct: defaults.recent_pullback_pct,
            weaken_trend: defaults.weaken_trend,
            status: None,
        };

        match self.evaluate(&ctx)? {
            SignalOutcome::Accepted(signal) => {
                info!(
                    id = %signal.id,
                    symbol = %signal.symbol,
                    timeframe = %signal.timeframe,
                    direction = ?signal.direction,
                    "signal accepted"
                );
                self.cache.upsert((*signal).clone());
                Ok(*signal)
            }
            SignalOutcome::Rejected(gate) => Err(DeskError::RequirementsNotMet(gate)),
        }
    }

    /// Current update-stream payload: every cached signal.
    pub fn stream_event(&self) -> StreamEvent {
        StreamEvent {
            kind: StreamEventKind::SignalUpdate,
            data: self.cache.all(),
        }
    }
}
