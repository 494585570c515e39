//! Market data set the desk evaluates against.
//!
//! A data set is the tradable universe, recent bars, the discretionary
//! checklist, and source health. It is read from a JSON file or built from the
//! seeded sample universe when no file is given.

use std::path::Path;

use scalpdesk_core::components::{
    Checklist, DominanceBias, EmaTriple, EntryMetric, MetricKind, Total3State,
};
use scalpdesk_core::domain::{
    DataSource, HealthStatus, Ohlcv, SourceHealth, SymbolInfo, Timeframe,
};
use scalpdesk_core::{SignalContext, SignalStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::validate::{validate_bar, validate_symbol, ValidationError};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to access market data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid market data JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid market data: {0}")]
    Invalid(#[from] ValidationError),
    #[error("duplicate symbol {0}")]
    DuplicateSymbol(String),
}

/// Checklist length and passing count of the sample data set.
const SAMPLE_CHECKLIST: (usize, usize) = (12, 10);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub symbols: Vec<SymbolInfo>,
    pub ohlcv: Vec<Ohlcv>,
    #[serde(default)]
    pub checklist: Checklist,
    #[serde(default)]
    pub health: Vec<SourceHealth>,
}

impl MarketData {
    /// Load and validate a data set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let data = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            symbols = data.symbols.len(),
            bars = data.ohlcv.len(),
            "loaded market data"
        );
        Ok(data)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DataError> {
        let data: Self = serde_json::from_str(content)?;
        data.validate()?;
        Ok(data)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Seeded sample universe: BTCUSDT and SOLUSDT perps with one bar each
    /// stamped a minute before `now_ms`.
    pub fn sample(now_ms: i64) -> Self {
        let bar_time = now_ms - 60_000;
        let bar = |symbol: &str, o: f64, h: f64, l: f64, c: f64, v: f64| Ohlcv {
            symbol: symbol.to_string(),
            t: bar_time,
            o,
            h,
            l,
            c,
            v,
            tf: Timeframe::M1,
            source: DataSource::Bybit,
        };

        Self {
            symbols: vec![
                SymbolInfo::usdt_perp("BTC", 0.1, 0.001),
                SymbolInfo::usdt_perp("SOL", 0.01, 0.1),
            ],
            ohlcv: vec![
                bar("BTCUSDT", 65_000.0, 65_100.0, 64_950.0, 65_080.0, 1_234.0),
                bar("SOLUSDT", 150.0, 151.2, 149.5, 150.8, 9_480.0),
            ],
            checklist: Checklist::numbered(SAMPLE_CHECKLIST.0, SAMPLE_CHECKLIST.1),
            health: vec![
                SourceHealth {
                    name: DataSource::Bybit,
                    latency_ms: 120,
                    status: HealthStatus::Healthy,
                    last_updated: now_ms,
                },
                SourceHealth {
                    name: DataSource::Coinglass,
                    latency_ms: 450,
                    status: HealthStatus::Degraded,
                    last_updated: now_ms - 60_000,
                },
                SourceHealth {
                    name: DataSource::Birdie,
                    latency_ms: 320,
                    status: HealthStatus::Healthy,
                    last_updated: now_ms,
                },
            ],
        }
    }

    /// Entry evidence that accompanies the sample universe.
    pub fn sample_evidence() -> Vec<EntryMetric> {
        vec![
            EntryMetric::passed(MetricKind::BreakoutRetest).with_score(2.0),
            EntryMetric::passed(MetricKind::VolumeReaction).with_score(1.5),
            EntryMetric::failed(MetricKind::PatternConfirmation),
        ]
    }

    /// Candidate the sample desk is seeded with: SOLUSDT on 5m with the
    /// averages interleaved around the last close. The alignment gate rejects
    /// it, so a sample desk starts with an empty cache.
    pub fn sample_seed_context(&self) -> Option<SignalContext> {
        let symbol = self.find_symbol("SOLUSDT")?.clone();
        let price = self.latest_bar(&symbol.symbol)?.c;
        Some(SignalContext {
            symbol,
            timeframe: Timeframe::M5,
            price,
            ema: EmaTriple::new(price * 0.995, price * 1.002, price * 1.01),
            metrics: Self::sample_evidence(),
            checklist: self.checklist.clone(),
            btc_dominance_bias: DominanceBias::Neutral,
            total3_state: Total3State::Expanding,
            btc_correlation: 0.72,
            baseline_stop_pct: 1.3,
            recent_pullback_pct: 1.1,
            weaken_trend: false,
            status: Some(SignalStatus::New),
        })
    }

    pub fn find_symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }

    /// Most recent bar for `symbol`, first one wins on equal timestamps.
    pub fn latest_bar(&self, symbol: &str) -> Option<&Ohlcv> {
        self.ohlcv
            .iter()
            .filter(|bar| bar.symbol == symbol)
            .fold(None, |best: Option<&Ohlcv>, bar| match best {
                Some(b) if b.t >= bar.t => Some(b),
                _ => Some(bar),
            })
    }

    pub fn validate(&self) -> Result<(), DataError> {
        for (idx, info) in self.symbols.iter().enumerate() {
            validate_symbol(info)?;
            if self.symbols[..idx].iter().any(|s| s.symbol == info.symbol) {
                return Err(DataError::DuplicateSymbol(info.symbol.clone()));
            }
        }
        self.ohlcv.iter().try_for_each(validate_bar)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn sample_universe_matches_seed() {
        let data = MarketData::sample(NOW);
        assert_eq!(data.symbols.len(), 2);
        assert_eq!(data.symbols[0].symbol, "BTCUSDT");
        assert_eq!(data.symbols[1].tick_size, 0.01);
        assert_eq!(data.ohlcv[1].c, 150.8);
        assert!(data.ohlcv.iter().all(|b| b.t == NOW - 60_000));
        assert_eq!(data.checklist.len(), 12);
        assert_eq!(data.checklist.passing_count(), 10);
        assert_eq!(data.health.len(), 3);
        assert_eq!(data.health[1].status, HealthStatus::Degraded);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn sample_seed_is_rejected_by_alignment() {
        let data = MarketData::sample(NOW);
        let ctx = data.sample_seed_context().unwrap();
        assert_eq!(ctx.price, 150.8);
        assert_eq!(
            scalpdesk_core::SignalBuilder::new(Default::default()).evaluate(&ctx).rejection(),
            Some(scalpdesk_core::GateRejection::Alignment)
        );
    }

    #[test]
    fn sample_evidence_has_two_passing_metrics() {
        let metrics = MarketData::sample_evidence();
        assert_eq!(metrics.iter().filter(|m| m.pass).count(), 2);
        assert_eq!(metrics[0].score, Some(2.0));
    }

    #[test]
    fn find_symbol_is_exact() {
        let data = MarketData::sample(NOW);
        assert!(data.find_symbol("SOLUSDT").is_some());
        assert!(data.find_symbol("solusdt").is_none());
        assert!(data.find_symbol("ETHUSDT").is_none());
    }

    #[test]
    fn latest_bar_prefers_newest_then_first() {
        let mut data = MarketData::sample(NOW);
        let mut newer = data.ohlcv[1].clone();
        newer.t = NOW;
        newer.c = 152.0;
        let mut twin = newer.clone();
        twin.c = 999.0;
        data.ohlcv.push(newer);
        data.ohlcv.push(twin);
        assert_eq!(data.latest_bar("SOLUSDT").map(|b| b.c), Some(152.0));
        assert!(data.latest_bar("ETHUSDT").is_none());
    }

    #[test]
    fn duplicate_symbols_are_rejected() {
        let mut data = MarketData::sample(NOW);
        data.symbols.push(data.symbols[0].clone());
        assert!(matches!(
            data.validate(),
            Err(DataError::DuplicateSymbol(s)) if s == "BTCUSDT"
        ));
    }

    #[test]
    fn json_without_optional_sections_parses() {
        let json = r#"{
            "symbols": [{"symbol":"BTCUSDT","base":"BTC","quote":"USDT","type":"perp",
                         "tick_size":0.1,"lot_size":0.001,"status":"trading"}],
            "ohlcv": []
        }"#;
        let data = MarketData::from_json_str(json).unwrap();
        assert!(data.checklist.is_empty());
        assert!(data.health.is_empty());
    }

    #[test]
    fn crossed_bar_fails_load() {
        let mut data = MarketData::sample(NOW);
        data.ohlcv[0].l = 70_000.0;
        let json = serde_json::to_string(&data).unwrap();
        assert!(matches!(
            MarketData::from_json_str(&json),
            Err(DataError::Invalid(ValidationError::InsaneBar { .. }))
        ));
    }
}
