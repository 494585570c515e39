//! Snapshot orchestration: a point-in-time market view for export.
//!
//! Alignment is recomputed for every accepted signal against the *latest* bar
//! price for its symbol, so the snapshot reflects drift since the signal was
//! built.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::components::{evaluate_ema_rule, EmaStack};
use crate::domain::{Ohlcv, SourceHealth, SymbolInfo, Timeframe};
use crate::signal::Signal;

/// Recomputed alignment indexed by `(symbol, timeframe)`.
///
/// Serializes as the nested `{symbol: {timeframe: stack}}` map consumers expect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentTable {
    entries: BTreeMap<(String, Timeframe), EmaStack>,
}

impl AlignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the stack for `(symbol, timeframe)`.
    pub fn insert(&mut self, symbol: &str, timeframe: Timeframe, stack: EmaStack) {
        self.entries.insert((symbol.to_string(), timeframe), stack);
    }

    pub fn get(&self, symbol: &str, timeframe: Timeframe) -> Option<&EmaStack> {
        self.entries.get(&(symbol.to_string(), timeframe))
    }

    /// All timeframes recorded for one symbol, in timeframe order.
    pub fn for_symbol<'a>(
        &'a self,
        symbol: &'a str,
    ) -> impl Iterator<Item = (Timeframe, &'a EmaStack)> + 'a {
        self.entries
            .iter()
            .filter(move |((sym, _), _)| sym == symbol)
            .map(|((_, tf), stack)| (*tf, stack))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Timeframe, &EmaStack)> {
        self.entries
            .iter()
            .map(|((sym, tf), stack)| (sym.as_str(), *tf, stack))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AlignmentTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut nested: BTreeMap<&str, BTreeMap<Timeframe, &EmaStack>> = BTreeMap::new();
        for (symbol, tf, stack) in self.iter() {
            nested.entry(symbol).or_default().insert(tf, stack);
        }
        nested.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AlignmentTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nested = BTreeMap::<String, BTreeMap<Timeframe, EmaStack>>::deserialize(deserializer)?;
        let entries = nested
            .into_iter()
            .flat_map(|(symbol, by_tf)| {
                by_tf
                    .into_iter()
                    .map(move |(tf, stack)| ((symbol.clone(), tf), stack))
            })
            .collect();
        Ok(Self { entries })
    }
}

/// Inputs to [`build_snapshot`]. Owned so the snapshot can pass them through.
#[derive(Debug, Clone, Default)]
pub struct SnapshotInput {
    pub symbols: Vec<SymbolInfo>,
    pub ohlcv: Vec<Ohlcv>,
    pub signals: Vec<Signal>,
    pub health: Vec<SourceHealth>,
}

/// Read-only, self-consistent market view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbols: Vec<SymbolInfo>,
    pub ohlcv: Vec<Ohlcv>,
    pub ema: AlignmentTable,
    pub signals: Vec<Signal>,
    pub health: Vec<SourceHealth>,
    /// Epoch milliseconds at construction.
    pub updated_at: i64,
}

/// Close of the most recent bar for `symbol`, or 0 when there is none.
///
/// Ties on `t` resolve to the first bar in input order.
pub fn latest_price(bars: &[Ohlcv], symbol: &str) -> f64 {
    bars.iter()
        .filter(|bar| bar.symbol == symbol)
        .fold(None::<&Ohlcv>, |latest, bar| match latest {
            Some(best) if best.t >= bar.t => Some(best),
            _ => Some(bar),
        })
        .map_or(0.0, |bar| bar.c)
}

/// Assemble a snapshot, recomputing alignment for every signal at the latest price.
///
/// Never fails; empty inputs produce an empty snapshot.
pub fn build_snapshot(input: SnapshotInput, clock: &impl Clock) -> Snapshot {
    let mut ema = AlignmentTable::new();
    for signal in &input.signals {
        let price = latest_price(&input.ohlcv, &signal.symbol);
        let stack = evaluate_ema_rule(price, signal.filters.ema_or(price));
        ema.insert(&signal.symbol, signal.timeframe, stack);
    }

    Snapshot {
        symbols: input.symbols,
        ohlcv: input.ohlcv,
        ema,
        signals: input.signals,
        health: input.health,
        updated_at: clock.now_millis(),
    }
}
