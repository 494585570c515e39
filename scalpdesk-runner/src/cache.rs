//! In-memory signal cache, one live signal per symbol.

use std::collections::BTreeMap;

use scalpdesk_core::Signal;
use tracing::info;

/// Latest accepted signal per symbol.
///
/// Writes are last-write-wins: a new signal for a symbol replaces the previous
/// one regardless of timeframe or direction.
#[derive(Debug, Clone, Default)]
pub struct SignalCache {
    signals: BTreeMap<String, Signal>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a list; later entries for the same symbol win.
    pub fn from_signals(signals: impl IntoIterator<Item = Signal>) -> Self {
        let mut cache = Self::new();
        for signal in signals {
            cache.signals.insert(signal.symbol.clone(), signal);
        }
        cache
    }

    /// Store `signal`, returning the one it replaced.
    pub fn upsert(&mut self, signal: Signal) -> Option<Signal> {
        let replaced = self.signals.insert(signal.symbol.clone(), signal);
        if let Some(old) = &replaced {
            info!(symbol = %old.symbol, replaced = %old.id, "signal replaced");
        }
        replaced
    }

    pub fn get(&self, symbol: &str) -> Option<&Signal> {
        self.signals.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.signals.contains_key(symbol)
    }

    /// Cached signals ordered by symbol.
    pub fn all(&self) -> Vec<Signal> {
        self.signals.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
