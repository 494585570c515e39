//! Read-side filters over cached signals and snapshots.

use scalpdesk_core::components::Direction;
use scalpdesk_core::domain::Timeframe;
use scalpdesk_core::{ParseError, Signal, Snapshot};
use serde::{Deserialize, Serialize};

/// Filter for listing cached signals. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalQuery {
    pub timeframe: Option<Timeframe>,
    pub direction: Option<Direction>,
    /// Minimum checklist score.
    pub min_score: Option<usize>,
}

impl SignalQuery {
    pub fn matches(&self, signal: &Signal) -> bool {
        self.timeframe.map_or(true, |tf| signal.timeframe == tf)
            && self.direction.map_or(true, |d| signal.direction == d)
            && self
                .min_score
                .map_or(true, |min| signal.correlation.checklist_score >= min)
    }

    pub fn apply<'a>(&self, signals: impl IntoIterator<Item = &'a Signal>) -> Vec<Signal> {
        signals
            .into_iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

/// Filter for snapshot requests. Only the `signals` field is narrowed; the
/// universe, bars, alignment table and health pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotQuery {
    pub symbol: Option<String>,
    pub timeframes: Option<Vec<Timeframe>>,
}

impl SnapshotQuery {
    /// Build from the comma-separated form used on the command line, e.g. `"1m,5m"`.
    pub fn from_parts(symbol: Option<String>, timeframes: Option<&str>) -> Result<Self, ParseError> {
        let timeframes = timeframes.map(parse_timeframe_list).transpose()?;
        Ok(Self { symbol, timeframes })
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        self.symbol.as_deref().map_or(true, |s| signal.symbol == s)
            && self
                .timeframes
                .as_ref()
                .map_or(true, |tfs| tfs.contains(&signal.timeframe))
    }

    pub fn apply(&self, mut snapshot: Snapshot) -> Snapshot {
        snapshot.signals.retain(|s| self.matches(s));
        snapshot
    }
}

/// Parse `"1m,5m"` into timeframes. Blank entries are skipped.
pub fn parse_timeframe_list(list: &str) -> Result<Vec<Timeframe>, ParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
