use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::bar::Timeframe;

static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(1);

/// Signal identifier: `{symbol}-{timeframe}-{created_at}-{seq}`.
///
/// `seq` comes from a process-wide monotonic counter, so two signals built for
/// the same symbol and timeframe within one clock tick still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    pub fn generate(symbol: &str, timeframe: Timeframe, at: DateTime<Utc>) -> Self {
        let seq = SIGNAL_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{symbol}-{timeframe}-{}-{seq}",
            at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_in_same_tick_are_distinct() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let a = SignalId::generate("SOLUSDT", Timeframe::M5, at);
        let b = SignalId::generate("SOLUSDT", Timeframe::M5, at);
        assert_ne!(a, b);
    }

    #[test]
    fn id_carries_symbol_timeframe_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let id = SignalId::generate("BTCUSDT", Timeframe::H1, at);
        assert!(id.as_str().starts_with("BTCUSDT-1h-2024-03-15T12:00:00.000Z-"));
    }
}
