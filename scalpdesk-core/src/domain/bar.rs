//! OHLCV bar: the reference market data unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Bar interval. Signals are produced per symbol and timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Self::M1, Self::M5, Self::M15, Self::H1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "1h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| ParseError::UnknownTimeframe(s.trim().to_string()))
    }
}

/// Upstream provider a bar or health record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Bybit,
    Coinglass,
    Birdie,
}

/// One priced interval for a symbol, timeframe and source.
///
/// `t` is the bar open time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub symbol: String,
    pub t: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: f64,
    pub tf: Timeframe,
    pub source: DataSource,
}

impl Ohlcv {
    /// Basic OHLC sanity check: `l <= o, c <= h`, all fields finite, volume non-negative.
    ///
    /// The engine never calls this; it is offered to boundary validation.
    pub fn is_sane(&self) -> bool {
        let finite = [self.o, self.h, self.l, self.c, self.v]
            .iter()
            .all(|x| x.is_finite());
        finite
            && self.l <= self.o
            && self.l <= self.c
            && self.o <= self.h
            && self.c <= self.h
            && self.v >= 0.0
    }
}
