//! Trailing-stop sizer: dynamic pullback method.
//!
//! 1. A weakening trend tightens the baseline to 75%.
//! 2. The stop never exceeds 90% of the recent pullback.
//! 3. The result is floored at 0.1% and rounded to the nearest 0.1%.

use serde::{Deserialize, Serialize};

/// Granularity of the trailing-stop percentage.
pub const TRAILING_STOP_PRECISION: f64 = 0.1;

/// Smallest trailing stop ever emitted, in percent.
pub const TRAILING_STOP_FLOOR: f64 = 0.1;

const WEAK_TREND_TIGHTENING: f64 = 0.75;
const PULLBACK_FRACTION: f64 = 0.9;

/// Sizing method. Only `DynamicPullback` is produced; the others are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingMethod {
    DynamicPullback,
    VolatilityBand,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    pub ts_pct: f64,
    pub method: TrailingMethod,
    /// Whether trend weakness tightened the baseline.
    pub tighten_on_weak_trend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStopParams {
    pub baseline_pct: f64,
    pub recent_pullback_pct: f64,
    pub weaken_trend: bool,
}

/// Round `value` to the nearest multiple of `precision` (halves away from zero).
///
/// Divides by the inverse rather than multiplying by `precision`, so multiples
/// of 0.1 come out as their nearest `f64` (0.3, not 0.30000000000000004).
pub fn round_to_precision(value: f64, precision: f64) -> f64 {
    (value / precision).round() / precision.recip()
}

/// Size the trailing stop.
///
/// # Panics
/// On non-finite inputs. Those are contract violations that boundary
/// validation must catch before reaching the engine.
pub fn calculate_trailing_stop(params: TrailingStopParams) -> TrailingStop {
    assert!(
        params.baseline_pct.is_finite() && params.recent_pullback_pct.is_finite(),
        "trailing stop inputs must be finite (baseline={}, pullback={})",
        params.baseline_pct,
        params.recent_pullback_pct
    );

    let tightened = if params.weaken_trend {
        params.baseline_pct * WEAK_TREND_TIGHTENING
    } else {
        params.baseline_pct
    };
    let dynamic = tightened.min(params.recent_pullback_pct * PULLBACK_FRACTION);
    let ts_pct = round_to_precision(dynamic.max(TRAILING_STOP_FLOOR), TRAILING_STOP_PRECISION);

    TrailingStop {
        ts_pct,
        method: TrailingMethod::DynamicPullback,
        tighten_on_weak_trend: params.weaken_trend,
    }
}
