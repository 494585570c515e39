//! Boundary validation for records entering the desk.
//!
//! The core engine trusts its inputs: it compares out-of-range correlations,
//! it does not reject crossed bars, and it panics on non-finite stop inputs.
//! Everything that arrives from a file or the command line passes through
//! these checks first.

use scalpdesk_core::components::{EntryMetric, CHECKLIST_SIZE};
use scalpdesk_core::domain::{Ohlcv, SymbolInfo};
use scalpdesk_core::{Signal, SignalContext};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("btc_correlation must be within [-1, 1], got {0}")]
    CorrelationOutOfRange(f64),
    #[error("checklist has {0} items, at most 12 allowed")]
    ChecklistTooLong(usize),
    #[error("checklist score {0} exceeds 12")]
    ChecklistScoreTooHigh(usize),
    #[error("evidence min_required must be at least 1")]
    ZeroMinRequired,
    #[error("bar for {symbol} at {t} has inconsistent OHLC")]
    InsaneBar { symbol: String, t: i64 },
    #[error("symbol name must not be empty")]
    EmptySymbol,
    #[error("symbol {symbol} does not match {base}{quote}")]
    SymbolMismatch {
        symbol: String,
        base: String,
        quote: String,
    },
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::Negative { field, value })
    }
}

fn correlation(value: f64) -> Result<(), ValidationError> {
    finite("btc_correlation", value)?;
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CorrelationOutOfRange(value))
    }
}

pub fn validate_symbol(info: &SymbolInfo) -> Result<(), ValidationError> {
    if info.symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if info.symbol != format!("{}{}", info.base, info.quote) {
        return Err(ValidationError::SymbolMismatch {
            symbol: info.symbol.clone(),
            base: info.base.clone(),
            quote: info.quote.clone(),
        });
    }
    positive("tick_size", info.tick_size)?;
    positive("lot_size", info.lot_size)?;
    Ok(())
}

pub fn validate_bar(bar: &Ohlcv) -> Result<(), ValidationError> {
    for (field, value) in [("o", bar.o), ("h", bar.h), ("l", bar.l), ("c", bar.c)] {
        finite(field, value)?;
    }
    non_negative("v", bar.v)?;
    if !bar.is_sane() {
        return Err(ValidationError::InsaneBar {
            symbol: bar.symbol.clone(),
            t: bar.t,
        });
    }
    Ok(())
}

pub fn validate_metric(metric: &EntryMetric) -> Result<(), ValidationError> {
    if let Some(score) = metric.score {
        finite("score", score)?;
    }
    Ok(())
}

/// Full check of an evaluation context before it reaches the gates.
pub fn validate_context(ctx: &SignalContext) -> Result<(), ValidationError> {
    validate_symbol(&ctx.symbol)?;
    finite("price", ctx.price)?;
    finite("ema8", ctx.ema.ema8)?;
    finite("ema21", ctx.ema.ema21)?;
    finite("ema50", ctx.ema.ema50)?;
    correlation(ctx.btc_correlation)?;
    non_negative("baseline_stop_pct", ctx.baseline_stop_pct)?;
    non_negative("recent_pullback_pct", ctx.recent_pullback_pct)?;
    if ctx.checklist.len() > CHECKLIST_SIZE {
        return Err(ValidationError::ChecklistTooLong(ctx.checklist.len()));
    }
    ctx.metrics.iter().try_for_each(validate_metric)
}

/// Structural check of a signal loaded from outside the engine.
pub fn validate_signal(signal: &Signal) -> Result<(), ValidationError> {
    if signal.symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if signal.correlation.checklist_score > CHECKLIST_SIZE {
        return Err(ValidationError::ChecklistScoreTooHigh(
            signal.correlation.checklist_score,
        ));
    }
    if signal.evidence.min_required == 0 {
        return Err(ValidationError::ZeroMinRequired);
    }
    correlation(signal.correlation.btc_correlation)?;
    non_negative("risk.sl", signal.risk.sl)?;
    signal.evidence.metrics.iter().try_for_each(validate_metric)
}
