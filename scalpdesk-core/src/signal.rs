//! Signal orchestration: applies the four gates in order and synthesizes the
//! signal record with its risk parameters.
//!
//! Gate order is fixed: Alignment → Evidence → Correlation → Direction. The
//! first rejection short-circuits; later gates never run. A rejection is a
//! normal "no signal" outcome, not an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::components::{
    aggregate_evidence, calculate_trailing_stop, evaluate_correlation, evaluate_ema_rule,
    Checklist, CorrelationCheck, CorrelationInput, Direction, DominanceBias, EmaStack, EmaTriple,
    EntryEvidence, EntryMetric, EvidencePolicy, Total3State, TrailingStop, TrailingStopParams,
};
use crate::domain::{SignalId, SymbolInfo, Timeframe};

/// Reward multiple for long setups.
pub const LONG_REWARD_MULTIPLE: f64 = 1.8;

/// Reward multiple for short setups.
pub const SHORT_REWARD_MULTIPLE: f64 = 1.6;

/// Lifecycle status. The engine only ever assigns the caller's status or `New`;
/// later transitions belong to whatever monitors open signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalStatus {
    #[serde(rename = "CANDIDATE")]
    Candidate,
    #[default]
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "HIT TP")]
    HitTp,
    #[serde(rename = "HIT SL")]
    HitSl,
    #[serde(rename = "EXPIRED")]
    Expired,
    #[serde(rename = "ARCHIVED")]
    Archived,
}

/// Which side of price the EMA stack was on when the signal was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackSide {
    AboveAll,
    BelowAll,
}

/// Audit record of the alignment gate.
///
/// Averages are kept at full precision; only `display_map` rounds them. They are optional
/// because signals may arrive from outside the engine without them; snapshot
/// recomputation substitutes the latest price for a missing average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFilters {
    pub ema_stack: StackSide,
    #[serde(default)]
    pub ema8: Option<f64>,
    #[serde(default)]
    pub ema21: Option<f64>,
    #[serde(default)]
    pub ema50: Option<f64>,
}

impl SignalFilters {
    fn from_stack(stack: &EmaStack) -> Self {
        Self {
            ema_stack: if stack.all_above_price {
                StackSide::AboveAll
            } else {
                StackSide::BelowAll
            },
            ema8: Some(stack.ema8),
            ema21: Some(stack.ema21),
            ema50: Some(stack.ema50),
        }
    }

    /// Recorded averages with `fallback` standing in for any that are missing.
    pub fn ema_or(&self, fallback: f64) -> EmaTriple {
        EmaTriple::new(
            self.ema8.unwrap_or(fallback),
            self.ema21.unwrap_or(fallback),
            self.ema50.unwrap_or(fallback),
        )
    }

    /// String rendering for display: stack side plus `{:.4}` averages.
    pub fn display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let side = match self.ema_stack {
            StackSide::AboveAll => "aboveAll",
            StackSide::BelowAll => "belowAll",
        };
        map.insert("emaStack".to_string(), side.to_string());
        for (key, value) in [("ema8", self.ema8), ("ema21", self.ema21), ("ema50", self.ema50)] {
            if let Some(v) = value {
                map.insert(key.to_string(), format!("{v:.4}"));
            }
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Static stop-loss percentage (the caller's baseline, verbatim).
    pub sl: f64,
    /// Reward-to-risk multiple for the take-profit.
    pub tp_rr: f64,
    pub trailing: TrailingStop,
}

/// A qualified directional signal. Only the orchestrator creates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub direction: Direction,
    pub filters: SignalFilters,
    pub evidence: EntryEvidence,
    pub correlation: CorrelationCheck,
    pub risk: Risk,
    pub status: SignalStatus,
}

/// Everything needed to evaluate one symbol on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContext {
    pub symbol: SymbolInfo,
    pub timeframe: Timeframe,
    pub price: f64,
    pub ema: EmaTriple,
    pub metrics: Vec<EntryMetric>,
    pub checklist: Checklist,
    pub btc_dominance_bias: DominanceBias,
    pub total3_state: Total3State,
    pub btc_correlation: f64,
    pub baseline_stop_pct: f64,
    pub recent_pullback_pct: f64,
    pub weaken_trend: bool,
    #[serde(default)]
    pub status: Option<SignalStatus>,
}

/// The gate that rejected a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRejection {
    Alignment,
    Evidence,
    Correlation,
    Direction,
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Alignment => "price is not strictly above or below the EMA stack",
            Self::Evidence => "not enough passing entry evidence",
            Self::Correlation => "checklist score or BTC correlation out of bounds",
            Self::Direction => "EMA stack does not resolve to a direction",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Accepted(Box<Signal>),
    Rejected(GateRejection),
}

impl SignalOutcome {
    pub fn into_signal(self) -> Option<Signal> {
        match self {
            Self::Accepted(signal) => Some(*signal),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<GateRejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(gate) => Some(*gate),
        }
    }
}

/// Gate pipeline with its evidence policy and clock.
#[derive(Debug, Clone, Default)]
pub struct SignalBuilder<C: Clock = SystemClock> {
    policy: EvidencePolicy,
    clock: C,
}

impl SignalBuilder<SystemClock> {
    pub fn new(policy: EvidencePolicy) -> Self {
        Self { policy, clock: SystemClock }
    }
}

impl<C: Clock> SignalBuilder<C> {
    pub fn with_clock(policy: EvidencePolicy, clock: C) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &EvidencePolicy {
        &self.policy
    }

    /// Run the gates in order and report either the signal or the first failing gate.
    pub fn evaluate(&self, ctx: &SignalContext) -> SignalOutcome {
        match self.run_gates(ctx) {
            Ok(signal) => SignalOutcome::Accepted(Box::new(signal)),
            Err(gate) => {
                debug!(
                    symbol = %ctx.symbol.symbol,
                    timeframe = %ctx.timeframe,
                    gate = ?gate,
                    "signal rejected: {gate}"
                );
                SignalOutcome::Rejected(gate)
            }
        }
    }

    pub fn build(&self, ctx: &SignalContext) -> Option<Signal> {
        self.evaluate(ctx).into_signal()
    }

    fn run_gates(&self, ctx: &SignalContext) -> Result<Signal, GateRejection> {
        let stack = evaluate_ema_rule(ctx.price, ctx.ema);
        if !stack.rule_pass {
            return Err(GateRejection::Alignment);
        }

        let evidence = aggregate_evidence(&ctx.metrics, &self.policy);
        if !evidence.passed {
            return Err(GateRejection::Evidence);
        }

        let correlation = evaluate_correlation(CorrelationInput {
            btc_dominance_bias: ctx.btc_dominance_bias,
            total3_state: ctx.total3_state,
            btc_correlation: ctx.btc_correlation,
            checklist: &ctx.checklist,
        });
        if !correlation.pass {
            return Err(GateRejection::Correlation);
        }

        let direction = stack.direction().ok_or(GateRejection::Direction)?;

        let trailing = calculate_trailing_stop(TrailingStopParams {
            baseline_pct: ctx.baseline_stop_pct,
            recent_pullback_pct: ctx.recent_pullback_pct,
            weaken_trend: ctx.weaken_trend,
        });
        let risk = Risk {
            sl: ctx.baseline_stop_pct,
            tp_rr: match direction {
                Direction::Long => LONG_REWARD_MULTIPLE,
                Direction::Short => SHORT_REWARD_MULTIPLE,
            },
            trailing,
        };

        Ok(Signal {
            id: SignalId::generate(&ctx.symbol.symbol, ctx.timeframe, self.clock.now()),
            symbol: ctx.symbol.symbol.clone(),
            timeframe: ctx.timeframe,
            direction,
            filters: SignalFilters::from_stack(&stack),
            evidence,
            correlation,
            risk,
            status: ctx.status.unwrap_or_default(),
        })
    }
}

/// Build a signal with the default evidence policy and the system clock.
pub fn build_signal(ctx: &SignalContext) -> Option<Signal> {
    SignalBuilder::<SystemClock>::default().build(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::components::MetricKind;

    fn context() -> SignalContext {
        SignalContext {
            symbol: SymbolInfo::usdt_perp("SOL", 0.01, 0.1),
            timeframe: Timeframe::M5,
            price: 110.0,
            ema: EmaTriple::new(100.0, 95.0, 90.0),
            metrics: vec![
                EntryMetric::passed(MetricKind::BreakoutRetest),
                EntryMetric::passed(MetricKind::VolumeReaction),
            ],
            checklist: Checklist::numbered(12, 10),
            btc_dominance_bias: DominanceBias::Neutral,
            total3_state: Total3State::Expanding,
            btc_correlation: 0.72,
            baseline_stop_pct: 1.3,
            recent_pullback_pct: 1.1,
            weaken_trend: false,
            status: None,
        }
    }

    fn builder() -> SignalBuilder<FixedClock> {
        SignalBuilder::with_clock(EvidencePolicy::default(), FixedClock::from_millis(1_700_000_000_000))
    }

    #[test]
    fn long_signal_when_stack_below_price() {
        let signal = builder().build(&context()).expect("all gates pass");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.risk.tp_rr, LONG_REWARD_MULTIPLE);
        assert_eq!(signal.risk.sl, 1.3);
        assert_eq!(signal.risk.trailing.ts_pct, 1.0);
        assert_eq!(signal.status, SignalStatus::New);
        assert_eq!(signal.filters.ema_stack, StackSide::BelowAll);
        assert!(signal.id.as_str().starts_with("SOLUSDT-5m-"));
    }

    #[test]
    fn short_signal_uses_short_reward_multiple() {
        let mut ctx = context();
        ctx.price = 80.0;
        let signal = builder().build(&ctx).expect("all gates pass");
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.risk.tp_rr, SHORT_REWARD_MULTIPLE);
        assert_eq!(signal.filters.ema_stack, StackSide::AboveAll);
    }

    #[test]
    fn caller_status_is_kept() {
        let mut ctx = context();
        ctx.status = Some(SignalStatus::Candidate);
        let signal = builder().build(&ctx).unwrap();
        assert_eq!(signal.status, SignalStatus::Candidate);
    }

    #[test]
    fn alignment_rejects_first() {
        let mut ctx = context();
        ctx.price = 95.0;
        ctx.metrics.clear();
        ctx.checklist = Checklist::default();
        assert_eq!(builder().evaluate(&ctx).rejection(), Some(GateRejection::Alignment));
    }

    #[test]
    fn evidence_rejects_before_correlation() {
        let mut ctx = context();
        ctx.metrics.truncate(1);
        ctx.checklist = Checklist::numbered(12, 2);
        assert_eq!(builder().evaluate(&ctx).rejection(), Some(GateRejection::Evidence));
    }

    #[test]
    fn correlation_rejects_high_btc_correlation() {
        let mut ctx = context();
        ctx.btc_correlation = -0.95;
        assert_eq!(builder().evaluate(&ctx).rejection(), Some(GateRejection::Correlation));
    }

    #[test]
    fn policy_minimum_is_honoured() {
        let strict = SignalBuilder::with_clock(
            EvidencePolicy::with_min_required(3),
            FixedClock::from_millis(0),
        );
        assert_eq!(strict.evaluate(&context()).rejection(), Some(GateRejection::Evidence));
    }

    #[test]
    fn filters_keep_precision_and_display_four_decimals() {
        let mut ctx = context();
        ctx.ema = EmaTriple::new(100.123456, 95.00004, 90.99996);
        let signal = builder().build(&ctx).unwrap();
        assert_eq!(signal.filters.ema8, Some(100.123456));
        assert_eq!(signal.filters.ema21, Some(95.00004));
        let display = signal.filters.display_map();
        assert_eq!(display["emaStack"], "belowAll");
        assert_eq!(display["ema8"], "100.1235");
        assert_eq!(display["ema21"], "95.0000");
        assert_eq!(display["ema50"], "91.0000");
    }

    #[test]
    fn ema_or_substitutes_missing_averages() {
        let filters = SignalFilters {
            ema_stack: StackSide::BelowAll,
            ema8: Some(1.0),
            ema21: None,
            ema50: None,
        };
        assert_eq!(filters.ema_or(7.0), EmaTriple::new(1.0, 7.0, 7.0));
    }

    #[test]
    fn status_serializes_with_spaces() {
        assert_eq!(serde_json::to_string(&SignalStatus::HitTp).unwrap(), "\"HIT TP\"");
        let status: SignalStatus = serde_json::from_str("\"HIT SL\"").unwrap();
        assert_eq!(status, SignalStatus::HitSl);
    }

    #[test]
    fn signal_json_roundtrip() {
        let signal = builder().build(&context()).unwrap();
        let json = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(signal, back);
    }
}
