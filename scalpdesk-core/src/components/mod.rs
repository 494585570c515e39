//! Gate evaluators: the four independent leaves of the decision engine.
//!
//! - Alignment: price strictly on one side of the EMA 8/21/50 stack
//! - Evidence: enough corroborating entry metrics
//! - Correlation: discretionary checklist score and bounded BTC correlation
//! - Trailing stop: bounded, precision-rounded trailing distance
//!
//! Each evaluator is a pure function of its inputs. Composition and gate order
//! live in [`crate::signal`].

pub mod alignment;
pub mod correlation;
pub mod evidence;
pub mod trailing;

pub use alignment::{evaluate_ema_rule, Direction, EmaStack, EmaTriple};
pub use correlation::{
    evaluate_correlation, Checklist, ChecklistItem, CorrelationCheck, CorrelationInput,
    DominanceBias, Total3State, CHECKLIST_SIZE, MAX_BTC_CORRELATION, MIN_CHECKLIST_SCORE,
};
pub use evidence::{
    aggregate_evidence, evidence_score, EntryEvidence, EntryMetric, EvidencePolicy, MetricKind,
    REQUIRED_EVIDENCE_COUNT,
};
pub use trailing::{
    calculate_trailing_stop, round_to_precision, TrailingMethod, TrailingStop, TrailingStopParams,
    TRAILING_STOP_FLOOR, TRAILING_STOP_PRECISION,
};
