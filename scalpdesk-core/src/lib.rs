//! ScalpDesk Core: the signal decision-and-risk engine.
//!
//! This crate contains:
//! - Domain records (symbols, OHLCV bars, source health, signal ids)
//! - Four independent gate evaluators (EMA alignment, entry evidence,
//!   correlation/checklist, trailing-stop sizing)
//! - The signal orchestrator that runs the gates in order and attaches risk
//! - The snapshot orchestrator that recomputes alignment at the latest price
//!
//! Everything is synchronous and side-effect free apart from reading the
//! [`clock::Clock`]. No I/O happens here.

pub mod clock;
pub mod components;
pub mod domain;
pub mod error;
pub mod signal;
pub mod snapshot;

pub use error::ParseError;
pub use signal::{
    build_signal, GateRejection, Risk, Signal, SignalBuilder, SignalContext, SignalFilters,
    SignalOutcome, SignalStatus, StackSide,
};
pub use snapshot::{build_snapshot, AlignmentTable, Snapshot, SnapshotInput};
