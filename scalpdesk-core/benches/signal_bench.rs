//! Criterion benchmarks for ScalpDesk hot paths.
//!
//! Benchmarks:
//! 1. Full gate pipeline (accepted and rejected contexts)
//! 2. Snapshot assembly over a growing signal set

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scalpdesk_core::clock::FixedClock;
use scalpdesk_core::components::{
    Checklist, DominanceBias, EmaTriple, EntryMetric, EvidencePolicy, MetricKind, Total3State,
};
use scalpdesk_core::domain::{DataSource, Ohlcv, SymbolInfo, Timeframe};
use scalpdesk_core::{build_snapshot, SignalBuilder, SignalContext, SnapshotInput};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_context(base: &str, price: f64) -> SignalContext {
    SignalContext {
        symbol: SymbolInfo::usdt_perp(base, 0.01, 0.1),
        timeframe: Timeframe::M5,
        price,
        ema: EmaTriple::new(price * 0.99, price * 0.985, price * 0.98),
        metrics: vec![
            EntryMetric::passed(MetricKind::BreakoutRetest),
            EntryMetric::passed(MetricKind::VolumeReaction),
            EntryMetric::failed(MetricKind::PatternConfirmation),
        ],
        checklist: Checklist::numbered(12, 10),
        btc_dominance_bias: DominanceBias::Neutral,
        total3_state: Total3State::Expanding,
        btc_correlation: 0.72,
        baseline_stop_pct: 1.2,
        recent_pullback_pct: 1.0,
        weaken_trend: false,
        status: None,
    }
}

fn make_bars(n: usize) -> Vec<Ohlcv> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Ohlcv {
                symbol: format!("SYM{}USDT", i % 50),
                t: i as i64 * 60_000,
                o: close - 0.3,
                h: close + 1.5,
                l: close - 1.5,
                c: close,
                v: 1_000.0,
                tf: Timeframe::M1,
                source: DataSource::Bybit,
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_signal_pipeline(c: &mut Criterion) {
    let builder = SignalBuilder::with_clock(EvidencePolicy::default(), FixedClock::from_millis(0));
    let accepted = make_context("SOL", 150.0);
    let mut rejected = make_context("SOL", 150.0);
    rejected.checklist = Checklist::numbered(12, 8);

    let mut group = c.benchmark_group("signal_pipeline");
    group.bench_function("accepted", |b| b.iter(|| builder.evaluate(black_box(&accepted))));
    group.bench_function("rejected_at_correlation", |b| {
        b.iter(|| builder.evaluate(black_box(&rejected)))
    });
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let builder = SignalBuilder::with_clock(EvidencePolicy::default(), FixedClock::from_millis(0));
    let clock = FixedClock::from_millis(0);
    let bars = make_bars(5_000);

    let mut group = c.benchmark_group("build_snapshot");
    for n_signals in [10usize, 50] {
        let signals: Vec<_> = (0..n_signals)
            .filter_map(|i| builder.build(&make_context(&format!("SYM{i}"), 110.0)))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n_signals), &signals, |b, signals| {
            b.iter(|| {
                let input = SnapshotInput {
                    ohlcv: bars.clone(),
                    signals: signals.clone(),
                    ..SnapshotInput::default()
                };
                build_snapshot(black_box(input), &clock)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_signal_pipeline, bench_snapshot);
criterion_main!(benches);
