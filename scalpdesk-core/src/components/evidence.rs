//! Entry evidence: corroborating metrics counted against a minimum.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of passing metrics required for an entry.
pub const REQUIRED_EVIDENCE_COUNT: usize = 2;

/// Category of corroborating evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BreakoutRetest,
    VolumeReaction,
    LiquiditySweep,
    PatternConfirmation,
    MomentumShift,
}

/// One piece of corroborating evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetric {
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub pass: bool,
    /// Explicit weight; overrides the policy's per-kind weight when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl EntryMetric {
    pub fn passed(kind: MetricKind) -> Self {
        Self { kind, pass: true, score: None }
    }

    pub fn failed(kind: MetricKind) -> Self {
        Self { kind, pass: false, score: None }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// How evidence is counted and weighted.
///
/// Weights resolve as: the metric's own `score`, else the table entry for its
/// kind, else 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidencePolicy {
    pub min_required: usize,
    pub weights: BTreeMap<MetricKind, f64>,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            min_required: REQUIRED_EVIDENCE_COUNT,
            weights: BTreeMap::new(),
        }
    }
}

impl EvidencePolicy {
    pub fn with_min_required(min_required: usize) -> Self {
        Self { min_required, ..Self::default() }
    }

    pub fn with_weight(mut self, kind: MetricKind, weight: f64) -> Self {
        self.weights.insert(kind, weight);
        self
    }

    pub fn weight_of(&self, metric: &EntryMetric) -> f64 {
        metric
            .score
            .or_else(|| self.weights.get(&metric.kind).copied())
            .unwrap_or(1.0)
    }
}

/// Aggregated evidence for one evaluation. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEvidence {
    pub metrics: Vec<EntryMetric>,
    pub min_required: usize,
    pub passed: bool,
}

impl EntryEvidence {
    pub fn pass_count(&self) -> usize {
        self.metrics.iter().filter(|m| m.pass).count()
    }
}

/// `passed` iff the number of passing metrics reaches `policy.min_required`.
pub fn aggregate_evidence(metrics: &[EntryMetric], policy: &EvidencePolicy) -> EntryEvidence {
    let passes = metrics.iter().filter(|m| m.pass).count();
    EntryEvidence {
        metrics: metrics.to_vec(),
        min_required: policy.min_required,
        passed: passes >= policy.min_required,
    }
}

/// Weighted score over passing metrics. Failing metrics contribute nothing.
pub fn evidence_score(evidence: &EntryEvidence, policy: &EvidencePolicy) -> f64 {
    evidence
        .metrics
        .iter()
        .filter(|m| m.pass)
        .map(|m| policy.weight_of(m))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_metrics() -> Vec<EntryMetric> {
        vec![
            EntryMetric::passed(MetricKind::BreakoutRetest),
            EntryMetric::passed(MetricKind::VolumeReaction),
            EntryMetric::failed(MetricKind::LiquiditySweep),
        ]
    }

    #[test]
    fn passes_when_minimum_met() {
        let evidence = aggregate_evidence(&base_metrics(), &EvidencePolicy::default());
        assert!(evidence.passed);
        assert_eq!(evidence.min_required, 2);
        assert_eq!(evidence.pass_count(), 2);
    }

    #[test]
    fn fails_below_threshold() {
        let metrics: Vec<EntryMetric> = base_metrics()
            .into_iter()
            .map(|m| EntryMetric { pass: m.kind == MetricKind::LiquiditySweep, ..m })
            .collect();
        let evidence = aggregate_evidence(&metrics, &EvidencePolicy::with_min_required(3));
        assert!(!evidence.passed);
    }

    #[test]
    fn empty_metrics_never_pass_with_positive_minimum() {
        let evidence = aggregate_evidence(&[], &EvidencePolicy::with_min_required(1));
        assert!(!evidence.passed);
        assert!(evidence.metrics.is_empty());
    }

    #[test]
    fn zero_minimum_passes_empty() {
        let evidence = aggregate_evidence(&[], &EvidencePolicy::with_min_required(0));
        assert!(evidence.passed);
    }

    #[test]
    fn score_defaults_to_one_per_passing_metric() {
        let policy = EvidencePolicy::default();
        let evidence = aggregate_evidence(&base_metrics(), &policy);
        assert_eq!(evidence_score(&evidence, &policy), 2.0);
    }

    #[test]
    fn failing_metrics_contribute_nothing_even_when_weighted() {
        let policy = EvidencePolicy::default();
        let metrics = vec![
            EntryMetric::passed(MetricKind::BreakoutRetest).with_score(2.0),
            EntryMetric::passed(MetricKind::VolumeReaction).with_score(1.5),
            EntryMetric::failed(MetricKind::PatternConfirmation).with_score(10.0),
        ];
        let evidence = aggregate_evidence(&metrics, &policy);
        assert_eq!(evidence_score(&evidence, &policy), 3.5);
    }

    #[test]
    fn policy_weight_table_applies_when_metric_has_no_score() {
        let policy = EvidencePolicy::default().with_weight(MetricKind::LiquiditySweep, 3.0);
        let metrics = vec![
            EntryMetric::passed(MetricKind::LiquiditySweep),
            EntryMetric::passed(MetricKind::LiquiditySweep).with_score(0.5),
            EntryMetric::passed(MetricKind::MomentumShift),
        ];
        let evidence = aggregate_evidence(&metrics, &policy);
        assert_eq!(evidence_score(&evidence, &policy), 4.5);
    }

    #[test]
    fn metric_serializes_kind_as_type() {
        let json = serde_json::to_value(EntryMetric::passed(MetricKind::MomentumShift)).unwrap();
        assert_eq!(json["type"], "momentum_shift");
        assert!(json.get("score").is_none());
    }
}
