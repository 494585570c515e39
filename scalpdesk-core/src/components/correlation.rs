//! Correlation gate: discretionary checklist score plus bounded BTC correlation.
//!
//! The macro tags (BTC dominance bias, TOTAL3 state) are carried through for
//! display and do not influence the verdict.

use serde::{Deserialize, Serialize};

/// Minimum number of passing checklist items.
pub const MIN_CHECKLIST_SCORE: usize = 10;

/// Conventional checklist length. Not enforced by the gate.
pub const CHECKLIST_SIZE: usize = 12;

/// Maximum absolute correlation with BTC.
pub const MAX_BTC_CORRELATION: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominanceBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Total3State {
    Expanding,
    Contracting,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub key: String,
    pub description: String,
    pub pass: bool,
}

/// Ordered discretionary checklist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    /// `total` generic items of which the first `passing` pass.
    pub fn numbered(total: usize, passing: usize) -> Self {
        Self {
            items: (0..total)
                .map(|idx| ChecklistItem {
                    key: format!("check_{}", idx + 1),
                    description: format!("Checklist item {}", idx + 1),
                    pass: idx < passing,
                })
                .collect(),
        }
    }

    pub fn passing_count(&self) -> usize {
        self.items.iter().filter(|item| item.pass).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CorrelationInput<'a> {
    pub btc_dominance_bias: DominanceBias,
    pub total3_state: Total3State,
    pub btc_correlation: f64,
    pub checklist: &'a Checklist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCheck {
    pub btc_dominance_bias: DominanceBias,
    pub total3_state: Total3State,
    pub btc_correlation: f64,
    pub checklist_score: usize,
    pub pass: bool,
}

pub fn evaluate_correlation(input: CorrelationInput<'_>) -> CorrelationCheck {
    let checklist_score = input.checklist.passing_count();
    let pass = checklist_score >= MIN_CHECKLIST_SCORE
        && input.btc_correlation.abs() <= MAX_BTC_CORRELATION;

    CorrelationCheck {
        btc_dominance_bias: input.btc_dominance_bias,
        total3_state: input.total3_state,
        btc_correlation: input.btc_correlation,
        checklist_score,
        pass,
    }
}
