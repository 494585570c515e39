//! EMA alignment rule: price must sit strictly on one side of the 8/21/50 stack.
//!
//! Direction convention: a stack entirely *below* price maps to `Long`, a stack
//! entirely *above* price maps to `Short`. Any equality or interleaving leaves
//! the rule failed with no direction. NaN compares false everywhere and so
//! falls on the rejection path too.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(ParseError::UnknownDirection(other.to_string())),
        }
    }
}

/// The three supplied moving averages (short, medium, long).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaTriple {
    pub ema8: f64,
    pub ema21: f64,
    pub ema50: f64,
}

impl EmaTriple {
    pub fn new(ema8: f64, ema21: f64, ema50: f64) -> Self {
        Self { ema8, ema21, ema50 }
    }

    fn values(&self) -> [f64; 3] {
        [self.ema8, self.ema21, self.ema50]
    }
}

/// Outcome of the alignment rule, carrying the averages it was evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaStack {
    pub ema8: f64,
    pub ema21: f64,
    pub ema50: f64,
    pub all_above_price: bool,
    pub all_below_price: bool,
    pub rule_pass: bool,
}

impl EmaStack {
    /// `Long` when every average is below price, `Short` when every average is above.
    pub fn direction(&self) -> Option<Direction> {
        if self.all_below_price {
            Some(Direction::Long)
        } else if self.all_above_price {
            Some(Direction::Short)
        } else {
            None
        }
    }

    pub fn triple(&self) -> EmaTriple {
        EmaTriple::new(self.ema8, self.ema21, self.ema50)
    }
}

/// Evaluate the alignment rule for `price` against `ema`.
pub fn evaluate_ema_rule(price: f64, ema: EmaTriple) -> EmaStack {
    let all_above_price = ema.values().iter().all(|&avg| avg > price);
    let all_below_price = ema.values().iter().all(|&avg| avg < price);

    EmaStack {
        ema8: ema.ema8,
        ema21: ema.ema21,
        ema50: ema.ema50,
        all_above_price,
        all_below_price,
        rule_pass: all_above_price || all_below_price,
    }
}
