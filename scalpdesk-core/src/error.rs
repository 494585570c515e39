//! Errors for parsing the wire names of timeframes and directions.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown timeframe '{0}' (expected 1m, 5m, 15m or 1h)")]
    UnknownTimeframe(String),

    #[error("unknown direction '{0}' (expected long or short)")]
    UnknownDirection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_rejected_token() {
        assert_eq!(
            ParseError::UnknownTimeframe("4h".into()).to_string(),
            "unknown timeframe '4h' (expected 1m, 5m, 15m or 1h)"
        );
        assert_eq!(
            ParseError::UnknownDirection("up".into()).to_string(),
            "unknown direction 'up' (expected long or short)"
        );
    }
}
