use serde::{Deserialize, Serialize};

/// Contract type of a listed instrument. Only linear perpetuals are traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Perp,
}

/// Exchange-side trading state of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingStatus {
    Trading,
    Halted,
}

/// Instrument metadata: identity, contract type and precision.
///
/// Supplied by the market data source and read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub base: String,
    pub quote: String,
    #[serde(rename = "type")]
    pub instrument_type: InstrumentType,
    pub tick_size: f64,
    pub lot_size: f64,
    pub status: TradingStatus,
}

impl SymbolInfo {
    /// Linear USDT perpetual with the given precision, currently trading.
    pub fn usdt_perp(base: &str, tick_size: f64, lot_size: f64) -> Self {
        Self {
            symbol: format!("{base}USDT"),
            base: base.to_string(),
            quote: "USDT".to_string(),
            instrument_type: InstrumentType::Perp,
            tick_size,
            lot_size,
            status: TradingStatus::Trading,
        }
    }

    pub fn is_trading(&self) -> bool {
        self.status == TradingStatus::Trading
    }
}
