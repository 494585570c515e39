//! Domain records for ScalpDesk.
//!
//! Everything here is a plain immutable value. Records reference each other by
//! symbol string and [`Timeframe`], never by pointer.

pub mod bar;
pub mod health;
pub mod ids;
pub mod symbol;

pub use bar::{DataSource, Ohlcv, Timeframe};
pub use health::{HealthStatus, SourceHealth};
pub use ids::SignalId;
pub use symbol::{InstrumentType, SymbolInfo, TradingStatus};
