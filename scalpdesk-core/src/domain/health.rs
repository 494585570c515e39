use serde::{Deserialize, Serialize};

use super::bar::DataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

/// Latency and availability of one upstream data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHealth {
    pub name: DataSource,
    pub latency_ms: u64,
    pub status: HealthStatus,
    /// Epoch milliseconds of the last successful update.
    pub last_updated: i64,
}
