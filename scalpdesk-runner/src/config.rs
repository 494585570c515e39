//! Desk configuration loaded from TOML.
//!
//! Every section is optional; a missing section or key falls back to the
//! defaults the desk ships with. The gate thresholds themselves (checklist
//! minimum, correlation bound, reward multiples) are engine constants and are
//! not configurable here.

use std::path::Path;

use scalpdesk_core::components::{DominanceBias, EvidencePolicy, Total3State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level desk configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub evidence: EvidencePolicy,
    pub submit: SubmitDefaults,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
}

/// Market context assumed for quick submissions that only carry a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitDefaults {
    /// Multipliers applied to price to derive EMA 8/21/50.
    pub ema_offsets: [f64; 3],
    pub btc_dominance_bias: DominanceBias,
    pub total3_state: Total3State,
    pub btc_correlation: f64,
    pub baseline_stop_pct: f64,
    pub recent_pullback_pct: f64,
    pub weaken_trend: bool,
}

impl Default for SubmitDefaults {
    fn default() -> Self {
        Self {
            ema_offsets: [0.99, 0.985, 0.98],
            btc_dominance_bias: DominanceBias::Neutral,
            total3_state: Total3State::Expanding,
            btc_correlation: 0.72,
            baseline_stop_pct: 1.2,
            recent_pullback_pct: 1.0,
            weaken_trend: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub interval_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl DeskConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and check a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Content hash of the effective configuration.
    ///
    /// Two configs with the same values hash identically regardless of key
    /// order or comments in the source file.
    pub fn config_hash(&self) -> String {
        // Struct fields serialize in declaration order and weights live in a
        // BTreeMap, so the JSON form is canonical.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.evidence.min_required == 0 {
            return Err(ConfigError::Invalid(
                "evidence.min_required must be at least 1".into(),
            ));
        }
        if let Some((kind, weight)) = self
            .evidence
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "evidence weight for {kind:?} must be finite and non-negative, got {weight}"
            )));
        }
        let submit = &self.submit;
        if submit.ema_offsets.iter().any(|o| !o.is_finite() || *o <= 0.0) {
            return Err(ConfigError::Invalid(
                "submit.ema_offsets must be positive and finite".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&submit.btc_correlation) {
            return Err(ConfigError::Invalid(format!(
                "submit.btc_correlation must be within [-1, 1], got {}",
                submit.btc_correlation
            )));
        }
        for (name, value) in [
            ("baseline_stop_pct", submit.baseline_stop_pct),
            ("recent_pullback_pct", submit.recent_pullback_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "submit.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.stream.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "stream.interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalpdesk_core::components::MetricKind;

    #[test]
    fn empty_document_yields_defaults() {
        let config = DeskConfig::from_toml_str("").unwrap();
        assert_eq!(config, DeskConfig::default());
        assert_eq!(config.evidence.min_required, 2);
        assert_eq!(config.submit.ema_offsets, [0.99, 0.985, 0.98]);
        assert_eq!(config.submit.btc_correlation, 0.72);
        assert_eq!(config.stream.interval_secs, 5);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DeskConfig::from_toml_str(
            r#"
            [evidence]
            min_required = 3

            [evidence.weights]
            breakout_retest = 2.5

            [submit]
            btc_dominance_bias = "bearish"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.evidence.min_required, 3);
        assert_eq!(
            config.evidence.weights.get(&MetricKind::BreakoutRetest),
            Some(&2.5)
        );
        assert_eq!(config.submit.btc_dominance_bias, DominanceBias::Bearish);
        assert_eq!(config.submit.total3_state, Total3State::Expanding);
        assert_eq!(config.submit.baseline_stop_pct, 1.2);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = DeskConfig::default();
        config.submit.weaken_trend = true;
        config.stream.interval_secs = 2;
        let text = config.to_toml_string().unwrap();
        let parsed = DeskConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_zero_min_required() {
        let err = DeskConfig::from_toml_str("[evidence]\nmin_required = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_correlation_out_of_range() {
        let err = DeskConfig::from_toml_str("[submit]\nbtc_correlation = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("btc_correlation"));
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = DeskConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_hash_is_stable_and_value_sensitive() {
        let a = DeskConfig::default();
        let b = DeskConfig::from_toml_str("# comment only\n").unwrap();
        assert_eq!(a.config_hash(), b.config_hash());
        assert_eq!(a.config_hash().len(), 64);

        let mut c = DeskConfig::default();
        c.submit.baseline_stop_pct = 1.3;
        assert_ne!(a.config_hash(), c.config_hash());
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = DeskConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
