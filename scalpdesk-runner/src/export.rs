//! Snapshot export with schema versioning and a content fingerprint.
//!
//! Exported files wrap the snapshot in an envelope carrying `schema_version`
//! and a blake3 `fingerprint` of the snapshot JSON. Newer schema versions and
//! fingerprint mismatches are rejected on import.

use std::path::Path;

use anyhow::{bail, Context, Result};
use scalpdesk_core::Snapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Current schema version for exported snapshots.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub schema_version: u32,
    pub fingerprint: String,
    pub snapshot: Snapshot,
}

impl SnapshotEnvelope {
    pub fn new(snapshot: Snapshot) -> Result<Self> {
        let fingerprint = fingerprint(&snapshot)?;
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            fingerprint,
            snapshot,
        })
    }
}

/// blake3 hex digest of the compact snapshot JSON.
pub fn fingerprint(snapshot: &Snapshot) -> Result<String> {
    let json = serde_json::to_string(snapshot).context("failed to serialize snapshot")?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_snapshot_json(snapshot: &Snapshot) -> Result<String> {
    let envelope = SnapshotEnvelope::new(snapshot.clone())?;
    serde_json::to_string_pretty(&envelope).context("failed to serialize snapshot envelope")
}

pub fn import_snapshot(json: &str) -> Result<Snapshot> {
    let envelope: SnapshotEnvelope =
        serde_json::from_str(json).context("failed to deserialize snapshot envelope")?;
    if envelope.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            envelope.schema_version,
            SCHEMA_VERSION
        );
    }
    let actual = fingerprint(&envelope.snapshot)?;
    if actual != envelope.fingerprint {
        bail!(
            "snapshot fingerprint mismatch (recorded {}, computed {})",
            envelope.fingerprint,
            actual
        );
    }
    Ok(envelope.snapshot)
}

// ─── File I/O ───────────────────────────────────────────────────────

/// Write the snapshot envelope to `path`, creating parent directories.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    let json = export_snapshot_json(snapshot)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
    info!(
        path = %path.display(),
        signals = snapshot.signals.len(),
        "snapshot exported"
    );
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    import_snapshot(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalpdesk_core::clock::FixedClock;
    use scalpdesk_core::domain::SymbolInfo;
    use scalpdesk_core::{build_snapshot, SnapshotInput};

    fn sample_snapshot() -> Snapshot {
        build_snapshot(
            SnapshotInput {
                symbols: vec![SymbolInfo::usdt_perp("BTC", 0.1, 0.001)],
                ..Default::default()
            },
            &FixedClock::from_millis(42),
        )
    }

    #[test]
    fn json_roundtrip() {
        let snapshot = sample_snapshot();
        let json = export_snapshot_json(&snapshot).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        let restored = import_snapshot(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn rejects_future_schema_version() {
        let mut envelope = SnapshotEnvelope::new(sample_snapshot()).unwrap();
        envelope.schema_version = 99;
        let json = serde_json::to_string(&envelope).unwrap();
        let err = import_snapshot(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version 99"));
    }

    #[test]
    fn rejects_tampered_snapshot() {
        let mut envelope = SnapshotEnvelope::new(sample_snapshot()).unwrap();
        envelope.snapshot.updated_at += 1;
        let json = serde_json::to_string(&envelope).unwrap();
        let err = import_snapshot(&json).unwrap_err();
        assert!(err.to_string().contains("fingerprint mismatch"));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let snapshot = sample_snapshot();
        assert_eq!(fingerprint(&snapshot).unwrap(), fingerprint(&snapshot).unwrap());
        assert_eq!(fingerprint(&snapshot).unwrap().len(), 64);
    }

    #[test]
    fn write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        let snapshot = sample_snapshot();
        write_snapshot(&snapshot, &path).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), snapshot);
    }
}
