//! # Ledger State File
//!
//! The CLI keeps the whole ledger in one JSON file holding a
//! [`LedgerSnapshot`]. A missing file is an empty ledger. Writes go to a
//! sibling temporary file first and are renamed into place, so an
//! interrupted write never leaves a truncated state file behind.

use std::path::Path;

use anyhow::{Context, Result};

use cvault_ledger::{LedgerSnapshot, VaultConfig};

/// Read the snapshot at `path`, or an empty one if the file does not exist.
pub fn load_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "state file absent, starting empty ledger");
        return Ok(LedgerSnapshot::empty());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    Ok(snapshot)
}

/// Write `snapshot` to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, snapshot: &LedgerSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write state file {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace state file {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        credentials = snapshot.credentials.len(),
        "state file written"
    );
    Ok(())
}

/// Load vault configuration: the YAML file if given, else defaults, then
/// `CVAULT_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    let config = match path {
        Some(path) => VaultConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => VaultConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("invalid environment override")?;
    tracing::debug!(
        max_payload_bytes = config.max_payload_bytes,
        verify_policy = %config.verify_policy,
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert_eq!(snapshot, LedgerSnapshot::empty());
    }

    #[test]
    fn save_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        save_snapshot(&path, &LedgerSnapshot::empty()).unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_snapshot(&path).unwrap(), LedgerSnapshot::empty());
    }

    #[test]
    fn corrupt_state_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse state file"));
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.yaml");
        std::fs::write(&path, "max_payload_bytes: 512\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.max_payload_bytes, 512);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.yaml"))).is_err());
    }
}
