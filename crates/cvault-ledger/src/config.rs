//! # Vault Configuration
//!
//! Runtime limits and policy for a [`CredentialVault`](crate::CredentialVault).
//! Defaults apply when nothing is configured. A YAML file may set any subset
//! of fields, and environment variables override whatever the file says:
//!
//! - `CVAULT_MAX_PAYLOAD_BYTES` (default: 65536)
//! - `CVAULT_VERIFY_POLICY`: `reject_revoked` (default) or `allow_revoked`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`VaultConfig::max_payload_bytes`].
pub const ENV_MAX_PAYLOAD_BYTES: &str = "CVAULT_MAX_PAYLOAD_BYTES";

/// Environment variable overriding [`VaultConfig::verify_policy`].
pub const ENV_VERIFY_POLICY: &str = "CVAULT_VERIFY_POLICY";

/// Default payload limit in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// How `verify` treats a revoked credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// Fail with `Inactive`. No record is written.
    #[default]
    RejectRevoked,
    /// Compare and record as for an active credential.
    AllowRevoked,
}

impl VerifyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RejectRevoked => "reject_revoked",
            Self::AllowRevoked => "allow_revoked",
        }
    }
}

impl std::fmt::Display for VerifyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerifyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject_revoked" => Ok(Self::RejectRevoked),
            "allow_revoked" => Ok(Self::AllowRevoked),
            _ => Err(ConfigError::InvalidValue {
                key: "verify_policy".to_string(),
                value: s.to_string(),
                reason: "expected reject_revoked or allow_revoked".to_string(),
            }),
        }
    }
}

/// Vault settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Largest accepted encrypted payload, in bytes. Must be positive.
    pub max_payload_bytes: usize,
    /// Treatment of revoked credentials in `verify`.
    pub verify_policy: VerifyPolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            verify_policy: VerifyPolicy::default(),
        }
    }
}

impl VaultConfig {
    /// Parse and validate a YAML document. Missing fields take defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply `CVAULT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_MAX_PAYLOAD_BYTES) {
            self.max_payload_bytes = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: ENV_MAX_PAYLOAD_BYTES.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(raw) = get(ENV_VERIFY_POLICY) {
            self.verify_policy = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_VERIFY_POLICY.to_string(),
                value: raw.clone(),
                reason: "expected reject_revoked or allow_revoked".to_string(),
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_payload_bytes".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
