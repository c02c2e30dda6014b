//! Registry configuration

use crate::authority::{DEFAULT_CREATION_FEE, DEFAULT_MAX_IDENTITIES};
use crate::errors::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const ENV_MAX_IDENTITIES: &str = "IDENTITY_REGISTRY_MAX_IDENTITIES";
pub const ENV_CREATION_FEE: &str = "IDENTITY_REGISTRY_CREATION_FEE";
pub const ENV_LOG_LEVEL: &str = "IDENTITY_REGISTRY_LOG_LEVEL";

/// Initial policy and runtime settings.
///
/// The authority is deliberately absent: it can only be established through
/// the one-shot `set_authority` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Initial identity capacity
    pub max_identities: u64,
    /// Initial registration fee
    pub creation_fee: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_identities: DEFAULT_MAX_IDENTITIES,
            creation_fee: DEFAULT_CREATION_FEE,
            log_level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a TOML file. Missing fields keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading registry configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: RegistryConfig = toml::from_str(&content)
            .map_err(|e| RegistryError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `IDENTITY_REGISTRY_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_MAX_IDENTITIES) {
            match val.parse() {
                Ok(parsed) => self.max_identities = parsed,
                Err(_) => warn!(var = ENV_MAX_IDENTITIES, value = %val, "ignoring unparsable override"),
            }
        }
        if let Some(val) = lookup(ENV_CREATION_FEE) {
            match val.parse() {
                Ok(parsed) => self.creation_fee = parsed,
                Err(_) => warn!(var = ENV_CREATION_FEE, value = %val, "ignoring unparsable override"),
            }
        }
        if let Some(val) = lookup(ENV_LOG_LEVEL) {
            self.log_level = val;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_identities == 0 {
            return Err(RegistryError::InvalidMaxIdentities {
                value: self.max_identities,
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RegistryError::Config(format!("Failed to serialize config: {}", e)))
    }
}
