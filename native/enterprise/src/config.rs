use std::{error::Error, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{connector::ServiceAddress, dispatch::CallbackDelivery, logging::LoggingConfig};

/// Proxy configuration, usually read from `enterprise_proxy.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub service: ServiceAddress,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub callbacks: CallbackDelivery,
}

impl ProxyConfig {
    /// Reads the config from `path`. Missing sections take their defaults.
    #[instrument(err)]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;
        let config: Self =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        debug!(?config, "Loaded proxy config");
        Ok(config)
    }

    /// Like [`ProxyConfig::load`], but falls back to the defaults on failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = e.as_ref() as &dyn Error, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }
}
