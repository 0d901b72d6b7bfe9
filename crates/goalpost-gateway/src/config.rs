//! Gateway configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use goalpost_core::store::StoreConfig;
use goalpost_core::traits::SyncGateway;

use crate::http::{HttpGateway, DEFAULT_TIMEOUT_SECS};
use crate::mock::{LatencyProfile, MockGateway};

/// Which sync gateway to talk to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GatewayConfig {
    /// In-memory demo backend.
    Mock {
        /// Delay each call like a slow backend would.
        #[serde(default)]
        simulate_latency: bool,
        /// Start with the demo goals instead of an empty list.
        #[serde(default = "default_true")]
        seed: bool,
    },
    /// REST backend.
    Http {
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig::Mock {
            simulate_latency: false,
            seed: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level goalpost configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalpostConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is and never expanded again.
/// An unterminated `${` is kept literally.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `goalpost.toml` in the current directory
/// 2. `~/.config/goalpost/config.toml`
///
/// `GOALPOST_BASE_URL` switches to the HTTP gateway at that URL.
pub fn load_config() -> Result<GoalpostConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GoalpostConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("goalpost.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GoalpostConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GoalpostConfig::default(),
    };

    if let Ok(base_url) = std::env::var("GOALPOST_BASE_URL") {
        let timeout_secs = match config.gateway {
            GatewayConfig::Http { timeout_secs, .. } => timeout_secs,
            GatewayConfig::Mock { .. } => DEFAULT_TIMEOUT_SECS,
        };
        config.gateway = GatewayConfig::Http {
            base_url,
            timeout_secs,
        };
    }

    if let GatewayConfig::Http { base_url, .. } = &mut config.gateway {
        *base_url = resolve_env_vars(base_url);
    }

    if let Some(ratio) = config.store.max_progress_ratio {
        anyhow::ensure!(
            ratio.is_finite() && ratio > 0.0,
            "store.max_progress_ratio must be a positive number, got {ratio}"
        );
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("goalpost"))
}

/// Create a gateway instance from its configuration.
pub fn create_gateway(config: &GatewayConfig) -> Result<Arc<dyn SyncGateway>> {
    match config {
        GatewayConfig::Mock {
            simulate_latency,
            seed,
        } => {
            let gateway = if *seed {
                MockGateway::seeded()
            } else {
                MockGateway::new(Vec::new())
            };
            let latency = if *simulate_latency {
                LatencyProfile::simulated()
            } else {
                LatencyProfile::none()
            };
            Ok(Arc::new(gateway.with_latency(latency)))
        }
        GatewayConfig::Http {
            base_url,
            timeout_secs,
        } => Ok(Arc::new(HttpGateway::new(
            base_url,
            Duration::from_secs(*timeout_secs),
        )?)),
    }
}
