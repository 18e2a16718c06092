use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOG_FILTER: &str = "crm_service=info,tower_http=info";

fn default_max_upload_bytes() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

/// Artificial delays standing in for a remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    pub fn simulated() -> Self {
        Self {
            list: Duration::from_millis(300),
            get: Duration::from_millis(200),
            create: Duration::from_millis(500),
            update: Duration::from_millis(400),
            delete: Duration::from_millis(300),
        }
    }

    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::simulated()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub latency: LatencyProfile,
    pub seed_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_upload_bytes: default_max_upload_bytes(),
            latency: LatencyProfile::default(),
            seed_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("CRM_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .context("CRM_BIND_ADDR must be a socket address")?;

        let max_upload_bytes = match std::env::var("CRM_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("CRM_MAX_UPLOAD_BYTES is not a byte count: {}", raw))?,
            Err(_) => default_max_upload_bytes(),
        };

        let latency = match env_or("CRM_SIMULATED_LATENCY", "true").to_lowercase().as_str() {
            "true" | "1" | "yes" => LatencyProfile::simulated(),
            "false" | "0" | "no" => LatencyProfile::none(),
            other => anyhow::bail!("CRM_SIMULATED_LATENCY must be true or false, got {}", other),
        };

        let seed_file = std::env::var("CRM_SEED_FILE").ok().map(PathBuf::from);
        let log_filter = env_or("CRM_LOG", DEFAULT_LOG_FILTER);

        Ok(Config {
            bind_addr,
            max_upload_bytes,
            latency,
            seed_file,
            log_filter,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn load_config() -> Result<Config> {
    // Load .env file first
    dotenv().ok();
    Config::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_simulated_latency() {
        let config = Config::default();
        assert_eq!(config.latency.create, Duration::from_millis(500));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn none_profile_has_no_delays() {
        let latency = LatencyProfile::none();
        assert!(latency.list.is_zero() && latency.delete.is_zero());
    }
}
