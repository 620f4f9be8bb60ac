use std::time::Duration;

use tracing::{info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_ASSET_BYTES: u64 = 25 * 1024 * 1024;

pub const ENV_TIMEOUT_SECS: &str = "FATCHAT_ASSET_TIMEOUT_SECS";
pub const ENV_MAX_ASSET_BYTES: &str = "FATCHAT_MAX_ASSET_BYTES";
pub const ENV_ALLOW_INSECURE_HTTP: &str = "FATCHAT_ALLOW_INSECURE_HTTP";
pub const ENV_USER_AGENT: &str = "FATCHAT_USER_AGENT";

/// Limits applied to every asset load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    /// Upper bound for a whole load (fetch + decode)
    pub timeout: Duration,
    pub max_asset_bytes: u64,
    /// Plain `http://` locators are refused unless this is set
    pub allow_insecure_http: bool,
    pub user_agent: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
            allow_insecure_http: false,
            user_agent: concat!("fatchat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AssetConfig {
    /// Build from process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS) {
            if secs == 0 {
                warn!(key = ENV_TIMEOUT_SECS, "Timeout of 0 ignored");
            } else {
                config.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(bytes) = parse_var::<u64>(&lookup, ENV_MAX_ASSET_BYTES) {
            config.max_asset_bytes = bytes;
        }

        if let Some(raw) = lookup(ENV_ALLOW_INSECURE_HTTP) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.allow_insecure_http = true,
                "0" | "false" | "no" => config.allow_insecure_http = false,
                other => warn!(key = ENV_ALLOW_INSECURE_HTTP, value = %other, "Ignoring invalid boolean"),
            }
        }

        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }

        info!(
            timeout = ?config.timeout,
            max_asset_bytes = config.max_asset_bytes,
            allow_insecure_http = config.allow_insecure_http,
            "Asset config loaded"
        );

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}
