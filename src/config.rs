use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::demo_data::DEFAULT_DEMO_SEED;
use crate::feed::DEFAULT_API_BASE;
use crate::http_client::DEFAULT_TIMEOUT_SECS;

const DEFAULT_LOG_FILE: &str = "fpl_terminal.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub offline: bool,
    pub request_timeout: Duration,
    pub demo_seed: u64,
    pub log_file: PathBuf,
    pub catalog_refresh: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            offline: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            demo_seed: DEFAULT_DEMO_SEED,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            catalog_refresh: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call after `.env` files have been loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let defaults = Self::default();

        let api_base = opt("FPL_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let offline = opt("FPL_OFFLINE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.offline);
        let timeout_secs = opt("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let demo_seed = opt("FPL_DEMO_SEED")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.demo_seed);
        let log_file = opt("FPL_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);
        let refresh_secs = opt("CATALOG_POLL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300)
            .max(30);

        Self {
            api_base,
            offline,
            request_timeout: Duration::from_secs(timeout_secs),
            demo_seed,
            log_file,
            catalog_refresh: Duration::from_secs(refresh_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_env_gives_defaults() {
        assert_eq!(from_pairs(&[]), AppConfig::default());
    }

    #[test]
    fn values_are_clamped_and_normalized() {
        let cfg = from_pairs(&[
            ("FPL_API_BASE", "http://10.0.0.2:9000/"),
            ("FPL_OFFLINE", "TRUE"),
            ("HTTP_TIMEOUT_SECS", "0"),
            ("CATALOG_POLL_SECS", "5"),
            ("FPL_DEMO_SEED", "not-a-number"),
        ]);
        assert_eq!(cfg.api_base, "http://10.0.0.2:9000");
        assert!(cfg.offline);
        assert_eq!(cfg.request_timeout, Duration::from_secs(1));
        assert_eq!(cfg.catalog_refresh, Duration::from_secs(30));
        assert_eq!(cfg.demo_seed, DEFAULT_DEMO_SEED);
    }
}
