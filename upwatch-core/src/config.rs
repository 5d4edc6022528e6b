use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Public games list endpoint
    /// Env: LISTING_URL (default: "https://multiplayer.factorio.com/get-games")
    pub listing_url: String,

    /// Username sent with each listing request
    /// Env: LISTING_USERNAME (default: "")
    pub listing_username: String,

    /// Token sent with each listing request
    /// Env: LISTING_TOKEN (default: "")
    pub listing_token: String,

    /// Seconds between ticks
    /// Env: POLL_INTERVAL_SECS (default: 60)
    pub poll_interval: Duration,

    /// Timeout for one listing request
    /// Env: FETCH_TIMEOUT_SECS (default: 30)
    pub fetch_timeout: Duration,

    /// Directory holding the persisted JSON documents
    /// Env: DATA_DIR (default: ".")
    pub data_dir: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for debugging mostly
        Self {
            listing_url: env_or_default_string(
                "LISTING_URL",
                "https://multiplayer.factorio.com/get-games",
            ),
            listing_username: env_or_default_string("LISTING_USERNAME", ""),
            listing_token: env_or_default_string("LISTING_TOKEN", ""),
            poll_interval: Duration::from_secs(env_or_default("POLL_INTERVAL_SECS", 60)),
            fetch_timeout: Duration::from_secs(env_or_default("FETCH_TIMEOUT_SECS", 30)),
            data_dir: env_or_default_string("DATA_DIR", "."),
        }
    }

    /// Create configuration with all default values
    pub fn default() -> Self {
        Self {
            listing_url: "https://multiplayer.factorio.com/get-games".to_string(),
            listing_username: String::new(),
            listing_token: String::new(),
            poll_interval: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(30),
            data_dir: ".".to_string(),
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.listing_url,
            "https://multiplayer.factorio.com/get-games"
        );
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.data_dir, ".");
    }
}
