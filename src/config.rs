use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::BuddyError;
use crate::generators::content::MAX_TOTAL_SIZE;

/// Longest lifetime a persisted artifact may have.
pub const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Runtime configuration. Defaults are overridden by `BUDDY_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Empty disables the admin endpoints.
    pub admin_key: String,
    pub default_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
    pub max_file_size: u64,
    pub file_requests_per_minute: u32,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:testdata.db".to_string(),
            loglevel: "info".to_string(),
            admin_key: String::new(),
            default_ttl_secs: 24 * 60 * 60,
            cleanup_interval_secs: 60 * 60,
            max_file_size: MAX_TOTAL_SIZE,
            file_requests_per_minute: 30,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `BUDDY_*` environment variables.
    pub fn load() -> Result<Self, BuddyError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("BUDDY_")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, BuddyError> {
        let cfg: Config = figment.extract()?;
        Ok(cfg.normalized())
    }

    /// Effective bulk-file ceiling; never above the generator's hard cap.
    pub fn file_size_limit(&self) -> u64 {
        self.max_file_size.min(MAX_TOTAL_SIZE)
    }

    /// Default artifact TTL, kept within `1..=MAX_TTL_SECS` seconds.
    pub fn default_ttl(&self) -> chrono::Duration {
        let secs = self.default_ttl_secs.clamp(1, MAX_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    fn normalized(mut self) -> Self {
        self.max_file_size = self.file_size_limit();
        self.default_ttl_secs = self.default_ttl_secs.clamp(1, MAX_TTL_SECS);
        self.file_requests_per_minute = self.file_requests_per_minute.max(1);
        self.cleanup_interval_secs = self.cleanup_interval_secs.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_limit_is_clamped() {
        let cfg = Config {
            max_file_size: u64::MAX,
            ..Config::default()
        };
        assert_eq!(cfg.file_size_limit(), MAX_TOTAL_SIZE);
        assert_eq!(cfg.normalized().max_file_size, MAX_TOTAL_SIZE);
    }

    #[test]
    fn default_ttl_is_bounded() {
        let huge = Config {
            default_ttl_secs: u64::MAX,
            ..Config::default()
        };
        assert_eq!(huge.default_ttl().num_seconds(), MAX_TTL_SECS as i64);
        assert_eq!(huge.normalized().default_ttl_secs, MAX_TTL_SECS);

        let zero = Config {
            default_ttl_secs: 0,
            ..Config::default()
        };
        assert_eq!(zero.default_ttl().num_seconds(), 1);
    }

    #[test]
    fn malformed_value_is_an_error() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::default("cleanup_interval_secs", "hourly"));
        assert!(matches!(
            Config::from_figment(figment),
            Err(BuddyError::Config(_))
        ));
    }

    #[test]
    fn overrides_are_applied() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::default("database_url", "sqlite:other.db"))
            .merge(Serialized::default("default_ttl_secs", u64::MAX));
        let cfg = Config::from_figment(figment).unwrap();
        assert_eq!(cfg.database_url, "sqlite:other.db");
        assert_eq!(cfg.default_ttl_secs, MAX_TTL_SECS);
    }

    #[test]
    fn zero_rate_becomes_one() {
        let cfg = Config {
            file_requests_per_minute: 0,
            ..Config::default()
        }
        .normalized();
        assert_eq!(cfg.file_requests_per_minute, 1);
    }
}
