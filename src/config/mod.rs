// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{Result, ServiceError};
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix for nested environment overrides, e.g. `PROMPTCACHE_CACHE__TTL_SECONDS`.
const ENV_PREFIX: &str = "PROMPTCACHE";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Legacy flags `USE_REDIS` / `REDIS_URL` (highest)
    /// 2. Environment variables (`PROMPTCACHE_` prefix)
    /// 3. Config file (`path`, or `~/.promptcache/config.toml` when present)
    /// 4. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the caller.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`AppConfig::load`], reading environment values from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::with_name(&Self::default_config_path()).required(false),
        };

        let lookup = |key: &str| match &env {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        let legacy_backend = lookup("USE_REDIS").map(|v| {
            if v.eq_ignore_ascii_case("true") {
                CacheBackendKind::Redis.as_str()
            } else {
                CacheBackendKind::Memory.as_str()
            }
        });
        let legacy_redis_url = lookup("REDIS_URL");

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file
            .add_source(file)
            // Override with environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env.clone()),
            )
            .set_override_option("cache.backend", legacy_backend)?
            .set_override_option("cache.redis_url", legacy_redis_url)?
            .build()
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        let loaded: AppConfig = config
            .try_deserialize()
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ServiceError::Config("server.port must be non-zero".to_string()));
        }
        if self.performance.max_concurrent_requests == 0 {
            return Err(ServiceError::Config(
                "performance.max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.model.max_length == 0 {
            return Err(ServiceError::Config("model.max_length must be at least 1".to_string()));
        }
        if !self.model.temperature.is_finite() || self.model.temperature < 0.0 {
            return Err(ServiceError::Config(
                "model.temperature must be a non-negative number".to_string(),
            ));
        }
        // SETEX rejects a zero expiry
        if self.cache.ttl_seconds == 0 {
            return Err(ServiceError::Config("cache.ttl_seconds must be at least 1".to_string()));
        }
        Ok(())
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".promptcache")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.performance.max_concurrent_requests, 10);
    }

    #[test]
    fn test_prefixed_env_overrides() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("PROMPTCACHE_CACHE__TTL_SECONDS", "60"),
                ("PROMPTCACHE_SERVER__PORT", "9001"),
                ("PROMPTCACHE_MODEL__NAME", "gpt2"),
            ]),
        )
        .unwrap();
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.model.name, "gpt2");
    }

    #[test]
    fn test_legacy_redis_flags() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("USE_REDIS", "TRUE"), ("REDIS_URL", "redis://cache:6380")]),
        )
        .unwrap();
        assert_eq!(config.cache.backend, CacheBackendKind::Redis);
        assert_eq!(config.cache.redis_url, "redis://cache:6380");

        let config = AppConfig::load_with_env(None, env(&[("USE_REDIS", "no")])).unwrap();
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
    }

    #[test]
    fn test_config_file_is_layered_under_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cache]\nbackend = \"redis\"\nttl_seconds = 10\n\n[performance]\nmax_concurrent_requests = 2"
        )
        .unwrap();

        let config = AppConfig::load_with_env(
            Some(file.path()),
            env(&[("PROMPTCACHE_CACHE__TTL_SECONDS", "20")]),
        )
        .unwrap();
        assert_eq!(config.cache.backend, CacheBackendKind::Redis);
        assert_eq!(config.cache.ttl_seconds, 20);
        assert_eq!(config.performance.max_concurrent_requests, 2);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let result = AppConfig::load_with_env(
            None,
            env(&[("PROMPTCACHE_PERFORMANCE__MAX_CONCURRENT_REQUESTS", "0")]),
        );
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
