use crate::{
    BroadcastConfig, CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CacheConfig, ConfigError,
    ConfigErrorResult, LoggingConfig, RateLimitConfig, ServerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub broadcast: BroadcastConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for MM_CONFIG_DIR env var, else use ./.mm/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply MM_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: MM_CONFIG_DIR env var > ./.mm/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.broadcast.validate()?;
        self.rate_limit.validate()?;
        self.cache.validate()?;

        Ok(())
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  server: {}:{}", self.server.host, self.server.port);
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stdout")
        );
        info!(
            "  broadcast: heartbeat={}s, idle_timeout={}s, buffer={}",
            self.broadcast.heartbeat_interval_secs,
            self.broadcast.idle_timeout_secs,
            self.broadcast.send_buffer_size
        );
        info!(
            "  rate_limit: {}/{}s",
            self.rate_limit.max_requests, self.rate_limit.window_secs
        );
        info!(
            "  cache: max_entries={}, ttl={}s",
            self.cache.max_entries, self.cache.ttl_secs
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("MM_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("MM_SERVER_PORT", &mut self.server.port);

        // Logging
        Self::apply_env_parse("MM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("MM_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("MM_LOG_FILE", &mut self.logging.file);

        // Broadcast
        Self::apply_env_parse(
            "MM_BROADCAST_HEARTBEAT_INTERVAL_SECS",
            &mut self.broadcast.heartbeat_interval_secs,
        );
        Self::apply_env_parse(
            "MM_BROADCAST_IDLE_TIMEOUT_SECS",
            &mut self.broadcast.idle_timeout_secs,
        );
        Self::apply_env_parse(
            "MM_BROADCAST_SEND_BUFFER_SIZE",
            &mut self.broadcast.send_buffer_size,
        );

        // Rate limit
        Self::apply_env_parse(
            "MM_RATE_LIMIT_MAX_REQUESTS",
            &mut self.rate_limit.max_requests,
        );
        Self::apply_env_parse(
            "MM_RATE_LIMIT_WINDOW_SECS",
            &mut self.rate_limit.window_secs,
        );

        // Cache
        Self::apply_env_parse("MM_CACHE_MAX_ENTRIES", &mut self.cache.max_entries);
        Self::apply_env_parse("MM_CACHE_TTL_SECS", &mut self.cache.ttl_secs);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
