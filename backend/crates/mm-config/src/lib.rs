mod broadcast_config;
mod cache_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod rate_limit_config;
mod server_config;

pub use broadcast_config::{
    BroadcastConfig, DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_IDLE_TIMEOUT_SECS,
    DEFAULT_SEND_BUFFER_SIZE,
};
pub use cache_config::CacheConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use rate_limit_config::RateLimitConfig;
pub use server_config::ServerConfig;

#[cfg(test)]
mod tests;

const CONFIG_DIR_ENV: &str = "MM_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".mm";
const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const MIN_PORT: u16 = 1024;
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
