use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const MIN_CACHE_ENTRIES: usize = 1;
pub const MAX_CACHE_ENTRIES: usize = 100_000;
pub const DEFAULT_CACHE_ENTRIES: usize = 500;

pub const MIN_CACHE_TTL_SECS: u64 = 1;
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Bounded LRU+TTL cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_ENTRIES,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_entries < MIN_CACHE_ENTRIES || self.max_entries > MAX_CACHE_ENTRIES {
            return Err(ConfigError::config(format!(
                "cache.max_entries must be {}-{}, got {}",
                MIN_CACHE_ENTRIES, MAX_CACHE_ENTRIES, self.max_entries
            )));
        }

        if self.ttl_secs < MIN_CACHE_TTL_SECS || self.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::config(format!(
                "cache.ttl_secs must be {}-{}, got {}",
                MIN_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS, self.ttl_secs
            )));
        }

        Ok(())
    }
}
