pub mod error;
pub mod rate_limiter;
pub mod ttl_cache;

pub use error::{CoreError, Result};
pub use rate_limiter::RateLimiter;
pub use ttl_cache::{CacheStats, TtlCache};
