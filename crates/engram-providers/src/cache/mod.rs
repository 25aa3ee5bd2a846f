//! Cache providers

#[cfg(feature = "cache-moka")]
mod moka;
#[cfg(feature = "cache-redis")]
mod redis;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;
