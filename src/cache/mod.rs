//! Lookaside cache for catalog pages.
//!
//! - [`QueryKey`] turns query parameters into canonical store keys.
//! - [`CacheStore`] is the port the catalog service talks to.
//! - [`MemoryCacheStore`] and [`RedisCacheStore`] are the two providers,
//!   selected by `[cache] backend` in `reelshelf.toml`.
//!
//! Entries always expire after their TTL; explicit invalidation is an
//! optimization on top of that.

mod config;
mod keys;
mod lock;
mod memory;
mod redis_store;
mod store;

pub use config::{CacheBackend, CacheConfig};
pub use keys::{MAX_PARAMS_LEN, QueryKey};
pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use store::{CacheError, CacheResult, CacheStore};

pub(crate) use config::DEFAULT_KEY_NAMESPACE;
pub(crate) use redis_store::redact_url;
