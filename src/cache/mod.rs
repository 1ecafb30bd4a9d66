// Response cache module
// Author: kelexine (https://github.com/kelexine)

pub mod backend;
pub mod fingerprint;
pub mod manager;
pub mod memory;
pub mod models;
pub mod redis_backend;

pub use backend::CacheBackend;
pub use fingerprint::{fingerprint, FINGERPRINT_LEN};
pub use manager::CacheManager;
pub use memory::MemoryBackend;
pub use models::CacheStats;
pub use redis_backend::RedisBackend;
