mod memory_cache;

pub use memory_cache::InMemoryTtlCache;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Best-effort key/value store whose entries vanish after a time-to-live.
///
/// Absence is a normal answer: an expired or never-written key returns `None`.
/// Writers overwrite each other (last write wins).
#[async_trait]
pub trait TtlCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn put_with_ttl(&self, key: &str, value: Value, ttl: Duration);
}
