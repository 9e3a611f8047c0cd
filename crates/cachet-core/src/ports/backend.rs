use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Backend capability - the minimal command set the repository needs.
///
/// One implementation per topology (standalone, cluster, in-memory). The
/// implementation is picked once when the repository is opened and never
/// switched per call. Implementations must accept concurrent calls through a
/// shared reference.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short label for logs, e.g. `"standalone"`.
    fn topology(&self) -> &'static str;

    /// SET, with EX in the same command when `ttl` is given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// GET. `Ok(None)` is the backend's nil reply.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// DEL. Returns the number of keys removed.
    async fn delete(&self, key: &str) -> Result<u64, CacheError>;

    /// EXISTS. Returns the number of matching keys.
    async fn exists(&self, key: &str) -> Result<u64, CacheError>;

    /// EXPIRE. Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// PING round trip.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Called when the repository is closed. Multiplexed clients
    /// release their sockets when the last handle is dropped, which happens
    /// right after this returns; this hook only does what must happen before
    /// that. Must tolerate repeated calls.
    async fn close(&self);
}
