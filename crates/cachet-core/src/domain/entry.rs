use std::time::Duration;

use crate::error::CacheError;

/// A key/value pair on its way to the backing store.
///
/// The core never stores entries; it validates and forwards them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    /// Build an entry from wire-level fields. `ttl_seconds <= 0` means no expiry.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        ttl_seconds: i64,
    ) -> Result<Self, CacheError> {
        let key = key.into();
        validate_key(&key)?;

        let ttl = u64::try_from(ttl_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            key,
            value: value.into(),
            ttl,
        })
    }
}

/// Keys must be non-empty before any backend call is attempted.
pub fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        return Err(CacheError::Validation("key cannot be empty".to_string()));
    }
    Ok(())
}
