//! Cache repository - the uniform contract in front of any backend topology.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::{CacheEntry, Deadline, Outcome, validate_key};
use crate::error::CacheError;
use crate::ports::CacheBackend;

/// Owns the one backend connection for the life of the process.
///
/// Every operation validates its key first, then issues a single backend call
/// bounded by the per-call timeout and the caller's [`Deadline`]. Backend
/// replies are normalized: nil and empty values become [`Outcome::NotFound`],
/// everything else that fails becomes a [`CacheError`].
pub struct CacheRepository {
    backend: RwLock<Option<Arc<dyn CacheBackend>>>,
    call_timeout: Duration,
}

impl CacheRepository {
    /// Wrap an already verified backend.
    pub fn new(backend: Arc<dyn CacheBackend>, call_timeout: Duration) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
            call_timeout,
        }
    }

    /// Probe the backend and wrap it. On a failed probe the backend is closed
    /// before the error is returned.
    pub async fn open(
        backend: Arc<dyn CacheBackend>,
        call_timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let probe = match tokio::time::timeout(probe_timeout, backend.ping()).await {
            Ok(result) => result.map_err(|e| format!("liveness probe failed: {e}")),
            Err(_) => Err(format!("liveness probe timed out after {probe_timeout:?}")),
        };

        if let Err(reason) = probe {
            tracing::error!(topology = backend.topology(), %reason, "Backend probe failed");
            backend.close().await;
            return Err(CacheError::Connection(reason));
        }

        tracing::info!(
            topology = backend.topology(),
            call_timeout_ms = call_timeout.as_millis() as u64,
            "Cache repository ready"
        );

        Ok(Self::new(backend, call_timeout))
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Store `value` under `key`. `ttl_seconds <= 0` stores without expiry.
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: i64,
        deadline: Deadline,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key, value, ttl_seconds)?;
        let backend = self.backend().await?;

        self.bounded("set", deadline, backend.set(&entry.key, &entry.value, entry.ttl))
            .await
    }

    pub async fn get(&self, key: &str, deadline: Deadline) -> Result<Outcome<String>, CacheError> {
        validate_key(key)?;
        let backend = self.backend().await?;

        let value = self.bounded("get", deadline, backend.get(key)).await?;

        // An empty value is treated the same as the nil reply.
        Ok(value.filter(|v| !v.is_empty()).into())
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn delete(&self, key: &str, deadline: Deadline) -> Result<(), CacheError> {
        validate_key(key)?;
        let backend = self.backend().await?;

        let removed = self.bounded("delete", deadline, backend.delete(key)).await?;
        tracing::trace!(key, removed, "Delete applied");
        Ok(())
    }

    pub async fn exists(&self, key: &str, deadline: Deadline) -> Result<bool, CacheError> {
        validate_key(key)?;
        let backend = self.backend().await?;

        let count = self.bounded("exists", deadline, backend.exists(key)).await?;
        Ok(count > 0)
    }

    /// Apply a new expiry to an existing key.
    pub async fn expire(
        &self,
        key: &str,
        ttl_seconds: i64,
        deadline: Deadline,
    ) -> Result<Outcome<()>, CacheError> {
        validate_key(key)?;
        if ttl_seconds <= 0 {
            return Err(CacheError::Validation(
                "ttl_seconds must be greater than zero".to_string(),
            ));
        }
        let backend = self.backend().await?;

        let ttl = Duration::from_secs(ttl_seconds as u64);
        let applied = self.bounded("expire", deadline, backend.expire(key, ttl)).await?;

        Ok(if applied {
            Outcome::Success(())
        } else {
            Outcome::NotFound
        })
    }

    /// Round trip to the backend, used by health checks.
    pub async fn ping(&self, deadline: Deadline) -> Result<(), CacheError> {
        let backend = self.backend().await?;
        self.bounded("ping", deadline, backend.ping()).await
    }

    /// Release the connection. Safe to call any number of times.
    pub async fn close(&self) {
        let backend = self.backend.write().await.take();

        match backend {
            Some(backend) => {
                backend.close().await;
                tracing::info!(topology = backend.topology(), "Cache repository closed");
            }
            None => tracing::debug!("Cache repository already closed"),
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.backend.read().await.is_none()
    }

    async fn backend(&self) -> Result<Arc<dyn CacheBackend>, CacheError> {
        self.backend.read().await.clone().ok_or(CacheError::Closed)
    }

    async fn bounded<T, F>(
        &self,
        op: &'static str,
        deadline: Deadline,
        call: F,
    ) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        if deadline.is_expired() {
            return Err(CacheError::Timeout(Duration::ZERO));
        }

        let budget = deadline.budget(self.call_timeout);
        match tokio::time::timeout(budget, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "Backend call failed");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(op, budget_ms = budget.as_millis() as u64, "Backend call timed out");
                Err(CacheError::Timeout(budget))
            }
        }
    }
}
