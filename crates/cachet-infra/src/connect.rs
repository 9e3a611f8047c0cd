//! Repository construction - configuration checks, topology selection, probe.

use std::sync::Arc;

use cachet_core::ports::CacheBackend;
use cachet_core::{CacheError, CacheRepository};

use crate::config::ConnectionConfig;
#[cfg(feature = "redis")]
use crate::config::Topology;

/// Open a repository against the configured backend.
///
/// Fails with [`CacheError::Configuration`] before any network activity when
/// the configuration is invalid (for example an empty password), and with
/// [`CacheError::Connection`] when the backend cannot be reached or does not
/// answer the liveness probe.
pub async fn connect(config: &ConnectionConfig) -> Result<CacheRepository, CacheError> {
    config.validate()?;

    tracing::info!(
        address = %config.address(),
        topology = config.topology.as_str(),
        tls = config.use_tls,
        "Opening cache repository"
    );
    if config.tls_insecure {
        tracing::warn!("TLS certificate validation is disabled (VALKEY_TLS_INSECURE)");
    }

    let backend = open_backend(config).await?;
    CacheRepository::open(backend, config.request_timeout, config.probe_timeout).await
}

/// Open a repository over an already constructed backend, with the timeouts
/// from `config`. Used for the in-memory backend.
pub async fn connect_with(
    backend: Arc<dyn CacheBackend>,
    config: &ConnectionConfig,
) -> Result<CacheRepository, CacheError> {
    CacheRepository::open(backend, config.request_timeout, config.probe_timeout).await
}

#[cfg(feature = "redis")]
async fn open_backend(config: &ConnectionConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
    use crate::backend::{ClusterBackend, StandaloneBackend};

    let backend: Arc<dyn CacheBackend> = match config.topology {
        Topology::Standalone => Arc::new(StandaloneBackend::connect(config).await?),
        Topology::Cluster => Arc::new(ClusterBackend::connect(config).await?),
    };
    Ok(backend)
}

#[cfg(not(feature = "redis"))]
async fn open_backend(_config: &ConnectionConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
    Err(CacheError::Configuration(
        "built without the redis feature; no network backend available".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use cachet_core::Deadline;

    use crate::backend::InMemoryBackend;

    #[tokio::test]
    async fn test_empty_password_fails_before_connecting() {
        // Port 1 would refuse the connection; the error must be about configuration.
        let config = ConnectionConfig {
            port: 1,
            ..Default::default()
        };

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, CacheError::Configuration(_)));
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            password: "s3cret".to_string(),
            connect_timeout: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
            ..Default::default()
        };

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, CacheError::Connection(_)), "got {err:?}");
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_unreachable_cluster_seed_is_connection_error() {
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            password: "s3cret".to_string(),
            topology: Topology::Cluster,
            connect_timeout: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
            ..Default::default()
        };

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, CacheError::Connection(_)), "got {err:?}");
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_connect_without_redis_is_configuration_error() {
        let config = ConnectionConfig {
            password: "s3cret".to_string(),
            ..Default::default()
        };

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, CacheError::Configuration(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connect_with_memory_backend() {
        let config = ConnectionConfig {
            request_timeout: Duration::from_millis(250),
            ..Default::default()
        };

        let repo = connect_with(Arc::new(InMemoryBackend::new()), &config)
            .await
            .unwrap();
        assert_eq!(repo.call_timeout(), Duration::from_millis(250));

        repo.set("user:42", "alice", 60, Deadline::none()).await.unwrap();
        assert!(repo.exists("user:42", Deadline::none()).await.unwrap());
        repo.close().await;
    }
}
