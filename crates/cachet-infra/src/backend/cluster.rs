//! Clustered Redis/Valkey backend - commands are routed by key slot.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;

use cachet_core::CacheError;
use cachet_core::ports::CacheBackend;

use super::redis_support::{command_error, connection_error, connection_info};
use crate::config::ConnectionConfig;

/// Cluster backend over one async [`ClusterConnection`].
///
/// The configured address is the seed node; the client discovers the rest of
/// the slot map itself. TLS mode and credentials are inherited from the seed.
pub struct ClusterBackend {
    conn: ClusterConnection,
    seed: String,
}

impl ClusterBackend {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CacheError> {
        let mut builder = ClusterClient::builder(vec![connection_info(config)?])
            .password(config.password.clone())
            .connection_timeout(config.connect_timeout)
            .response_timeout(config.request_timeout);

        if let Some(username) = &config.username {
            builder = builder.username(username.clone());
        }

        let client = builder.build().map_err(connection_error)?;

        let conn = tokio::time::timeout(config.connect_timeout, client.get_async_connection())
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(connection_error)?;

        let backend = Self {
            conn,
            seed: config.address(),
        };

        // CLIENT SETNAME is broadcast to every node the client knows about.
        if let Some(name) = &config.client_name {
            backend.set_client_name(name).await?;
        }

        tracing::info!(
            seed = %backend.seed,
            tls = config.use_tls,
            "Connected to cache cluster"
        );

        Ok(backend)
    }

    async fn set_client_name(&self, name: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("CLIENT")
            .arg("SETNAME")
            .arg(name)
            .query_async(&mut conn)
            .await
            .map_err(connection_error)?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for ClusterBackend {
    fn topology(&self) -> &'static str {
        "cluster"
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => conn
                .set_ex::<_, _, ()>(key, value, duration.as_secs())
                .await
                .map_err(command_error),
            None => conn.set::<_, _, ()>(key, value).await.map_err(command_error),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(command_error)
    }

    async fn delete(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, u64>(key).await.map_err(command_error)
    }

    async fn exists(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        conn.exists::<_, u64>(key).await.map_err(command_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        conn.expire::<_, bool>(key, seconds).await.map_err(command_error)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn close(&self) {
        // Node connections close once the last handle clone is dropped.
        tracing::debug!(seed = %self.seed, "Releasing cache cluster backend");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Live cluster seed from the `VALKEY_TEST_CLUSTER_*` variables; `None` skips the test.
    async fn get_test_cluster() -> Option<ClusterBackend> {
        let password = std::env::var("VALKEY_TEST_CLUSTER_PASSWORD").ok()?;
        let config = ConnectionConfig {
            host: std::env::var("VALKEY_TEST_CLUSTER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("VALKEY_TEST_CLUSTER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7000),
            password,
            client_name: Some("cachet-cluster-test".to_string()),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        };

        ClusterBackend::connect(&config).await.ok()
    }

    #[tokio::test]
    async fn test_cluster_set_get_delete_across_slots() {
        let backend = match get_test_cluster().await {
            Some(b) => b,
            None => {
                tracing::warn!("Valkey cluster not available, skipping test");
                return;
            }
        };

        // Keys chosen to land on different hash slots.
        for key in ["cachet:test:{a}", "cachet:test:{b}", "cachet:test:{c}"] {
            backend.set(key, "value", None).await.unwrap();
            assert_eq!(backend.get(key).await.unwrap(), Some("value".to_string()));
            assert_eq!(backend.exists(key).await.unwrap(), 1);

            assert_eq!(backend.delete(key).await.unwrap(), 1);
            assert_eq!(backend.delete(key).await.unwrap(), 0);
        }
        backend.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_cluster_client_name_is_applied() {
        let backend = match get_test_cluster().await {
            Some(b) => b,
            None => return,
        };

        let mut conn = backend.conn.clone();
        let name: Option<String> = redis::cmd("CLIENT")
            .arg("GETNAME")
            .query_async(&mut conn)
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("cachet-cluster-test"));
    }
}
