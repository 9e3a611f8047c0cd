//! Single-node Redis/Valkey backend with connection pooling and reconnects.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use cachet_core::CacheError;
use cachet_core::ports::CacheBackend;

use super::redis_support::{command_error, connection_error, connection_info};
use crate::config::ConnectionConfig;

/// Standalone backend over a multiplexed [`ConnectionManager`].
///
/// The manager is cheap to clone and safe for concurrent command issuance;
/// each call works on its own clone.
pub struct StandaloneBackend {
    conn: ConnectionManager,
    address: String,
}

impl StandaloneBackend {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CacheError> {
        let client = Client::open(connection_info(config)?).map_err(connection_error)?;

        // Use timeout to prevent hanging if the backend is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(connection_error)?;

        let backend = Self {
            conn,
            address: config.address(),
        };

        // Not re-sent after an automatic reconnect.
        if let Some(name) = &config.client_name {
            backend.set_client_name(name).await?;
        }

        tracing::info!(
            address = %backend.address,
            tls = config.use_tls,
            "Connected to standalone cache backend"
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
impl CacheBackend for StandaloneBackend {
    fn topology(&self) -> &'static str {
        "standalone"
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
        // The socket closes once the last manager clone is dropped.
        tracing::debug!(address = %self.address, "Releasing standalone cache backend");
    }
}
