//! Helpers shared by the Redis-backed implementations.

use redis::{ConnectionInfo, ErrorKind, IntoConnectionInfo, RedisError};

use cachet_core::CacheError;

use crate::config::ConnectionConfig;

/// Build the connection target, including TLS mode and credentials.
///
/// rustls never negotiates below TLS 1.2. The `#insecure` fragment turns off
/// certificate validation and is only added when explicitly configured.
pub(crate) fn connection_info(config: &ConnectionConfig) -> Result<ConnectionInfo, CacheError> {
    let scheme = if config.use_tls { "rediss" } else { "redis" };
    let fragment = if config.use_tls && config.tls_insecure {
        "#insecure"
    } else {
        ""
    };
    let url = format!("{scheme}://{}:{}/{fragment}", config.host, config.port);

    let mut info = url
        .as_str()
        .into_connection_info()
        .map_err(|e| CacheError::Configuration(format!("invalid backend address: {e}")))?;

    info.redis.username = config.username.clone();
    info.redis.password = Some(config.password.clone());

    Ok(info)
}

/// Errors while establishing the connection.
pub(crate) fn connection_error(err: RedisError) -> CacheError {
    CacheError::Connection(err.to_string())
}

/// Errors from an individual command.
pub(crate) fn command_error(err: RedisError) -> CacheError {
    match err.kind() {
        ErrorKind::Moved | ErrorKind::Ask | ErrorKind::CrossSlot => CacheError::Backend(format!(
            "topology mismatch, backend redirected the command ({err}); check VALKEY_MODE"
        )),
        _ if err.is_timeout() => CacheError::Backend(format!("backend timed out: {err}")),
        _ if err.is_connection_dropped() || err.is_connection_refusal() => {
            CacheError::Backend(format!("backend connection lost: {err}"))
        }
        _ => CacheError::Backend(err.to_string()),
    }
}
