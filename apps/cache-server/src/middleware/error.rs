//! Error mapping - repository failures to RPC status codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use cachet_core::CacheError;
use cachet_shared::{RpcCode, RpcStatus};
use std::fmt;

/// Application-level error type rendered as an [`RpcStatus`] body.
#[derive(Debug)]
pub enum RpcError {
    /// Caller-correctable input; retrying unchanged will fail again.
    InvalidArgument(String),
    DeadlineExceeded(String),
    Unavailable(String),
    Internal(String),
}

impl RpcError {
    /// Map a repository error for operation `op` (e.g. `"set"`).
    pub fn from_cache(op: &str, err: CacheError) -> Self {
        match err {
            CacheError::Validation(msg) | CacheError::Configuration(msg) => {
                RpcError::InvalidArgument(msg)
            }
            CacheError::Timeout(_) => RpcError::DeadlineExceeded(format!("failed to {op}: {err}")),
            CacheError::Closed => RpcError::Unavailable(format!("failed to {op}: {err}")),
            CacheError::Connection(_) | CacheError::Backend(_) => {
                RpcError::Internal(format!("failed to {op}: {err}"))
            }
        }
    }

    pub fn code(&self) -> RpcCode {
        match self {
            RpcError::InvalidArgument(_) => RpcCode::InvalidArgument,
            RpcError::DeadlineExceeded(_) => RpcCode::DeadlineExceeded,
            RpcError::Unavailable(_) => RpcCode::Unavailable,
            RpcError::Internal(_) => RpcCode::Internal,
        }
    }

    fn message(&self) -> &str {
        match self {
            RpcError::InvalidArgument(msg)
            | RpcError::DeadlineExceeded(msg)
            | RpcError::Unavailable(msg)
            | RpcError::Internal(msg) => msg,
        }
    }

    pub fn status(&self) -> RpcStatus {
        RpcStatus::new(self.code(), self.message())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            RpcError::DeadlineExceeded(msg) => write!(f, "Deadline exceeded: {}", msg),
            RpcError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            RpcError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for RpcError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RpcError::Internal(detail) => tracing::error!(error = %detail, "Cache call failed"),
            RpcError::InvalidArgument(detail) => tracing::debug!(error = %detail, "Rejected call"),
            other => tracing::warn!(error = %other, "Cache call not completed"),
        }

        HttpResponse::build(self.status_code()).json(self.status())
    }
}

/// Result type alias for handlers.
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_maps_to_invalid_argument() {
        let err = RpcError::from_cache("get", CacheError::Validation("key cannot be empty".into()));
        assert_eq!(err.code(), RpcCode::InvalidArgument);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.status().message, "key cannot be empty");
    }

    #[test]
    fn test_configuration_error_is_reported_to_caller() {
        let err = RpcError::from_cache(
            "open",
            CacheError::Configuration("password must not be empty".into()),
        );
        assert_eq!(err.code(), RpcCode::InvalidArgument);
        assert_eq!(err.status().message, "password must not be empty");
        assert!(!err.code().is_retryable());
    }

    #[test]
    fn test_backend_failure_maps_to_internal_with_cause() {
        let err = RpcError::from_cache("set", CacheError::Backend("READONLY replica".into()));
        assert_eq!(err.code(), RpcCode::Internal);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.status().message.starts_with("failed to set: "));
        assert!(err.status().message.contains("READONLY replica"));
    }

    #[test]
    fn test_timeout_and_closed_are_transient() {
        let timeout =
            RpcError::from_cache("exists", CacheError::Timeout(Duration::from_millis(50)));
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let closed = RpcError::from_cache("delete", CacheError::Closed);
        assert_eq!(closed.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(closed.code().is_retryable());
    }
}
