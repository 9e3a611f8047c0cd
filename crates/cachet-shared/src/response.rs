//! Status body returned for every failed call.

use serde::{Deserialize, Serialize};

/// Status codes of the cache RPC surface, named after their gRPC counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcCode {
    InvalidArgument,
    DeadlineExceeded,
    Unavailable,
    Internal,
}

impl RpcCode {
    /// HTTP status used to carry this code.
    pub fn http_status(&self) -> u16 {
        match self {
            RpcCode::InvalidArgument => 400,
            RpcCode::Internal => 500,
            RpcCode::Unavailable => 503,
            RpcCode::DeadlineExceeded => 504,
        }
    }

    /// Whether a client may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcCode::Unavailable | RpcCode::DeadlineExceeded)
    }
}

/// A status code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: RpcCode,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_like_grpc_names() {
        let status = RpcStatus::new(RpcCode::InvalidArgument, "key cannot be empty");
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["code"], "INVALID_ARGUMENT");
        assert_eq!(json["message"], "key cannot be empty");
        assert_eq!(
            serde_json::to_value(RpcCode::DeadlineExceeded).unwrap(),
            "DEADLINE_EXCEEDED"
        );
    }

    #[test]
    fn test_only_transient_codes_are_retryable() {
        assert!(RpcCode::Unavailable.is_retryable());
        assert!(RpcCode::DeadlineExceeded.is_retryable());
        assert!(!RpcCode::InvalidArgument.is_retryable());
        assert!(!RpcCode::Internal.is_retryable());
    }
}
