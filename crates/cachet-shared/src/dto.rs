//! Data Transfer Objects - request/response types for the cache RPC surface.
//!
//! Missing fields deserialize to their zero value; field presence is checked
//! by the repository, not here.

use serde::{Deserialize, Serialize};

/// Store a value, optionally with an expiry. `ttl_seconds <= 0` means none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetRequest {
    pub key: String,
}

/// `value` is empty when `found` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub found: bool,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistsRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Apply a new expiry to an existing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpireRequest {
    pub key: String,
    pub ttl_seconds: i64,
}

/// `success` is false when the key does not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpireResponse {
    pub success: bool,
}
