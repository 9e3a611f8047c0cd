//! # Cachet Shared
//!
//! Wire types shared between the cache server and its clients.

pub mod dto;
pub mod response;

pub use response::{RpcCode, RpcStatus};
