//! # Cachet Infrastructure
//!
//! Concrete backends for the repository port defined in `cachet-core`, and the
//! `connect` entry point that picks one from configuration.
//!
//! ## Feature Flags
//!
//! - `redis` (default) - Redis/Valkey standalone and cluster backends, with TLS.
//!   Without it, [`connect`] fails with a configuration error and only
//!   [`connect_with`] plus [`InMemoryBackend`] are usable.

pub mod backend;
pub mod config;
mod connect;

pub use backend::InMemoryBackend;
pub use config::{ConfigError, ConnectionConfig, Topology};
pub use connect::{connect, connect_with};

#[cfg(feature = "redis")]
pub use backend::{ClusterBackend, StandaloneBackend};
