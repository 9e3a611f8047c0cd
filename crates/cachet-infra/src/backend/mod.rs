//! Backend implementations - Redis/Valkey standalone and cluster, plus in-memory.

mod memory;

pub use memory::InMemoryBackend;

#[cfg(feature = "redis")]
mod cluster;
#[cfg(feature = "redis")]
mod redis_support;
#[cfg(feature = "redis")]
mod standalone;

#[cfg(feature = "redis")]
pub use cluster::ClusterBackend;
#[cfg(feature = "redis")]
pub use standalone::StandaloneBackend;
