//! Ports - trait definitions for external dependencies.
//! Infrastructure crates provide the implementations.

mod backend;

pub use backend::CacheBackend;
