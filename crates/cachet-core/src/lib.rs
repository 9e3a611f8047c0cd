//! # Cachet Core
//!
//! The domain layer of the Cachet cache service.
//! Holds the repository contract, key rules and the backend port. No network
//! client lives here; concrete backends are provided by `cachet-infra`.

pub mod domain;
pub mod error;
pub mod ports;
pub mod repository;

pub use domain::{CacheEntry, Deadline, Outcome};
pub use error::CacheError;
pub use repository::CacheRepository;
