//! Application state - shared across all handlers.

use std::sync::Arc;

use cachet_core::CacheRepository;

/// Shared application state.
///
/// The repository is opened once before the server binds and closed once
/// after it has drained.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<CacheRepository>,
}

impl AppState {
    pub fn new(repo: Arc<CacheRepository>) -> Self {
        Self { repo }
    }
}
