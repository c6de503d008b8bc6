//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Engine tuning knobs resolved at startup
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Create a new application state with the given repository and
    /// configuration.
    pub fn new(repository: Arc<dyn FullRepository>, config: EngineConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
        }
    }
}
