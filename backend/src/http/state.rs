//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::AuthService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Token signer/verifier used by the auth middleware
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, auth: AuthService) -> Self {
        Self {
            repository,
            auth: Arc::new(auth),
        }
    }
}
