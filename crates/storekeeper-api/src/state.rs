//! Application state shared across handlers

use std::sync::Arc;
use storekeeper_auth::AuthService;
use storekeeper_db::UserStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub store: Arc<dyn UserStore>,
    /// Authentication service
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Create a new application state
    pub fn new(store: Arc<dyn UserStore>, auth: Arc<AuthService>) -> Self {
        Self { store, auth }
    }
}
