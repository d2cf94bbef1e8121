use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::Store;

/// Request-scoped dependencies, explicitly constructed in `main` and handed
/// to handlers through axum state. No process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}
