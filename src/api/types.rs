//! Shared state for the API router.

use std::sync::Arc;

use crate::credential::CredentialStore;
use crate::session::SessionOrchestrator;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub session: Arc<SessionOrchestrator>,
    pub credentials: Arc<CredentialStore>,
}

impl ApiContext {
    pub fn new(session: Arc<SessionOrchestrator>, credentials: CredentialStore) -> Self {
        Self {
            session,
            credentials: Arc::new(credentials),
        }
    }
}
