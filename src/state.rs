use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::DomainVerifier;
use crate::tenant::TenantDirectory;

/// Shared application state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub directory: Arc<dyn TenantDirectory>,
    pub verifier: Arc<DomainVerifier>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        directory: Arc<dyn TenantDirectory>,
        verifier: Arc<DomainVerifier>,
    ) -> Self {
        Self {
            pool,
            directory,
            verifier,
        }
    }
}
