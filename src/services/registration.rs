use sqlx::PgPool;
use thiserror::Error;

use crate::database::models::{Tenant, User, UserRole};
use crate::services::tenant_service::{TenantService, TenantServiceError};
use crate::services::user_service::{UserService, UserServiceError};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    User(#[from] UserServiceError),
    #[error(transparent)]
    Tenant(#[from] TenantServiceError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Create an account and its first store in one transaction. Either insert
/// can lose a uniqueness race (email, subdomain); on any failure the whole
/// registration rolls back, so a rejected subdomain never strands a user
/// row that would block retrying with the same email.
pub async fn register_owner(
    pool: &PgPool,
    email: &str,
    password: &str,
    subdomain: &str,
) -> Result<(User, Tenant), RegistrationError> {
    let mut tx = pool.begin().await?;

    let user = UserService::create_user_with(&mut *tx, email, password, UserRole::StoreOwner).await?;
    let tenant = TenantService::create_tenant_with(&mut *tx, user.id, subdomain).await?;

    tx.commit().await?;
    Ok((user, tenant))
}
