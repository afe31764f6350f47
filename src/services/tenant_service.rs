use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::tenant::slug::{self, SlugError};

#[derive(Debug, Error)]
pub enum TenantServiceError {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("Subdomain already taken: {0}")]
    AlreadyExists(String),
    #[error("Tenant not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const TENANT_COLUMNS: &str =
    "id, subdomain, custom_domain, owner_id, is_active, created_at, updated_at";

/// Tenant lifecycle: creation at registration, subdomain renames, owner
/// and admin listings. Lookup for request resolution lives in
/// `tenant::directory`.
pub struct TenantService {
    pool: PgPool,
}

impl TenantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store for `owner_id`. The slug passes the reserved-word
    /// policy first; the unique index is the final arbiter under races.
    /// Takes any executor so registration can bundle this with the user
    /// insert in one transaction.
    pub async fn create_tenant_with(
        executor: impl sqlx::postgres::PgExecutor<'_>,
        owner_id: Uuid,
        subdomain: &str,
    ) -> Result<Tenant, TenantServiceError> {
        let subdomain = subdomain.to_lowercase();
        slug::validate_slug(&subdomain)?;

        let query = format!(
            "INSERT INTO tenants (id, subdomain, owner_id, is_active) \
             VALUES ($1, $2, $3, true) RETURNING {}",
            TENANT_COLUMNS
        );
        let result = sqlx::query_as::<_, Tenant>(&query)
            .bind(Uuid::new_v4())
            .bind(&subdomain)
            .bind(owner_id)
            .fetch_one(executor)
            .await;

        match result {
            Ok(tenant) => Ok(tenant),
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(TenantServiceError::AlreadyExists(subdomain))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rename the subdomain, subject to the same policy and re-uniqueness
    /// check as creation.
    pub async fn update_subdomain(
        &self,
        tenant_id: Uuid,
        new_subdomain: &str,
    ) -> Result<Tenant, TenantServiceError> {
        let new_subdomain = new_subdomain.to_lowercase();
        slug::validate_slug(&new_subdomain)?;

        let query = format!(
            "UPDATE tenants SET subdomain = $1, updated_at = now() \
             WHERE id = $2 RETURNING {}",
            TENANT_COLUMNS
        );
        let result = sqlx::query_as::<_, Tenant>(&query)
            .bind(&new_subdomain)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(tenant)) => Ok(tenant),
            Ok(None) => Err(TenantServiceError::NotFound),
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(TenantServiceError::AlreadyExists(new_subdomain))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, TenantServiceError> {
        let query = format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS);
        Ok(sqlx::query_as::<_, Tenant>(&query)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// All stores owned by one user; multi-store ownership is supported.
    pub async fn find_owned(&self, owner_id: Uuid) -> Result<Vec<Tenant>, TenantServiceError> {
        let query = format!(
            "SELECT {} FROM tenants WHERE owner_id = $1 ORDER BY created_at",
            TENANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Tenant>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Platform-admin listing of every tenant.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, TenantServiceError> {
        let query = format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC",
            TENANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Tenant>(&query)
            .fetch_all(&self.pool)
            .await?)
    }
}
