use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::services::domain_service::DomainError;

/// Lookup contract over the tenant registry. Both lookups are
/// case-insensitive on the matched field and return at most one tenant;
/// unique constraints upstream guarantee no ambiguity.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Exact slug match.
    async fn find_by_subdomain(&self, slug: &str) -> Result<Option<Tenant>, sqlx::Error>;

    /// Matches when the stored custom domain equals `host`, equals
    /// `www.<host>`, or equals `host` stripped of a leading `www.`. Owners
    /// register either form and traffic arrives as either.
    async fn find_by_custom_domain(&self, host: &str) -> Result<Option<Tenant>, sqlx::Error>;
}

/// Postgres-backed directory over the shared `tenants` table.
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TENANT_COLUMNS: &str =
    "id, subdomain, custom_domain, owner_id, is_active, created_at, updated_at";

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn find_by_subdomain(&self, slug: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tenants WHERE lower(subdomain) = $1",
            TENANT_COLUMNS
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(slug.to_lowercase())
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_by_custom_domain(&self, host: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let host = host.to_lowercase();
        let bare = host.strip_prefix("www.").unwrap_or(&host).to_string();
        let query = format!(
            "SELECT {} FROM tenants \
             WHERE lower(custom_domain) IN ($1, 'www.' || $1, $2)",
            TENANT_COLUMNS
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(&host)
            .bind(&bare)
            .fetch_optional(&self.pool)
            .await
    }
}

/// In-memory directory mirroring the SQL matching contract. Used by unit
/// tests and the CLI's offline dry runs.
#[derive(Default)]
pub struct MemoryTenantDirectory {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
}

impl MemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    /// Activation with the same uniqueness semantics as the SQL unique
    /// index: the second writer of the same domain gets a conflict.
    pub async fn activate_custom_domain(
        &self,
        tenant_id: Uuid,
        domain: &str,
    ) -> Result<(), DomainError> {
        let domain_lower = domain.to_lowercase();
        let mut tenants = self.tenants.write().await;

        let taken = tenants.values().any(|t| {
            t.id != tenant_id
                && t.custom_domain
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase() == domain_lower)
        });
        if taken {
            return Err(DomainError::Conflict(domain.to_string()));
        }

        let tenant = tenants
            .get_mut(&tenant_id)
            .ok_or_else(|| DomainError::InvalidDomain("unknown tenant".to_string()))?;
        tenant.custom_domain = Some(domain.to_string());
        tenant.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for MemoryTenantDirectory {
    async fn find_by_subdomain(&self, slug: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let slug = slug.to_lowercase();
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| t.subdomain.to_lowercase() == slug)
            .cloned())
    }

    async fn find_by_custom_domain(&self, host: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let host = host.to_lowercase();
        let bare = host.strip_prefix("www.").unwrap_or(&host);
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| {
                t.custom_domain.as_deref().is_some_and(|stored| {
                    let stored = stored.to_lowercase();
                    stored == host || stored == format!("www.{}", host) || stored == bare
                })
            })
            .cloned())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use chrono::Utc;

    pub fn tenant(subdomain: &str, custom_domain: Option<&str>) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            subdomain: subdomain.to_string(),
            custom_domain: custom_domain.map(str::to_string),
            owner_id: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::tenant;
    use super::*;

    #[tokio::test]
    async fn test_subdomain_lookup_is_case_insensitive() {
        let dir = MemoryTenantDirectory::new();
        dir.insert(tenant("acme", None)).await;

        assert!(dir.find_by_subdomain("acme").await.unwrap().is_some());
        assert!(dir.find_by_subdomain("ACME").await.unwrap().is_some());
        assert!(dir.find_by_subdomain("acme2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_domain_www_equivalence() {
        let dir = MemoryTenantDirectory::new();
        // Stored bare: both arrival forms must match
        dir.insert(tenant("acme", Some("shop.example.com"))).await;

        assert!(dir.find_by_custom_domain("shop.example.com").await.unwrap().is_some());
        assert!(dir.find_by_custom_domain("www.shop.example.com").await.unwrap().is_some());
        assert!(dir.find_by_custom_domain("SHOP.EXAMPLE.COM").await.unwrap().is_some());

        // Stored with www. prefix: both arrival forms must match
        let dir = MemoryTenantDirectory::new();
        dir.insert(tenant("beta", Some("www.beta-store.io"))).await;

        assert!(dir.find_by_custom_domain("beta-store.io").await.unwrap().is_some());
        assert!(dir.find_by_custom_domain("www.beta-store.io").await.unwrap().is_some());
        assert!(dir.find_by_custom_domain("other.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_activation_one_conflict() {
        let dir = std::sync::Arc::new(MemoryTenantDirectory::new());
        let a = tenant("store-a", None);
        let b = tenant("store-b", None);
        let (id_a, id_b) = (a.id, b.id);
        dir.insert(a).await;
        dir.insert(b).await;

        let d1 = dir.clone();
        let d2 = dir.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { d1.activate_custom_domain(id_a, "shop.example.com").await }),
            tokio::spawn(async move { d2.activate_custom_domain(id_b, "shop.example.com").await }),
        );
        let results = [r1.unwrap(), r2.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
            .count();
        assert_eq!((successes, conflicts), (1, 1));
    }
}
