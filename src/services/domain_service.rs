use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domains::verify::{ChallengeMethod, VerificationChallenge};

#[derive(Debug, Error)]
pub enum DomainError {
    /// Unique-index violation on activation: another tenant committed the
    /// same domain first. Surfaced to the user, never silently reassigned.
    #[error("Domain already in use: {0}")]
    Conflict(String),
    #[error("No verification challenge outstanding")]
    NoChallenge,
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence and activation for custom domains. Verification itself is
/// in `domains::verify`; this service owns the challenge rows and the
/// atomic activation commit.
pub struct DomainService {
    pool: PgPool,
}

impl DomainService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Basic shape check before a challenge is issued. Platform-owned
    /// hostnames can never be claimed as custom domains.
    pub fn validate_domain(domain: &str, platform_root: &str) -> Result<String, DomainError> {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();
        if domain.is_empty() || !domain.contains('.') || domain.contains('/') || domain.contains(':')
        {
            return Err(DomainError::InvalidDomain(
                "Enter a bare hostname such as shop.example.com".to_string(),
            ));
        }
        if domain == platform_root || domain.ends_with(&format!(".{}", platform_root)) {
            return Err(DomainError::InvalidDomain(
                "Platform hostnames cannot be registered as custom domains".to_string(),
            ));
        }
        Ok(domain)
    }

    /// Persist a freshly issued challenge, replacing any previous one for
    /// this tenant.
    pub async fn store_challenge(
        &self,
        tenant_id: Uuid,
        challenge: &VerificationChallenge,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO domain_challenges (tenant_id, domain, expected_token, method, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id) DO UPDATE SET
                domain = EXCLUDED.domain,
                expected_token = EXCLUDED.expected_token,
                method = EXCLUDED.method,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(tenant_id)
        .bind(&challenge.domain)
        .bind(&challenge.expected_token)
        .bind(challenge.method)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load_challenge(
        &self,
        tenant_id: Uuid,
    ) -> Result<VerificationChallenge, DomainError> {
        let row: Option<(String, String, ChallengeMethod, chrono::DateTime<chrono::Utc>)> =
            sqlx::query_as(
                "SELECT domain, expected_token, method, expires_at \
                 FROM domain_challenges WHERE tenant_id = $1",
            )
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(domain, expected_token, method, expires_at)| VerificationChallenge {
            domain,
            expected_token,
            method,
            expires_at,
        })
        .ok_or(DomainError::NoChallenge)
    }

    /// Activate a verified domain on the tenant in one atomic commit. The
    /// partial unique index on lower(custom_domain) re-checks global
    /// uniqueness at commit time; two tenants racing the same domain get
    /// exactly one success and one `Conflict`.
    pub async fn activate_domain(&self, tenant_id: Uuid, domain: &str) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tenants SET custom_domain = $1, updated_at = now() WHERE id = $2",
        )
        .bind(domain)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                return Err(DomainError::Conflict(domain.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        // Challenge is consumed by a successful activation
        sqlx::query("DELETE FROM domain_challenges WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("activated custom domain {} for tenant {}", domain, tenant_id);
        Ok(())
    }

    /// Clear the custom domain; traffic falls back to the subdomain form.
    pub async fn clear_domain(&self, tenant_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE tenants SET custom_domain = NULL, updated_at = now() WHERE id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_shapes() {
        let root = "storehub.test";
        assert_eq!(
            DomainService::validate_domain("Shop.Example.COM.", root).unwrap(),
            "shop.example.com"
        );
        assert!(DomainService::validate_domain("", root).is_err());
        assert!(DomainService::validate_domain("no-dots", root).is_err());
        assert!(DomainService::validate_domain("http://x.com/path", root).is_err());
        assert!(DomainService::validate_domain("x.com:8080", root).is_err());
    }

    #[test]
    fn test_platform_hosts_rejected() {
        let root = "storehub.test";
        assert!(DomainService::validate_domain("storehub.test", root).is_err());
        assert!(DomainService::validate_domain("acme.storehub.test", root).is_err());
        assert!(DomainService::validate_domain("acme.example.com", root).is_ok());
    }
}
