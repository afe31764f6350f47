use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A store (tenant). `subdomain` addresses it under the platform root;
/// `custom_domain` is optional and only set after DNS verification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub subdomain: String,
    /// Stored verbatim as the owner registered it; matching treats the
    /// `www.` and bare forms as equivalent.
    pub custom_domain: Option<String>,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Public base URL for this tenant's dashboard, preferring the custom
    /// domain when one is active.
    pub fn base_url(&self, platform_root: &str) -> String {
        match &self.custom_domain {
            Some(domain) => format!("https://{}", domain),
            None => format!("https://{}.{}", self.subdomain, platform_root),
        }
    }
}
