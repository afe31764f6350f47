use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::tenant::RequireTenant;
use crate::services::tenant_service::TenantService;
use crate::state::AppState;

/// GET /api/settings - current store settings for its owner.
pub async fn get_settings(
    Extension(auth): Extension<AuthUser>,
    RequireTenant(ctx): RequireTenant,
) -> ApiResult<Value> {
    super::ensure_owner(&auth, &ctx.tenant)?;

    let root = &config::config().platform.root_domain;
    Ok(ApiResponse::success(json!({
        "store": ctx.tenant,
        "base_url": ctx.tenant.base_url(root),
        "resolved_via": ctx.method,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubdomainRequest {
    pub subdomain: String,
}

/// PUT /api/settings/subdomain - rename the store's subdomain. Subject to
/// the reserved-word policy and a re-uniqueness check.
pub async fn update_subdomain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RequireTenant(ctx): RequireTenant,
    Json(req): Json<UpdateSubdomainRequest>,
) -> ApiResult<Value> {
    super::ensure_owner(&auth, &ctx.tenant)?;

    let tenants = TenantService::new(state.pool.clone());
    let updated = tenants.update_subdomain(ctx.tenant.id, &req.subdomain).await?;

    tracing::info!(
        tenant = %updated.id,
        from = %ctx.tenant.subdomain,
        to = %updated.subdomain,
        "subdomain renamed"
    );

    let root = &config::config().platform.root_domain;
    Ok(ApiResponse::success(json!({
        "store": updated,
        "base_url": updated.base_url(root),
    })))
}
