use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::database::models::UserRole;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::tenant::MaybeTenant;
use crate::services::tenant_service::TenantService;
use crate::state::AppState;

/// GET /api/admin/tenants - platform-wide tenant listing. Tenant-optional:
/// the admin console runs on the platform root with no tenant context.
pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    MaybeTenant(_): MaybeTenant,
) -> ApiResult<Value> {
    if auth.role != UserRole::PlatformAdmin {
        return Err(ApiError::forbidden("Platform admin access required"));
    }

    let tenants = TenantService::new(state.pool.clone()).list_tenants().await?;
    Ok(ApiResponse::success(json!({
        "count": tenants.len(),
        "tenants": tenants,
    })))
}
