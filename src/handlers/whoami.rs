use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;
use crate::state::AppState;

/// GET /api/auth/whoami - authenticated identity plus owned stores.
pub async fn whoami(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let stores = TenantService::new(state.pool.clone())
        .find_owned(auth.id)
        .await?;

    Ok(ApiResponse::success(json!({
        "user": {
            "id": auth.id,
            "email": auth.email,
            "role": auth.role,
        },
        "stores": stores,
    })))
}
