use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::tenant::RequireTenant;

/// GET /api/store - public storefront probe for the resolved tenant.
///
/// The resolver returns inactive tenants too; the specific "inactive"
/// error is produced here so lapsed stores are distinguishable from
/// unregistered addresses for their owners, but only once resolution
/// succeeded.
pub async fn store_info(RequireTenant(ctx): RequireTenant) -> ApiResult<Value> {
    if !ctx.tenant.is_active {
        return Err(ApiError::tenant_inactive(
            "This store is currently inactive",
        ));
    }

    let root = &config::config().platform.root_domain;
    Ok(ApiResponse::success(json!({
        "store": {
            "subdomain": ctx.tenant.subdomain,
            "base_url": ctx.tenant.base_url(root),
        },
        "resolved_via": ctx.method,
    })))
}
