use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::domains::verify::{ChallengeMethod, ChallengeState};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::tenant::RequireTenant;
use crate::services::domain_service::DomainService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestDomainBody {
    pub domain: String,
    #[serde(default = "default_method")]
    pub method: ChallengeMethod,
}

fn default_method() -> ChallengeMethod {
    ChallengeMethod::Txt
}

/// POST /api/settings/domain - claim a custom domain: issues a DNS
/// challenge the owner must publish before the domain can activate.
pub async fn request_domain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RequireTenant(ctx): RequireTenant,
    Json(req): Json<RequestDomainBody>,
) -> ApiResult<Value> {
    super::ensure_owner(&auth, &ctx.tenant)?;

    let root = &config::config().platform.root_domain;
    let domain = DomainService::validate_domain(&req.domain, root)?;

    let challenge = state.verifier.issue(&domain, req.method);
    let service = DomainService::new(state.pool.clone());
    service.store_challenge(ctx.tenant.id, &challenge).await?;

    Ok(ApiResponse::created(json!({
        "domain": challenge.domain,
        "method": challenge.method,
        "record_name": state.verifier.record_name(&challenge.domain),
        "token": challenge.expected_token,
        "cname_target": state.verifier.cname_target(),
        "expires_at": challenge.expires_at,
    })))
}

/// POST /api/settings/domain/check - re-check the outstanding challenge
/// against live DNS; activates the domain on success. Propagation lag
/// shows up as `pending`, never as an error.
pub async fn check_domain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RequireTenant(ctx): RequireTenant,
) -> ApiResult<Value> {
    super::ensure_owner(&auth, &ctx.tenant)?;

    let service = DomainService::new(state.pool.clone());
    let challenge = service.load_challenge(ctx.tenant.id).await?;

    let result = state.verifier.check(&challenge).await;
    match result {
        ChallengeState::Verified => {
            // Activation re-checks global uniqueness at commit time; a
            // concurrent claim of the same domain surfaces as a conflict.
            service.activate_domain(ctx.tenant.id, &challenge.domain).await?;
            Ok(ApiResponse::success(json!({
                "state": result,
                "domain": challenge.domain,
            })))
        }
        ChallengeState::Pending | ChallengeState::Expired => Ok(ApiResponse::success(json!({
            "state": result,
            "domain": challenge.domain,
            "expires_at": challenge.expires_at,
        }))),
    }
}

/// DELETE /api/settings/domain - drop the custom domain; the store falls
/// back to its subdomain address.
pub async fn clear_domain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RequireTenant(ctx): RequireTenant,
) -> ApiResult<Value> {
    super::ensure_owner(&auth, &ctx.tenant)?;

    let service = DomainService::new(state.pool.clone());
    service.clear_domain(ctx.tenant.id).await?;

    Ok(ApiResponse::success(json!({
        "subdomain": ctx.tenant.subdomain,
        "custom_domain": Value::Null,
    })))
}
