use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::{Tenant, UserRole};
use crate::error::ApiError;
use crate::handoff;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::registration;
use crate::services::tenant_service::TenantService;
use crate::services::user_service::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Subdomain slug for the user's first store
    pub subdomain: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Which of the user's stores to hand off to; defaults to the first
    pub subdomain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: Value,
    pub stores: Vec<Tenant>,
    /// Redirect target carrying the token in the URL fragment; `None`
    /// when the account owns no store yet.
    pub handoff_url: Option<String>,
}

/// POST /auth/register - create an account plus its first store, then hand
/// the session off to the store's dashboard origin. The two inserts commit
/// together: a taken subdomain rolls the user row back too.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    if req.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let (user, tenant) =
        registration::register_owner(&state.pool, &req.email, &req.password, &req.subdomain)
            .await?;

    let token = generate_jwt(Claims::new(user.id, user.email.clone(), user.role))?;
    let payload = auth_payload(token, &user.email, user.role, vec![tenant], None)?;

    tracing::info!(email = %user.email, "registered new store owner");
    Ok(ApiResponse::created(payload))
}

/// POST /auth/login - authenticate and hand off to the requested store.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let users = UserService::new(state.pool.clone());
    let user = users.authenticate(&req.email, &req.password).await?;

    let tenants = TenantService::new(state.pool.clone());
    let stores = tenants.find_owned(user.id).await?;

    let token = generate_jwt(Claims::new(user.id, user.email.clone(), user.role))?;
    let payload = auth_payload(token, &user.email, user.role, stores, req.subdomain.as_deref())?;

    Ok(ApiResponse::success(payload))
}

fn auth_payload(
    token: String,
    email: &str,
    role: UserRole,
    stores: Vec<Tenant>,
    requested_slug: Option<&str>,
) -> Result<AuthPayload, ApiError> {
    let root = &config::config().platform.root_domain;

    let target = match requested_slug {
        Some(slug) => Some(
            stores
                .iter()
                .find(|t| t.subdomain.eq_ignore_ascii_case(slug))
                .ok_or_else(|| ApiError::forbidden("You do not own that store"))?,
        ),
        None => stores.first(),
    };

    let handoff_url = target
        .map(|tenant| handoff::handoff_url(&tenant.base_url(root), &token))
        .transpose()
        .map_err(|e| {
            tracing::error!("failed to build handoff url: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?
        .map(|url| url.to_string());

    Ok(AuthPayload {
        user: json!({ "email": email, "role": role }),
        token,
        stores,
        handoff_url,
    })
}
