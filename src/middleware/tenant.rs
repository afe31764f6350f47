use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header::HOST, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};

use crate::config;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tenant::resolver::{resolve, Resolution, ResolveInput, TenantContext};

/// Header an internal proxy uses to forward the client-facing hostname.
/// The deployment edge must strip this from untrusted traffic; we only
/// honor it when the peer is on an internal network AND the config opts in.
pub const OVERRIDE_HOST_HEADER: &str = "x-original-host";

/// Runs the tenant resolver once per request and injects the outcome as a
/// `Resolution` extension. Never rejects by itself: whether a tenant is
/// required is decided by the route's extractor.
pub async fn resolve_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let host_header = headers.get(HOST).and_then(|v| v.to_str().ok());
    let override_host = headers
        .get(OVERRIDE_HOST_HEADER)
        .and_then(|v| v.to_str().ok());

    let override_trusted = config::config().security.trust_proxy_header
        && request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .is_some_and(|info| is_internal_peer(info.0.ip()));

    let path_candidate = first_path_segment(request.uri().path());

    let input = ResolveInput {
        host_header,
        override_host,
        override_trusted,
        path_candidate,
    };

    let resolution = match resolve(state.directory.as_ref(), &config::config().platform.root_domain, input).await
    {
        Ok(resolution) => resolution,
        Err(e) => return ApiError::from(e).into_response(),
    };

    if let Resolution::Resolved(ctx) = &resolution {
        tracing::debug!(
            tenant = %ctx.tenant.subdomain,
            method = ?ctx.method,
            "resolved tenant"
        );
    }

    request.extensions_mut().insert(resolution);
    next.run(request).await
}

/// First path component, the candidate for path-based dashboard routing.
fn first_path_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Loopback and RFC1918/ULA peers count as internal.
fn is_internal_peer(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

/// Extractor for tenant-required routes. `NotFound` and `NoTenant` are
/// rejected identically so probes cannot tell an unregistered address
/// apart from a malformed one.
pub struct RequireTenant(pub TenantContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Resolution>() {
            Some(Resolution::Resolved(ctx)) => Ok(RequireTenant(ctx.clone())),
            Some(_) => Err(ApiError::TenantNotFound),
            None => Err(ApiError::internal_server_error(
                "Tenant resolution middleware not installed",
            )),
        }
    }
}

/// Extractor for tenant-optional routes (platform admin endpoints run
/// without tenant scoping).
pub struct MaybeTenant(pub Option<TenantContext>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Resolution>() {
            Some(Resolution::Resolved(ctx)) => Ok(MaybeTenant(Some(ctx.clone()))),
            Some(_) => Ok(MaybeTenant(None)),
            None => Err(ApiError::internal_server_error(
                "Tenant resolution middleware not installed",
            )),
        }
    }
}
