use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, HeaderValue, ORIGIN, VARY,
        },
        Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::{self, Environment};
use crate::state::AppState;
use crate::tenant::hostname::{classify, HostClass};
use crate::tenant::TenantDirectory;

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "authorization, content-type";

/// CORS with a dynamically derived allow set: the platform root, every
/// registered subdomain, and every active custom domain. Custom domains
/// are added at runtime, so a static allow-list cannot work; the check is
/// a per-request directory lookup.
pub async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let allowed_origin = match &origin {
        Some(origin) => origin_allowed(state.directory.as_ref(), origin)
            .await
            .then(|| origin.clone()),
        None => None,
    };

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = allowed_origin {
            apply_cors_headers(&mut response, &origin, true);
        }
        return response;
    }

    let mut response = next.run(request).await;
    if let Some(origin) = allowed_origin {
        apply_cors_headers(&mut response, &origin, false);
    }
    response
}

fn apply_cors_headers(response: &mut Response, origin: &str, preflight: bool) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(VARY, HeaderValue::from_static("origin"));
    if preflight {
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("300"));
    }
}

async fn origin_allowed(directory: &dyn TenantDirectory, origin: &str) -> bool {
    let config = config::config();

    let Ok(url) = url::Url::parse(origin) else {
        return false;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };

    match classify(host, &config.platform.root_domain) {
        HostClass::PlatformRoot => true,
        HostClass::LocalDev { .. } => {
            matches!(config.environment, Environment::Development)
        }
        HostClass::PlatformSubdomain { slug } => match directory.find_by_subdomain(&slug).await {
            Ok(tenant) => tenant.is_some(),
            Err(e) => {
                tracing::error!("CORS subdomain lookup failed: {}", e);
                false
            }
        },
        HostClass::CandidateCustomDomain { host: Some(host) } => {
            match directory.find_by_custom_domain(&host).await {
                Ok(tenant) => tenant.map(|t| t.is_active).unwrap_or(false),
                Err(e) => {
                    tracing::error!("CORS custom domain lookup failed: {}", e);
                    false
                }
            }
        }
        HostClass::CandidateCustomDomain { host: None } => false,
    }
}
