use serde::Serialize;

use crate::database::models::Tenant;
use crate::tenant::directory::TenantDirectory;
use crate::tenant::hostname::{classify, HostClass};
use crate::tenant::slug;

/// How a request was matched to its tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    CustomDomain,
    Subdomain,
    Path,
}

/// Request-scoped tenant binding. Produced fresh by the resolver on every
/// request and never cached across requests; all downstream data access is
/// parameterized by `tenant.id`.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub method: ResolutionMethod,
}

/// Outcome of running the resolver. `NotFound` (an address was extracted
/// but no tenant matched) is deliberately distinct from `NoTenant` (the
/// request did not address a tenant at all); only the caller knows whether
/// its route requires one.
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(TenantContext),
    NotFound,
    NoTenant,
}

/// Raw addressing inputs for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveInput<'a> {
    pub host_header: Option<&'a str>,
    /// Client-facing host forwarded by an internal proxy (X-Original-Host).
    pub override_host: Option<&'a str>,
    /// Whether the override header may be honored for this request. When
    /// false and the header is present, the resolver fails closed: it logs
    /// and falls back to the raw Host header.
    pub override_trusted: bool,
    /// First path segment, for path-based dashboard routing on the
    /// platform root (`/<slug>/...`).
    pub path_candidate: Option<&'a str>,
}

/// Resolve a request to a tenant. Read-only and idempotent; safe to run on
/// every request. First match wins, in strict order: trusted override host,
/// path slug, custom domain, subdomain.
pub async fn resolve(
    directory: &dyn TenantDirectory,
    platform_root: &str,
    input: ResolveInput<'_>,
) -> Result<Resolution, sqlx::Error> {
    let effective_host = match (input.override_host, input.override_trusted) {
        (Some(host), true) => host,
        (Some(_), false) => {
            // Spoofing vector if honored from an untrusted source
            tracing::warn!("ignoring host override header from untrusted source");
            input.host_header.unwrap_or("")
        }
        (None, _) => input.host_header.unwrap_or(""),
    };

    let class = classify(effective_host, platform_root);

    // Path-based addressing wins: it is how the dashboard is reached when
    // the platform root itself is the Host. A non-matching segment is just
    // an ordinary route, so a miss falls through to host-based resolution.
    if let Some(segment) = input.path_candidate {
        if slug::validate_slug(segment).is_ok() {
            if let Some(tenant) = directory.find_by_subdomain(segment).await? {
                return Ok(Resolution::Resolved(TenantContext {
                    tenant,
                    method: ResolutionMethod::Path,
                }));
            }
        }
    }

    match class {
        HostClass::CandidateCustomDomain { host: Some(host) } => {
            match directory.find_by_custom_domain(&host).await? {
                Some(tenant) => Ok(Resolution::Resolved(TenantContext {
                    tenant,
                    method: ResolutionMethod::CustomDomain,
                })),
                None => Ok(Resolution::NotFound),
            }
        }
        HostClass::CandidateCustomDomain { host: None } => Ok(Resolution::NotFound),
        HostClass::PlatformSubdomain { slug } | HostClass::LocalDev { slug: Some(slug) } => {
            match directory.find_by_subdomain(&slug).await? {
                Some(tenant) => Ok(Resolution::Resolved(TenantContext {
                    tenant,
                    method: ResolutionMethod::Subdomain,
                })),
                None => Ok(Resolution::NotFound),
            }
        }
        HostClass::PlatformRoot | HostClass::LocalDev { slug: None } => Ok(Resolution::NoTenant),
    }
}
