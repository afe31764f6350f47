/// Classification of an incoming hostname. The single source of truth for
/// hostname parsing; nothing else in the crate inspects Host headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    /// `localhost`, an IPv4/IPv6 literal, or `<slug>.localhost`
    LocalDev { slug: Option<String> },
    /// The configured platform root domain, bare or `www.`-prefixed
    PlatformRoot,
    /// `<slug>.<platform-root>` with exactly one label before the root
    PlatformSubdomain { slug: String },
    /// Anything else; may be a registered custom domain, decided by lookup
    CandidateCustomDomain { host: Option<String> },
}

/// Classify a raw Host header value against the platform root domain.
///
/// Never panics: malformed or empty input classifies as
/// `CandidateCustomDomain { host: None }` and the directory lookup simply
/// fails to match.
pub fn classify(hostname: &str, platform_root: &str) -> HostClass {
    let host = normalize_host(hostname);
    if host.is_empty() {
        return HostClass::CandidateCustomDomain { host: None };
    }

    let platform_root = platform_root.trim_end_matches('.').to_lowercase();

    if host == "localhost" || is_ip_literal(&host) {
        return HostClass::LocalDev { slug: None };
    }
    if let Some(label) = host.strip_suffix(".localhost") {
        // Only a single label is a usable dev slug; deeper nesting is noise
        if !label.is_empty() && !label.contains('.') {
            return HostClass::LocalDev {
                slug: Some(label.to_string()),
            };
        }
        return HostClass::LocalDev { slug: None };
    }

    if !platform_root.is_empty() {
        if host == platform_root {
            return HostClass::PlatformRoot;
        }
        if let Some(label) = host.strip_suffix(&format!(".{}", platform_root)) {
            // www gets the same equivalence the directory grants custom
            // domains: both forms of the platform's own domain are the root
            if label == "www" {
                return HostClass::PlatformRoot;
            }
            if !label.is_empty() && !label.contains('.') {
                return HostClass::PlatformSubdomain {
                    slug: label.to_string(),
                };
            }
            // Nested labels under the root are not tenant subdomains; fall
            // through to the custom-domain catch-all like any other host.
        }
    }

    HostClass::CandidateCustomDomain { host: Some(host) }
}

/// Strip the port (handling IPv6 bracket literals), trim trailing dots,
/// and lowercase.
pub fn normalize_host(hostname: &str) -> String {
    let trimmed = hostname.trim();

    // [::1]:8080 style bracket literal
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return rest[..end].to_lowercase();
        }
        return trimmed.to_lowercase();
    }

    let without_port = match trimmed.rsplit_once(':') {
        // More than one colon and no brackets means a bare IPv6 literal
        Some(_) if trimmed.matches(':').count() > 1 => trimmed,
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => trimmed,
    };

    without_port.trim_end_matches('.').to_lowercase()
}

fn is_ip_literal(host: &str) -> bool {
    host.parse::<std::net::IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "storehub.test";

    #[test]
    fn test_platform_root_exact_match() {
        assert_eq!(classify("storehub.test", ROOT), HostClass::PlatformRoot);
        assert_eq!(classify("STOREHUB.TEST", ROOT), HostClass::PlatformRoot);
        assert_eq!(classify("storehub.test:8080", ROOT), HostClass::PlatformRoot);
        assert_eq!(classify("storehub.test.", ROOT), HostClass::PlatformRoot);
    }

    #[test]
    fn test_www_root_is_platform_root() {
        // Same www-equivalence the directory gives custom domains
        assert_eq!(classify("www.storehub.test", ROOT), HostClass::PlatformRoot);
        assert_eq!(classify("WWW.storehub.test:443", ROOT), HostClass::PlatformRoot);
        // www under anything else is still a custom-domain candidate
        assert_eq!(
            classify("www.example.com", ROOT),
            HostClass::CandidateCustomDomain {
                host: Some("www.example.com".into())
            }
        );
    }

    #[test]
    fn test_platform_subdomain() {
        assert_eq!(
            classify("acme.storehub.test", ROOT),
            HostClass::PlatformSubdomain { slug: "acme".into() }
        );
        assert_eq!(
            classify("ACME.storehub.test:3000", ROOT),
            HostClass::PlatformSubdomain { slug: "acme".into() }
        );
    }

    #[test]
    fn test_nested_subdomain_is_not_a_tenant() {
        // Two labels before the root is not a tenant address
        assert_eq!(
            classify("a.b.storehub.test", ROOT),
            HostClass::CandidateCustomDomain {
                host: Some("a.b.storehub.test".into())
            }
        );
    }

    #[test]
    fn test_local_dev() {
        assert_eq!(classify("localhost", ROOT), HostClass::LocalDev { slug: None });
        assert_eq!(classify("localhost:3000", ROOT), HostClass::LocalDev { slug: None });
        assert_eq!(classify("127.0.0.1:3000", ROOT), HostClass::LocalDev { slug: None });
        assert_eq!(classify("[::1]:3000", ROOT), HostClass::LocalDev { slug: None });
        assert_eq!(
            classify("acme.localhost:3000", ROOT),
            HostClass::LocalDev { slug: Some("acme".into()) }
        );
    }

    #[test]
    fn test_unrelated_domain_is_custom_candidate() {
        assert_eq!(
            classify("shop.example.com", ROOT),
            HostClass::CandidateCustomDomain {
                host: Some("shop.example.com".into())
            }
        );
        assert_eq!(
            classify("example.com", ROOT),
            HostClass::CandidateCustomDomain {
                host: Some("example.com".into())
            }
        );
    }

    #[test]
    fn test_malformed_input_never_panics() {
        assert_eq!(
            classify("", ROOT),
            HostClass::CandidateCustomDomain { host: None }
        );
        assert_eq!(
            classify("   ", ROOT),
            HostClass::CandidateCustomDomain { host: None }
        );
        // Unclosed bracket, garbage port: still classified, never a panic
        assert!(matches!(
            classify("[::1", ROOT),
            HostClass::LocalDev { .. } | HostClass::CandidateCustomDomain { .. }
        ));
        assert!(matches!(
            classify("host:notaport", ROOT),
            HostClass::CandidateCustomDomain { .. }
        ));
    }

    #[test]
    fn test_port_stripping() {
        assert_eq!(normalize_host("example.com:443"), "example.com");
        assert_eq!(normalize_host("example.com"), "example.com");
        assert_eq!(normalize_host("[2001:db8::1]:8080"), "2001:db8::1");
        // Bare IPv6 literal keeps its colons
        assert_eq!(normalize_host("2001:db8::1"), "2001:db8::1");
    }
}
