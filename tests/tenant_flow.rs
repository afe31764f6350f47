//! End-to-end exercises of the tenant resolution core through the public
//! library API: resolve a store by each addressing scheme, verify a custom
//! domain against a fake DNS zone, and walk the cross-domain session
//! handoff into the per-store credential store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;
use uuid::Uuid;

use storehub_api::cli::credentials::CredentialStore;
use storehub_api::config::PlatformConfig;
use storehub_api::database::models::Tenant;
use storehub_api::domains::verify::{ChallengeMethod, ChallengeState, DnsError, DnsLookup, DomainVerifier};
use storehub_api::handoff;
use storehub_api::tenant::resolver::{resolve, Resolution, ResolutionMethod, ResolveInput};
use storehub_api::tenant::MemoryTenantDirectory;

const ROOT: &str = "storehub.test";

fn store(subdomain: &str, custom_domain: Option<&str>) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        subdomain: subdomain.to_string(),
        custom_domain: custom_domain.map(str::to_string),
        owner_id: Uuid::new_v4(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn platform() -> PlatformConfig {
    PlatformConfig {
        root_domain: ROOT.to_string(),
        verify_record_prefix: "_storehub-verify".to_string(),
        verify_cname_target: format!("verify.{}", ROOT),
        challenge_ttl_hours: 24,
    }
}

#[derive(Default)]
struct FakeDns {
    txt: Mutex<HashMap<String, Vec<String>>>,
}

impl FakeDns {
    fn publish_txt(&self, name: &str, value: &str) {
        self.txt
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }
}

#[async_trait]
impl DnsLookup for FakeDns {
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError> {
        self.txt
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(DnsError::NoRecords)
    }

    async fn cname_target(&self, _name: &str) -> Result<Option<String>, DnsError> {
        Err(DnsError::NoRecords)
    }
}

#[tokio::test]
async fn resolves_one_store_under_every_addressing_scheme() {
    let dir = MemoryTenantDirectory::new();
    dir.insert(store("acme", Some("shop.example.com"))).await;

    let cases = [
        ("acme.storehub.test", None, ResolutionMethod::Subdomain),
        ("shop.example.com", None, ResolutionMethod::CustomDomain),
        ("www.shop.example.com", None, ResolutionMethod::CustomDomain),
        ("storehub.test", Some("acme"), ResolutionMethod::Path),
        ("acme.localhost:3000", None, ResolutionMethod::Subdomain),
    ];

    for (host, path, expected_method) in cases {
        let input = ResolveInput {
            host_header: Some(host),
            path_candidate: path,
            ..Default::default()
        };
        match resolve(&dir, ROOT, input).await.unwrap() {
            Resolution::Resolved(ctx) => {
                assert_eq!(ctx.tenant.subdomain, "acme", "host {}", host);
                assert_eq!(ctx.method, expected_method, "host {}", host);
            }
            other => panic!("host {} did not resolve: {:?}", host, other),
        }
    }
}

#[tokio::test]
async fn domain_verification_then_custom_domain_resolution() {
    let dir = MemoryTenantDirectory::new();
    let acme = store("acme", None);
    let acme_id = acme.id;
    dir.insert(acme).await;

    // Issue a challenge and check before the owner published anything
    let dns = FakeDns::default();
    let issuing = DomainVerifier::new(Box::new(FakeDns::default()), platform());
    let challenge = issuing.issue("shop.example.com", ChallengeMethod::Txt);
    assert_eq!(issuing.check(&challenge).await, ChallengeState::Pending);

    // Owner publishes the TXT record; the same challenge now verifies
    dns.publish_txt(
        "_storehub-verify.shop.example.com",
        &challenge.expected_token,
    );
    let verifier = DomainVerifier::new(Box::new(dns), platform());
    assert_eq!(verifier.check(&challenge).await, ChallengeState::Verified);

    // Activation makes the domain resolvable, www form included
    dir.activate_custom_domain(acme_id, &challenge.domain)
        .await
        .unwrap();
    let input = ResolveInput {
        host_header: Some("www.shop.example.com"),
        ..Default::default()
    };
    match resolve(&dir, ROOT, input).await.unwrap() {
        Resolution::Resolved(ctx) => {
            assert_eq!(ctx.tenant.id, acme_id);
            assert_eq!(ctx.method, ResolutionMethod::CustomDomain);
        }
        other => panic!("custom domain did not resolve: {:?}", other),
    }
}

#[test]
fn handoff_lands_token_in_per_store_credentials() {
    let token = "session-token-for-acme";

    // Issuing side: token rides in the fragment only
    let url = handoff_url_for("acme", token);
    assert!(url.query().is_none());

    // Receiving side: capture, store under the slug, strip the fragment
    let captured = handoff::extract_token(&url).unwrap();
    let path = std::env::temp_dir()
        .join(format!("storehub-flow-{}", Uuid::new_v4()))
        .join("credentials.json");
    let mut credentials = CredentialStore::load_from(path.clone()).unwrap();
    credentials.set("acme", captured);
    credentials.save().unwrap();

    let visible = handoff::strip_fragment(&url);
    assert!(!visible.as_str().contains(token));

    // A second store's login never disturbs the first session
    let reloaded = CredentialStore::load_from(path.clone()).unwrap();
    assert_eq!(reloaded.get("acme").unwrap().token, token);
    assert!(reloaded.get("beta").is_none());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

fn handoff_url_for(slug: &str, token: &str) -> Url {
    handoff::handoff_url(&format!("https://{}.{}", slug, ROOT), token).unwrap()
}
