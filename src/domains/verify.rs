use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::PlatformConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "challenge_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChallengeMethod {
    Txt,
    Cname,
}

/// A pending proof that the tenant owner controls `domain`. Consumed on
/// successful verification or discarded on expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationChallenge {
    pub domain: String,
    pub expected_token: String,
    pub method: ChallengeMethod,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of checking a challenge. `Pending` covers every DNS failure
/// mode as well: NXDOMAIN and timeouts are expected during propagation and
/// must not force the user to restart the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeState {
    Verified,
    Pending,
    Expired,
}

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("no records found")]
    NoRecords,
    #[error("lookup timed out")]
    Timeout,
    #[error("resolution failed: {0}")]
    Resolution(String),
}

/// DNS read interface for challenge checks. Production uses a real
/// resolver; tests pin a static zone.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError>;
    async fn cname_target(&self, name: &str) -> Result<Option<String>, DnsError>;
}

/// Issues and checks domain ownership challenges. Never invoked on the hot
/// request path; only on user-triggered "verify now" actions.
pub struct DomainVerifier {
    dns: Box<dyn DnsLookup>,
    platform: PlatformConfig,
}

impl DomainVerifier {
    pub fn new(dns: Box<dyn DnsLookup>, platform: PlatformConfig) -> Self {
        Self { dns, platform }
    }

    /// Record name the owner must publish: `_<platform>-verify.<domain>`
    pub fn record_name(&self, domain: &str) -> String {
        format!("{}.{}", self.platform.verify_record_prefix, domain)
    }

    /// CNAME target for the alternative challenge form.
    pub fn cname_target(&self) -> &str {
        &self.platform.verify_cname_target
    }

    /// Start a verification attempt: random opaque token, 24h TTL.
    pub fn issue(&self, domain: &str, method: ChallengeMethod) -> VerificationChallenge {
        VerificationChallenge {
            domain: domain.to_lowercase(),
            expected_token: Uuid::new_v4().to_string(),
            method,
            expires_at: Utc::now() + Duration::hours(self.platform.challenge_ttl_hours),
        }
    }

    /// Check a previously issued challenge against live DNS.
    pub async fn check(&self, challenge: &VerificationChallenge) -> ChallengeState {
        if Utc::now() > challenge.expires_at {
            return ChallengeState::Expired;
        }

        let record_name = self.record_name(&challenge.domain);
        match challenge.method {
            ChallengeMethod::Txt => match self.dns.txt_records(&record_name).await {
                // Case-sensitive exact match of at least one returned value
                Ok(values) if values.iter().any(|v| v == &challenge.expected_token) => {
                    ChallengeState::Verified
                }
                Ok(_) => ChallengeState::Pending,
                Err(e) => {
                    tracing::debug!("TXT lookup for {} not satisfied yet: {}", record_name, e);
                    ChallengeState::Pending
                }
            },
            ChallengeMethod::Cname => match self.dns.cname_target(&record_name).await {
                Ok(Some(target))
                    if target.trim_end_matches('.').eq_ignore_ascii_case(self.cname_target()) =>
                {
                    ChallengeState::Verified
                }
                Ok(_) => ChallengeState::Pending,
                Err(e) => {
                    tracing::debug!("CNAME lookup for {} not satisfied yet: {}", record_name, e);
                    ChallengeState::Pending
                }
            },
        }
    }
}

pub mod resolver_dns {
    use super::{DnsError, DnsLookup};
    use async_trait::async_trait;
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};
    use hickory_resolver::error::{ResolveError, ResolveErrorKind};
    use hickory_resolver::proto::rr::{RData, RecordType};
    use hickory_resolver::TokioAsyncResolver;

    /// System-resolver-backed DNS reads.
    pub struct ResolverDns {
        resolver: TokioAsyncResolver,
    }

    impl ResolverDns {
        pub fn new() -> Self {
            let resolver =
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
            Self { resolver }
        }
    }

    impl Default for ResolverDns {
        fn default() -> Self {
            Self::new()
        }
    }

    fn map_err(err: ResolveError) -> DnsError {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => DnsError::NoRecords,
            ResolveErrorKind::Timeout => DnsError::Timeout,
            _ => DnsError::Resolution(err.to_string()),
        }
    }

    #[async_trait]
    impl DnsLookup for ResolverDns {
        async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError> {
            let lookup = self.resolver.txt_lookup(name).await.map_err(map_err)?;
            Ok(lookup
                .iter()
                .map(|txt| {
                    txt.txt_data()
                        .iter()
                        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                        .collect::<String>()
                })
                .collect())
        }

        async fn cname_target(&self, name: &str) -> Result<Option<String>, DnsError> {
            let lookup = self
                .resolver
                .lookup(name, RecordType::CNAME)
                .await
                .map_err(map_err)?;
            Ok(lookup.iter().find_map(|rdata| match rdata {
                RData::CNAME(target) => Some(target.0.to_utf8()),
                _ => None,
            }))
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::{DnsError, DnsLookup};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Static zone file for tests. Records are added after issuing a
    /// challenge to simulate the owner publishing them.
    #[derive(Default)]
    pub struct StaticDns {
        txt: Mutex<HashMap<String, Vec<String>>>,
        cname: Mutex<HashMap<String, String>>,
        pub fail_with_timeout: bool,
    }

    impl StaticDns {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn publish_txt(&self, name: &str, value: &str) {
            self.txt
                .lock()
                .unwrap()
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }

        pub fn publish_cname(&self, name: &str, target: &str) {
            self.cname
                .lock()
                .unwrap()
                .insert(name.to_string(), target.to_string());
        }
    }

    #[async_trait]
    impl DnsLookup for StaticDns {
        async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError> {
            if self.fail_with_timeout {
                return Err(DnsError::Timeout);
            }
            self.txt
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or(DnsError::NoRecords)
        }

        async fn cname_target(&self, name: &str) -> Result<Option<String>, DnsError> {
            if self.fail_with_timeout {
                return Err(DnsError::Timeout);
            }
            Ok(self.cname.lock().unwrap().get(name).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticDns;
    use super::*;

    fn platform() -> PlatformConfig {
        PlatformConfig {
            root_domain: "storehub.test".to_string(),
            verify_record_prefix: "_storehub-verify".to_string(),
            verify_cname_target: "verify.storehub.test".to_string(),
            challenge_ttl_hours: 24,
        }
    }

    #[test]
    fn test_record_name_shape() {
        let verifier = DomainVerifier::new(Box::new(StaticDns::new()), platform());
        assert_eq!(
            verifier.record_name("shop.example.com"),
            "_storehub-verify.shop.example.com"
        );
    }

    #[tokio::test]
    async fn test_txt_round_trip() {
        let dns = StaticDns::new();
        let verifier = DomainVerifier::new(Box::new(StaticDns::new()), platform());
        let challenge = verifier.issue("shop.example.com", ChallengeMethod::Txt);

        // Checking before the record is published yields Pending
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Pending);

        // Publishing the exact token yields Verified
        dns.publish_txt(
            "_storehub-verify.shop.example.com",
            &challenge.expected_token,
        );
        let verifier = DomainVerifier::new(Box::new(dns), platform());
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Verified);
    }

    #[tokio::test]
    async fn test_txt_match_is_case_sensitive() {
        let dns = StaticDns::new();
        let platform_config = platform();
        let issuing = DomainVerifier::new(Box::new(StaticDns::new()), platform_config.clone());
        let challenge = issuing.issue("shop.example.com", ChallengeMethod::Txt);

        dns.publish_txt(
            "_storehub-verify.shop.example.com",
            &challenge.expected_token.to_uppercase(),
        );
        let verifier = DomainVerifier::new(Box::new(dns), platform_config);
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Pending);
    }

    #[tokio::test]
    async fn test_cname_challenge() {
        let dns = StaticDns::new();
        dns.publish_cname(
            "_storehub-verify.shop.example.com",
            // Trailing dot as returned by a real resolver
            "verify.storehub.test.",
        );
        let verifier = DomainVerifier::new(Box::new(dns), platform());
        let challenge = verifier.issue("shop.example.com", ChallengeMethod::Cname);
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Verified);
    }

    #[tokio::test]
    async fn test_dns_failures_downgrade_to_pending() {
        let mut dns = StaticDns::new();
        dns.fail_with_timeout = true;
        let verifier = DomainVerifier::new(Box::new(dns), platform());
        let challenge = verifier.issue("shop.example.com", ChallengeMethod::Txt);
        // Propagation lag is not a hard error
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Pending);
    }

    #[tokio::test]
    async fn test_expired_challenge() {
        let verifier = DomainVerifier::new(Box::new(StaticDns::new()), platform());
        let mut challenge = verifier.issue("shop.example.com", ChallengeMethod::Txt);
        challenge.expires_at = Utc::now() - Duration::minutes(1);
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Expired);
    }

    #[tokio::test]
    async fn test_wrong_token_stays_pending() {
        let dns = StaticDns::new();
        dns.publish_txt("_storehub-verify.shop.example.com", "stale-token");
        let verifier = DomainVerifier::new(Box::new(dns), platform());
        let challenge = verifier.issue("shop.example.com", ChallengeMethod::Txt);
        assert_eq!(verifier.check(&challenge).await, ChallengeState::Pending);
    }
}
