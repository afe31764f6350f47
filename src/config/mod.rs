use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub platform: PlatformConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Root domain the platform is served from; `<slug>.<root>` addresses a tenant.
    pub root_domain: String,
    /// Label prefix for the DNS challenge record, e.g. `_storehub-verify`.
    pub verify_record_prefix: String,
    /// CNAME target tenants may point their challenge record at.
    pub verify_cname_target: String,
    /// Lifetime of an issued domain verification challenge, in hours.
    pub challenge_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Honor the X-Original-Host override header. Only enable when the app
    /// sits behind an internal proxy that strips the header at the edge.
    pub trust_proxy_header: bool,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Platform overrides
        if let Ok(v) = env::var("PLATFORM_ROOT_DOMAIN") {
            self.platform.root_domain = v.trim().trim_end_matches('.').to_lowercase();
        }
        if let Ok(v) = env::var("PLATFORM_VERIFY_CNAME_TARGET") {
            self.platform.verify_cname_target = v.trim().to_lowercase();
        }
        if let Ok(v) = env::var("PLATFORM_CHALLENGE_TTL_HOURS") {
            self.platform.challenge_ttl_hours = v.parse().unwrap_or(self.platform.challenge_ttl_hours);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_TRUST_PROXY_HEADER") {
            self.security.trust_proxy_header = v.parse().unwrap_or(self.security.trust_proxy_header);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            platform: PlatformConfig {
                root_domain: "storehub.test".to_string(),
                verify_record_prefix: "_storehub-verify".to_string(),
                verify_cname_target: "verify.storehub.test".to_string(),
                challenge_ttl_hours: 24,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-do-not-deploy".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                trust_proxy_header: true,
                bcrypt_cost: 4, // fast hashes for local iteration
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            platform: PlatformConfig {
                root_domain: "staging.storehub.io".to_string(),
                verify_record_prefix: "_storehub-verify".to_string(),
                verify_cname_target: "verify.staging.storehub.io".to_string(),
                challenge_ttl_hours: 24,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 24,
                trust_proxy_header: false,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            platform: PlatformConfig {
                root_domain: "storehub.io".to_string(),
                verify_record_prefix: "_storehub-verify".to_string(),
                verify_cname_target: "verify.storehub.io".to_string(),
                challenge_ttl_hours: 24,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 4,
                trust_proxy_header: false,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.platform.root_domain, "storehub.test");
        assert!(config.security.trust_proxy_header);
        assert_eq!(config.platform.challenge_ttl_hours, 24);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.security.trust_proxy_header);
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }
}
