//! Per-store credential store for the CLI client.
//!
//! A user may hold live sessions for several stores at once, each
//! addressed by a different subdomain or path. Tokens are therefore keyed
//! by store slug and the active token is always re-derived from the slug
//! in use; there is no ambient "current token" slot to cross-contaminate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    entries: HashMap<String, CredentialEntry>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Load from the default config dir, creating an empty store if the
    /// file does not exist yet.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir()?.join("credentials.json");
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> anyhow::Result<Self> {
        let mut store = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<CredentialStore>(&content)?
        } else {
            CredentialStore::default()
        };
        store.path = Some(path);
        Ok(store)
    }

    pub fn get(&self, slug: &str) -> Option<&CredentialEntry> {
        self.entries.get(&slug.to_lowercase())
    }

    pub fn set(&mut self, slug: &str, token: String) {
        self.entries.insert(
            slug.to_lowercase(),
            CredentialEntry {
                token,
                issued_at: Utc::now(),
            },
        );
    }

    pub fn clear(&mut self, slug: &str) -> bool {
        self.entries.remove(&slug.to_lowercase()).is_some()
    }

    /// Slugs with a stored token, for `auth status`.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("credential store has no backing path"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("STOREHUB_CLI_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
    Ok(PathBuf::from(home).join(".config").join("storehub").join("cli"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("storehub-cli-test-{}", Uuid::new_v4()))
            .join("credentials.json")
    }

    #[test]
    fn test_tokens_are_isolated_per_slug() {
        let mut store = CredentialStore::load_from(scratch_path()).unwrap();
        store.set("acme", "token-a".into());
        store.set("beta", "token-b".into());

        // Logging into beta must not disturb acme's session
        assert_eq!(store.get("acme").unwrap().token, "token-a");
        assert_eq!(store.get("beta").unwrap().token, "token-b");
        assert_eq!(store.get("ACME").unwrap().token, "token-a");

        assert!(store.clear("acme"));
        assert!(store.get("acme").is_none());
        assert_eq!(store.get("beta").unwrap().token, "token-b");
    }

    #[test]
    fn test_round_trip_through_disk() {
        let path = scratch_path();
        let mut store = CredentialStore::load_from(path.clone()).unwrap();
        store.set("acme", "persisted-token".into());
        store.save().unwrap();

        let reloaded = CredentialStore::load_from(path.clone()).unwrap();
        assert_eq!(reloaded.get("acme").unwrap().token, "persisted-token");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_slug_yields_none() {
        let store = CredentialStore::load_from(scratch_path()).unwrap();
        assert!(store.get("nope").is_none());
        assert!(store.slugs().is_empty());
    }
}
