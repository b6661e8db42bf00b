//! Connection configuration.
//!
//! Loaded from `TABULA_*` environment variables or a JSON file. Values missing
//! from a file fall back to the environment when credentials are resolved.

use crate::error::{TabulaError, TabulaResult};
use crate::transport::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const ENV_ACCOUNT: &str = "TABULA_STORAGE_ACCOUNT";
pub const ENV_ACCESS_KEY: &str = "TABULA_STORAGE_ACCESS_KEY";
pub const ENV_ENDPOINT: &str = "TABULA_ENDPOINT";
pub const ENV_MAX_RETRIES: &str = "TABULA_MAX_RETRIES";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulaConfig {
    pub storage_account: Option<String>,
    pub storage_access_key: Option<String>,
    /// Overrides the account's default table endpoint.
    pub endpoint: Option<String>,
    pub retry: RetryPolicy,
}

/// Account name and key, both present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account: String,
    pub access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl TabulaConfig {
    pub fn new(account: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            storage_account: Some(account.into()),
            storage_access_key: Some(access_key.into()),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read every setting from the environment.
    pub fn from_env() -> TabulaResult<Self> {
        let mut config = Self {
            storage_account: env_value(ENV_ACCOUNT),
            storage_access_key: env_value(ENV_ACCESS_KEY),
            endpoint: env_value(ENV_ENDPOINT),
            retry: RetryPolicy::default(),
        };
        if let Some(raw) = env_value(ENV_MAX_RETRIES) {
            config.retry.max_retries = raw.parse().map_err(|_| {
                TabulaError::Config(format!("{ENV_MAX_RETRIES} must be an integer, got '{raw}'"))
            })?;
        }
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> TabulaResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| TabulaError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> TabulaResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    /// Credentials from this config, each falling back to its environment
    /// variable.
    pub fn resolve_credentials(&self) -> TabulaResult<Credentials> {
        let account = self
            .storage_account
            .clone()
            .or_else(|| env_value(ENV_ACCOUNT))
            .ok_or_else(|| TabulaError::Config(format!("storage account not set ({ENV_ACCOUNT})")))?;
        let access_key = self
            .storage_access_key
            .clone()
            .or_else(|| env_value(ENV_ACCESS_KEY))
            .ok_or_else(|| {
                TabulaError::Config(format!("storage access key not set ({ENV_ACCESS_KEY})"))
            })?;
        Ok(Credentials {
            account,
            access_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("tabula.json");

        let config = TabulaConfig::new("acct", "secret")
            .with_endpoint("http://127.0.0.1:10002")
            .with_retry(RetryPolicy::default().with_max_retries(5));
        config.save_to_file(&path).unwrap();

        let loaded = TabulaConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.retry.interval, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tabula.json");
        fs::write(&path, r#"{"storage_account": "acct"}"#).unwrap();

        let loaded = TabulaConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.storage_account.as_deref(), Some("acct"));
        assert!(loaded.storage_access_key.is_none());
        assert_eq!(loaded.retry, RetryPolicy::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tabula.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TabulaConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, TabulaError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = TabulaConfig::load_from_file(temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TabulaError::Io { .. }));
    }

    #[test]
    fn test_explicit_credentials_win() {
        let creds = TabulaConfig::new("acct", "secret")
            .resolve_credentials()
            .unwrap();
        assert_eq!(creds.account, "acct");
        assert_eq!(creds.access_key, "secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
