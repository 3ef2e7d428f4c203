use std::env;

use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult};

pub const STORE_URL_VAR: &str = "GROCERY_STORE_URL";
pub const STORE_KEY_VAR: &str = "GROCERY_STORE_KEY";

/// Location and public API key of the hosted store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Project base url, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous key sent as `apikey` on every request
    pub api_key: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> DomainResult<Self> {
        let url = require(STORE_URL_VAR)?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(DomainError::Validation(format!(
                "{STORE_URL_VAR} must be an http(s) url, got {url}"
            )));
        }
        let api_key = require(STORE_KEY_VAR)?;
        info!("Using store at {url}");
        Ok(Self::new(url, api_key))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }
}

fn require(key: &str) -> DomainResult<String> {
    env::var(key)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            warn!("Environment variable {key} not found");
            DomainError::Validation(format!("{key} is not set"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = StoreConfig::new("https://demo.example.co/", "anon");
        assert_eq!(config.rest_url("items"), "https://demo.example.co/rest/v1/items");
        assert_eq!(
            config.auth_url("/token?grant_type=password"),
            "https://demo.example.co/auth/v1/token?grant_type=password"
        );
    }
}
