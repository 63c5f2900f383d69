//! Runtime configuration, read from the environment.

use std::time::Duration;

use anyhow::ensure;

pub const SUBMIT_TIMEOUT_ENV: &str = "FORGEPOS_TRANSFER_SUBMIT_TIMEOUT_SECS";
pub const API_URL_ENV: &str = "FORGEPOS_API_URL";
pub const API_TOKEN_ENV: &str = "FORGEPOS_API_TOKEN";

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Settings for one transfer workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upper bound on a single `create` call. Elapsing counts as a failed submission.
    pub submit_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let submit_timeout = match lookup(SUBMIT_TIMEOUT_ENV) {
            None => DEFAULT_SUBMIT_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "{SUBMIT_TIMEOUT_ENV} is not a positive number of seconds; using default"
                    );
                    DEFAULT_SUBMIT_TIMEOUT
                }
            },
        };

        Self { submit_timeout }
    }
}

/// Where the inventory service lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl HttpClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup(API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("{API_URL_ENV} not set; using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        ensure!(
            api_url.starts_with("http://") || api_url.starts_with("https://"),
            "{API_URL_ENV} must be an http(s) URL, got '{api_url}'"
        );

        let token = lookup(API_TOKEN_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self { api_url, token })
    }
}
