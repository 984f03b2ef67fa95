//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `UBIREGI_*` environment variables or a config file;
//! anything unset falls back to the defaults below.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::PageBudget;
use serde::Deserialize;
use url::Url;

use crate::domain::CheckoutManagerConfig;
use crate::outbound::{DEFAULT_BASE_URL, UbiAgentConfig};

const DEFAULT_MAX_PAGES: u32 = 1_000;
const DEFAULT_MAX_ELAPSED_SECS: u64 = 300;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Settings that cannot be turned into a working client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No auth token was configured.
    #[error("UBIREGI_AUTH_TOKEN is not set")]
    MissingAuthToken,
    /// The base URL does not parse.
    #[error("invalid base url `{url}`: {message}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Parser message.
        message: String,
    },
}

/// Connection and pagination settings for the Ubiregi client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "UBIREGI")]
pub struct ClientSettings {
    /// Account auth token sent as `X-Ubiregi-Auth-Token`.
    pub auth_token: Option<String>,
    /// API base override.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Page ceiling for one search.
    pub max_pages: Option<u32>,
    /// Wall-clock ceiling for one search in seconds; `0` disables it.
    pub max_elapsed_secs: Option<u64>,
    /// Attempts per idempotent call, including the first.
    pub max_attempts: Option<u32>,
}

impl ClientSettings {
    /// Configured API base, falling back to the production endpoint.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection settings for the HTTP agent.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the token is missing or blank, or the
    /// base URL does not parse.
    pub fn agent_config(&self) -> Result<UbiAgentConfig, SettingsError> {
        let token = self
            .auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(SettingsError::MissingAuthToken)?;
        let base_url =
            Url::parse(self.base_url()).map_err(|error| SettingsError::InvalidBaseUrl {
                url: self.base_url().to_owned(),
                message: error.to_string(),
            })?;
        Ok(UbiAgentConfig::new(base_url, token).with_timeout(self.request_timeout()))
    }

    /// Pagination budget and retry policy for the checkout manager.
    pub fn manager_config(&self) -> CheckoutManagerConfig {
        let max_elapsed = match self.max_elapsed_secs.unwrap_or(DEFAULT_MAX_ELAPSED_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        CheckoutManagerConfig {
            page_budget: PageBudget::new(self.max_pages.unwrap_or(DEFAULT_MAX_PAGES), max_elapsed),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            ..CheckoutManagerConfig::default()
        }
    }
}
