//! Reqwest-backed Ubiregi agent.
//!
//! This adapter owns transport details only: URL resolution against the API
//! base, authentication and JSON headers, request serialisation, timeout and
//! HTTP error mapping, and JSON decoding into domain envelopes. Requests never
//! leave the base URL's origin, so the auth token stays with the API host.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::{Action, Attempt, Policy};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::dto::{CheckoutBodyDto, ErrorBodyDto};
use crate::domain::ports::{SearchTarget, UbiAgent, UbiAgentError};
use crate::domain::{CheckoutDetails, CheckoutPatch, CollectionEnvelope, ResourceEnvelope};

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://ubiregi.com/api/3/";

/// Header carrying the account auth token.
pub const AUTH_TOKEN_HEADER: &str = "X-Ubiregi-Auth-Token";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;
const DEFAULT_USER_AGENT: &str = concat!("ubiclient/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`UbiHttpAgent`].
#[derive(Clone)]
pub struct UbiAgentConfig {
    /// API base; relative resource paths resolve against it.
    pub base_url: Url,
    /// Account auth token.
    pub auth_token: Zeroizing<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// HTTP user-agent.
    pub user_agent: String,
}

impl UbiAgentConfig {
    /// Settings with the default timeout and user-agent.
    pub fn new(base_url: Url, auth_token: impl Into<String>) -> Self {
        Self {
            base_url,
            auth_token: Zeroizing::new(auth_token.into()),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for UbiAgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UbiAgentConfig")
            .field("base_url", &self.base_url.as_str())
            .field("auth_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Failure to construct a [`UbiHttpAgent`].
#[derive(Debug, thiserror::Error)]
pub enum UbiHttpAgentBuildError {
    /// The auth token is blank or not a valid header value.
    #[error("auth token must be a non-blank visible ASCII string")]
    InvalidAuthToken,
    /// The base URL cannot carry relative paths.
    #[error("base url `{0}` cannot be a base for resource paths")]
    InvalidBaseUrl(String),
    /// Reqwest rejected the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Agent performing authenticated JSON requests against one API base.
pub struct UbiHttpAgent {
    client: Client,
    base_url: Url,
}

impl UbiHttpAgent {
    /// Build an agent from connection settings.
    /// ```rust,ignore
    /// let agent = UbiHttpAgent::new(UbiAgentConfig::new(base_url, token))?;
    /// ```
    /// # Errors
    ///
    /// Returns [`UbiHttpAgentBuildError`] when the token or base URL is
    /// unusable or the reqwest client cannot be constructed.
    pub fn new(config: UbiAgentConfig) -> Result<Self, UbiHttpAgentBuildError> {
        let base_url = with_trailing_slash(config.base_url)?;
        let headers = default_headers(config.auth_token.as_str())?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .default_headers(headers)
            .redirect(Policy::custom(same_origin_redirects))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn resolve(&self, path: &str) -> Result<Url, UbiAgentError> {
        self.base_url.join(path).map_err(|error| {
            UbiAgentError::invalid_request(format!(
                "cannot resolve `{path}` against {}: {error}",
                self.base_url
            ))
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending ubiregi request");
        self.client.request(method, url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, UbiAgentError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), bytes = body.len(), "ubiregi response received");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl UbiAgent for UbiHttpAgent {
    async fn add(
        &self,
        path: &str,
        checkout: &CheckoutDetails,
    ) -> Result<ResourceEnvelope, UbiAgentError> {
        let url = self.resolve(path)?;
        let request = self
            .request(Method::POST, url)
            .json(&CheckoutBodyDto { checkout });
        let body = self.execute(request).await?;
        decode(&body, "checkout")
    }

    async fn search(&self, target: &SearchTarget) -> Result<CollectionEnvelope, UbiAgentError> {
        let request = match target {
            SearchTarget::Collection { path, criteria } => {
                let url = self.resolve(path)?;
                self.request(Method::GET, url)
                    .query(&criteria.to_query_string())
            }
            SearchTarget::Continuation(next) => {
                let url = next.resolve(&self.base_url).map_err(|error| {
                    UbiAgentError::invalid_request(format!("refusing continuation url: {error}"))
                })?;
                self.request(Method::GET, url)
            }
        };
        let body = self.execute(request).await?;
        decode(&body, "checkout collection")
    }

    async fn get(&self, path: &str) -> Result<ResourceEnvelope, UbiAgentError> {
        let url = self.resolve(path)?;
        let body = self.execute(self.request(Method::GET, url)).await?;
        decode(&body, "resource")
    }

    async fn update(
        &self,
        path: &str,
        patch: &CheckoutPatch,
    ) -> Result<ResourceEnvelope, UbiAgentError> {
        let url = self.resolve(path)?;
        let request = self
            .request(Method::PATCH, url)
            .json(&CheckoutBodyDto { checkout: patch });
        let body = self.execute(request).await?;
        decode(&body, "checkout")
    }

    async fn delete(&self, path: &str) -> Result<(), UbiAgentError> {
        let url = self.resolve(path)?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

fn default_headers(auth_token: &str) -> Result<HeaderMap, UbiHttpAgentBuildError> {
    if auth_token.trim().is_empty() {
        return Err(UbiHttpAgentBuildError::InvalidAuthToken);
    }
    let mut token = HeaderValue::from_str(auth_token)
        .map_err(|_| UbiHttpAgentBuildError::InvalidAuthToken)?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(AUTH_TOKEN_HEADER, token);
    Ok(headers)
}

fn same_origin_redirects(attempt: Attempt<'_>) -> Action {
    let origin = attempt.previous().first().map(Url::origin);
    if attempt.previous().len() > MAX_REDIRECTS {
        attempt.error("too many redirects")
    } else if origin.as_ref() == Some(&attempt.url().origin()) {
        attempt.follow()
    } else {
        attempt.stop()
    }
}

fn with_trailing_slash(mut base_url: Url) -> Result<Url, UbiHttpAgentBuildError> {
    if base_url.cannot_be_a_base() {
        return Err(UbiHttpAgentBuildError::InvalidBaseUrl(base_url.to_string()));
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url)
}

fn decode<T: DeserializeOwned>(body: &[u8], document: &str) -> Result<T, UbiAgentError> {
    serde_json::from_slice(body).map_err(|error| {
        UbiAgentError::decode(format!("invalid ubiregi {document} payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> UbiAgentError {
    if error.is_timeout() {
        UbiAgentError::timeout(error.to_string())
    } else {
        UbiAgentError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UbiAgentError {
    let detail = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::detail)
        .unwrap_or_else(|| body_preview(body));
    let raw = String::from_utf8_lossy(body).into_owned();
    let code = status.as_u16();

    match status {
        StatusCode::NOT_FOUND => UbiAgentError::not_found(code, detail, raw),
        StatusCode::TOO_MANY_REQUESTS => UbiAgentError::rate_limited(code, detail, raw),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => UbiAgentError::unavailable(code, detail, raw),
        _ => UbiAgentError::status(code, detail, raw),
    }
}

/// Short single-line rendering of a body for error display.
fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
