//! Server-supplied continuation URLs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors raised when a continuation URL cannot be accepted or followed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContinuationUrlError {
    /// The server supplied an empty or whitespace-only value.
    #[error("continuation url must not be blank")]
    Blank,
    /// The value could not be resolved against the client base URL.
    #[error("continuation url `{raw}` cannot be resolved: {message}")]
    Unresolvable {
        /// Raw continuation value as received.
        raw: String,
        /// Parser failure description.
        message: String,
    },
    /// The value points at a different scheme, host or port than the base.
    #[error("continuation url `{raw}` leaves origin {origin}")]
    ForeignOrigin {
        /// Raw continuation value as received.
        raw: String,
        /// ASCII serialisation of the base origin.
        origin: String,
    },
}

/// Opaque pointer to the next page of a collection.
///
/// The value is kept exactly as the server sent it. Callers must follow it
/// verbatim: the server already encoded the remaining filter state, so query
/// parameters are never re-applied on top of it.
///
/// ## Invariants
/// - The raw value is non-blank.
/// - A resolved continuation shares the base URL's origin.
///
/// # Examples
/// ```
/// use pagination::ContinuationUrl;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let next = ContinuationUrl::new("accounts/current/checkouts?glb=10")?;
/// let base = url::Url::parse("https://ubiregi.com/api/3/")?;
/// let resolved = next.resolve(&base)?;
/// assert_eq!(
///     resolved.as_str(),
///     "https://ubiregi.com/api/3/accounts/current/checkouts?glb=10"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContinuationUrl(String);

impl ContinuationUrl {
    /// Validate and wrap a raw continuation value.
    ///
    /// # Errors
    ///
    /// Returns [`ContinuationUrlError::Blank`] when the value is empty once
    /// trimmed.
    pub fn new(raw: impl Into<String>) -> Result<Self, ContinuationUrlError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ContinuationUrlError::Blank);
        }
        Ok(Self(raw))
    }

    /// Raw continuation value as received from the server.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Resolve the continuation against a base URL.
    ///
    /// Absolute values replace the base entirely; relative values are joined
    /// onto it, following RFC 3986 reference resolution. Either way the result
    /// must stay on the base URL's origin.
    ///
    /// # Errors
    ///
    /// Returns [`ContinuationUrlError::Unresolvable`] when the value is not a
    /// valid URL reference, and [`ContinuationUrlError::ForeignOrigin`] when
    /// it resolves to another scheme, host or port.
    pub fn resolve(&self, base: &Url) -> Result<Url, ContinuationUrlError> {
        let resolved =
            base.join(self.0.as_str())
                .map_err(|error| ContinuationUrlError::Unresolvable {
                    raw: self.0.clone(),
                    message: error.to_string(),
                })?;
        if resolved.origin() != base.origin() {
            return Err(ContinuationUrlError::ForeignOrigin {
                raw: self.0.clone(),
                origin: base.origin().ascii_serialization(),
            });
        }
        Ok(resolved)
    }
}

impl TryFrom<String> for ContinuationUrl {
    type Error = ContinuationUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContinuationUrl> for String {
    fn from(value: ContinuationUrl) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContinuationUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}
