//! Transport DTOs for Ubiregi request bodies and error payloads.
//!
//! Response documents decode straight into domain types; only the write
//! wrappers and error bodies need a separate shape.

use serde::{Deserialize, Serialize};

/// `{"checkout": ...}` wrapper used by create and update requests.
#[derive(Debug, Serialize)]
pub(super) struct CheckoutBodyDto<'a, T: Serialize> {
    pub(super) checkout: &'a T,
}

/// Error payload some Ubiregi endpoints attach to non-success responses.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) errors: Vec<String>,
}

impl ErrorBodyDto {
    /// Human-readable detail, when the payload carried any.
    pub(super) fn detail(self) -> Option<String> {
        let mut parts: Vec<String> = self
            .message
            .into_iter()
            .chain(self.error)
            .chain(self.errors)
            .map(|part| part.trim().to_owned())
            .filter(|part| !part.is_empty())
            .collect();
        parts.dedup();
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::message(r#"{"message":"invalid auth token"}"#, Some("invalid auth token"))]
    #[case::error(r#"{"error":"not permitted"}"#, Some("not permitted"))]
    #[case::list(r#"{"errors":["guid is taken","price is blank"]}"#, Some("guid is taken; price is blank"))]
    #[case::duplicate(r#"{"error":"gone","message":"gone"}"#, Some("gone"))]
    #[case::blank(r#"{"error":"  "}"#, None)]
    #[case::unrelated(r#"{"status":"failed"}"#, None)]
    fn extracts_error_detail(#[case] body: &str, #[case] expected: Option<&str>) {
        let dto: ErrorBodyDto = serde_json::from_str(body).expect("error body decodes");
        assert_eq!(dto.detail().as_deref(), expected);
    }

    #[test]
    fn wraps_checkout_bodies() {
        let body = CheckoutBodyDto {
            checkout: &serde_json::json!({ "status": "cancel" }),
        };
        let value = serde_json::to_value(&body).expect("body serialises");
        assert_eq!(value, serde_json::json!({ "checkout": { "status": "cancel" } }));
    }
}
