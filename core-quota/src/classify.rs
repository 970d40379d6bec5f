//! # Response Classification
//!
//! Maps a remote status code + body onto the retry/rotate/stop decision.
//!
//! The platform signals quota exhaustion as HTTP 403 with a structured error
//! envelope (`error.errors[].reason` of `quotaExceeded` or
//! `dailyLimitExceeded`); an ordinary 403 is a hard rejection, not a quota
//! event, so the body must be inspected before deciding.

use serde::Deserialize;

/// What a remote response means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx — use the response.
    Success,
    /// 429 or 5xx — safe to retry with backoff.
    Transient,
    /// Quota exhausted on the credential that made the call.
    QuotaExhausted,
    /// Credentials rejected — propagate immediately, never retry.
    AuthInvalid,
    /// Any other rejection — not retryable, not terminal for the run.
    Failed,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];
const AUTH_REASONS: &[&str] = &["authError", "unauthorized"];

fn envelope_reasons(body: &[u8]) -> Vec<String> {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| e.errors.into_iter().filter_map(|d| d.reason).collect())
        .unwrap_or_default()
}

/// Classify a remote response.
pub fn classify_response(status: u16, body: &[u8]) -> Disposition {
    if (200..300).contains(&status) {
        return Disposition::Success;
    }

    if status == 429 || (500..600).contains(&status) {
        return Disposition::Transient;
    }

    if status == 401 {
        return Disposition::AuthInvalid;
    }

    if status == 403 {
        let reasons = envelope_reasons(body);
        if reasons.iter().any(|r| QUOTA_REASONS.contains(&r.as_str())) {
            return Disposition::QuotaExhausted;
        }
        if reasons.iter().any(|r| AUTH_REASONS.contains(&r.as_str())) {
            return Disposition::AuthInvalid;
        }

        // Some error paths drop the structured envelope; fall back to the
        // raw body the way the quota window actually announces itself.
        let raw = String::from_utf8_lossy(body).to_lowercase();
        if raw.contains("quota") || raw.contains("dailylimit") {
            return Disposition::QuotaExhausted;
        }
    }

    Disposition::Failed
}

/// Best-effort human-readable message from an error body, for diagnostics.
pub fn error_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if let Some(error) = envelope.error {
            if let Some(message) = error.message {
                return message;
            }
            if let Some(detail) = error.errors.into_iter().find_map(|d| d.message) {
                return detail;
            }
        }
    }

    let raw = String::from_utf8_lossy(body);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "(empty response body)".to_string()
    } else {
        trimmed.chars().take(300).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTA_BODY: &str = r#"{
        "error": {
            "code": 403,
            "message": "The request cannot be completed because you have exceeded your quota.",
            "errors": [{"reason": "quotaExceeded", "message": "exceeded"}]
        }
    }"#;

    #[test]
    fn test_success_statuses() {
        assert_eq!(classify_response(200, b"{}"), Disposition::Success);
        assert_eq!(classify_response(204, b""), Disposition::Success);
    }

    #[test]
    fn test_transient_statuses() {
        assert_eq!(classify_response(429, b""), Disposition::Transient);
        assert_eq!(classify_response(500, b""), Disposition::Transient);
        assert_eq!(classify_response(503, b""), Disposition::Transient);
    }

    #[test]
    fn test_quota_envelope() {
        assert_eq!(
            classify_response(403, QUOTA_BODY.as_bytes()),
            Disposition::QuotaExhausted
        );
    }

    #[test]
    fn test_daily_limit_reason() {
        let body = r#"{"error":{"errors":[{"reason":"dailyLimitExceeded"}]}}"#;
        assert_eq!(
            classify_response(403, body.as_bytes()),
            Disposition::QuotaExhausted
        );
    }

    #[test]
    fn test_quota_fallback_on_unstructured_body() {
        assert_eq!(
            classify_response(403, b"daily quota exceeded for this project"),
            Disposition::QuotaExhausted
        );
    }

    #[test]
    fn test_plain_403_is_not_quota() {
        let body = r#"{"error":{"errors":[{"reason":"forbidden"}],"message":"Access forbidden"}}"#;
        assert_eq!(classify_response(403, body.as_bytes()), Disposition::Failed);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(classify_response(401, b""), Disposition::AuthInvalid);
        let body = r#"{"error":{"errors":[{"reason":"authError"}]}}"#;
        assert_eq!(
            classify_response(403, body.as_bytes()),
            Disposition::AuthInvalid
        );
    }

    #[test]
    fn test_other_client_errors_fail() {
        assert_eq!(classify_response(404, b"not found"), Disposition::Failed);
        assert_eq!(classify_response(409, b"conflict"), Disposition::Failed);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(QUOTA_BODY.as_bytes()),
            "The request cannot be completed because you have exceeded your quota."
        );
        assert_eq!(error_message(b"plain text failure"), "plain text failure");
        assert_eq!(error_message(b""), "(empty response body)");
    }
}
