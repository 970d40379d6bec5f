use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Outcome taxonomy for remote API calls.
///
/// Every [`PlaylistApi`](crate::playlist::PlaylistApi) method resolves to one
/// of these. The quota substrate retries `Transient`/`Network`, rotates keys
/// on `KeyQuotaExhausted`, and treats the quota and auth variants as terminal
/// signals that must unwind to the executor's top level.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Retryable remote failure (429 or 5xx).
    #[error("transient remote error (HTTP {status}): {message}")]
    Transient { status: u16, message: String },

    /// Connection-level failure (refused, reset, timed out). Retryable.
    #[error("network error: {0}")]
    Network(String),

    /// The active key — or the whole pool, once rotation runs dry — is out
    /// of quota. Terminal when it escapes the provider connector.
    #[error("API key quota exhausted")]
    KeyQuotaExhausted,

    /// The authenticated session is out of quota. Terminal and sticky.
    #[error("session quota exhausted")]
    SessionQuotaExhausted,

    /// Credentials rejected. Never retried; requires external re-auth.
    #[error("authentication invalid: {0}")]
    AuthInvalid(String),

    /// Non-retryable remote rejection (4xx other than quota/auth).
    #[error("remote API rejected the call (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse remote response: {0}")]
    Parse(String),
}

impl ApiError {
    /// True for the two quota variants.
    pub fn is_quota(&self) -> bool {
        matches!(
            self,
            ApiError::KeyQuotaExhausted | ApiError::SessionQuotaExhausted
        )
    }

    /// True if the retry loop may re-issue the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transient { .. } | ApiError::Network(_))
    }

    /// True for signals that stop the run: quota exhaustion and invalid auth.
    pub fn is_terminal(&self) -> bool {
        self.is_quota() || matches!(self, ApiError::AuthInvalid(_))
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        ApiError::Network(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_variants_are_terminal() {
        assert!(ApiError::KeyQuotaExhausted.is_quota());
        assert!(ApiError::KeyQuotaExhausted.is_terminal());
        assert!(ApiError::SessionQuotaExhausted.is_terminal());
        assert!(ApiError::AuthInvalid("expired".into()).is_terminal());
        assert!(!ApiError::AuthInvalid("expired".into()).is_quota());
    }

    #[test]
    fn test_retryable_variants() {
        assert!(ApiError::Transient {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(ApiError::Network("connection reset".into()).is_retryable());
        assert!(!ApiError::KeyQuotaExhausted.is_retryable());
        assert!(!ApiError::AuthInvalid("nope".into()).is_retryable());
        assert!(!ApiError::Api {
            status: 404,
            message: "not found".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_bridge_error_converts_to_network() {
        let err: ApiError = BridgeError::OperationFailed("timed out".into()).into();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(err.is_retryable());
    }
}
