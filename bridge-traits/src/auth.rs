//! Auth Collaborator Seam
//!
//! Credential acquisition and refresh live outside this workspace. The
//! orchestrator reaches them through this trait: the engine only ever
//! receives a ready-to-use [`PlaylistApi`] client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::playlist::PlaylistApi;

/// Coarse health of the auth collaborator, as reported by a cheap
/// authenticated probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthHealth {
    /// Credentials valid, calls succeed.
    Ok,
    /// Credentials valid but the probe hit quota exhaustion — syncing now
    /// would burn retries for nothing; wait for the quota window.
    OkQuotaExhausted,
    /// Credentials rejected; user action required.
    AuthInvalid,
    /// The probe itself failed (network, unexpected response).
    Failed,
}

impl AuthHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthHealth::Ok => "ok",
            AuthHealth::OkQuotaExhausted => "ok_quota_exhausted",
            AuthHealth::AuthInvalid => "auth_invalid",
            AuthHealth::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AuthHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External credential manager.
#[async_trait]
pub trait AuthBroker: Send + Sync {
    /// Build an authenticated playlist client, refreshing credentials if the
    /// broker knows how.
    ///
    /// # Errors
    ///
    /// [`ApiError::AuthInvalid`](crate::error::ApiError::AuthInvalid) on
    /// unrecoverable credential failure.
    async fn authenticated_client(&self) -> ApiResult<Arc<dyn PlaylistApi>>;

    /// Cheap authenticated probe.
    async fn health_check(&self) -> AuthHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_display() {
        assert_eq!(AuthHealth::Ok.to_string(), "ok");
        assert_eq!(
            AuthHealth::OkQuotaExhausted.to_string(),
            "ok_quota_exhausted"
        );
        assert_eq!(AuthHealth::AuthInvalid.to_string(), "auth_invalid");
        assert_eq!(AuthHealth::Failed.to_string(), "failed");
    }
}
