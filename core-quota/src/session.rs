//! # Quota Session
//!
//! The injected context object every call site consults. Earlier designs
//! kept these flags as module-level globals, which made the engine
//! untestable and limited a process to one session; here they are plain
//! fields, so independent sessions coexist and tests build fresh ones.

use crate::pool::ApiKeyPool;
use bridge_traits::error::{ApiError, ApiResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Sticky quota state for one credential set.
///
/// Two independent tripwires:
/// - `keys_tripped`: the rotating API key pool ran dry
/// - `session_tripped`: the authenticated session hit its quota
///
/// Once tripped, the matching calls fail fast without network I/O for the
/// rest of the session's life.
#[derive(Debug, Default)]
pub struct QuotaSession {
    key_pool: Option<Arc<ApiKeyPool>>,
    keys_tripped: AtomicBool,
    session_tripped: AtomicBool,
}

impl QuotaSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_pool(pool: Arc<ApiKeyPool>) -> Self {
        Self {
            key_pool: Some(pool),
            keys_tripped: AtomicBool::new(false),
            session_tripped: AtomicBool::new(false),
        }
    }

    pub fn key_pool(&self) -> Option<&Arc<ApiKeyPool>> {
        self.key_pool.as_ref()
    }

    /// Tripwire for session-authenticated calls. Must run before any
    /// network attempt on a mutating call.
    pub fn check_session(&self) -> ApiResult<()> {
        if self.session_tripped() {
            return Err(ApiError::SessionQuotaExhausted);
        }
        Ok(())
    }

    /// Tripwire for keyed calls.
    pub fn check_keys(&self) -> ApiResult<()> {
        if self.keys_tripped() {
            return Err(ApiError::KeyQuotaExhausted);
        }
        Ok(())
    }

    pub fn trip_session(&self) {
        if !self.session_tripped.swap(true, Ordering::SeqCst) {
            warn!("Session quota tripwire set; further session calls fail fast");
        }
    }

    pub fn trip_keys(&self) {
        if !self.keys_tripped.swap(true, Ordering::SeqCst) {
            warn!("API key tripwire set; further keyed calls fail fast");
        }
    }

    pub fn session_tripped(&self) -> bool {
        self.session_tripped.load(Ordering::SeqCst)
    }

    pub fn keys_tripped(&self) -> bool {
        self.keys_tripped.load(Ordering::SeqCst)
    }
}
