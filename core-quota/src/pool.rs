//! # API Key Pool
//!
//! Ordered opaque credentials with monotonic rotation. When the active key
//! runs out of quota the caller rotates to the next one and re-issues the
//! same call; once rotation runs past the last key the pool is exhausted for
//! the rest of the process — there is deliberately no reset.

use bridge_traits::error::{ApiError, ApiResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{info, warn};

/// Process-local pool of API keys.
///
/// The cursor only ever moves forward. An empty pool behaves as already
/// exhausted. The pool is never persisted.
#[derive(Debug)]
pub struct ApiKeyPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
    exhausted: AtomicBool,
}

impl ApiKeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        if keys.is_empty() {
            warn!("API key pool created without keys; keyed calls will fail fast");
        } else {
            info!(key_count = keys.len(), "Initialized API key pool");
        }

        let exhausted = keys.is_empty();
        Self {
            keys,
            cursor: AtomicUsize::new(0),
            exhausted: AtomicBool::new(exhausted),
        }
    }

    /// The active key.
    ///
    /// # Errors
    ///
    /// [`ApiError::KeyQuotaExhausted`] once every key has been rotated out.
    pub fn current_key(&self) -> ApiResult<String> {
        if self.exhausted.load(Ordering::SeqCst) {
            return Err(ApiError::KeyQuotaExhausted);
        }

        let index = self.cursor.load(Ordering::SeqCst);
        match self.keys.get(index) {
            Some(key) => Ok(key.clone()),
            None => Err(ApiError::KeyQuotaExhausted),
        }
    }

    /// Advance to the next key.
    ///
    /// # Errors
    ///
    /// [`ApiError::KeyQuotaExhausted`] when rotation moves past the last
    /// key; the pool is then permanently exhausted.
    pub fn rotate(&self) -> ApiResult<()> {
        let next = self.cursor.fetch_add(1, Ordering::SeqCst) + 1;

        if next >= self.keys.len() {
            self.exhausted.store(true, Ordering::SeqCst);
            warn!("All API keys exhausted");
            return Err(ApiError::KeyQuotaExhausted);
        }

        warn!(
            active_key = next + 1,
            key_count = self.keys.len(),
            "Rotated to next API key"
        );
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_key_returns_first() {
        let pool = ApiKeyPool::new(vec!["key-a".into(), "key-b".into()]);
        assert_eq!(pool.current_key().unwrap(), "key-a");
        // Reading the key does not advance the cursor
        assert_eq!(pool.current_key().unwrap(), "key-a");
    }

    #[test]
    fn test_rotate_advances_monotonically() {
        let pool = ApiKeyPool::new(vec!["key-a".into(), "key-b".into(), "key-c".into()]);

        pool.rotate().unwrap();
        assert_eq!(pool.current_key().unwrap(), "key-b");
        pool.rotate().unwrap();
        assert_eq!(pool.current_key().unwrap(), "key-c");
    }

    #[test]
    fn test_rotation_past_last_key_exhausts() {
        let pool = ApiKeyPool::new(vec!["key-a".into(), "key-b".into()]);

        pool.rotate().unwrap();
        let err = pool.rotate().unwrap_err();
        assert!(matches!(err, ApiError::KeyQuotaExhausted));
        assert!(pool.is_exhausted());
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let pool = ApiKeyPool::new(vec!["key-a".into()]);

        assert!(pool.rotate().is_err());
        assert!(pool.is_exhausted());
        // No path back: current_key and rotate both keep failing
        assert!(matches!(
            pool.current_key().unwrap_err(),
            ApiError::KeyQuotaExhausted
        ));
        assert!(pool.rotate().is_err());
    }

    #[test]
    fn test_empty_pool_starts_exhausted() {
        let pool = ApiKeyPool::new(vec![]);
        assert!(pool.is_exhausted());
        assert!(matches!(
            pool.current_key().unwrap_err(),
            ApiError::KeyQuotaExhausted
        ));
    }
}
