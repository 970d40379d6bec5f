//! # Core Configuration Module
//!
//! One validated configuration type for the whole engine.
//!
//! ## Overview
//!
//! `CoreConfig` collects every tunable the reconciliation core and its
//! provider connectors consume: cache location and TTL, retry and backoff
//! settings, the politeness delay for mutating calls, remote batch size, and
//! the optional per-run insertion cap. The builder validates fail-fast with
//! actionable messages so a bad value never reaches a remote call.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .cache_dir("/var/lib/playlist-sync/cache")
//!     .max_insertions(Some(200))
//!     .mutation_delay(Duration::from_millis(1500))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Remote page/batch ceiling imposed by the platform API (playlistItems.list
/// and videos.list both cap at 50).
pub const MAX_REMOTE_BATCH_SIZE: usize = 50;

/// Engine configuration.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding the per-playlist cache files
    pub cache_dir: PathBuf,

    /// How long a fetched playlist snapshot stays trustworthy
    pub cache_ttl: Duration,

    /// Total attempts per remote call (first try included)
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    pub backoff_base: Duration,

    /// Per-request timeout handed to the HTTP client
    pub request_timeout: Duration,

    /// Politeness delay after every successful mutating call
    pub mutation_delay: Duration,

    /// Ids per remote batch call, capped at [`MAX_REMOTE_BATCH_SIZE`]
    pub batch_size: usize,

    /// Optional cap on insertions (adds + replacements) per run
    pub max_insertions: Option<u64>,

    /// Whether version-variant filtering applies during ingestion
    pub version_filtering: bool,

    /// Emit a progress event every N processed mutations (0 disables)
    pub progress_every: u64,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::Config("Cache directory cannot be empty".to_string()));
        }

        if self.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Cache TTL must be greater than zero; a zero TTL would refetch \
                 the playlist on every pass and burn quota."
                    .to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(Error::Config(
                "Max retries must be at least 1 (the first attempt counts)".to_string(),
            ));
        }

        if self.batch_size == 0 || self.batch_size > MAX_REMOTE_BATCH_SIZE {
            return Err(Error::Config(format!(
                "Batch size must be between 1 and {}",
                MAX_REMOTE_BATCH_SIZE
            )));
        }

        if self.max_insertions == Some(0) {
            return Err(Error::Config(
                "Max insertions of 0 would skip every planned insert. \
                 Use None to disable the cap."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    cache_dir: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    max_retries: Option<u32>,
    backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    mutation_delay: Option<Duration>,
    batch_size: Option<usize>,
    max_insertions: Option<u64>,
    version_filtering: Option<bool>,
    progress_every: Option<u64>,
}

impl CoreConfigBuilder {
    /// Sets the cache directory (required).
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the cache TTL.
    ///
    /// Default: 6 hours
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Sets total attempts per remote call.
    ///
    /// Default: 3
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the exponential backoff base delay.
    ///
    /// Default: 1 second
    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = Some(base);
        self
    }

    /// Sets the per-request HTTP timeout.
    ///
    /// Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the politeness delay after successful mutating calls.
    ///
    /// Default: 1 second. Zero disables the delay; this is a rate-limit
    /// courtesy, not a correctness requirement.
    pub fn mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = Some(delay);
        self
    }

    /// Sets the remote batch size.
    ///
    /// Default: 50 (the platform maximum)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Caps insertions (adds + replacements) per run.
    ///
    /// Default: no cap
    pub fn max_insertions(mut self, cap: Option<u64>) -> Self {
        self.max_insertions = cap;
        self
    }

    /// Enables or disables version-variant filtering during ingestion.
    ///
    /// Default: enabled
    pub fn version_filtering(mut self, enabled: bool) -> Self {
        self.version_filtering = Some(enabled);
        self
    }

    /// Emit a progress event every N processed mutations.
    ///
    /// Default: 10. Zero disables periodic progress events.
    pub fn progress_every(mut self, every: u64) -> Self {
        self.progress_every = Some(every);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Config`] with an actionable message when a required
    /// field is missing or a value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let cache_dir = self.cache_dir.ok_or_else(|| {
            Error::Config("Cache directory is required. Use .cache_dir() to set it.".to_string())
        })?;

        let config = CoreConfig {
            cache_dir,
            cache_ttl: self.cache_ttl.unwrap_or(Duration::from_secs(6 * 60 * 60)),
            max_retries: self.max_retries.unwrap_or(3),
            backoff_base: self.backoff_base.unwrap_or(Duration::from_secs(1)),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            mutation_delay: self.mutation_delay.unwrap_or(Duration::from_secs(1)),
            batch_size: self.batch_size.unwrap_or(MAX_REMOTE_BATCH_SIZE),
            max_insertions: self.max_insertions,
            version_filtering: self.version_filtering.unwrap_or(true),
            progress_every: self.progress_every.unwrap_or(10),
        };

        config.validate()?;

        Ok(config)
    }
}
