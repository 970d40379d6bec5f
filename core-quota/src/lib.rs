//! # Quota/Retry Substrate
//!
//! The generic machinery every remote call in the workspace runs through:
//!
//! - [`pool`]: [`ApiKeyPool`] — ordered credentials with monotonic rotation
//!   and a sticky exhausted flag
//! - [`session`]: [`QuotaSession`] — the injected context object carrying
//!   the two sticky quota tripwires (per-key and authenticated-session)
//! - [`classify`]: response classification into retry/rotate/stop
//!   dispositions, including the platform's quota error envelope
//! - [`retry`]: [`execute_with_retry`] — exponential backoff for transient
//!   failures only; quota and auth signals are never retried
//!
//! The substrate is deliberately provider-agnostic: it knows HTTP status
//! semantics and the quota error envelope, nothing about playlists.

pub mod classify;
pub mod pool;
pub mod retry;
pub mod session;

pub use classify::{classify_response, error_message, Disposition};
pub use pool::ApiKeyPool;
pub use retry::{execute_with_retry, RetryPolicy};
pub use session::QuotaSession;
