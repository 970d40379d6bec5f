//! # Bridge Traits
//!
//! Trait seams shared by every crate in the workspace.
//!
//! This crate defines the boundaries between the reconciliation core and the
//! outside world:
//!
//! - [`http`]: transport-level request/response types and the [`HttpClient`]
//!   trait implemented per platform (see `bridge-desktop` for the reqwest
//!   implementation)
//! - [`playlist`]: the [`PlaylistApi`] provider trait — the full remote
//!   surface the sync engine needs from a video platform
//! - [`auth`]: the [`AuthBroker`] collaborator trait through which an
//!   external credential manager hands the engine an authenticated client
//! - [`error`]: [`BridgeError`] for transport failures and [`ApiError`],
//!   the call-outcome taxonomy the quota substrate and executor dispatch on

pub mod auth;
pub mod error;
pub mod http;
pub mod playlist;

pub use auth::{AuthBroker, AuthHealth};
pub use error::{ApiError, ApiResult, BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use playlist::{PlaylistApi, PlaylistItemRecord};
