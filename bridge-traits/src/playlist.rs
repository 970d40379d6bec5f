//! Playlist Provider Abstraction
//!
//! The remote surface the reconciliation engine needs from a video-hosting
//! platform, as a mockable trait object. `provider-youtube` implements it for
//! the YouTube Data API v3.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ApiResult;

/// One membership row of a remote playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItemRecord {
    /// The video the row points at.
    pub video_id: String,
    /// The row's own id — the handle deletions need.
    pub playlist_item_id: String,
}

/// Remote playlist operations.
///
/// Implementations are expected to be fully authenticated: the engine never
/// sees tokens or keys, only classified [`ApiError`](crate::error::ApiError)
/// outcomes. Mutating calls must consult the session quota tripwire before
/// touching the network and observe the configured politeness delay after a
/// successful write.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// Cheap probe that the playlist exists and is accessible.
    ///
    /// # Errors
    ///
    /// A playlist that cannot be used fails here, before any mutation is
    /// attempted.
    async fn verify_playlist(&self, playlist_id: &str) -> ApiResult<()>;

    /// Fetch one page of playlist membership.
    ///
    /// Returns the page's items plus the token for the next page, `None` on
    /// the last page.
    async fn list_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<(Vec<PlaylistItemRecord>, Option<String>)>;

    /// Batched video definition lookup (`video_id` → "hd"/"sd").
    ///
    /// Videos the remote does not report are simply absent from the map.
    async fn video_definitions(&self, video_ids: &[String]) -> ApiResult<HashMap<String, String>>;

    /// Insert a video into the playlist. Returns the new playlist item id.
    async fn insert_item(&self, playlist_id: &str, video_id: &str) -> ApiResult<String>;

    /// Delete a playlist row by its playlist item id.
    async fn delete_item(&self, playlist_item_id: &str) -> ApiResult<()>;
}
