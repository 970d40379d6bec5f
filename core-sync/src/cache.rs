//! # State Store
//!
//! Durable persistence for [`RemotePlaylistState`] plus the remote fetch
//! path that rebuilds it. The cache file is the single cross-run source of
//! truth and is only ever written via write-temp-then-rename, so a crash
//! mid-write can never leave a torn file behind.

use crate::error::{Result, SyncError};
use crate::state::{RemoteItem, RemotePlaylistState};
use bridge_traits::error::ApiError;
use bridge_traits::playlist::PlaylistApi;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

fn is_valid_playlist_id(playlist_id: &str) -> bool {
    !playlist_id.is_empty()
        && playlist_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Page every membership row from the remote, carrying tracked metadata
/// over from `prior` for videos still present.
pub async fn fetch_remote_state(
    api: &dyn PlaylistApi,
    playlist_id: &str,
    prior: Option<&RemotePlaylistState>,
) -> std::result::Result<RemotePlaylistState, ApiError> {
    let mut state = RemotePlaylistState::new(playlist_id, chrono::Utc::now().timestamp());
    let mut page_token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let (items, next_token) = api.list_items_page(playlist_id, page_token).await?;
        pages += 1;

        for item in items {
            let mut remote = RemoteItem::untracked(item.playlist_item_id);
            if let Some(prev) = prior.and_then(|p| p.items_by_video_id.get(&item.video_id)) {
                remote.song_key = prev.song_key.clone();
                remote.quality = prev.quality.clone();
                remote.added_by_script = prev.added_by_script;
                remote.artist = prev.artist.clone();
            }
            state.items_by_video_id.insert(item.video_id, remote);
        }

        match next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    if let Some(prev) = prior {
        state.song_key_to_video_id = prev.song_key_to_video_id.clone();
    }

    debug!(
        pages,
        items = state.items_by_video_id.len(),
        "Fetched playlist state from remote"
    );
    Ok(state)
}

/// Cache-directory-rooted persistence for playlist state.
#[derive(Debug, Clone)]
pub struct StateStore {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl StateStore {
    pub fn new(cache_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl,
        }
    }

    /// Cache file path for a playlist.
    ///
    /// # Errors
    ///
    /// Rejects ids that could escape the cache directory.
    pub fn cache_path(&self, playlist_id: &str) -> Result<PathBuf> {
        if !is_valid_playlist_id(playlist_id) {
            return Err(SyncError::InvalidPlaylistId(playlist_id.to_string()));
        }
        Ok(self.cache_dir.join(format!("playlist_{}.json", playlist_id)))
    }

    /// Load the cached state, strictly.
    ///
    /// Returns `Ok(None)` — cold — for a missing file, undecodable JSON, a
    /// schema version mismatch, a playlist id mismatch, or any structural
    /// defect. Partially valid state is never returned.
    pub async fn load(&self, playlist_id: &str) -> Result<Option<RemotePlaylistState>> {
        let path = self.cache_path(playlist_id)?;

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state: RemotePlaylistState = match serde_json::from_slice(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache file corrupted; starting cold");
                return Ok(None);
            }
        };

        if state.playlist_id != playlist_id || !state.is_structurally_valid() {
            warn!(path = %path.display(), "Cache file invalid or unsupported; starting cold");
            return Ok(None);
        }

        Ok(Some(state))
    }

    /// Persist state atomically: write a sibling temp file, then rename.
    pub async fn save(&self, state: &RemotePlaylistState) -> Result<()> {
        let path = self.cache_path(&state.playlist_id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = tmp_path(&path);
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            path = %path.display(),
            items = state.items_by_video_id.len(),
            "Persisted playlist state"
        );
        Ok(())
    }

    /// Whether the snapshot is still within its TTL at time `now`.
    pub fn is_fresh(&self, state: &RemotePlaylistState, now: i64) -> bool {
        now.saturating_sub(state.fetched_at) <= self.ttl.as_secs() as i64
    }

    /// The cache read path: a fresh, valid cached snapshot when allowed,
    /// otherwise a full remote rebuild persisted before returning.
    pub async fn load_or_fetch(
        &self,
        api: &dyn PlaylistApi,
        playlist_id: &str,
        force_refresh: bool,
    ) -> Result<RemotePlaylistState> {
        let prior = self.load(playlist_id).await?;

        if !force_refresh {
            if let Some(state) = &prior {
                if self.is_fresh(state, chrono::Utc::now().timestamp()) {
                    debug!("Using cached playlist state");
                    return Ok(state.clone());
                }
            }
        }

        let state = fetch_remote_state(api, playlist_id, prior.as_ref()).await?;
        self.save(&state).await?;
        Ok(state)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
