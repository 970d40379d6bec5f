use bridge_traits::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Playlist {playlist_id} is not accessible: {reason}")]
    PlaylistInaccessible { playlist_id: String, reason: String },

    #[error("Invalid playlist id: {0}")]
    InvalidPlaylistId(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
