//! # YouTube Playlist Provider
//!
//! Implements the [`PlaylistApi`](bridge_traits::playlist::PlaylistApi)
//! trait for the YouTube Data API v3, on top of the `bridge-traits` HTTP
//! seam and the `core-quota` substrate.
//!
//! ## Features
//!
//! - Paginated playlist membership listing (`playlistItems.list`)
//! - Batched definition lookup (`videos.list`, 50 ids per call) with API
//!   key rotation when a pool is configured
//! - Mutations (`playlistItems.insert` / `playlistItems.delete`) over the
//!   authenticated session, tripwire-guarded, with a politeness delay after
//!   every successful write
//! - Classification-aware retries via `core-quota`

pub mod connector;
pub mod types;

pub use connector::YouTubeConnector;
