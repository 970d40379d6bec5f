//! # Remote Playlist State
//!
//! The typed shape of the per-playlist cache file. The on-disk JSON uses
//! snake_case keys and sorted maps; any file that does not decode into these
//! types is treated as cold and rebuilt from the remote — the engine never
//! trusts partially malformed state.

use core_ingest::{Candidate, Quality, VideoDefinition, VideoSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version of the cache file. Bump on any shape change; mismatching
/// files are rebuilt, never migrated in place.
pub const CACHE_VERSION: u32 = 1;

/// Quality metadata recorded for a playlisted video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedQuality {
    pub definition: String,
    pub source: String,
}

impl TrackedQuality {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            definition: candidate.definition.as_str().to_string(),
            source: candidate.source.as_str().to_string(),
        }
    }

    /// Rank for comparison against candidate quality. Unrecognized strings
    /// rank as unknown, the worst case.
    pub fn rank(&self) -> Quality {
        Quality::new(
            VideoDefinition::parse(&self.definition),
            VideoSource::parse(&self.source),
        )
    }
}

/// Tracked metadata for one video currently on the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub playlist_item_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<TrackedQuality>,

    /// True for entries this system inserted; only those are ever eligible
    /// for roster-driven removal.
    #[serde(default)]
    pub added_by_script: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl RemoteItem {
    /// A bare membership row, as fetched for videos this system never
    /// touched.
    pub fn untracked(playlist_item_id: String) -> Self {
        Self {
            playlist_item_id,
            song_key: None,
            quality: None,
            added_by_script: false,
            artist: None,
        }
    }
}

/// Cached view of a playlist's remote membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlaylistState {
    pub version: u32,
    pub playlist_id: String,
    /// Unix timestamp of the last fetch or successful mutation
    pub fetched_at: i64,
    pub items_by_video_id: BTreeMap<String, RemoteItem>,
    /// Song identity to playlisted video, maintained for system-added
    /// entries; the handle replacements are detected through
    #[serde(default)]
    pub song_key_to_video_id: BTreeMap<String, String>,
}

impl RemotePlaylistState {
    pub fn new(playlist_id: impl Into<String>, fetched_at: i64) -> Self {
        Self {
            version: CACHE_VERSION,
            playlist_id: playlist_id.into(),
            fetched_at,
            items_by_video_id: BTreeMap::new(),
            song_key_to_video_id: BTreeMap::new(),
        }
    }

    /// Structural health check over and above serde decoding.
    pub fn is_structurally_valid(&self) -> bool {
        self.version == CACHE_VERSION
            && !self.playlist_id.is_empty()
            && self
                .items_by_video_id
                .values()
                .all(|item| !item.playlist_item_id.is_empty())
    }

    pub fn contains_video(&self, video_id: &str) -> bool {
        self.items_by_video_id.contains_key(video_id)
    }

    /// Record a successful insert of `candidate` under `playlist_item_id`.
    pub fn record_added(&mut self, candidate: &Candidate, playlist_item_id: String) {
        self.items_by_video_id.insert(
            candidate.video_id.clone(),
            RemoteItem {
                playlist_item_id,
                song_key: Some(candidate.song_key.clone()),
                quality: Some(TrackedQuality::from_candidate(candidate)),
                added_by_script: true,
                artist: Some(candidate.artist.clone()),
            },
        );
        self.song_key_to_video_id
            .insert(candidate.song_key.clone(), candidate.video_id.clone());
    }

    /// Record a successful delete: drops the membership row and any song
    /// mapping still pointing at the removed video.
    pub fn record_removed(&mut self, video_id: &str) {
        self.items_by_video_id.remove(video_id);
        self.song_key_to_video_id.retain(|_, vid| vid != video_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(video_id: &str, song_key: &str) -> Candidate {
        Candidate {
            artist: "acdc".into(),
            video_id: video_id.into(),
            song_key: song_key.into(),
            title: "Song".into(),
            definition: VideoDefinition::Hd,
            source: VideoSource::Original,
        }
    }

    #[test]
    fn test_record_added_tracks_everything() {
        let mut state = RemotePlaylistState::new("PL1", 0);
        state.record_added(&candidate("v1", "song-1"), "pi-1".into());

        let item = &state.items_by_video_id["v1"];
        assert_eq!(item.playlist_item_id, "pi-1");
        assert_eq!(item.song_key.as_deref(), Some("song-1"));
        assert!(item.added_by_script);
        assert_eq!(item.artist.as_deref(), Some("acdc"));
        assert_eq!(
            item.quality,
            Some(TrackedQuality {
                definition: "hd".into(),
                source: "original".into()
            })
        );
        assert_eq!(state.song_key_to_video_id["song-1"], "v1");
    }

    #[test]
    fn test_record_removed_drops_song_mapping() {
        let mut state = RemotePlaylistState::new("PL1", 0);
        state.record_added(&candidate("v1", "song-1"), "pi-1".into());
        state.record_removed("v1");

        assert!(!state.contains_video("v1"));
        assert!(state.song_key_to_video_id.is_empty());
    }

    #[test]
    fn test_replacement_sequence_keeps_new_mapping() {
        let mut state = RemotePlaylistState::new("PL1", 0);
        state.record_added(&candidate("v-old", "song-1"), "pi-old".into());
        // Insert-before-delete: the new video lands first
        state.record_added(&candidate("v-new", "song-1"), "pi-new".into());
        state.record_removed("v-old");

        assert!(!state.contains_video("v-old"));
        assert!(state.contains_video("v-new"));
        assert_eq!(state.song_key_to_video_id["song-1"], "v-new");
    }

    #[test]
    fn test_structural_validity() {
        let mut state = RemotePlaylistState::new("PL1", 0);
        assert!(state.is_structurally_valid());

        state
            .items_by_video_id
            .insert("v1".into(), RemoteItem::untracked(String::new()));
        assert!(!state.is_structurally_valid());
    }

    #[test]
    fn test_version_mismatch_is_invalid() {
        let mut state = RemotePlaylistState::new("PL1", 0);
        state.version = CACHE_VERSION + 1;
        assert!(!state.is_structurally_valid());
    }

    #[test]
    fn test_serialization_round_trip_uses_snake_case() {
        let mut state = RemotePlaylistState::new("PL1", 1700000000);
        state.record_added(&candidate("v1", "song-1"), "pi-1".into());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["playlist_id"], "PL1");
        assert_eq!(json["fetched_at"], 1700000000);
        assert_eq!(
            json["items_by_video_id"]["v1"]["playlist_item_id"],
            "pi-1"
        );
        assert_eq!(json["items_by_video_id"]["v1"]["added_by_script"], true);
        assert_eq!(json["song_key_to_video_id"]["song-1"], "v1");

        let back: RemotePlaylistState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_song_map_defaults_empty() {
        let json = r#"{
            "version": 1,
            "playlist_id": "PL1",
            "fetched_at": 0,
            "items_by_video_id": {}
        }"#;
        let state: RemotePlaylistState = serde_json::from_str(json).unwrap();
        assert!(state.song_key_to_video_id.is_empty());
        assert!(state.is_structurally_valid());
    }
}
