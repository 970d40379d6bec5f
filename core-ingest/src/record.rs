//! # Accepted Record
//!
//! Validated shape of the discovery collaborator's `accepted.json` entries.
//! Several generations of the discovery stage wrote slightly different field
//! spellings; the serde aliases absorb them so the loader never probes raw
//! JSON keys.

use serde::Deserialize;

/// One entry of an artist's accepted-video list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptedRecord {
    #[serde(default, alias = "videoId", alias = "videoID", alias = "id")]
    pub video_id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, alias = "channelTitle")]
    pub channel_title: Option<String>,

    /// Duration in seconds; informational only at this stage.
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(default)]
    pub definition: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    // Stable song identity, in precedence order.
    #[serde(default)]
    pub song_key: Option<String>,
    #[serde(default)]
    pub track_key: Option<String>,
    #[serde(default, alias = "musicbrainz_recording_id")]
    pub recording_mbid: Option<String>,
    #[serde(default, alias = "musicbrainz_work_id")]
    pub work_mbid: Option<String>,
    #[serde(default)]
    pub release_mbid: Option<String>,
    #[serde(default)]
    pub song: Option<SongIdentity>,
}

/// Nested identity block some record generations used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongIdentity {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub recording_mbid: Option<String>,
    #[serde(default)]
    pub work_mbid: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AcceptedRecord {
    /// The video id, trimmed; `None` makes the record unusable.
    pub fn video_id(&self) -> Option<&str> {
        non_empty(&self.video_id)
    }

    pub fn title(&self) -> &str {
        non_empty(&self.title).unwrap_or("")
    }

    /// First stable song identifier present, in precedence order. No
    /// title-based matching, no guessing — absent means absent.
    pub fn stable_song_key(&self) -> Option<&str> {
        non_empty(&self.song_key)
            .or_else(|| non_empty(&self.track_key))
            .or_else(|| non_empty(&self.recording_mbid))
            .or_else(|| non_empty(&self.work_mbid))
            .or_else(|| non_empty(&self.release_mbid))
            .or_else(|| {
                self.song.as_ref().and_then(|song| {
                    non_empty(&song.key)
                        .or_else(|| non_empty(&song.id))
                        .or_else(|| non_empty(&song.recording_mbid))
                        .or_else(|| non_empty(&song.work_mbid))
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_aliases() {
        let record: AcceptedRecord = serde_json::from_str(r#"{"videoId": "abc123"}"#).unwrap();
        assert_eq!(record.video_id(), Some("abc123"));

        let record: AcceptedRecord = serde_json::from_str(r#"{"id": "xyz789"}"#).unwrap();
        assert_eq!(record.video_id(), Some("xyz789"));
    }

    #[test]
    fn test_blank_video_id_is_none() {
        let record: AcceptedRecord = serde_json::from_str(r#"{"video_id": "  "}"#).unwrap();
        assert_eq!(record.video_id(), None);
    }

    #[test]
    fn test_song_key_precedence() {
        let record: AcceptedRecord = serde_json::from_str(
            r#"{"song_key": "sk-1", "recording_mbid": "mbid-1"}"#,
        )
        .unwrap();
        assert_eq!(record.stable_song_key(), Some("sk-1"));

        let record: AcceptedRecord =
            serde_json::from_str(r#"{"recording_mbid": "mbid-1"}"#).unwrap();
        assert_eq!(record.stable_song_key(), Some("mbid-1"));
    }

    #[test]
    fn test_nested_song_identity() {
        let record: AcceptedRecord =
            serde_json::from_str(r#"{"song": {"recording_mbid": "mbid-9"}}"#).unwrap();
        assert_eq!(record.stable_song_key(), Some("mbid-9"));
    }

    #[test]
    fn test_no_identity_yields_none() {
        let record: AcceptedRecord =
            serde_json::from_str(r#"{"video_id": "v1", "title": "Song"}"#).unwrap();
        assert_eq!(record.stable_song_key(), None);
    }
}
