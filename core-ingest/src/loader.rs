//! # Candidate Loader
//!
//! Scans `<root>/<artist>/**/accepted.json` and folds the records into the
//! best candidate per song identity. One unreadable file or malformed record
//! never aborts the scan.

use crate::candidate::{Candidate, VideoDefinition, VideoSource};
use crate::error::{IngestError, Result};
use crate::filter::VersionFilter;
use crate::record::AcceptedRecord;
use crate::roster::ArtistRoster;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ACCEPTED_FILE_NAME: &str = "accepted.json";

/// What a scan saw, plus the surviving candidates.
#[derive(Debug, Default)]
pub struct LoadStats {
    /// Records seen across all accepted lists
    pub total_items: u64,
    /// Records rejected as version variants
    pub filtered_versions: u64,
    /// Candidates whose song key fell back to the video id
    pub fallback_count: u64,
    /// Artist directories skipped because they left the roster
    pub skipped_artists: u64,
    /// Best candidate per song key
    pub candidates: Vec<Candidate>,
}

/// Scanner for per-artist accepted-video lists.
pub struct CandidateLoader {
    filter: Option<VersionFilter>,
}

impl CandidateLoader {
    /// Loader with version filtering enabled.
    pub fn new() -> Self {
        Self {
            filter: Some(VersionFilter::new()),
        }
    }

    /// Loader that syncs every accepted record unfiltered.
    pub fn without_filtering() -> Self {
        Self { filter: None }
    }

    /// Loader with the filter toggled by configuration.
    pub fn with_filtering(enabled: bool) -> Self {
        if enabled {
            Self::new()
        } else {
            Self::without_filtering()
        }
    }

    /// Scan the output root and build the deduplicated candidate set.
    ///
    /// Per record: extract the video id (skip if absent), apply the version
    /// filter, resolve the song key (stable identifier, else video id), and
    /// keep the highest-quality candidate per song key — ties keep the
    /// first seen. Artists absent from the roster are skipped entirely.
    ///
    /// # Errors
    ///
    /// Only a missing root or an unreadable directory tree is an error;
    /// individual bad files are logged and skipped.
    pub fn load(&self, root: &Path, roster: &ArtistRoster) -> Result<LoadStats> {
        if !root.is_dir() {
            return Err(IngestError::MissingRoot(root.to_path_buf()));
        }

        let mut accepted_paths = Vec::new();
        collect_accepted_files(root, &mut accepted_paths)?;
        accepted_paths.sort();

        let mut stats = LoadStats::default();
        let mut best_by_song: BTreeMap<String, Candidate> = BTreeMap::new();

        for path in accepted_paths {
            let artist = match path.parent().and_then(|p| p.file_name()) {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };

            if !roster.contains(&artist) {
                debug!(artist = %artist, "Skipping artist not in roster");
                stats.skipped_artists += 1;
                continue;
            }

            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read accepted list");
                    continue;
                }
            };

            let items: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed accepted list");
                    continue;
                }
            };

            for item in items {
                stats.total_items += 1;

                let record: AcceptedRecord = match serde_json::from_value(item) {
                    Ok(record) => record,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Skipping malformed record");
                        continue;
                    }
                };

                let Some(video_id) = record.video_id() else {
                    continue;
                };

                let title = record.title().to_string();

                if let Some(filter) = &self.filter {
                    if let Some(pattern) = filter.is_excluded(&title) {
                        stats.filtered_versions += 1;
                        debug!(title = %title, pattern, "Filtered version variant");
                        continue;
                    }
                }

                let song_key = record
                    .stable_song_key()
                    .unwrap_or(video_id)
                    .to_string();

                let candidate = Candidate {
                    artist: artist.clone(),
                    video_id: video_id.to_string(),
                    song_key: song_key.clone(),
                    title,
                    definition: record
                        .definition
                        .as_deref()
                        .map(VideoDefinition::parse)
                        .unwrap_or(VideoDefinition::Unknown),
                    source: record
                        .source
                        .as_deref()
                        .map(VideoSource::parse)
                        .unwrap_or(VideoSource::Unknown),
                };

                if candidate.is_song_key_fallback() {
                    stats.fallback_count += 1;
                }

                match best_by_song.get(&song_key) {
                    // Strictly better replaces; ties keep first-seen
                    Some(prev) if candidate.quality() <= prev.quality() => {}
                    _ => {
                        best_by_song.insert(song_key, candidate);
                    }
                }
            }
        }

        stats.candidates = best_by_song.into_values().collect();
        Ok(stats)
    }
}

impl Default for CandidateLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_accepted_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_accepted_files(&path, out)?;
        } else if path.file_name().and_then(|n| n.to_str()) == Some(ACCEPTED_FILE_NAME) {
            out.push(path);
        }
    }
    Ok(())
}
