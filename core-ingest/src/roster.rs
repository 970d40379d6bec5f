//! # Artist Roster
//!
//! The allow-list of artists whose candidates may enter the playlist, held
//! as canonical keys so punctuation and casing differences never split one
//! artist into two.

use crate::error::{IngestError, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Convert an artist name into its stable roster/filesystem key.
///
/// Lowercases and strips everything but ASCII letters and digits:
/// "AC/DC" → "acdc", "Andrew W.K." → "andrewwk". The same fold is applied
/// on both sides of every roster comparison.
pub fn canonical_artist_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Allow-listed artists, keyed canonically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistRoster {
    keys: BTreeSet<String>,
}

impl ArtistRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from display names, canonicalizing each.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::new();
        for name in names {
            roster.insert(name.as_ref());
        }
        roster
    }

    /// Read a roster file: one artist per line, an optional `artist` header
    /// row, blank lines ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IngestError::Roster {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = content.lines();
        let mut roster = Self::new();

        if let Some(first) = lines.next() {
            if !first.trim().eq_ignore_ascii_case("artist") {
                roster.insert(first);
            }
        }

        for line in lines {
            roster.insert(line);
        }

        Ok(roster)
    }

    /// Add one artist by display name. Empty names are ignored.
    pub fn insert(&mut self, name: &str) {
        let key = canonical_artist_key(name.trim());
        if !key.is_empty() {
            self.keys.insert(key);
        }
    }

    /// Membership test against the canonical key of `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&canonical_artist_key(name))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_artist_key("AC/DC"), "acdc");
        assert_eq!(canonical_artist_key("Andrew W.K."), "andrewwk");
        assert_eq!(canonical_artist_key("Guns N' Roses"), "gunsnroses");
        assert_eq!(canonical_artist_key("  Taylor Swift  "), "taylorswift");
    }

    #[test]
    fn test_contains_uses_canonical_form() {
        let roster = ArtistRoster::from_names(["AC/DC"]);
        assert!(roster.contains("acdc"));
        assert!(roster.contains("AC/DC"));
        assert!(roster.contains("A.C.D.C."));
        assert!(!roster.contains("Accept"));
    }

    #[test]
    fn test_empty_names_ignored() {
        let roster = ArtistRoster::from_names(["", "   ", "!!", "Real Artist"]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_from_file_with_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "artist").unwrap();
        writeln!(file, "AC/DC").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Motorhead").unwrap();

        let roster = ArtistRoster::from_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.contains("acdc"));
        assert!(roster.contains("motorhead"));
    }

    #[test]
    fn test_from_file_without_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AC/DC").unwrap();
        writeln!(file, "Motorhead").unwrap();

        let roster = ArtistRoster::from_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_missing_file_errors() {
        let result = ArtistRoster::from_file(Path::new("/nonexistent/artists.csv"));
        assert!(matches!(result, Err(IngestError::Roster { .. })));
    }
}
