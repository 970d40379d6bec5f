//! # Version Filter
//!
//! Pure title classification: decides whether a title names a non-canonical
//! version of a song (live cut, cover, remix, lyric upload) that must not
//! reach the playlist. No I/O, no state beyond the compiled patterns.

use regex::Regex;

/// Titles carrying one of these phrases are never excluded, even when an
/// exclusion pattern also matches ("Song (Official Music Video) [Live Cut]"
/// stays in).
const ALWAYS_ALLOWED_PHRASES: &[&str] = &["official music video", "official video", "vevo"];

const VERSION_EXCLUDE_PATTERNS: &[&str] = &[
    // Covers
    r"\bcover(ed)?\s+by\b",
    r"\b(?:my|our|their)\s+cover\b",
    // Live
    r"\blive\s+(at|from|in)\b",
    r"\blive\s+performance\b",
    r"\blive\s+session\b",
    r"\blive\s+version\b",
    r"\(live\)",
    // Acoustic
    r"\bacoustic\s+version\b",
    r"\bacoustic\s+session\b",
    r"\(acoustic\)",
    // Remixes / edits
    r"\bremix\b",
    r"\bre[-\s]?mix\b",
    r"\bextended\s+mix\b",
    r"\bradio\s+edit\b",
    r"\bclub\s+mix\b",
    // Alternate takes
    r"\bdemo\b",
    r"\brough\s+mix\b",
    r"\balternate\s+version\b",
    // Fan / unofficial
    r"\bfan\s+made\b",
    r"\bfan\s+video\b",
    r"\bunofficial\b",
    // Low-quality reuploads
    r"\bsped\s*up\b",
    r"\bslowed\s*down\b",
    r"\bnightcore\b",
    r"\blyrics?\b",
    // Compilations
    r"\bmash\s*up\b",
    r"\bmashup\b",
    r"\bcompilation\b",
];

/// Normalize a title for matching: lowercase, collapsed whitespace.
/// Parentheses and brackets are preserved — context matters.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Regex-driven rejection of non-canonical version variants.
pub struct VersionFilter {
    patterns: Vec<Regex>,
}

impl VersionFilter {
    pub fn new() -> Self {
        let patterns = VERSION_EXCLUDE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("static version pattern must compile"))
            .collect();
        Self { patterns }
    }

    /// Returns the matched pattern when the title is a non-canonical
    /// version, for diagnostics; `None` when the title passes.
    pub fn is_excluded(&self, title: &str) -> Option<&str> {
        if title.is_empty() {
            return None;
        }

        let normalized = normalize_title(title);

        for phrase in ALWAYS_ALLOWED_PHRASES {
            if normalized.contains(phrase) {
                return None;
            }
        }

        self.patterns
            .iter()
            .find(|p| p.is_match(&normalized))
            .map(|p| p.as_str())
    }
}

impl Default for VersionFilter {
    fn default() -> Self {
        Self::new()
    }
}
