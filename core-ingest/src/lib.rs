//! # Candidate Model & Ingestion
//!
//! Builds the deduplicated, quality-ranked candidate set the plan builder
//! consumes.
//!
//! ## Overview
//!
//! The discovery collaborator leaves one `accepted.json` per artist under an
//! output root. This crate:
//! - parses those records into validated types ([`record`])
//! - filters out non-canonical version variants — covers, live cuts,
//!   remixes ([`filter`])
//! - assigns each candidate its stable cross-upload song identity and
//!   quality tuple ([`candidate`])
//! - keeps only the best candidate per song identity ([`loader`])
//!
//! Artists outside the allow-list roster ([`roster`]) are skipped entirely.

pub mod candidate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod record;
pub mod roster;

pub use candidate::{Candidate, Quality, VideoDefinition, VideoSource};
pub use error::{IngestError, Result};
pub use filter::VersionFilter;
pub use loader::{CandidateLoader, LoadStats};
pub use record::AcceptedRecord;
pub use roster::{canonical_artist_key, ArtistRoster};
