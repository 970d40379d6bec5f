//! # Plan Builder
//!
//! Diffs the candidate set against the cached remote state into add /
//! replace / skip decisions, plus removals for artists that left the
//! roster. Candidates are evaluated in a deterministic order so identical
//! inputs always produce identical plans.

use crate::state::{RemotePlaylistState, TrackedQuality};
use bridge_traits::error::ApiError;
use bridge_traits::playlist::PlaylistApi;
use core_ingest::{ArtistRoster, Candidate, Quality, VideoDefinition};
use tracing::{debug, instrument, warn};

/// Swap a playlisted video for a strictly better upload of the same song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub candidate: Candidate,
    pub prev_video_id: String,
    pub prev_item_id: String,
}

/// Delete a system-added video whose artist left the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub video_id: String,
    pub playlist_item_id: String,
    pub artist: String,
}

/// The full set of decisions for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub already_present: u64,
    pub to_add: Vec<Candidate>,
    pub to_replace: Vec<Replacement>,
    pub skipped_worse: u64,
    pub removals: Vec<Removal>,
}

impl Plan {
    pub fn total_mutations(&self) -> u64 {
        (self.to_add.len() + self.to_replace.len() + self.removals.len()) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total_mutations() == 0
    }
}

enum ReplacementCheck {
    Replace {
        prev_video_id: String,
        prev_item_id: String,
    },
    NotBetter,
    NoMapping,
}

/// Computes a [`Plan`] from candidates and cached remote state.
pub struct PlanBuilder<'a> {
    api: &'a dyn PlaylistApi,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(api: &'a dyn PlaylistApi) -> Self {
        Self { api }
    }

    /// Evaluate every candidate, in (artist, song key, video id) order:
    ///
    /// 1. Video already playlisted → already present, no action.
    /// 2. The song identity maps to a playlisted video of strictly lower
    ///    recorded quality → replace. Missing recorded quality ranks as
    ///    worst-case, so any quality-known candidate may replace it.
    /// 3. Mapped but not strictly better → skipped; the playlist never
    ///    regresses for a song identity.
    /// 4. Otherwise → add.
    ///
    /// Unknown candidate definitions are resolved remotely first so the
    /// comparisons in 2–3 are never biased by missing data.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn build(
        &self,
        mut candidates: Vec<Candidate>,
        state: &RemotePlaylistState,
        roster: &ArtistRoster,
    ) -> Result<Plan, ApiError> {
        self.resolve_unknown_definitions(&mut candidates).await?;

        candidates
            .sort_by_key(|c| (c.artist.to_lowercase(), c.song_key.clone(), c.video_id.clone()));

        let mut plan = Plan::default();

        for candidate in candidates {
            if state.contains_video(&candidate.video_id) {
                plan.already_present += 1;
                continue;
            }

            match check_replacement(&candidate, state) {
                ReplacementCheck::Replace {
                    prev_video_id,
                    prev_item_id,
                } => {
                    debug!(
                        song_key = %candidate.song_key,
                        old = %prev_video_id,
                        new = %candidate.video_id,
                        "Proposing replacement"
                    );
                    plan.to_replace.push(Replacement {
                        candidate,
                        prev_video_id,
                        prev_item_id,
                    });
                }
                ReplacementCheck::NotBetter => plan.skipped_worse += 1,
                ReplacementCheck::NoMapping => plan.to_add.push(candidate),
            }
        }

        plan.removals = plan_removals(state, roster);
        Ok(plan)
    }

    async fn resolve_unknown_definitions(
        &self,
        candidates: &mut [Candidate],
    ) -> Result<(), ApiError> {
        let unknown_ids: Vec<String> = candidates
            .iter()
            .filter(|c| c.definition == VideoDefinition::Unknown)
            .map(|c| c.video_id.clone())
            .collect();

        if unknown_ids.is_empty() {
            return Ok(());
        }

        debug!(count = unknown_ids.len(), "Resolving unknown video definitions");

        let definitions = match self.api.video_definitions(&unknown_ids).await {
            Ok(map) => map,
            Err(e) if e.is_terminal() => return Err(e),
            Err(e) => {
                // Degrade rather than abort: unknown stays unknown, which
                // only ever under-ranks a candidate
                warn!(error = %e, "Definition lookup failed; continuing without definitions");
                return Ok(());
            }
        };

        for candidate in candidates.iter_mut() {
            if candidate.definition == VideoDefinition::Unknown {
                if let Some(raw) = definitions.get(&candidate.video_id) {
                    candidate.definition = VideoDefinition::parse(raw);
                }
            }
        }

        Ok(())
    }
}

fn check_replacement(candidate: &Candidate, state: &RemotePlaylistState) -> ReplacementCheck {
    let Some(prev_video_id) = state.song_key_to_video_id.get(&candidate.song_key) else {
        return ReplacementCheck::NoMapping;
    };

    // A mapping pointing at a video no longer on the playlist proves
    // nothing; the candidate is a plain add
    let Some(prev_item) = state.items_by_video_id.get(prev_video_id) else {
        return ReplacementCheck::NoMapping;
    };

    let prev_quality = prev_item
        .quality
        .as_ref()
        .map(TrackedQuality::rank)
        .unwrap_or(Quality::WORST);

    if candidate.quality() > prev_quality {
        ReplacementCheck::Replace {
            prev_video_id: prev_video_id.clone(),
            prev_item_id: prev_item.playlist_item_id.clone(),
        }
    } else {
        ReplacementCheck::NotBetter
    }
}

/// Videos this system added whose artist is no longer allow-listed.
/// Untracked videos and entries without a recorded artist are never touched.
pub fn plan_removals(state: &RemotePlaylistState, roster: &ArtistRoster) -> Vec<Removal> {
    let mut removals = Vec::new();

    for (video_id, item) in &state.items_by_video_id {
        if !item.added_by_script {
            continue;
        }
        let Some(artist) = &item.artist else {
            continue;
        };
        if !roster.contains(artist) {
            removals.push(Removal {
                video_id: video_id.clone(),
                playlist_item_id: item.playlist_item_id.clone(),
                artist: artist.clone(),
            });
        }
    }

    removals
}
