//! # Mutation Executor
//!
//! Applies a [`Plan`] strictly sequentially: replacements, then additions,
//! then removals. Replacements insert the better video before deleting the
//! old one, so a failure window shows a temporary duplicate, never a gap.
//!
//! Durable state is checkpointed after every successful mutation. A terminal
//! quota or auth signal persists and stops the loop — not the process — and
//! the persisted cache then reflects exactly the mutations that succeeded.
//! Any other per-item failure is counted, logged, and skipped; one bad item
//! never aborts the batch.

use crate::cache::StateStore;
use crate::error::Result;
use crate::plan::Plan;
use crate::state::RemotePlaylistState;
use bridge_traits::error::ApiError;
use bridge_traits::playlist::PlaylistApi;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, SyncEvent};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// Counters for one execution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub added: u64,
    /// Replacements are a subset of `added`
    pub replaced: u64,
    pub removed: u64,
    pub failed: u64,
    pub skipped_by_limit: u64,
}

/// How a pass ended, with the stable exit code the orchestrator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every planned mutation was attempted.
    Completed,
    /// Quota ran out mid-pass; durable state reflects the mutations that
    /// succeeded. A successful partial run — wait for the quota window.
    QuotaExhausted,
    /// Credentials went invalid; user action required.
    AuthInvalid,
    /// Unexpected failure.
    Failed,
}

impl RunOutcome {
    /// Stable process exit codes: 0 completed, 2 quota-exhausted clean
    /// stop, 3 auth invalid, 1 unexpected failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Failed => 1,
            RunOutcome::QuotaExhausted => 2,
            RunOutcome::AuthInvalid => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::QuotaExhausted => "quota_exhausted",
            RunOutcome::AuthInvalid => "auth_invalid",
            RunOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signals that end the pass early, mapped to their outcome.
pub(crate) fn terminal_outcome(err: &ApiError) -> Option<RunOutcome> {
    match err {
        ApiError::KeyQuotaExhausted | ApiError::SessionQuotaExhausted => {
            Some(RunOutcome::QuotaExhausted)
        }
        ApiError::AuthInvalid(_) => Some(RunOutcome::AuthInvalid),
        _ => None,
    }
}

/// Sequential, checkpointing plan executor.
pub struct MutationExecutor<'a> {
    api: &'a dyn PlaylistApi,
    store: &'a StateStore,
    events: &'a EventBus,
    max_insertions: Option<u64>,
    progress_every: u64,
}

impl<'a> MutationExecutor<'a> {
    pub fn new(
        api: &'a dyn PlaylistApi,
        store: &'a StateStore,
        events: &'a EventBus,
        config: &CoreConfig,
    ) -> Self {
        Self {
            api,
            store,
            events,
            max_insertions: config.max_insertions,
            progress_every: config.progress_every,
        }
    }

    /// Apply the plan against `state`, mutating and persisting it as
    /// mutations land.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (cache persistence) surface as `Err`;
    /// remote terminal signals come back as a successful partial run with
    /// the matching [`RunOutcome`].
    #[instrument(skip_all, fields(playlist_id = %state.playlist_id, mutations = plan.total_mutations()))]
    pub async fn execute(
        &self,
        run_id: &str,
        plan: &Plan,
        state: &mut RemotePlaylistState,
    ) -> Result<(MutationOutcome, RunOutcome)> {
        let playlist_id = state.playlist_id.clone();
        let total = plan.total_mutations();
        let mut outcome = MutationOutcome::default();
        let mut processed = 0u64;

        if !plan.to_replace.is_empty() {
            debug!(count = plan.to_replace.len(), "Executing replacements");
        }

        for replacement in &plan.to_replace {
            if !self.can_insert(outcome.added) {
                outcome.skipped_by_limit += 1;
                processed += 1;
                self.maybe_progress(run_id, processed, total, &outcome);
                continue;
            }

            match self
                .api
                .insert_item(&playlist_id, &replacement.candidate.video_id)
                .await
            {
                Ok(new_item_id) => {
                    outcome.added += 1;
                    outcome.replaced += 1;
                    debug!(
                        video_id = %replacement.candidate.video_id,
                        playlist_item_id = %new_item_id,
                        song_key = %replacement.candidate.song_key,
                        "Inserted replacement"
                    );
                    state.record_added(&replacement.candidate, new_item_id);
                    self.persist(state).await?;

                    match self.api.delete_item(&replacement.prev_item_id).await {
                        Ok(()) => {
                            state.record_removed(&replacement.prev_video_id);
                            self.persist(state).await?;
                            debug!(
                                video_id = %replacement.prev_video_id,
                                "Deleted replaced video"
                            );
                        }
                        Err(e) => {
                            if let Some(stop) = terminal_outcome(&e) {
                                warn!(error = %e, "Stopping during replacement delete; progress saved");
                                return Ok((outcome, stop));
                            }
                            outcome.failed += 1;
                            warn!(
                                video_id = %replacement.prev_video_id,
                                error = %e,
                                "Delete of replaced video failed; leaving temporary duplicate"
                            );
                        }
                    }
                }
                Err(e) => {
                    if let Some(stop) = terminal_outcome(&e) {
                        warn!(error = %e, "Stopping during replacement insert; progress saved");
                        self.persist(state).await?;
                        return Ok((outcome, stop));
                    }
                    outcome.failed += 1;
                    error!(
                        video_id = %replacement.candidate.video_id,
                        error = %e,
                        "Replacement insert failed; skipping item"
                    );
                }
            }

            processed += 1;
            self.maybe_progress(run_id, processed, total, &outcome);
        }

        if !plan.to_add.is_empty() {
            debug!(count = plan.to_add.len(), "Executing additions");
        }

        for candidate in &plan.to_add {
            if !self.can_insert(outcome.added) {
                outcome.skipped_by_limit += 1;
                processed += 1;
                self.maybe_progress(run_id, processed, total, &outcome);
                continue;
            }

            // A replacement earlier in this pass may already have landed it
            if state.contains_video(&candidate.video_id) {
                processed += 1;
                self.maybe_progress(run_id, processed, total, &outcome);
                continue;
            }

            match self.api.insert_item(&playlist_id, &candidate.video_id).await {
                Ok(item_id) => {
                    outcome.added += 1;
                    debug!(
                        video_id = %candidate.video_id,
                        playlist_item_id = %item_id,
                        song_key = %candidate.song_key,
                        artist = %candidate.artist,
                        "Added video"
                    );
                    state.record_added(candidate, item_id);
                    self.persist(state).await?;
                }
                Err(e) => {
                    if let Some(stop) = terminal_outcome(&e) {
                        warn!(error = %e, "Stopping during additions; progress saved");
                        self.persist(state).await?;
                        return Ok((outcome, stop));
                    }
                    outcome.failed += 1;
                    error!(
                        video_id = %candidate.video_id,
                        error = %e,
                        "Insert failed; skipping item"
                    );
                }
            }

            processed += 1;
            self.maybe_progress(run_id, processed, total, &outcome);
        }

        if !plan.removals.is_empty() {
            debug!(count = plan.removals.len(), "Executing removals");
        }

        for removal in &plan.removals {
            match self.api.delete_item(&removal.playlist_item_id).await {
                Ok(()) => {
                    outcome.removed += 1;
                    state.record_removed(&removal.video_id);
                    self.persist(state).await?;
                    debug!(
                        video_id = %removal.video_id,
                        artist = %removal.artist,
                        "Removed de-listed video"
                    );
                }
                Err(e) => {
                    if let Some(stop) = terminal_outcome(&e) {
                        warn!(error = %e, "Stopping during removals; progress saved");
                        self.persist(state).await?;
                        return Ok((outcome, stop));
                    }
                    outcome.failed += 1;
                    warn!(
                        video_id = %removal.video_id,
                        error = %e,
                        "Removal failed; skipping item"
                    );
                }
            }

            processed += 1;
            self.maybe_progress(run_id, processed, total, &outcome);
        }

        self.persist(state).await?;

        info!(
            added = outcome.added,
            replaced = outcome.replaced,
            removed = outcome.removed,
            failed = outcome.failed,
            skipped_by_limit = outcome.skipped_by_limit,
            "Execution complete"
        );

        Ok((outcome, RunOutcome::Completed))
    }

    fn can_insert(&self, inserted_so_far: u64) -> bool {
        match self.max_insertions {
            Some(cap) => inserted_so_far < cap,
            None => true,
        }
    }

    async fn persist(&self, state: &mut RemotePlaylistState) -> Result<()> {
        state.fetched_at = chrono::Utc::now().timestamp();
        self.store.save(state).await
    }

    fn maybe_progress(&self, run_id: &str, processed: u64, total: u64, outcome: &MutationOutcome) {
        if self.progress_every == 0 {
            return;
        }
        if processed % self.progress_every != 0 && processed != total {
            return;
        }

        self.events
            .emit(SyncEvent::Progress {
                run_id: run_id.to_string(),
                processed,
                total,
                added: outcome.added,
                replaced: outcome.replaced,
                removed: outcome.removed,
                failed: outcome.failed,
                skipped_by_limit: outcome.skipped_by_limit,
            })
            .ok();
    }
}
