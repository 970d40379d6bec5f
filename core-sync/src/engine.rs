//! # Sync Engine
//!
//! Sequences one reconciliation pass for a single playlist: tripwire check,
//! access validation, state load, plan, execute. Plan computation and
//! mutation application are strictly sequential; there is exactly one
//! logical thread of control per playlist and mutating calls are never
//! parallelized.

use crate::cache::StateStore;
use crate::error::{Result, SyncError};
use crate::executor::{terminal_outcome, MutationExecutor, MutationOutcome, RunOutcome};
use crate::plan::{Plan, PlanBuilder};
use bridge_traits::playlist::PlaylistApi;
use core_ingest::{ArtistRoster, Candidate};
use core_quota::QuotaSession;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, SyncEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Per-pass options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and report the plan without mutating anything.
    pub dry_run: bool,
    /// Refetch remote state even when the cache is fresh.
    pub force_refresh: bool,
}

/// Plan counts carried into the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub already_present: u64,
    pub to_add: u64,
    pub to_replace: u64,
    pub removals: u64,
    pub skipped_worse: u64,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        Self {
            already_present: plan.already_present,
            to_add: plan.to_add.len() as u64,
            to_replace: plan.to_replace.len() as u64,
            removals: plan.removals.len() as u64,
            skipped_worse: plan.skipped_worse,
        }
    }
}

/// Everything the orchestrator needs to know about a finished pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: String,
    pub playlist_id: String,
    pub outcome: RunOutcome,
    pub dry_run: bool,
    pub plan: PlanSummary,
    pub mutations: MutationOutcome,
}

impl SyncReport {
    /// Stable process exit code for this pass.
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

/// One-playlist reconciliation driver.
pub struct SyncEngine {
    api: Arc<dyn PlaylistApi>,
    session: Arc<QuotaSession>,
    store: StateStore,
    events: EventBus,
    config: CoreConfig,
}

impl SyncEngine {
    pub fn new(
        api: Arc<dyn PlaylistApi>,
        session: Arc<QuotaSession>,
        config: CoreConfig,
        events: EventBus,
    ) -> Self {
        let store = StateStore::new(config.cache_dir.clone(), config.cache_ttl);
        Self {
            api,
            session,
            store,
            events,
            config,
        }
    }

    /// Run one pass over `playlist_id`.
    ///
    /// Terminal quota and auth signals come back as a successful report
    /// with the matching outcome — a quota stop is a successful partial
    /// run, not a crash. An inaccessible playlist fails before any
    /// mutation is attempted.
    #[instrument(skip(self, candidates, roster), fields(playlist_id = %playlist_id))]
    pub async fn run(
        &self,
        playlist_id: &str,
        candidates: Vec<Candidate>,
        roster: &ArtistRoster,
        options: RunOptions,
    ) -> Result<SyncReport> {
        let run_id = Uuid::new_v4().to_string();
        self.events
            .emit(SyncEvent::Started {
                run_id: run_id.clone(),
                playlist_id: playlist_id.to_string(),
            })
            .ok();

        if self.session.session_tripped() {
            warn!("Session quota already exhausted; skipping pass");
            return Ok(self.finish(
                run_id,
                playlist_id,
                RunOutcome::QuotaExhausted,
                options.dry_run,
                PlanSummary::default(),
                MutationOutcome::default(),
            ));
        }

        if let Err(e) = self.api.verify_playlist(playlist_id).await {
            if let Some(stop) = terminal_outcome(&e) {
                warn!(error = %e, "Terminal signal while validating playlist access");
                return Ok(self.finish(
                    run_id,
                    playlist_id,
                    stop,
                    options.dry_run,
                    PlanSummary::default(),
                    MutationOutcome::default(),
                ));
            }
            return Err(SyncError::PlaylistInaccessible {
                playlist_id: playlist_id.to_string(),
                reason: e.to_string(),
            });
        }

        let mut state = match self
            .store
            .load_or_fetch(self.api.as_ref(), playlist_id, options.force_refresh)
            .await
        {
            Ok(state) => state,
            Err(e) => return self.stop_or_err(run_id, playlist_id, options.dry_run, e),
        };

        // Health check: never plan against malformed state
        if !state.is_structurally_valid() {
            warn!("Playlist state failed health check; forcing refresh");
            state = match self
                .store
                .load_or_fetch(self.api.as_ref(), playlist_id, true)
                .await
            {
                Ok(state) => state,
                Err(e) => return self.stop_or_err(run_id, playlist_id, options.dry_run, e),
            };
        }

        let plan = match PlanBuilder::new(self.api.as_ref())
            .build(candidates, &state, roster)
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                return self.stop_or_err(run_id, playlist_id, options.dry_run, SyncError::from(e))
            }
        };

        let summary = PlanSummary::from(&plan);
        self.events
            .emit(SyncEvent::PlanReady {
                run_id: run_id.clone(),
                already_present: summary.already_present,
                to_add: summary.to_add,
                to_replace: summary.to_replace,
                removals: summary.removals,
                skipped_worse: summary.skipped_worse,
            })
            .ok();
        info!(
            already_present = summary.already_present,
            to_add = summary.to_add,
            to_replace = summary.to_replace,
            removals = summary.removals,
            skipped_worse = summary.skipped_worse,
            "Plan ready"
        );

        if options.dry_run {
            debug!("Dry run; no mutations applied");
            return Ok(self.finish(
                run_id,
                playlist_id,
                RunOutcome::Completed,
                true,
                summary,
                MutationOutcome::default(),
            ));
        }

        let executor = MutationExecutor::new(self.api.as_ref(), &self.store, &self.events, &self.config);
        let (mutations, outcome) = executor.execute(&run_id, &plan, &mut state).await?;

        Ok(self.finish(run_id, playlist_id, outcome, false, summary, mutations))
    }

    fn finish(
        &self,
        run_id: String,
        playlist_id: &str,
        outcome: RunOutcome,
        dry_run: bool,
        plan: PlanSummary,
        mutations: MutationOutcome,
    ) -> SyncReport {
        self.events
            .emit(SyncEvent::Completed {
                run_id: run_id.clone(),
                outcome: outcome.as_str().to_string(),
                added: mutations.added,
                replaced: mutations.replaced,
                removed: mutations.removed,
                failed: mutations.failed,
            })
            .ok();

        info!(outcome = outcome.as_str(), dry_run, "Pass finished");

        SyncReport {
            run_id,
            playlist_id: playlist_id.to_string(),
            outcome,
            dry_run,
            plan,
            mutations,
        }
    }

    /// Map a pre-execution terminal signal to a clean stop; anything else
    /// propagates as the error it is.
    fn stop_or_err(
        &self,
        run_id: String,
        playlist_id: &str,
        dry_run: bool,
        err: SyncError,
    ) -> Result<SyncReport> {
        if let SyncError::Api(api_err) = &err {
            if let Some(stop) = terminal_outcome(api_err) {
                warn!(error = %err, "Terminal signal before execution; stopping pass");
                return Ok(self.finish(
                    run_id,
                    playlist_id,
                    stop,
                    dry_run,
                    PlanSummary::default(),
                    MutationOutcome::default(),
                ));
            }
        }
        Err(err)
    }
}
