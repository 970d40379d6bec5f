//! # Playlist Reconciliation Engine
//!
//! Reconciles a target playlist's remote membership against the computed
//! expected set, surviving quota exhaustion and partial failures without
//! data loss, duplicate inserts, or quality regressions.
//!
//! ## Components
//!
//! - **Remote State Cache** (`state`, `cache`): versioned, TTL'd snapshot of
//!   playlist membership, persisted atomically and rebuilt from the remote
//!   whenever it cannot be trusted
//! - **Plan Builder** (`plan`): diffs candidates against the cached state
//!   into add / replace / skip decisions plus roster-driven removals
//! - **Mutation Executor** (`executor`): applies the plan strictly
//!   sequentially, checkpointing durable state after every successful
//!   mutation and converting terminal quota/auth signals into a clean stop
//! - **Sync Engine** (`engine`): sequences one full pass for a playlist —
//!   tripwire check, access validation, state load, plan, execute — and
//!   narrates it over the event bus
//!
//! ## Workflow
//!
//! 1. Short-circuit if the session quota tripwire is already set
//! 2. Validate playlist access (fails before any mutation)
//! 3. Load the cached playlist state, or page it from the remote
//! 4. Resolve unknown video definitions, then compute the plan
//! 5. Apply replacements (insert-before-delete), additions, removals
//! 6. Report a [`RunOutcome`] with a stable process exit code

pub mod cache;
pub mod engine;
pub mod error;
pub mod executor;
pub mod plan;
pub mod state;

pub use cache::StateStore;
pub use engine::{PlanSummary, RunOptions, SyncEngine, SyncReport};
pub use error::{Result, SyncError};
pub use executor::{MutationExecutor, MutationOutcome, RunOutcome};
pub use plan::{Plan, PlanBuilder, Removal, Replacement};
pub use state::{RemoteItem, RemotePlaylistState, TrackedQuality, CACHE_VERSION};
