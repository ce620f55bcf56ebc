//! Person merge engine.
//!
//! Collapses two person records into one survivor: field conflicts are
//! resolved per group, every relation of the absorbed person is moved or
//! deduplicated onto the survivor, and the absorbed record is deleted, all
//! inside a single [`store::MergeUnitOfWork`].

pub mod conflict;
pub mod error;
pub mod migrate;
pub mod orchestrator;
pub mod preview;
pub mod request;
pub mod slug;
pub mod stats;
pub mod store;
pub mod survivor;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{MergeError, MergeState, StoreError, StoreResult};
pub use orchestrator::{execute_merge, invalidate_merge_caches, MergeOutcome};
pub use preview::{build_preview, MergePreview};
pub use request::{MergeRequest, MergeResolutions, Operand, PreviewRequest, Resolution, ValidatedMerge};
pub use stats::{MergeStats, MergeStatsReport, RelationStats};
pub use store::MergeUnitOfWork;
