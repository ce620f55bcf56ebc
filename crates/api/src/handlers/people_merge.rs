//! Handlers for merging duplicate people.
//!
//! A merge runs inside one `PgMergeUnitOfWork`. `MERGE_TIMEOUT_SECS` bounds
//! both the pipeline and each statement; commit is never cut off. Stale
//! cache entries are purged only after the transaction has committed.
//!
//! Callers must not run two merges that share an operand at the same time.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use cinecat_core::error::CoreError;
use cinecat_core::merge::{
    build_preview, execute_merge, invalidate_merge_caches, MergeOutcome, MergePreview,
    MergeRequest, MergeStatsReport, PreviewRequest,
};
use cinecat_core::types::DbId;
use cinecat_db::PgMergeUnitOfWork;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub success: bool,
    pub survivor_id: DbId,
    pub absorbed_id: DbId,
    pub survivor_slug: String,
    pub stats: MergeStatsReport,
}

impl From<&MergeOutcome> for MergeResponse {
    fn from(outcome: &MergeOutcome) -> Self {
        Self {
            success: true,
            survivor_id: outcome.survivor_id,
            absorbed_id: outcome.absorbed_id,
            survivor_slug: outcome.survivor_slug.clone(),
            stats: MergeStatsReport::from(&outcome.stats),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// POST /api/v1/people/merge
///
/// Merge two people into one. The survivor keeps its id; the other record
/// is deleted after all of its relations have moved over.
pub async fn merge_people(
    State(state): State<AppState>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> AppResult<Json<MergeResponse>> {
    let Json(body) = payload?;
    let request = body.validate()?;

    let timeout = Duration::from_secs(state.config.merge_timeout_secs);

    let uow = PgMergeUnitOfWork::begin(&state.pool, timeout)
        .await
        .map_err(|e| AppError::MergeFailed(format!("Could not open merge transaction: {e}")))?;

    let outcome = execute_merge(Box::new(uow), request, timeout).await?;

    invalidate_merge_caches(state.invalidator.as_ref(), &outcome).await;

    Ok(Json(MergeResponse::from(&outcome)))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// POST /api/v1/people/merge/preview
///
/// Compare two people without changing anything. Unknown ids are a 404
/// here, unlike the merge itself.
pub async fn preview_merge(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> AppResult<Json<MergePreview>> {
    let Json(body) = payload?;
    let (a, b) = body.validate()?;

    let timeout = Duration::from_secs(state.config.merge_timeout_secs);
    let uow = PgMergeUnitOfWork::begin(&state.pool, timeout).await?;

    let preview = build_preview(Box::new(uow), a, b)
        .await
        .map_err(CoreError::from)?;

    Ok(Json(preview))
}
