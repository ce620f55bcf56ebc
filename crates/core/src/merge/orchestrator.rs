//! The merge pipeline.
//!
//! [`execute_merge`] runs every step inside one [`MergeUnitOfWork`] and
//! either commits it or rolls it back. The deadline bounds the pipeline
//! steps only: once they finish, commit runs to completion. Cache
//! invalidation is a separate post-commit step ([`invalidate_merge_caches`]).
//!
//! Two merges that share an operand must not run concurrently; callers are
//! expected to serialize them. Nothing here takes row locks.

use std::time::Duration;

use super::conflict::resolve_fields;
use super::error::{MergeError, MergeState, StoreError};
use super::migrate::{
    migrate_relation, reassign_relation, AlternativeNameMigrator, AwardRecipientReassigner,
    AwardWinnerReassigner, CastCreditMigrator, CrewCreditMigrator, ImageAppearanceMigrator,
    JurySeatMigrator, NationalityMigrator, PageViewReassigner, PersonLinkMigrator,
};
use super::request::{Operand, ValidatedMerge};
use super::slug::regenerate_slug;
use super::stats::MergeStats;
use super::store::MergeUnitOfWork;
use super::survivor::select_survivor;
use crate::cache::{
    filmography_keys, invalidate_best_effort, person_id_key, person_slug_key, CacheInvalidator,
    PEOPLE_LIST_KEY,
};
use crate::names::names_match;
use crate::types::DbId;

/// Result of a committed merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub survivor_id: DbId,
    pub absorbed_id: DbId,
    /// Survivor slug after the merge.
    pub survivor_slug: String,
    /// Survivor slug before the merge.
    pub previous_slug: String,
    pub absorbed_slug: String,
    /// Alternative name created from the losing name, if any.
    pub alternative_name_added: Option<String>,
    pub stats: MergeStats,
}

impl MergeOutcome {
    pub fn slug_changed(&self) -> bool {
        self.survivor_slug != self.previous_slug
    }

    /// Every cache key made stale by this merge.
    pub fn cache_keys(&self) -> Vec<String> {
        let mut keys = vec![
            person_id_key(self.survivor_id),
            person_id_key(self.absorbed_id),
        ];
        keys.extend(filmography_keys(self.survivor_id));
        keys.extend(filmography_keys(self.absorbed_id));
        keys.push(person_slug_key(&self.previous_slug));
        if self.slug_changed() {
            keys.push(person_slug_key(&self.survivor_slug));
        }
        keys.push(person_slug_key(&self.absorbed_slug));
        keys.push(PEOPLE_LIST_KEY.to_string());
        keys
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Tracks the last completed state so storage failures can report it.
struct Progress {
    state: MergeState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: MergeState::Validated,
        }
    }

    fn advance(&mut self, next: MergeState) {
        tracing::debug!(from = %self.state, to = %next, "Merge state advanced");
        self.state = next;
    }

    fn fail(&self) -> impl FnOnce(StoreError) -> MergeError {
        let state = self.state;
        move |source| MergeError::Storage { state, source }
    }
}

async fn run_pipeline(
    uow: &mut dyn MergeUnitOfWork,
    request: &ValidatedMerge,
    progress: &mut Progress,
) -> Result<MergeOutcome, MergeError> {
    // Loaded
    let person_a = uow
        .find_person(request.person_a_id)
        .await
        .map_err(progress.fail())?
        .ok_or(MergeError::PersonNotFound(request.person_a_id))?;
    let person_b = uow
        .find_person(request.person_b_id)
        .await
        .map_err(progress.fail())?
        .ok_or(MergeError::PersonNotFound(request.person_b_id))?;
    progress.advance(MergeState::Loaded);

    // SurvivorChosen
    let credits_a = uow
        .count_credits(person_a.id)
        .await
        .map_err(progress.fail())?;
    let credits_b = uow
        .count_credits(person_b.id)
        .await
        .map_err(progress.fail())?;
    let survivor_op = select_survivor(request.survivor, credits_a, credits_b);
    let (survivor, absorbed) = match survivor_op {
        Operand::A => (&person_a, &person_b),
        Operand::B => (&person_b, &person_a),
    };
    let survivor_id = survivor.id;
    let absorbed_id = absorbed.id;
    progress.advance(MergeState::SurvivorChosen);

    // FieldsResolved
    let resolution = resolve_fields(&person_a, &person_b, survivor_op, &request.resolutions);
    progress.advance(MergeState::FieldsResolved);

    // AltNamesMigrated
    let mut stats = MergeStats::default();
    let mut alt_names = AlternativeNameMigrator::default();
    stats.alternative_names = migrate_relation(&mut alt_names, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;

    let mut alternative_name_added = None;
    if let Some(losing_name) = resolution.losing_name.as_deref() {
        let existing = uow
            .list_alternative_names(survivor_id)
            .await
            .map_err(progress.fail())?;
        if !existing
            .iter()
            .any(|alt| names_match(&alt.full_name, losing_name))
        {
            uow.create_alternative_name(survivor_id, losing_name)
                .await
                .map_err(progress.fail())?;
            alternative_name_added = Some(losing_name.to_string());
        }
    }
    progress.advance(MergeState::AltNamesMigrated);

    // RelationsMigrated
    let remap = alt_names.remap;
    stats.cast_credits =
        migrate_relation(&mut CastCreditMigrator { remap: &remap }, uow, survivor_id, absorbed_id)
            .await
            .map_err(progress.fail())?;
    stats.crew_credits =
        migrate_relation(&mut CrewCreditMigrator { remap: &remap }, uow, survivor_id, absorbed_id)
            .await
            .map_err(progress.fail())?;
    stats.links = migrate_relation(&mut PersonLinkMigrator, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    stats.nationalities = migrate_relation(&mut NationalityMigrator, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    stats.image_appearances =
        migrate_relation(&mut ImageAppearanceMigrator, uow, survivor_id, absorbed_id)
            .await
            .map_err(progress.fail())?;
    stats.awards = reassign_relation(&AwardRecipientReassigner, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    stats.jury_seats = migrate_relation(&mut JurySeatMigrator, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    stats.award_wins = reassign_relation(&AwardWinnerReassigner, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    stats.page_views = reassign_relation(&PageViewReassigner, uow, survivor_id, absorbed_id)
        .await
        .map_err(progress.fail())?;
    progress.advance(MergeState::RelationsMigrated);

    // SurvivorUpdated
    let has_links = !uow
        .list_links(survivor_id)
        .await
        .map_err(progress.fail())?
        .is_empty();
    let fields = resolution.fields;
    let survivor_slug = if fields.name_differs_from(survivor) {
        regenerate_slug(
            uow,
            survivor_id,
            &survivor.slug,
            fields.first_name.as_deref(),
            fields.last_name.as_deref(),
        )
        .await
        .map_err(progress.fail())?
    } else {
        survivor.slug.clone()
    };
    let update = fields.into_update(survivor_slug.clone(), has_links);
    uow.update_person(survivor_id, &update)
        .await
        .map_err(progress.fail())?;
    progress.advance(MergeState::SurvivorUpdated);

    // AbsorbedDeleted
    uow.delete_person(absorbed_id)
        .await
        .map_err(progress.fail())?;
    progress.advance(MergeState::AbsorbedDeleted);

    Ok(MergeOutcome {
        survivor_id,
        absorbed_id,
        survivor_slug,
        previous_slug: survivor.slug.clone(),
        absorbed_slug: absorbed.slug.clone(),
        alternative_name_added,
        stats,
    })
}

/// Merge two people inside `uow`, committing on success.
///
/// Any failure rolls the unit of work back and leaves both people exactly
/// as they were. Storage failures carry the last state reached. `deadline`
/// applies to the pipeline steps; commit is not subject to it.
pub async fn execute_merge(
    mut uow: Box<dyn MergeUnitOfWork>,
    request: ValidatedMerge,
    deadline: Duration,
) -> Result<MergeOutcome, MergeError> {
    tracing::info!(
        person_a_id = request.person_a_id,
        person_b_id = request.person_b_id,
        survivor = ?request.survivor,
        deadline_secs = deadline.as_secs(),
        "Starting person merge"
    );

    let mut progress = Progress::new();
    let result =
        tokio::time::timeout(deadline, run_pipeline(uow.as_mut(), &request, &mut progress)).await;
    let result = result.unwrap_or_else(|_| {
        Err(MergeError::TimedOut {
            state: progress.state,
            deadline,
        })
    });
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(
                state = %progress.state,
                error = %err,
                "Person merge aborted, rolling back"
            );
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            return Err(err);
        }
    };

    uow.commit().await.map_err(progress.fail())?;
    progress.advance(MergeState::Committed);

    tracing::info!(
        survivor_id = outcome.survivor_id,
        absorbed_id = outcome.absorbed_id,
        survivor_slug = %outcome.survivor_slug,
        stats = ?outcome.stats,
        "Person merge committed"
    );
    Ok(outcome)
}

/// Purge every cache key made stale by `outcome`. Failures are only logged.
pub async fn invalidate_merge_caches(invalidator: &dyn CacheInvalidator, outcome: &MergeOutcome) {
    invalidate_best_effort(invalidator, &outcome.cache_keys()).await;
}
