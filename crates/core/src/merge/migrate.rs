//! Relation migration from the absorbed person to the survivor.
//!
//! [`plan_migration`] is the dedup-key algorithm shared by every relation:
//! each absorbed row is either transferred to the survivor or, when the
//! survivor already holds a row with the same key, collapsed into it.
//! [`RelationMigrator`] supplies the per-relation key, storage calls and
//! reconciliation rule; [`migrate_relation`] drives it. Relations without a
//! per-person uniqueness constraint skip the check and go through
//! [`BulkReassigner`] instead.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;

use super::error::StoreResult;
use super::stats::RelationStats;
use super::store::MergeUnitOfWork;
use crate::names::normalize_for_comparison;
use crate::person::{
    AlternativeName, CastCredit, CrewCredit, ImageAppearance, JurySeat, Nationality, PersonLink,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Dedup-key planning
// ---------------------------------------------------------------------------

/// What happens to one absorbed row.
#[derive(Debug, PartialEq)]
pub enum RowAction<'a, R> {
    /// No survivor row shares the key: re-own the row.
    Transfer(&'a R),
    /// `kept` already holds the key: reconcile into it and delete `dropped`.
    Collapse { dropped: &'a R, kept: &'a R },
}

/// Decide transfer vs collapse for every absorbed row, in input order.
///
/// Rows transferred earlier in the same pass count as held by the survivor,
/// so the result never leaves two survivor rows with the same key.
pub fn plan_migration<'a, R, K, F>(
    survivor_rows: &'a [R],
    absorbed_rows: &'a [R],
    key: F,
) -> Vec<RowAction<'a, R>>
where
    K: Eq + Hash,
    F: Fn(&R) -> K,
{
    let mut held: HashMap<K, &'a R> = HashMap::with_capacity(survivor_rows.len());
    for row in survivor_rows {
        held.entry(key(row)).or_insert(row);
    }

    absorbed_rows
        .iter()
        .map(|row| match held.entry(key(row)) {
            Entry::Occupied(existing) => RowAction::Collapse {
                dropped: row,
                kept: *existing.get(),
            },
            Entry::Vacant(slot) => {
                slot.insert(row);
                RowAction::Transfer(row)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Migrator contract
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RelationMigrator: Send + Sync {
    type Row: Send + Sync;
    type Key: Eq + Hash + Send;

    /// Relation name used in logs.
    const NAME: &'static str;

    fn key(&self, row: &Self::Row) -> Self::Key;

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<Self::Row>>;

    /// Fold anything worth keeping from `dropped` into `kept`.
    async fn reconcile(
        &mut self,
        _uow: &mut dyn MergeUnitOfWork,
        _kept: &Self::Row,
        _dropped: &Self::Row,
    ) -> StoreResult<()> {
        Ok(())
    }

    async fn collapse(&self, uow: &mut dyn MergeUnitOfWork, dropped: &Self::Row)
        -> StoreResult<()>;

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &Self::Row,
        survivor_id: DbId,
    ) -> StoreResult<()>;
}

/// Run the dedup-key algorithm for one relation.
pub async fn migrate_relation<M: RelationMigrator>(
    migrator: &mut M,
    uow: &mut dyn MergeUnitOfWork,
    survivor_id: DbId,
    absorbed_id: DbId,
) -> StoreResult<RelationStats> {
    let survivor_rows = migrator.load(uow, survivor_id).await?;
    let absorbed_rows = migrator.load(uow, absorbed_id).await?;
    let plan = {
        let m = &*migrator;
        plan_migration(&survivor_rows, &absorbed_rows, |row| m.key(row))
    };

    let mut stats = RelationStats::default();
    for action in plan {
        match action {
            RowAction::Collapse { dropped, kept } => {
                migrator.reconcile(uow, kept, dropped).await?;
                migrator.collapse(uow, dropped).await?;
                stats.deleted += 1;
            }
            RowAction::Transfer(row) => {
                migrator.transfer(uow, row, survivor_id).await?;
                stats.transferred += 1;
            }
        }
    }

    tracing::debug!(
        relation = M::NAME,
        transferred = stats.transferred,
        deleted = stats.deleted,
        "Relation migrated"
    );
    Ok(stats)
}

/// Relations reassigned with one bulk owner update.
#[async_trait]
pub trait BulkReassigner: Send + Sync {
    const NAME: &'static str;

    async fn reassign(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        from: DbId,
        to: DbId,
    ) -> StoreResult<u64>;
}

pub async fn reassign_relation<B: BulkReassigner>(
    reassigner: &B,
    uow: &mut dyn MergeUnitOfWork,
    survivor_id: DbId,
    absorbed_id: DbId,
) -> StoreResult<RelationStats> {
    let moved = reassigner.reassign(uow, absorbed_id, survivor_id).await?;
    tracing::debug!(relation = B::NAME, transferred = moved, "Relation reassigned");
    Ok(RelationStats {
        transferred: moved,
        deleted: 0,
    })
}

// ---------------------------------------------------------------------------
// Alternative names
// ---------------------------------------------------------------------------

/// Old alternative-name id to the id that survives the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltNameRemap(HashMap<DbId, DbId>);

impl AltNameRemap {
    pub fn insert(&mut self, from: DbId, to: DbId) {
        self.0.insert(from, to);
    }

    /// Map a credit's alternative-name reference through the remap.
    pub fn resolve(&self, id: Option<DbId>) -> Option<DbId> {
        id.map(|id| self.0.get(&id).copied().unwrap_or(id))
    }
}

/// Keyed on the accent/case-normalized full name.
///
/// Collapsing a name repoints every credit that referenced it and records
/// the mapping in [`AlternativeNameMigrator::remap`].
#[derive(Debug, Default)]
pub struct AlternativeNameMigrator {
    pub remap: AltNameRemap,
}

#[async_trait]
impl RelationMigrator for AlternativeNameMigrator {
    type Row = AlternativeName;
    type Key = String;

    const NAME: &'static str = "alternative_names";

    fn key(&self, row: &AlternativeName) -> String {
        normalize_for_comparison(&row.full_name)
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<AlternativeName>> {
        uow.list_alternative_names(person_id).await
    }

    async fn reconcile(
        &mut self,
        uow: &mut dyn MergeUnitOfWork,
        kept: &AlternativeName,
        dropped: &AlternativeName,
    ) -> StoreResult<()> {
        uow.repoint_cast_alternative_name(dropped.id, kept.id).await?;
        uow.repoint_crew_alternative_name(dropped.id, kept.id).await?;
        self.remap.insert(dropped.id, kept.id);
        Ok(())
    }

    async fn collapse(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        dropped: &AlternativeName,
    ) -> StoreResult<()> {
        uow.delete_alternative_name(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &AlternativeName,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        uow.transfer_alternative_name(row.id, survivor_id).await
    }
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// Keyed on movie. A collapsed credit donates its character name when the
/// survivor's credit has none.
pub struct CastCreditMigrator<'a> {
    pub remap: &'a AltNameRemap,
}

#[async_trait]
impl RelationMigrator for CastCreditMigrator<'_> {
    type Row = CastCredit;
    type Key = DbId;

    const NAME: &'static str = "cast_credits";

    fn key(&self, row: &CastCredit) -> DbId {
        row.movie_id
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<CastCredit>> {
        uow.list_cast_credits(person_id).await
    }

    async fn reconcile(
        &mut self,
        uow: &mut dyn MergeUnitOfWork,
        kept: &CastCredit,
        dropped: &CastCredit,
    ) -> StoreResult<()> {
        let kept_empty = kept
            .character_name
            .as_deref()
            .map_or(true, |s| s.trim().is_empty());
        match dropped.character_name.as_deref() {
            Some(name) if kept_empty && !name.trim().is_empty() => {
                uow.set_character_name(kept.id, name).await
            }
            _ => Ok(()),
        }
    }

    async fn collapse(&self, uow: &mut dyn MergeUnitOfWork, dropped: &CastCredit) -> StoreResult<()> {
        uow.delete_cast_credit(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &CastCredit,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        let alternative_name_id = self.remap.resolve(row.alternative_name_id);
        uow.transfer_cast_credit(row.id, survivor_id, alternative_name_id)
            .await
    }
}

/// Keyed on (movie, role).
pub struct CrewCreditMigrator<'a> {
    pub remap: &'a AltNameRemap,
}

#[async_trait]
impl RelationMigrator for CrewCreditMigrator<'_> {
    type Row = CrewCredit;
    type Key = (DbId, DbId);

    const NAME: &'static str = "crew_credits";

    fn key(&self, row: &CrewCredit) -> (DbId, DbId) {
        (row.movie_id, row.role_id)
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<CrewCredit>> {
        uow.list_crew_credits(person_id).await
    }

    async fn collapse(&self, uow: &mut dyn MergeUnitOfWork, dropped: &CrewCredit) -> StoreResult<()> {
        uow.delete_crew_credit(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &CrewCredit,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        let alternative_name_id = self.remap.resolve(row.alternative_name_id);
        uow.transfer_crew_credit(row.id, survivor_id, alternative_name_id)
            .await
    }
}

// ---------------------------------------------------------------------------
// Links, nationalities, images, jury seats
// ---------------------------------------------------------------------------

/// Keyed on the URL exactly as stored.
pub struct PersonLinkMigrator;

#[async_trait]
impl RelationMigrator for PersonLinkMigrator {
    type Row = PersonLink;
    type Key = String;

    const NAME: &'static str = "links";

    fn key(&self, row: &PersonLink) -> String {
        row.url.clone()
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<PersonLink>> {
        uow.list_links(person_id).await
    }

    async fn collapse(&self, uow: &mut dyn MergeUnitOfWork, dropped: &PersonLink) -> StoreResult<()> {
        uow.delete_link(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &PersonLink,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        uow.transfer_link(row.id, survivor_id).await
    }
}

/// Keyed on location. The owner is part of the primary key, so a transfer
/// deletes the absorbed row and inserts a copy under the survivor.
pub struct NationalityMigrator;

#[async_trait]
impl RelationMigrator for NationalityMigrator {
    type Row = Nationality;
    type Key = DbId;

    const NAME: &'static str = "nationalities";

    fn key(&self, row: &Nationality) -> DbId {
        row.location_id
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<Nationality>> {
        uow.list_nationalities(person_id).await
    }

    async fn collapse(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        dropped: &Nationality,
    ) -> StoreResult<()> {
        uow.delete_nationality(dropped.person_id, dropped.location_id)
            .await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &Nationality,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        uow.delete_nationality(row.person_id, row.location_id).await?;
        uow.insert_nationality(&Nationality {
            person_id: survivor_id,
            location_id: row.location_id,
            is_primary: row.is_primary,
        })
        .await
    }
}

/// Keyed on image.
pub struct ImageAppearanceMigrator;

#[async_trait]
impl RelationMigrator for ImageAppearanceMigrator {
    type Row = ImageAppearance;
    type Key = DbId;

    const NAME: &'static str = "image_appearances";

    fn key(&self, row: &ImageAppearance) -> DbId {
        row.image_id
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<ImageAppearance>> {
        uow.list_image_appearances(person_id).await
    }

    async fn collapse(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        dropped: &ImageAppearance,
    ) -> StoreResult<()> {
        uow.delete_image_appearance(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &ImageAppearance,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        uow.transfer_image_appearance(row.id, survivor_id).await
    }
}

/// Keyed on festival section: one seat per person per section.
pub struct JurySeatMigrator;

#[async_trait]
impl RelationMigrator for JurySeatMigrator {
    type Row = JurySeat;
    type Key = DbId;

    const NAME: &'static str = "jury_seats";

    fn key(&self, row: &JurySeat) -> DbId {
        row.section_id
    }

    async fn load(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        person_id: DbId,
    ) -> StoreResult<Vec<JurySeat>> {
        uow.list_jury_seats(person_id).await
    }

    async fn collapse(&self, uow: &mut dyn MergeUnitOfWork, dropped: &JurySeat) -> StoreResult<()> {
        uow.delete_jury_seat(dropped.id).await
    }

    async fn transfer(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        row: &JurySeat,
        survivor_id: DbId,
    ) -> StoreResult<()> {
        uow.transfer_jury_seat(row.id, survivor_id).await
    }
}

// ---------------------------------------------------------------------------
// Bulk reassignments
// ---------------------------------------------------------------------------

pub struct AwardRecipientReassigner;

#[async_trait]
impl BulkReassigner for AwardRecipientReassigner {
    const NAME: &'static str = "awards";

    async fn reassign(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        from: DbId,
        to: DbId,
    ) -> StoreResult<u64> {
        uow.reassign_awards(from, to).await
    }
}

pub struct AwardWinnerReassigner;

#[async_trait]
impl BulkReassigner for AwardWinnerReassigner {
    const NAME: &'static str = "award_wins";

    async fn reassign(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        from: DbId,
        to: DbId,
    ) -> StoreResult<u64> {
        uow.reassign_award_wins(from, to).await
    }
}

pub struct PageViewReassigner;

#[async_trait]
impl BulkReassigner for PageViewReassigner {
    const NAME: &'static str = "page_views";

    async fn reassign(
        &self,
        uow: &mut dyn MergeUnitOfWork,
        from: DbId,
        to: DbId,
    ) -> StoreResult<u64> {
        uow.reassign_page_views(from, to).await
    }
}
