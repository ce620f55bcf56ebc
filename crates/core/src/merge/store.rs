//! Unit-of-work traits consumed by the merge engine.
//!
//! One trait per relation type. A [`MergeUnitOfWork`] bundles them over a
//! single transaction; nothing written through it is visible until
//! [`MergeUnitOfWork::commit`] succeeds, and dropping it or calling
//! [`MergeUnitOfWork::rollback`] discards every write.

use async_trait::async_trait;

use super::error::StoreResult;
use crate::person::{
    AlternativeName, CastCredit, CreditCounts, CrewCredit, ImageAppearance, JurySeat, Nationality,
    Person, PersonLink, PersonUpdate,
};
use crate::types::DbId;

#[async_trait]
pub trait PersonStore: Send {
    async fn find_person(&mut self, id: DbId) -> StoreResult<Option<Person>>;

    async fn count_credits(&mut self, person_id: DbId) -> StoreResult<CreditCounts>;

    /// Id of the person currently holding `slug`, if any.
    async fn find_person_id_by_slug(&mut self, slug: &str) -> StoreResult<Option<DbId>>;

    async fn update_person(&mut self, id: DbId, update: &PersonUpdate) -> StoreResult<()>;

    async fn delete_person(&mut self, id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait AlternativeNameStore: Send {
    async fn list_alternative_names(&mut self, person_id: DbId)
        -> StoreResult<Vec<AlternativeName>>;

    async fn create_alternative_name(
        &mut self,
        person_id: DbId,
        full_name: &str,
    ) -> StoreResult<AlternativeName>;

    async fn transfer_alternative_name(&mut self, id: DbId, person_id: DbId) -> StoreResult<()>;

    async fn delete_alternative_name(&mut self, id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait CastCreditStore: Send {
    async fn list_cast_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CastCredit>>;

    async fn set_character_name(&mut self, id: DbId, character_name: &str) -> StoreResult<()>;

    async fn transfer_cast_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()>;

    async fn delete_cast_credit(&mut self, id: DbId) -> StoreResult<()>;

    /// Point every cast credit referencing alternative name `from` at `to`.
    async fn repoint_cast_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64>;
}

#[async_trait]
pub trait CrewCreditStore: Send {
    async fn list_crew_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CrewCredit>>;

    async fn transfer_crew_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()>;

    async fn delete_crew_credit(&mut self, id: DbId) -> StoreResult<()>;

    /// Point every crew credit referencing alternative name `from` at `to`.
    async fn repoint_crew_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64>;
}

#[async_trait]
pub trait PersonLinkStore: Send {
    async fn list_links(&mut self, person_id: DbId) -> StoreResult<Vec<PersonLink>>;

    async fn transfer_link(&mut self, id: DbId, person_id: DbId) -> StoreResult<()>;

    async fn delete_link(&mut self, id: DbId) -> StoreResult<()>;
}

/// Composite-key relation: rows are deleted and re-inserted, never updated.
#[async_trait]
pub trait NationalityStore: Send {
    async fn list_nationalities(&mut self, person_id: DbId) -> StoreResult<Vec<Nationality>>;

    async fn insert_nationality(&mut self, nationality: &Nationality) -> StoreResult<()>;

    async fn delete_nationality(&mut self, person_id: DbId, location_id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait ImageAppearanceStore: Send {
    async fn list_image_appearances(&mut self, person_id: DbId)
        -> StoreResult<Vec<ImageAppearance>>;

    async fn transfer_image_appearance(&mut self, id: DbId, person_id: DbId) -> StoreResult<()>;

    async fn delete_image_appearance(&mut self, id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait JurySeatStore: Send {
    async fn list_jury_seats(&mut self, person_id: DbId) -> StoreResult<Vec<JurySeat>>;

    async fn transfer_jury_seat(&mut self, id: DbId, person_id: DbId) -> StoreResult<()>;

    async fn delete_jury_seat(&mut self, id: DbId) -> StoreResult<()>;
}

#[async_trait]
pub trait AwardRecipientStore: Send {
    async fn count_awards(&mut self, person_id: DbId) -> StoreResult<i64>;

    /// Move every award received by `from` to `to`. Returns rows moved.
    async fn reassign_awards(&mut self, from: DbId, to: DbId) -> StoreResult<u64>;
}

#[async_trait]
pub trait AwardWinnerStore: Send {
    async fn count_award_wins(&mut self, person_id: DbId) -> StoreResult<i64>;

    async fn reassign_award_wins(&mut self, from: DbId, to: DbId) -> StoreResult<u64>;
}

#[async_trait]
pub trait PageViewStore: Send {
    async fn count_page_views(&mut self, person_id: DbId) -> StoreResult<i64>;

    async fn reassign_page_views(&mut self, from: DbId, to: DbId) -> StoreResult<u64>;
}

/// All relation stores over one transaction.
#[async_trait]
pub trait MergeUnitOfWork:
    PersonStore
    + AlternativeNameStore
    + CastCreditStore
    + CrewCreditStore
    + PersonLinkStore
    + NationalityStore
    + ImageAppearanceStore
    + JurySeatStore
    + AwardRecipientStore
    + AwardWinnerStore
    + PageViewStore
{
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
