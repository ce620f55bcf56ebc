//! Postgres implementation of the merge unit of work.

use std::time::Duration;

use async_trait::async_trait;
use cinecat_core::merge::store::{
    AlternativeNameStore, AwardRecipientStore, AwardWinnerStore, CastCreditStore,
    CrewCreditStore, ImageAppearanceStore, JurySeatStore, MergeUnitOfWork, NationalityStore,
    PageViewStore, PersonLinkStore, PersonStore,
};
use cinecat_core::merge::{StoreError, StoreResult};
use cinecat_core::person::{
    AlternativeName, CastCredit, CreditCounts, CrewCredit, ImageAppearance, JurySeat, Nationality,
    Person, PersonLink, PersonUpdate,
};
use cinecat_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories::{
    AlternativeNameRepo, CastCreditRepo, CrewCreditRepo, FestivalAwardWinnerRepo,
    ImageAppearanceRepo, JurySeatRepo, MovieAwardRepo, NationalityRepo, PageViewRepo,
    PersonLinkRepo, PersonRepo,
};

fn failed(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::new(operation, e)
}

/// Turn a "row touched" flag into an error when the row was missing.
fn require_row(operation: &'static str, found: bool) -> StoreResult<()> {
    if found {
        Ok(())
    } else {
        Err(StoreError::new(operation, "no matching row"))
    }
}

/// All merge writes on one Postgres transaction.
///
/// Dropping the value without calling `commit` rolls the transaction back.
pub struct PgMergeUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PgMergeUnitOfWork {
    /// Open a transaction whose statements are each bounded by `timeout`.
    pub async fn begin(pool: &PgPool, timeout: Duration) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SELECT set_config('statement_timeout', $1, true)")
            .bind(format!("{}ms", timeout.as_millis()))
            .execute(&mut *tx)
            .await?;
        Ok(Self { tx })
    }
}

#[async_trait]
impl PersonStore for PgMergeUnitOfWork {
    async fn find_person(&mut self, id: DbId) -> StoreResult<Option<Person>> {
        PersonRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(failed("find person"))
    }

    async fn count_credits(&mut self, person_id: DbId) -> StoreResult<CreditCounts> {
        PersonRepo::count_credits(&mut self.tx, person_id)
            .await
            .map_err(failed("count credits"))
    }

    async fn find_person_id_by_slug(&mut self, slug: &str) -> StoreResult<Option<DbId>> {
        PersonRepo::find_id_by_slug(&mut self.tx, slug)
            .await
            .map_err(failed("find person by slug"))
    }

    async fn update_person(&mut self, id: DbId, update: &PersonUpdate) -> StoreResult<()> {
        const OP: &str = "update person";
        let found = PersonRepo::update(&mut self.tx, id, update)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_person(&mut self, id: DbId) -> StoreResult<()> {
        const OP: &str = "delete person";
        let found = PersonRepo::delete(&mut self.tx, id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }
}

#[async_trait]
impl AlternativeNameStore for PgMergeUnitOfWork {
    async fn list_alternative_names(
        &mut self,
        person_id: DbId,
    ) -> StoreResult<Vec<AlternativeName>> {
        AlternativeNameRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list alternative names"))
    }

    async fn create_alternative_name(
        &mut self,
        person_id: DbId,
        full_name: &str,
    ) -> StoreResult<AlternativeName> {
        AlternativeNameRepo::create(&mut self.tx, person_id, full_name)
            .await
            .map_err(failed("create alternative name"))
    }

    async fn transfer_alternative_name(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer alternative name";
        let found = AlternativeNameRepo::transfer(&mut self.tx, id, person_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_alternative_name(&mut self, id: DbId) -> StoreResult<()> {
        AlternativeNameRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete alternative name"))
    }
}

#[async_trait]
impl CastCreditStore for PgMergeUnitOfWork {
    async fn list_cast_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CastCredit>> {
        CastCreditRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list cast credits"))
    }

    async fn set_character_name(&mut self, id: DbId, character_name: &str) -> StoreResult<()> {
        const OP: &str = "set character name";
        let found = CastCreditRepo::set_character_name(&mut self.tx, id, character_name)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn transfer_cast_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()> {
        const OP: &str = "transfer cast credit";
        let found = CastCreditRepo::transfer(&mut self.tx, id, person_id, alternative_name_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_cast_credit(&mut self, id: DbId) -> StoreResult<()> {
        CastCreditRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete cast credit"))
    }

    async fn repoint_cast_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        CastCreditRepo::repoint_alternative_name(&mut self.tx, from, to)
            .await
            .map_err(failed("repoint cast alternative name"))
    }
}

#[async_trait]
impl CrewCreditStore for PgMergeUnitOfWork {
    async fn list_crew_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CrewCredit>> {
        CrewCreditRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list crew credits"))
    }

    async fn transfer_crew_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()> {
        const OP: &str = "transfer crew credit";
        let found = CrewCreditRepo::transfer(&mut self.tx, id, person_id, alternative_name_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_crew_credit(&mut self, id: DbId) -> StoreResult<()> {
        CrewCreditRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete crew credit"))
    }

    async fn repoint_crew_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        CrewCreditRepo::repoint_alternative_name(&mut self.tx, from, to)
            .await
            .map_err(failed("repoint crew alternative name"))
    }
}

#[async_trait]
impl PersonLinkStore for PgMergeUnitOfWork {
    async fn list_links(&mut self, person_id: DbId) -> StoreResult<Vec<PersonLink>> {
        PersonLinkRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list links"))
    }

    async fn transfer_link(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer link";
        let found = PersonLinkRepo::transfer(&mut self.tx, id, person_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_link(&mut self, id: DbId) -> StoreResult<()> {
        PersonLinkRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete link"))
    }
}

#[async_trait]
impl NationalityStore for PgMergeUnitOfWork {
    async fn list_nationalities(&mut self, person_id: DbId) -> StoreResult<Vec<Nationality>> {
        NationalityRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list nationalities"))
    }

    async fn insert_nationality(&mut self, nationality: &Nationality) -> StoreResult<()> {
        NationalityRepo::insert(&mut self.tx, nationality)
            .await
            .map_err(failed("insert nationality"))
    }

    async fn delete_nationality(&mut self, person_id: DbId, location_id: DbId) -> StoreResult<()> {
        NationalityRepo::delete(&mut self.tx, person_id, location_id)
            .await
            .map(drop)
            .map_err(failed("delete nationality"))
    }
}

#[async_trait]
impl ImageAppearanceStore for PgMergeUnitOfWork {
    async fn list_image_appearances(
        &mut self,
        person_id: DbId,
    ) -> StoreResult<Vec<ImageAppearance>> {
        ImageAppearanceRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list image appearances"))
    }

    async fn transfer_image_appearance(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer image appearance";
        let found = ImageAppearanceRepo::transfer(&mut self.tx, id, person_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_image_appearance(&mut self, id: DbId) -> StoreResult<()> {
        ImageAppearanceRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete image appearance"))
    }
}

#[async_trait]
impl JurySeatStore for PgMergeUnitOfWork {
    async fn list_jury_seats(&mut self, person_id: DbId) -> StoreResult<Vec<JurySeat>> {
        JurySeatRepo::list_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("list jury seats"))
    }

    async fn transfer_jury_seat(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer jury seat";
        let found = JurySeatRepo::transfer(&mut self.tx, id, person_id)
            .await
            .map_err(failed(OP))?;
        require_row(OP, found)
    }

    async fn delete_jury_seat(&mut self, id: DbId) -> StoreResult<()> {
        JurySeatRepo::delete(&mut self.tx, id)
            .await
            .map(drop)
            .map_err(failed("delete jury seat"))
    }
}

#[async_trait]
impl AwardRecipientStore for PgMergeUnitOfWork {
    async fn count_awards(&mut self, person_id: DbId) -> StoreResult<i64> {
        MovieAwardRepo::count_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("count awards"))
    }

    async fn reassign_awards(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        MovieAwardRepo::reassign(&mut self.tx, from, to)
            .await
            .map_err(failed("reassign awards"))
    }
}

#[async_trait]
impl AwardWinnerStore for PgMergeUnitOfWork {
    async fn count_award_wins(&mut self, person_id: DbId) -> StoreResult<i64> {
        FestivalAwardWinnerRepo::count_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("count award wins"))
    }

    async fn reassign_award_wins(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        FestivalAwardWinnerRepo::reassign(&mut self.tx, from, to)
            .await
            .map_err(failed("reassign award wins"))
    }
}

#[async_trait]
impl PageViewStore for PgMergeUnitOfWork {
    async fn count_page_views(&mut self, person_id: DbId) -> StoreResult<i64> {
        PageViewRepo::count_by_person(&mut self.tx, person_id)
            .await
            .map_err(failed("count page views"))
    }

    async fn reassign_page_views(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        PageViewRepo::reassign(&mut self.tx, from, to)
            .await
            .map_err(failed("reassign page views"))
    }
}

#[async_trait]
impl MergeUnitOfWork for PgMergeUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(failed("commit"))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await.map_err(failed("rollback"))
    }
}
