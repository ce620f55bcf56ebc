//! In-memory unit of work for merge tests.
//!
//! [`MemoryCatalog`] holds the committed state. Each [`MemoryUnitOfWork`]
//! works on a private copy that is written back only on commit. The fake
//! enforces the same uniqueness and reference rules as the database
//! schema, so a migrator that leaves duplicates or dangling rows fails
//! here too.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::error::{StoreError, StoreResult};
use super::store::{
    AlternativeNameStore, AwardRecipientStore, AwardWinnerStore, CastCreditStore,
    CrewCreditStore, ImageAppearanceStore, JurySeatStore, MergeUnitOfWork, NationalityStore,
    PageViewStore, PersonLinkStore, PersonStore,
};
use crate::person::{
    AlternativeName, CastCredit, CreditCounts, CrewCredit, ImageAppearance, JurySeat, Nationality,
    Person, PersonLink, PersonUpdate,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

pub fn person(id: DbId, first_name: &str, last_name: &str) -> Person {
    Person {
        id,
        slug: format!("person-{id}"),
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        real_name: None,
        birth_date: None,
        death_date: None,
        birth_location_id: None,
        death_location_id: None,
        biography: None,
        photo_url: None,
        photo_storage_id: None,
        gender: None,
        imdb_id: None,
        tmdb_id: None,
        tmdb_popularity: None,
        tmdb_popularity_updated_at: None,
        has_links: false,
        hide_age: false,
    }
}

pub fn alt_name(id: DbId, person_id: DbId, full_name: &str) -> AlternativeName {
    AlternativeName {
        id,
        person_id,
        full_name: full_name.to_string(),
    }
}

pub fn cast(id: DbId, movie_id: DbId, person_id: DbId, character: Option<&str>) -> CastCredit {
    CastCredit {
        id,
        movie_id,
        person_id,
        character_name: character.map(str::to_string),
        billing_order: None,
        alternative_name_id: None,
    }
}

pub fn cast_with_alt(id: DbId, movie_id: DbId, person_id: DbId, alt_id: DbId) -> CastCredit {
    CastCredit {
        alternative_name_id: Some(alt_id),
        ..cast(id, movie_id, person_id, None)
    }
}

pub fn crew(id: DbId, movie_id: DbId, person_id: DbId, role_id: DbId) -> CrewCredit {
    CrewCredit {
        id,
        movie_id,
        person_id,
        role_id,
        billing_order: None,
        alternative_name_id: None,
    }
}

pub fn link(id: DbId, person_id: DbId, url: &str) -> PersonLink {
    PersonLink {
        id,
        person_id,
        link_type: "OTHER".to_string(),
        url: url.to_string(),
        title: None,
        display_order: 0,
    }
}

pub fn nationality(person_id: DbId, location_id: DbId, is_primary: bool) -> Nationality {
    Nationality {
        person_id,
        location_id,
        is_primary,
    }
}

pub fn image(id: DbId, image_id: DbId, person_id: DbId) -> ImageAppearance {
    ImageAppearance {
        id,
        image_id,
        person_id,
        position: 0,
    }
}

pub fn jury_seat(id: DbId, section_id: DbId, person_id: DbId) -> JurySeat {
    JurySeat {
        id,
        section_id,
        person_id,
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    people: BTreeMap<DbId, Person>,
    alt_names: BTreeMap<DbId, AlternativeName>,
    cast: BTreeMap<DbId, CastCredit>,
    crew: BTreeMap<DbId, CrewCredit>,
    links: BTreeMap<DbId, PersonLink>,
    nationalities: Vec<Nationality>,
    images: BTreeMap<DbId, ImageAppearance>,
    jury: BTreeMap<DbId, JurySeat>,
    awards: BTreeMap<DbId, u64>,
    award_wins: BTreeMap<DbId, u64>,
    page_views: BTreeMap<DbId, u64>,
    next_id: DbId,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            people: BTreeMap::new(),
            alt_names: BTreeMap::new(),
            cast: BTreeMap::new(),
            crew: BTreeMap::new(),
            links: BTreeMap::new(),
            nationalities: Vec::new(),
            images: BTreeMap::new(),
            jury: BTreeMap::new(),
            awards: BTreeMap::new(),
            award_wins: BTreeMap::new(),
            page_views: BTreeMap::new(),
            next_id: 10_000,
        }
    }
}

fn owned_by<T: Clone>(rows: &BTreeMap<DbId, T>, person_id: DbId, owner: impl Fn(&T) -> DbId) -> Vec<T> {
    rows.values()
        .filter(|row| owner(row) == person_id)
        .cloned()
        .collect()
}

impl CatalogState {
    pub fn person(&self, id: DbId) -> Option<&Person> {
        self.people.get(&id)
    }

    pub fn alternative_names_for(&self, person_id: DbId) -> Vec<AlternativeName> {
        owned_by(&self.alt_names, person_id, |r| r.person_id)
    }

    pub fn cast_for(&self, person_id: DbId) -> Vec<CastCredit> {
        owned_by(&self.cast, person_id, |r| r.person_id)
    }

    pub fn crew_for(&self, person_id: DbId) -> Vec<CrewCredit> {
        owned_by(&self.crew, person_id, |r| r.person_id)
    }

    pub fn links_for(&self, person_id: DbId) -> Vec<PersonLink> {
        owned_by(&self.links, person_id, |r| r.person_id)
    }

    pub fn nationalities_for(&self, person_id: DbId) -> Vec<Nationality> {
        self.nationalities
            .iter()
            .filter(|n| n.person_id == person_id)
            .cloned()
            .collect()
    }

    pub fn images_for(&self, person_id: DbId) -> Vec<ImageAppearance> {
        owned_by(&self.images, person_id, |r| r.person_id)
    }

    pub fn jury_for(&self, person_id: DbId) -> Vec<JurySeat> {
        owned_by(&self.jury, person_id, |r| r.person_id)
    }

    pub fn awards_for(&self, person_id: DbId) -> u64 {
        self.awards.get(&person_id).copied().unwrap_or(0)
    }

    pub fn award_wins_for(&self, person_id: DbId) -> u64 {
        self.award_wins.get(&person_id).copied().unwrap_or(0)
    }

    pub fn page_views_for(&self, person_id: DbId) -> u64 {
        self.page_views.get(&person_id).copied().unwrap_or(0)
    }

    fn is_referenced(&self, person_id: DbId) -> bool {
        self.alt_names.values().any(|r| r.person_id == person_id)
            || self.cast.values().any(|r| r.person_id == person_id)
            || self.crew.values().any(|r| r.person_id == person_id)
            || self.links.values().any(|r| r.person_id == person_id)
            || self.nationalities.iter().any(|r| r.person_id == person_id)
            || self.images.values().any(|r| r.person_id == person_id)
            || self.jury.values().any(|r| r.person_id == person_id)
            || self.awards_for(person_id) > 0
            || self.award_wins_for(person_id) > 0
            || self.page_views_for(person_id) > 0
    }
}

fn violation(operation: &'static str, message: impl Into<String>) -> StoreError {
    StoreError::new(operation, message.into())
}

fn move_count(counts: &mut BTreeMap<DbId, u64>, from: DbId, to: DbId) -> u64 {
    let moved = counts.remove(&from).unwrap_or(0);
    if moved > 0 {
        *counts.entry(to).or_insert(0) += moved;
    }
    moved
}

// ---------------------------------------------------------------------------
// Catalog and unit of work
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Shared {
    state: CatalogState,
    commits: usize,
    fail_on: Option<&'static str>,
    delay_on: Option<(&'static str, Duration)>,
}

/// Committed state shared by every unit of work opened from it.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryCatalog {
    pub fn begin(&self) -> MemoryUnitOfWork {
        let shared = self.shared.lock().unwrap();
        MemoryUnitOfWork {
            catalog: self.clone(),
            working: shared.state.clone(),
            fail_on: shared.fail_on,
            delay_on: shared.delay_on,
        }
    }

    pub fn snapshot(&self) -> CatalogState {
        self.shared.lock().unwrap().state.clone()
    }

    pub fn commits(&self) -> usize {
        self.shared.lock().unwrap().commits
    }

    /// Make every later unit of work fail when it reaches `operation`.
    pub fn fail_on(&self, operation: &'static str) {
        self.shared.lock().unwrap().fail_on = Some(operation);
    }

    /// Make every later unit of work sleep for `delay` before `operation`.
    pub fn delay_on(&self, operation: &'static str, delay: Duration) {
        self.shared.lock().unwrap().delay_on = Some((operation, delay));
    }

    fn with_state(&self, f: impl FnOnce(&mut CatalogState)) {
        f(&mut self.shared.lock().unwrap().state);
    }

    pub fn insert_person(&self, person: Person) {
        self.with_state(|s| {
            s.people.insert(person.id, person);
        });
    }

    pub fn insert_alt_name(&self, row: AlternativeName) {
        self.with_state(|s| {
            s.alt_names.insert(row.id, row);
        });
    }

    pub fn insert_cast(&self, row: CastCredit) {
        self.with_state(|s| {
            s.cast.insert(row.id, row);
        });
    }

    pub fn insert_crew(&self, row: CrewCredit) {
        self.with_state(|s| {
            s.crew.insert(row.id, row);
        });
    }

    pub fn insert_link(&self, row: PersonLink) {
        self.with_state(|s| {
            s.links.insert(row.id, row);
        });
    }

    pub fn insert_nationality(&self, row: Nationality) {
        self.with_state(|s| s.nationalities.push(row));
    }

    pub fn insert_image(&self, row: ImageAppearance) {
        self.with_state(|s| {
            s.images.insert(row.id, row);
        });
    }

    pub fn insert_jury_seat(&self, row: JurySeat) {
        self.with_state(|s| {
            s.jury.insert(row.id, row);
        });
    }

    pub fn insert_awards(&self, person_id: DbId, count: u64) {
        self.with_state(|s| *s.awards.entry(person_id).or_insert(0) += count);
    }

    pub fn insert_award_wins(&self, person_id: DbId, count: u64) {
        self.with_state(|s| *s.award_wins.entry(person_id).or_insert(0) += count);
    }

    pub fn insert_page_views(&self, person_id: DbId, count: u64) {
        self.with_state(|s| *s.page_views.entry(person_id).or_insert(0) += count);
    }
}

pub struct MemoryUnitOfWork {
    catalog: MemoryCatalog,
    working: CatalogState,
    fail_on: Option<&'static str>,
    delay_on: Option<(&'static str, Duration)>,
}

impl MemoryUnitOfWork {
    /// Uncommitted state as seen inside this unit of work.
    pub fn state(&self) -> &CatalogState {
        &self.working
    }

    async fn check(&self, operation: &'static str) -> StoreResult<()> {
        if let Some((delayed, delay)) = self.delay_on {
            if delayed == operation {
                tokio::time::sleep(delay).await;
            }
        }
        if self.fail_on == Some(operation) {
            return Err(violation(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PersonStore for MemoryUnitOfWork {
    async fn find_person(&mut self, id: DbId) -> StoreResult<Option<Person>> {
        self.check("find_person").await?;
        Ok(self.working.people.get(&id).cloned())
    }

    async fn count_credits(&mut self, person_id: DbId) -> StoreResult<CreditCounts> {
        self.check("count_credits").await?;
        Ok(CreditCounts {
            cast: self.working.cast_for(person_id).len() as i64,
            crew: self.working.crew_for(person_id).len() as i64,
        })
    }

    async fn find_person_id_by_slug(&mut self, slug: &str) -> StoreResult<Option<DbId>> {
        self.check("find_person_id_by_slug").await?;
        Ok(self
            .working
            .people
            .values()
            .find(|p| p.slug == slug)
            .map(|p| p.id))
    }

    async fn update_person(&mut self, id: DbId, update: &PersonUpdate) -> StoreResult<()> {
        const OP: &str = "update_person";
        self.check(OP).await?;
        if self
            .working
            .people
            .values()
            .any(|p| p.id != id && p.slug == update.slug)
        {
            return Err(violation(OP, format!("uq_people_slug: {}", update.slug)));
        }
        let person = self
            .working
            .people
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no person {id}")))?;
        person.slug = update.slug.clone();
        person.first_name = update.first_name.clone();
        person.last_name = update.last_name.clone();
        person.real_name = update.real_name.clone();
        person.birth_date = update.birth_date;
        person.death_date = update.death_date;
        person.birth_location_id = update.birth_location_id;
        person.death_location_id = update.death_location_id;
        person.biography = update.biography.clone();
        person.photo_url = update.photo_url.clone();
        person.photo_storage_id = update.photo_storage_id.clone();
        person.gender = update.gender;
        person.imdb_id = update.imdb_id.clone();
        person.tmdb_id = update.tmdb_id;
        person.tmdb_popularity = update.tmdb_popularity;
        person.tmdb_popularity_updated_at = update.tmdb_popularity_updated_at;
        person.has_links = update.has_links;
        Ok(())
    }

    async fn delete_person(&mut self, id: DbId) -> StoreResult<()> {
        const OP: &str = "delete_person";
        self.check(OP).await?;
        if self.working.is_referenced(id) {
            return Err(violation(OP, format!("person {id} is still referenced")));
        }
        self.working.people.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AlternativeNameStore for MemoryUnitOfWork {
    async fn list_alternative_names(
        &mut self,
        person_id: DbId,
    ) -> StoreResult<Vec<AlternativeName>> {
        self.check("list_alternative_names").await?;
        Ok(self.working.alternative_names_for(person_id))
    }

    async fn create_alternative_name(
        &mut self,
        person_id: DbId,
        full_name: &str,
    ) -> StoreResult<AlternativeName> {
        self.check("create_alternative_name").await?;
        self.working.next_id += 1;
        let row = alt_name(self.working.next_id, person_id, full_name);
        self.working.alt_names.insert(row.id, row.clone());
        Ok(row)
    }

    async fn transfer_alternative_name(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer_alternative_name";
        self.check(OP).await?;
        let row = self
            .working
            .alt_names
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no alternative name {id}")))?;
        row.person_id = person_id;
        Ok(())
    }

    async fn delete_alternative_name(&mut self, id: DbId) -> StoreResult<()> {
        const OP: &str = "delete_alternative_name";
        self.check(OP).await?;
        let referenced = self
            .working
            .cast
            .values()
            .any(|c| c.alternative_name_id == Some(id))
            || self
                .working
                .crew
                .values()
                .any(|c| c.alternative_name_id == Some(id));
        if referenced {
            return Err(violation(OP, format!("alternative name {id} is still referenced")));
        }
        self.working.alt_names.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl CastCreditStore for MemoryUnitOfWork {
    async fn list_cast_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CastCredit>> {
        self.check("list_cast_credits").await?;
        Ok(self.working.cast_for(person_id))
    }

    async fn set_character_name(&mut self, id: DbId, character_name: &str) -> StoreResult<()> {
        const OP: &str = "set_character_name";
        self.check(OP).await?;
        let row = self
            .working
            .cast
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no cast credit {id}")))?;
        row.character_name = Some(character_name.to_string());
        Ok(())
    }

    async fn transfer_cast_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()> {
        const OP: &str = "transfer_cast_credit";
        self.check(OP).await?;
        let movie_id = self
            .working
            .cast
            .get(&id)
            .map(|c| c.movie_id)
            .ok_or_else(|| violation(OP, format!("no cast credit {id}")))?;
        if self
            .working
            .cast
            .values()
            .any(|c| c.id != id && c.person_id == person_id && c.movie_id == movie_id)
        {
            return Err(violation(OP, "uq_movie_cast_movie_person"));
        }
        if let Some(row) = self.working.cast.get_mut(&id) {
            row.person_id = person_id;
            row.alternative_name_id = alternative_name_id;
        }
        Ok(())
    }

    async fn delete_cast_credit(&mut self, id: DbId) -> StoreResult<()> {
        self.check("delete_cast_credit").await?;
        self.working.cast.remove(&id);
        Ok(())
    }

    async fn repoint_cast_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        self.check("repoint_cast_alternative_name").await?;
        let mut moved = 0;
        for row in self.working.cast.values_mut() {
            if row.alternative_name_id == Some(from) {
                row.alternative_name_id = Some(to);
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[async_trait]
impl CrewCreditStore for MemoryUnitOfWork {
    async fn list_crew_credits(&mut self, person_id: DbId) -> StoreResult<Vec<CrewCredit>> {
        self.check("list_crew_credits").await?;
        Ok(self.working.crew_for(person_id))
    }

    async fn transfer_crew_credit(
        &mut self,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> StoreResult<()> {
        const OP: &str = "transfer_crew_credit";
        self.check(OP).await?;
        let key = self
            .working
            .crew
            .get(&id)
            .map(|c| (c.movie_id, c.role_id))
            .ok_or_else(|| violation(OP, format!("no crew credit {id}")))?;
        if self
            .working
            .crew
            .values()
            .any(|c| c.id != id && c.person_id == person_id && (c.movie_id, c.role_id) == key)
        {
            return Err(violation(OP, "uq_movie_crew_movie_person_role"));
        }
        if let Some(row) = self.working.crew.get_mut(&id) {
            row.person_id = person_id;
            row.alternative_name_id = alternative_name_id;
        }
        Ok(())
    }

    async fn delete_crew_credit(&mut self, id: DbId) -> StoreResult<()> {
        self.check("delete_crew_credit").await?;
        self.working.crew.remove(&id);
        Ok(())
    }

    async fn repoint_crew_alternative_name(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        self.check("repoint_crew_alternative_name").await?;
        let mut moved = 0;
        for row in self.working.crew.values_mut() {
            if row.alternative_name_id == Some(from) {
                row.alternative_name_id = Some(to);
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[async_trait]
impl PersonLinkStore for MemoryUnitOfWork {
    async fn list_links(&mut self, person_id: DbId) -> StoreResult<Vec<PersonLink>> {
        self.check("list_links").await?;
        Ok(self.working.links_for(person_id))
    }

    async fn transfer_link(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer_link";
        self.check(OP).await?;
        let row = self
            .working
            .links
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no link {id}")))?;
        row.person_id = person_id;
        Ok(())
    }

    async fn delete_link(&mut self, id: DbId) -> StoreResult<()> {
        self.check("delete_link").await?;
        self.working.links.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl NationalityStore for MemoryUnitOfWork {
    async fn list_nationalities(&mut self, person_id: DbId) -> StoreResult<Vec<Nationality>> {
        self.check("list_nationalities").await?;
        Ok(self.working.nationalities_for(person_id))
    }

    async fn insert_nationality(&mut self, nationality: &Nationality) -> StoreResult<()> {
        const OP: &str = "insert_nationality";
        self.check(OP).await?;
        if self.working.nationalities.iter().any(|n| {
            n.person_id == nationality.person_id && n.location_id == nationality.location_id
        }) {
            return Err(violation(OP, "person_nationalities_pkey"));
        }
        self.working.nationalities.push(nationality.clone());
        Ok(())
    }

    async fn delete_nationality(&mut self, person_id: DbId, location_id: DbId) -> StoreResult<()> {
        self.check("delete_nationality").await?;
        self.working
            .nationalities
            .retain(|n| !(n.person_id == person_id && n.location_id == location_id));
        Ok(())
    }
}

#[async_trait]
impl ImageAppearanceStore for MemoryUnitOfWork {
    async fn list_image_appearances(
        &mut self,
        person_id: DbId,
    ) -> StoreResult<Vec<ImageAppearance>> {
        self.check("list_image_appearances").await?;
        Ok(self.working.images_for(person_id))
    }

    async fn transfer_image_appearance(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer_image_appearance";
        self.check(OP).await?;
        let row = self
            .working
            .images
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no image appearance {id}")))?;
        row.person_id = person_id;
        Ok(())
    }

    async fn delete_image_appearance(&mut self, id: DbId) -> StoreResult<()> {
        self.check("delete_image_appearance").await?;
        self.working.images.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl JurySeatStore for MemoryUnitOfWork {
    async fn list_jury_seats(&mut self, person_id: DbId) -> StoreResult<Vec<JurySeat>> {
        self.check("list_jury_seats").await?;
        Ok(self.working.jury_for(person_id))
    }

    async fn transfer_jury_seat(&mut self, id: DbId, person_id: DbId) -> StoreResult<()> {
        const OP: &str = "transfer_jury_seat";
        self.check(OP).await?;
        let row = self
            .working
            .jury
            .get_mut(&id)
            .ok_or_else(|| violation(OP, format!("no jury seat {id}")))?;
        row.person_id = person_id;
        Ok(())
    }

    async fn delete_jury_seat(&mut self, id: DbId) -> StoreResult<()> {
        self.check("delete_jury_seat").await?;
        self.working.jury.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AwardRecipientStore for MemoryUnitOfWork {
    async fn count_awards(&mut self, person_id: DbId) -> StoreResult<i64> {
        self.check("count_awards").await?;
        Ok(self.working.awards_for(person_id) as i64)
    }

    async fn reassign_awards(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        self.check("reassign_awards").await?;
        Ok(move_count(&mut self.working.awards, from, to))
    }
}

#[async_trait]
impl AwardWinnerStore for MemoryUnitOfWork {
    async fn count_award_wins(&mut self, person_id: DbId) -> StoreResult<i64> {
        self.check("count_award_wins").await?;
        Ok(self.working.award_wins_for(person_id) as i64)
    }

    async fn reassign_award_wins(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        self.check("reassign_award_wins").await?;
        Ok(move_count(&mut self.working.award_wins, from, to))
    }
}

#[async_trait]
impl PageViewStore for MemoryUnitOfWork {
    async fn count_page_views(&mut self, person_id: DbId) -> StoreResult<i64> {
        self.check("count_page_views").await?;
        Ok(self.working.page_views_for(person_id) as i64)
    }

    async fn reassign_page_views(&mut self, from: DbId, to: DbId) -> StoreResult<u64> {
        self.check("reassign_page_views").await?;
        Ok(move_count(&mut self.working.page_views, from, to))
    }
}

#[async_trait]
impl MergeUnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        this.check("commit").await?;
        let mut shared = this.catalog.shared.lock().unwrap();
        shared.state = this.working;
        shared.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
