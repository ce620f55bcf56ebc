//! Person row model.

use cinecat_core::error::CoreError;
use cinecat_core::person::{Gender, PartialDate, Person};
use cinecat_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `people` table. Partial dates are stored as three
/// nullable integer columns each.
#[derive(Debug, Clone, FromRow)]
pub struct PersonRow {
    pub id: DbId,
    pub slug: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub real_name: Option<String>,
    pub birth_year: Option<i32>,
    pub birth_month: Option<i32>,
    pub birth_day: Option<i32>,
    pub death_year: Option<i32>,
    pub death_month: Option<i32>,
    pub death_day: Option<i32>,
    pub birth_location_id: Option<DbId>,
    pub death_location_id: Option<DbId>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub photo_storage_id: Option<String>,
    pub gender: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub tmdb_popularity: Option<f64>,
    pub tmdb_popularity_updated_at: Option<Timestamp>,
    pub has_links: bool,
    pub hide_age: bool,
}

impl TryFrom<PersonRow> for Person {
    type Error = CoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        Ok(Person {
            id: row.id,
            slug: row.slug,
            first_name: row.first_name,
            last_name: row.last_name,
            real_name: row.real_name,
            birth_date: PartialDate::from_columns(row.birth_year, row.birth_month, row.birth_day)?,
            death_date: PartialDate::from_columns(row.death_year, row.death_month, row.death_day)?,
            birth_location_id: row.birth_location_id,
            death_location_id: row.death_location_id,
            biography: row.biography,
            photo_url: row.photo_url,
            photo_storage_id: row.photo_storage_id,
            gender: row.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            imdb_id: row.imdb_id,
            tmdb_id: row.tmdb_id,
            tmdb_popularity: row.tmdb_popularity,
            tmdb_popularity_updated_at: row.tmdb_popularity_updated_at,
            has_links: row.has_links,
            hide_age: row.hide_age,
        })
    }
}

/// Split an optional partial date back into its three storage columns.
pub fn date_columns(date: Option<PartialDate>) -> (Option<i32>, Option<i32>, Option<i32>) {
    match date {
        Some(d) => (
            Some(d.year),
            d.month.map(|m| m as i32),
            d.day.map(|d| d as i32),
        ),
        None => (None, None, None),
    }
}

/// Fields needed to insert a person. Used by seeding code and tests.
#[derive(Debug, Clone, Default)]
pub struct CreatePerson {
    pub slug: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<PartialDate>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub tmdb_popularity: Option<f64>,
}
