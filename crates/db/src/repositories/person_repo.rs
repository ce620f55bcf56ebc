//! Repository for the `people` table.

use cinecat_core::person::{CreditCounts, Person, PersonUpdate};
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::person::{date_columns, CreatePerson, PersonRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, first_name, last_name, real_name, \
     birth_year, birth_month, birth_day, death_year, death_month, death_day, \
     birth_location_id, death_location_id, biography, photo_url, photo_storage_id, \
     gender, imdb_id, tmdb_id, tmdb_popularity, tmdb_popularity_updated_at, \
     has_links, hide_age";

fn into_person(row: PersonRow) -> Result<Person, sqlx::Error> {
    Person::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Reads and writes person rows. Every method runs on the caller's
/// connection so it can take part in an open transaction.
pub struct PersonRepo;

impl PersonRepo {
    /// Insert a person, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let (year, month, day) = date_columns(input.birth_date);
        let query = format!(
            "INSERT INTO people (slug, first_name, last_name, birth_year, birth_month, birth_day, \
                                 imdb_id, tmdb_id, tmdb_popularity)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PersonRow>(&query)
            .bind(&input.slug)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(year)
            .bind(month)
            .bind(day)
            .bind(&input.imdb_id)
            .bind(input.tmdb_id)
            .bind(input.tmdb_popularity)
            .fetch_one(&mut *conn)
            .await?;
        into_person(row)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE id = $1");
        sqlx::query_as::<_, PersonRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(into_person)
            .transpose()
    }

    /// Id of the person holding `slug`, if any.
    pub async fn find_id_by_slug(
        conn: &mut PgConnection,
        slug: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM people WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Number of cast and crew credits held by a person.
    pub async fn count_credits(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<CreditCounts, sqlx::Error> {
        let (cast, crew) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                (SELECT COUNT(*) FROM movie_cast WHERE person_id = $1),
                (SELECT COUNT(*) FROM movie_crew WHERE person_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(CreditCounts { cast, crew })
    }

    /// Overwrite every merge-resolved column. `hide_age` is left alone.
    ///
    /// Returns `true` if the row existed.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &PersonUpdate,
    ) -> Result<bool, sqlx::Error> {
        let (birth_year, birth_month, birth_day) = date_columns(input.birth_date);
        let (death_year, death_month, death_day) = date_columns(input.death_date);
        let result = sqlx::query(
            "UPDATE people SET
                slug = $2,
                first_name = $3,
                last_name = $4,
                real_name = $5,
                birth_year = $6,
                birth_month = $7,
                birth_day = $8,
                death_year = $9,
                death_month = $10,
                death_day = $11,
                birth_location_id = $12,
                death_location_id = $13,
                biography = $14,
                photo_url = $15,
                photo_storage_id = $16,
                gender = $17,
                imdb_id = $18,
                tmdb_id = $19,
                tmdb_popularity = $20,
                tmdb_popularity_updated_at = $21,
                has_links = $22,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.slug)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.real_name)
        .bind(birth_year)
        .bind(birth_month)
        .bind(birth_day)
        .bind(death_year)
        .bind(death_month)
        .bind(death_day)
        .bind(input.birth_location_id)
        .bind(input.death_location_id)
        .bind(&input.biography)
        .bind(&input.photo_url)
        .bind(&input.photo_storage_id)
        .bind(input.gender.map(|g| g.as_str()))
        .bind(&input.imdb_id)
        .bind(input.tmdb_id)
        .bind(input.tmdb_popularity)
        .bind(input.tmdb_popularity_updated_at)
        .bind(input.has_links)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a person. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
