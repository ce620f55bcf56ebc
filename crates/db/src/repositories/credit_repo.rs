//! Repositories for the `movie_cast` and `movie_crew` tables.

use cinecat_core::person::{CastCredit, CrewCredit};
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::credit::{CastCreditRow, CrewCreditRow};

const CAST_COLUMNS: &str =
    "id, movie_id, person_id, character_name, billing_order, alternative_name_id";

const CREW_COLUMNS: &str = "id, movie_id, person_id, role_id, billing_order, alternative_name_id";

// ---------------------------------------------------------------------------
// Cast
// ---------------------------------------------------------------------------

pub struct CastCreditRepo;

impl CastCreditRepo {
    pub async fn create(
        conn: &mut PgConnection,
        movie_id: DbId,
        person_id: DbId,
        character_name: Option<&str>,
    ) -> Result<CastCredit, sqlx::Error> {
        let query = format!(
            "INSERT INTO movie_cast (movie_id, person_id, character_name)
             VALUES ($1, $2, $3)
             RETURNING {CAST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CastCreditRow>(&query)
            .bind(movie_id)
            .bind(person_id)
            .bind(character_name)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<CastCredit>, sqlx::Error> {
        let query = format!(
            "SELECT {CAST_COLUMNS} FROM movie_cast
             WHERE person_id = $1
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, CastCreditRow>(&query)
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn set_character_name(
        conn: &mut PgConnection,
        id: DbId,
        character_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE movie_cast SET character_name = $2 WHERE id = $1")
            .bind(id)
            .bind(character_name)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Re-own a credit and set its alternative-name reference in one update.
    pub async fn transfer(
        conn: &mut PgConnection,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movie_cast SET person_id = $2, alternative_name_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(person_id)
        .bind(alternative_name_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movie_cast WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Point every credit using alternative name `from` at `to`.
    pub async fn repoint_alternative_name(
        conn: &mut PgConnection,
        from: DbId,
        to: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movie_cast SET alternative_name_id = $2 WHERE alternative_name_id = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

pub struct CrewCreditRepo;

impl CrewCreditRepo {
    pub async fn create(
        conn: &mut PgConnection,
        movie_id: DbId,
        person_id: DbId,
        role_id: DbId,
    ) -> Result<CrewCredit, sqlx::Error> {
        let query = format!(
            "INSERT INTO movie_crew (movie_id, person_id, role_id)
             VALUES ($1, $2, $3)
             RETURNING {CREW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CrewCreditRow>(&query)
            .bind(movie_id)
            .bind(person_id)
            .bind(role_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<CrewCredit>, sqlx::Error> {
        let query = format!(
            "SELECT {CREW_COLUMNS} FROM movie_crew
             WHERE person_id = $1
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, CrewCreditRow>(&query)
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn transfer(
        conn: &mut PgConnection,
        id: DbId,
        person_id: DbId,
        alternative_name_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movie_crew SET person_id = $2, alternative_name_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(person_id)
        .bind(alternative_name_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movie_crew WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn repoint_alternative_name(
        conn: &mut PgConnection,
        from: DbId,
        to: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movie_crew SET alternative_name_id = $2 WHERE alternative_name_id = $1",
        )
        .bind(from)
        .bind(to)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
