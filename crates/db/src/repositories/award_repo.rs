//! Repositories for `movie_awards` and `festival_award_winners`.
//!
//! Neither table limits one row per person and award, so merges move
//! their rows with a single bulk update.

use cinecat_core::types::DbId;
use sqlx::PgConnection;

pub struct MovieAwardRepo;

impl MovieAwardRepo {
    pub async fn create(
        conn: &mut PgConnection,
        movie_id: DbId,
        award_name: &str,
        person_id: DbId,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO movie_awards (movie_id, award_name, person_id)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(movie_id)
        .bind(award_name)
        .bind(person_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn count_by_person(conn: &mut PgConnection, person_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie_awards WHERE person_id = $1")
            .bind(person_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Move every award of `from` to `to`. Returns the number of rows moved.
    pub async fn reassign(conn: &mut PgConnection, from: DbId, to: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE movie_awards SET person_id = $2 WHERE person_id = $1")
            .bind(from)
            .bind(to)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct FestivalAwardWinnerRepo;

impl FestivalAwardWinnerRepo {
    pub async fn create(
        conn: &mut PgConnection,
        section_id: DbId,
        award_name: &str,
        person_id: DbId,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO festival_award_winners (section_id, award_name, person_id)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(section_id)
        .bind(award_name)
        .bind(person_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn count_by_person(conn: &mut PgConnection, person_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM festival_award_winners WHERE person_id = $1",
        )
        .bind(person_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn reassign(conn: &mut PgConnection, from: DbId, to: DbId) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE festival_award_winners SET person_id = $2 WHERE person_id = $1")
                .bind(from)
                .bind(to)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected())
    }
}
