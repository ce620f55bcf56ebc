//! Repository for the `person_nationalities` table.
//!
//! The owner is part of the primary key, so rows are inserted and deleted
//! but never re-owned in place.

use cinecat_core::person::Nationality;
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::satellite::NationalityRow;

pub struct NationalityRepo;

impl NationalityRepo {
    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<Nationality>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NationalityRow>(
            "SELECT person_id, location_id, is_primary FROM person_nationalities
             WHERE person_id = $1
             ORDER BY is_primary DESC, location_id ASC",
        )
        .bind(person_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert(conn: &mut PgConnection, input: &Nationality) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO person_nationalities (person_id, location_id, is_primary)
             VALUES ($1, $2, $3)",
        )
        .bind(input.person_id)
        .bind(input.location_id)
        .bind(input.is_primary)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn delete(
        conn: &mut PgConnection,
        person_id: DbId,
        location_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM person_nationalities WHERE person_id = $1 AND location_id = $2",
        )
        .bind(person_id)
        .bind(location_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
