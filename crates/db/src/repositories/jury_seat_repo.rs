//! Repository for the `festival_juries` table.

use cinecat_core::person::JurySeat;
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::satellite::JurySeatRow;

const COLUMNS: &str = "id, section_id, person_id";

pub struct JurySeatRepo;

impl JurySeatRepo {
    pub async fn create(
        conn: &mut PgConnection,
        section_id: DbId,
        person_id: DbId,
    ) -> Result<JurySeat, sqlx::Error> {
        let query = format!(
            "INSERT INTO festival_juries (section_id, person_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, JurySeatRow>(&query)
            .bind(section_id)
            .bind(person_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<JurySeat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM festival_juries
             WHERE person_id = $1
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, JurySeatRow>(&query)
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn transfer(
        conn: &mut PgConnection,
        id: DbId,
        person_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE festival_juries SET person_id = $2 WHERE id = $1")
            .bind(id)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM festival_juries WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
