//! Repository for the `person_alternative_names` table.

use cinecat_core::person::AlternativeName;
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::satellite::AlternativeNameRow;

const COLUMNS: &str = "id, person_id, full_name";

pub struct AlternativeNameRepo;

impl AlternativeNameRepo {
    pub async fn create(
        conn: &mut PgConnection,
        person_id: DbId,
        full_name: &str,
    ) -> Result<AlternativeName, sqlx::Error> {
        let query = format!(
            "INSERT INTO person_alternative_names (person_id, full_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AlternativeNameRow>(&query)
            .bind(person_id)
            .bind(full_name)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    /// All alternative names of a person, oldest first.
    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<AlternativeName>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM person_alternative_names
             WHERE person_id = $1
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, AlternativeNameRow>(&query)
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
        let result = sqlx::query("UPDATE person_alternative_names SET person_id = $2 WHERE id = $1")
            .bind(id)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM person_alternative_names WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
