//! Repository for the `image_people` table.

use cinecat_core::person::ImageAppearance;
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::satellite::ImageAppearanceRow;

const COLUMNS: &str = "id, image_id, person_id, position";

pub struct ImageAppearanceRepo;

impl ImageAppearanceRepo {
    pub async fn create(
        conn: &mut PgConnection,
        image_id: DbId,
        person_id: DbId,
    ) -> Result<ImageAppearance, sqlx::Error> {
        let query = format!(
            "INSERT INTO image_people (image_id, person_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ImageAppearanceRow>(&query)
            .bind(image_id)
            .bind(person_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<ImageAppearance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_people
             WHERE person_id = $1
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, ImageAppearanceRow>(&query)
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
        let result = sqlx::query("UPDATE image_people SET person_id = $2 WHERE id = $1")
            .bind(id)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM image_people WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
