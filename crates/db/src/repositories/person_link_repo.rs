//! Repository for the `person_links` table.

use cinecat_core::person::PersonLink;
use cinecat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::satellite::PersonLinkRow;

const COLUMNS: &str = "id, person_id, link_type, url, title, display_order";

pub struct PersonLinkRepo;

impl PersonLinkRepo {
    pub async fn create(
        conn: &mut PgConnection,
        person_id: DbId,
        link_type: &str,
        url: &str,
    ) -> Result<PersonLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO person_links (person_id, link_type, url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PersonLinkRow>(&query)
            .bind(person_id)
            .bind(link_type)
            .bind(url)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.into())
    }

    /// Links of a person in display order.
    pub async fn list_by_person(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<Vec<PersonLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM person_links
             WHERE person_id = $1
             ORDER BY display_order ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, PersonLinkRow>(&query)
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
        let result = sqlx::query("UPDATE person_links SET person_id = $2 WHERE id = $1")
            .bind(id)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM person_links WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
