//! Repository for the `page_views` analytics table.

use cinecat_core::types::DbId;
use sqlx::PgConnection;

pub struct PageViewRepo;

impl PageViewRepo {
    pub async fn record(conn: &mut PgConnection, path: &str, person_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO page_views (path, person_id) VALUES ($1, $2)")
            .bind(path)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn count_by_person(conn: &mut PgConnection, person_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM page_views WHERE person_id = $1")
            .bind(person_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn reassign(conn: &mut PgConnection, from: DbId, to: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE page_views SET person_id = $2 WHERE person_id = $1")
            .bind(from)
            .bind(to)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
