//! Cast and crew credit rows.

use cinecat_core::person::{CastCredit, CrewCredit};
use cinecat_core::types::DbId;
use sqlx::FromRow;

/// A row from the `movie_cast` table.
#[derive(Debug, Clone, FromRow)]
pub struct CastCreditRow {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub character_name: Option<String>,
    pub billing_order: Option<i32>,
    pub alternative_name_id: Option<DbId>,
}

impl From<CastCreditRow> for CastCredit {
    fn from(row: CastCreditRow) -> Self {
        CastCredit {
            id: row.id,
            movie_id: row.movie_id,
            person_id: row.person_id,
            character_name: row.character_name,
            billing_order: row.billing_order,
            alternative_name_id: row.alternative_name_id,
        }
    }
}

/// A row from the `movie_crew` table.
#[derive(Debug, Clone, FromRow)]
pub struct CrewCreditRow {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub role_id: DbId,
    pub billing_order: Option<i32>,
    pub alternative_name_id: Option<DbId>,
}

impl From<CrewCreditRow> for CrewCredit {
    fn from(row: CrewCreditRow) -> Self {
        CrewCredit {
            id: row.id,
            movie_id: row.movie_id,
            person_id: row.person_id,
            role_id: row.role_id,
            billing_order: row.billing_order,
            alternative_name_id: row.alternative_name_id,
        }
    }
}
