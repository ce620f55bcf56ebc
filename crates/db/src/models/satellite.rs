//! Rows hanging off a person: alternative names, links, nationalities,
//! image appearances and jury seats.

use cinecat_core::person::{AlternativeName, ImageAppearance, JurySeat, Nationality, PersonLink};
use cinecat_core::types::DbId;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AlternativeNameRow {
    pub id: DbId,
    pub person_id: DbId,
    pub full_name: String,
}

impl From<AlternativeNameRow> for AlternativeName {
    fn from(row: AlternativeNameRow) -> Self {
        AlternativeName {
            id: row.id,
            person_id: row.person_id,
            full_name: row.full_name,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PersonLinkRow {
    pub id: DbId,
    pub person_id: DbId,
    pub link_type: String,
    pub url: String,
    pub title: Option<String>,
    pub display_order: i32,
}

impl From<PersonLinkRow> for PersonLink {
    fn from(row: PersonLinkRow) -> Self {
        PersonLink {
            id: row.id,
            person_id: row.person_id,
            link_type: row.link_type,
            url: row.url,
            title: row.title,
            display_order: row.display_order,
        }
    }
}

/// Composite primary key `(person_id, location_id)`.
#[derive(Debug, Clone, FromRow)]
pub struct NationalityRow {
    pub person_id: DbId,
    pub location_id: DbId,
    pub is_primary: bool,
}

impl From<NationalityRow> for Nationality {
    fn from(row: NationalityRow) -> Self {
        Nationality {
            person_id: row.person_id,
            location_id: row.location_id,
            is_primary: row.is_primary,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ImageAppearanceRow {
    pub id: DbId,
    pub image_id: DbId,
    pub person_id: DbId,
    pub position: i32,
}

impl From<ImageAppearanceRow> for ImageAppearance {
    fn from(row: ImageAppearanceRow) -> Self {
        ImageAppearance {
            id: row.id,
            image_id: row.image_id,
            person_id: row.person_id,
            position: row.position,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JurySeatRow {
    pub id: DbId,
    pub section_id: DbId,
    pub person_id: DbId,
}

impl From<JurySeatRow> for JurySeat {
    fn from(row: JurySeatRow) -> Self {
        JurySeat {
            id: row.id,
            section_id: row.section_id,
            person_id: row.person_id,
        }
    }
}
