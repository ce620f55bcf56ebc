//! Person record and the relation rows that reference it.
//!
//! These are storage-agnostic domain types. `cinecat-db` maps its `FromRow`
//! structs into them; the merge engine only ever sees these.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::names;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(CoreError::Validation(format!(
                "Invalid gender '{other}'. Must be one of: MALE, FEMALE, OTHER"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Partial dates
// ---------------------------------------------------------------------------

/// A date known to year, month or day precision.
///
/// Day precision always implies month precision; [`PartialDate::new`]
/// rejects a day without a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PartialDate {
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Result<Self, CoreError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(CoreError::Validation(format!(
                    "Month must be between 1 and 12, got {m}"
                )));
            }
        }
        match (month, day) {
            (None, Some(_)) => Err(CoreError::Validation(
                "A partial date with a day must also have a month".into(),
            )),
            (_, Some(d)) if !(1..=31).contains(&d) => Err(CoreError::Validation(format!(
                "Day must be between 1 and 31, got {d}"
            ))),
            _ => Ok(Self { year, month, day }),
        }
    }

    /// Build from the three nullable storage columns.
    ///
    /// A missing year means "no date"; month/day without a year are ignored.
    pub fn from_columns(
        year: Option<i32>,
        month: Option<i32>,
        day: Option<i32>,
    ) -> Result<Option<Self>, CoreError> {
        let Some(year) = year else {
            return Ok(None);
        };
        let month = month.map(|m| m as u32);
        let day = day.map(|d| d as u32);
        Self::new(year, month, day).map(Some)
    }

    /// Render as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn display(&self) -> String {
        let mut out = self.year.to_string();
        if let Some(month) = self.month {
            out.push_str(&format!("-{month:02}"));
            if let Some(day) = self.day {
                out.push_str(&format!("-{day:02}"));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A person row with all scalar fields the merge engine resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: DbId,
    pub slug: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub real_name: Option<String>,
    pub birth_date: Option<PartialDate>,
    pub death_date: Option<PartialDate>,
    pub birth_location_id: Option<DbId>,
    pub death_location_id: Option<DbId>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub photo_storage_id: Option<String>,
    pub gender: Option<Gender>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub tmdb_popularity: Option<f64>,
    pub tmdb_popularity_updated_at: Option<Timestamp>,
    /// Denormalized: the person has at least one [`PersonLink`].
    pub has_links: bool,
    pub hide_age: bool,
}

impl Person {
    /// First and last name joined for display and comparison.
    pub fn full_name(&self) -> String {
        names::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Cast and crew credit counts for one person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCounts {
    pub cast: i64,
    pub crew: i64,
}

impl CreditCounts {
    pub fn total(&self) -> i64 {
        self.cast + self.crew
    }
}

/// Scalar column values written back to the survivor at the end of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonUpdate {
    pub slug: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub real_name: Option<String>,
    pub birth_date: Option<PartialDate>,
    pub death_date: Option<PartialDate>,
    pub birth_location_id: Option<DbId>,
    pub death_location_id: Option<DbId>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub photo_storage_id: Option<String>,
    pub gender: Option<Gender>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub tmdb_popularity: Option<f64>,
    pub tmdb_popularity_updated_at: Option<Timestamp>,
    pub has_links: bool,
}

// ---------------------------------------------------------------------------
// Relation rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeName {
    pub id: DbId,
    pub person_id: DbId,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastCredit {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub character_name: Option<String>,
    pub billing_order: Option<i32>,
    pub alternative_name_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewCredit {
    pub id: DbId,
    pub movie_id: DbId,
    pub person_id: DbId,
    pub role_id: DbId,
    pub billing_order: Option<i32>,
    pub alternative_name_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonLink {
    pub id: DbId,
    pub person_id: DbId,
    pub link_type: String,
    pub url: String,
    pub title: Option<String>,
    pub display_order: i32,
}

/// Composite-key association `(person_id, location_id)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nationality {
    pub person_id: DbId,
    pub location_id: DbId,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAppearance {
    pub id: DbId,
    pub image_id: DbId,
    pub person_id: DbId,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurySeat {
    pub id: DbId,
    pub section_id: DbId,
    pub person_id: DbId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn partial_date_accepts_year_only() {
        let date = PartialDate::new(1950, None, None).unwrap();
        assert_eq!(date.display(), "1950");
    }

    #[test]
    fn partial_date_rejects_day_without_month() {
        assert_matches!(
            PartialDate::new(1950, None, Some(3)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn partial_date_rejects_out_of_range_month() {
        assert!(PartialDate::new(1950, Some(13), None).is_err());
        assert!(PartialDate::new(1950, Some(0), None).is_err());
    }

    #[test]
    fn partial_date_display_pads_components() {
        let date = PartialDate::new(1950, Some(3), Some(7)).unwrap();
        assert_eq!(date.display(), "1950-03-07");
    }

    #[test]
    fn from_columns_without_year_is_none() {
        assert_eq!(PartialDate::from_columns(None, Some(3), Some(7)).unwrap(), None);
    }

    #[test]
    fn gender_round_trips_through_str() {
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!("UNKNOWN".parse::<Gender>().is_err());
    }
}
