//! Merge request types and pre-storage validation.

use serde::Deserialize;

use super::error::MergeError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Operands and resolutions
// ---------------------------------------------------------------------------

/// Which of the two request operands a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
}

impl Operand {
    pub fn other(self) -> Operand {
        match self {
            Operand::A => Operand::B,
            Operand::B => Operand::A,
        }
    }
}

/// Caller's choice for one field group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Resolution {
    /// No explicit choice: the automatic fill-if-empty policy applies.
    #[default]
    #[serde(skip)]
    Unset,
    #[serde(rename = "A")]
    UseA,
    #[serde(rename = "B")]
    UseB,
}

impl Resolution {
    /// The operand explicitly chosen, if any.
    pub fn operand(self) -> Option<Operand> {
        match self {
            Resolution::Unset => None,
            Resolution::UseA => Some(Operand::A),
            Resolution::UseB => Some(Operand::B),
        }
    }
}

/// Field groups that are resolved as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Name,
    RealName,
    BirthDate,
    DeathDate,
    BirthLocation,
    DeathLocation,
    Biography,
    Photo,
    Gender,
    ImdbId,
    TmdbId,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 11] = [
        FieldGroup::Name,
        FieldGroup::RealName,
        FieldGroup::BirthDate,
        FieldGroup::DeathDate,
        FieldGroup::BirthLocation,
        FieldGroup::DeathLocation,
        FieldGroup::Biography,
        FieldGroup::Photo,
        FieldGroup::Gender,
        FieldGroup::ImdbId,
        FieldGroup::TmdbId,
    ];

    /// Wire name used in requests and preview comparisons.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldGroup::Name => "name",
            FieldGroup::RealName => "realName",
            FieldGroup::BirthDate => "birthDate",
            FieldGroup::DeathDate => "deathDate",
            FieldGroup::BirthLocation => "birthLocation",
            FieldGroup::DeathLocation => "deathLocation",
            FieldGroup::Biography => "biography",
            FieldGroup::Photo => "photo",
            FieldGroup::Gender => "gender",
            FieldGroup::ImdbId => "imdbId",
            FieldGroup::TmdbId => "tmdbId",
        }
    }
}

/// Per-group resolution choices. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeResolutions {
    pub name: Resolution,
    pub real_name: Resolution,
    pub birth_date: Resolution,
    pub death_date: Resolution,
    pub birth_location: Resolution,
    pub death_location: Resolution,
    pub biography: Resolution,
    pub photo: Resolution,
    pub gender: Resolution,
    #[serde(alias = "externalId1")]
    pub imdb_id: Resolution,
    #[serde(alias = "externalId2")]
    pub tmdb_id: Resolution,
}

impl MergeResolutions {
    pub fn get(&self, group: FieldGroup) -> Resolution {
        match group {
            FieldGroup::Name => self.name,
            FieldGroup::RealName => self.real_name,
            FieldGroup::BirthDate => self.birth_date,
            FieldGroup::DeathDate => self.death_date,
            FieldGroup::BirthLocation => self.birth_location,
            FieldGroup::DeathLocation => self.death_location,
            FieldGroup::Biography => self.biography,
            FieldGroup::Photo => self.photo,
            FieldGroup::Gender => self.gender,
            FieldGroup::ImdbId => self.imdb_id,
            FieldGroup::TmdbId => self.tmdb_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /people/merge`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(rename = "personAId")]
    pub person_a_id: Option<DbId>,
    #[serde(rename = "personBId")]
    pub person_b_id: Option<DbId>,
    pub survivor_id: Option<DbId>,
    #[serde(default)]
    pub resolutions: MergeResolutions,
}

/// Body of `POST /people/merge/preview`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(rename = "personAId")]
    pub person_a_id: Option<DbId>,
    #[serde(rename = "personBId")]
    pub person_b_id: Option<DbId>,
}

/// A merge request that passed validation. Storage may now be touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMerge {
    pub person_a_id: DbId,
    pub person_b_id: DbId,
    /// Explicit survivor, already mapped onto an operand.
    pub survivor: Option<Operand>,
    pub resolutions: MergeResolutions,
}

/// Check that both ids are present, positive and distinct.
pub fn validate_pair(
    person_a_id: Option<DbId>,
    person_b_id: Option<DbId>,
) -> Result<(DbId, DbId), MergeError> {
    let (Some(a), Some(b)) = (person_a_id, person_b_id) else {
        return Err(MergeError::Validation(
            "Both personAId and personBId are required".into(),
        ));
    };
    if a <= 0 || b <= 0 {
        return Err(MergeError::Validation(
            "Both personAId and personBId are required".into(),
        ));
    }
    if a == b {
        return Err(MergeError::Validation(
            "Cannot merge a person with itself".into(),
        ));
    }
    Ok((a, b))
}

impl MergeRequest {
    /// Validate the request without touching storage.
    pub fn validate(self) -> Result<ValidatedMerge, MergeError> {
        let (a, b) = validate_pair(self.person_a_id, self.person_b_id)?;

        let survivor = match self.survivor_id {
            None => None,
            Some(id) if id == a => Some(Operand::A),
            Some(id) if id == b => Some(Operand::B),
            Some(id) => {
                return Err(MergeError::Validation(format!(
                    "survivorId {id} must be either personAId ({a}) or personBId ({b})"
                )))
            }
        };

        Ok(ValidatedMerge {
            person_a_id: a,
            person_b_id: b,
            survivor,
            resolutions: self.resolutions,
        })
    }
}

impl PreviewRequest {
    pub fn validate(self) -> Result<(DbId, DbId), MergeError> {
        validate_pair(self.person_a_id, self.person_b_id)
    }
}
