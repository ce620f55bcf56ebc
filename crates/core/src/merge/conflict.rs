//! Field-level conflict resolution between the two merge operands.
//!
//! Every field group is decided as one unit: an explicit [`Resolution`]
//! picks that operand's value outright; otherwise the survivor keeps its
//! value unless it is empty, in which case the absorbed value is adopted.

use super::request::{FieldGroup, MergeResolutions, Operand, Resolution};
use crate::names;
use crate::person::{Gender, PartialDate, Person, PersonUpdate};
use crate::types::{DbId, Timestamp};

/// Final scalar values for the survivor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
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
}

impl ResolvedFields {
    pub fn full_name(&self) -> String {
        names::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    /// `true` if first or last name differ from `person`'s.
    pub fn name_differs_from(&self, person: &Person) -> bool {
        self.first_name != person.first_name || self.last_name != person.last_name
    }

    pub fn into_update(self, slug: String, has_links: bool) -> PersonUpdate {
        PersonUpdate {
            slug,
            first_name: self.first_name,
            last_name: self.last_name,
            real_name: self.real_name,
            birth_date: self.birth_date,
            death_date: self.death_date,
            birth_location_id: self.birth_location_id,
            death_location_id: self.death_location_id,
            biography: self.biography,
            photo_url: self.photo_url,
            photo_storage_id: self.photo_storage_id,
            gender: self.gender,
            imdb_id: self.imdb_id,
            tmdb_id: self.tmdb_id,
            tmdb_popularity: self.tmdb_popularity,
            tmdb_popularity_updated_at: self.tmdb_popularity_updated_at,
            has_links,
        }
    }
}

/// Outcome of conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResolution {
    pub fields: ResolvedFields,
    /// The name that did not win, to be kept as an alternative name.
    ///
    /// `None` when blank or equal (ignoring accents and case) to the final
    /// name. The alternative-name migrator still checks it against the
    /// survivor's existing alternative names.
    pub losing_name: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Resolve one group and report which operand supplied the value.
fn resolve_group<T: Clone>(
    choice: Resolution,
    survivor: Operand,
    a: &T,
    b: &T,
    is_empty: impl Fn(&T) -> bool,
) -> (T, Operand) {
    let source = match choice.operand() {
        Some(explicit) => explicit,
        None => {
            let kept = if survivor == Operand::A { a } else { b };
            if is_empty(kept) {
                survivor.other()
            } else {
                survivor
            }
        }
    };
    let value = if source == Operand::A { a } else { b };
    (value.clone(), source)
}

/// Resolve every field group for a merge of `a` and `b`.
pub fn resolve_fields(
    a: &Person,
    b: &Person,
    survivor: Operand,
    resolutions: &MergeResolutions,
) -> FieldResolution {
    let pick = |group: FieldGroup| resolutions.get(group);

    let ((first_name, last_name), name_source) = resolve_group(
        pick(FieldGroup::Name),
        survivor,
        &(a.first_name.clone(), a.last_name.clone()),
        &(b.first_name.clone(), b.last_name.clone()),
        |(first, last): &(Option<String>, Option<String>)| is_blank(first) && is_blank(last),
    );

    let (real_name, _) = resolve_group(
        pick(FieldGroup::RealName),
        survivor,
        &a.real_name,
        &b.real_name,
        is_blank,
    );
    let (birth_date, _) = resolve_group(
        pick(FieldGroup::BirthDate),
        survivor,
        &a.birth_date,
        &b.birth_date,
        Option::is_none,
    );
    let (death_date, _) = resolve_group(
        pick(FieldGroup::DeathDate),
        survivor,
        &a.death_date,
        &b.death_date,
        Option::is_none,
    );
    let (birth_location_id, _) = resolve_group(
        pick(FieldGroup::BirthLocation),
        survivor,
        &a.birth_location_id,
        &b.birth_location_id,
        Option::is_none,
    );
    let (death_location_id, _) = resolve_group(
        pick(FieldGroup::DeathLocation),
        survivor,
        &a.death_location_id,
        &b.death_location_id,
        Option::is_none,
    );
    let (biography, _) = resolve_group(
        pick(FieldGroup::Biography),
        survivor,
        &a.biography,
        &b.biography,
        is_blank,
    );
    let ((photo_url, photo_storage_id), _) = resolve_group(
        pick(FieldGroup::Photo),
        survivor,
        &(a.photo_url.clone(), a.photo_storage_id.clone()),
        &(b.photo_url.clone(), b.photo_storage_id.clone()),
        |(url, _): &(Option<String>, Option<String>)| is_blank(url),
    );
    let (gender, _) = resolve_group(
        pick(FieldGroup::Gender),
        survivor,
        &a.gender,
        &b.gender,
        Option::is_none,
    );
    let (imdb_id, _) = resolve_group(
        pick(FieldGroup::ImdbId),
        survivor,
        &a.imdb_id,
        &b.imdb_id,
        is_blank,
    );
    let (tmdb_id, tmdb_source) = resolve_group(
        pick(FieldGroup::TmdbId),
        survivor,
        &a.tmdb_id,
        &b.tmdb_id,
        Option::is_none,
    );

    // Popularity follows the TMDB id when the survivor's id is replaced.
    let survivor_person = if survivor == Operand::A { a } else { b };
    let popularity_source = if tmdb_id.is_some() && tmdb_id != survivor_person.tmdb_id {
        if tmdb_source == Operand::A {
            a
        } else {
            b
        }
    } else {
        survivor_person
    };

    let fields = ResolvedFields {
        first_name,
        last_name,
        real_name: non_blank(real_name),
        birth_date,
        death_date,
        birth_location_id,
        death_location_id,
        biography: non_blank(biography),
        photo_url: non_blank(photo_url),
        photo_storage_id,
        gender,
        imdb_id: non_blank(imdb_id),
        tmdb_id,
        tmdb_popularity: popularity_source.tmdb_popularity,
        tmdb_popularity_updated_at: popularity_source.tmdb_popularity_updated_at,
    };

    let losing = if name_source == Operand::A { b } else { a };
    let losing_name = Some(losing.full_name().trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| !names::names_match(name, &fields.full_name()));

    FieldResolution {
        fields,
        losing_name,
    }
}
