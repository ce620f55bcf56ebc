//! Read-only merge preview.
//!
//! Loads both people through a unit of work that is always rolled back,
//! and reports how they differ and how much each would bring to a merge.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Value};

use super::error::{MergeError, MergeState, StoreError};
use super::request::FieldGroup;
use super::store::MergeUnitOfWork;
use super::survivor::{suggest_survivor, SuggestedSurvivor};
use crate::names::normalize_for_comparison;
use crate::person::{
    AlternativeName, CastCredit, CreditCounts, CrewCredit, Nationality, PartialDate, Person,
    PersonLink,
};
use crate::types::DbId;

/// Biography previews are cut to this many characters.
const BIOGRAPHY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPerson {
    #[serde(flatten)]
    pub person: Person,
    /// Cast plus crew credits.
    pub movie_count: i64,
    pub alternative_names: Vec<AlternativeName>,
    pub links: Vec<PersonLink>,
    pub nationalities: Vec<Nationality>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComparison {
    pub field: &'static str,
    pub value_a: Value,
    pub value_b: Value,
    pub display_a: String,
    pub display_b: String,
}

/// What one side would contribute if the other side survived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueCounts {
    pub cast_to_transfer: usize,
    pub crew_to_transfer: usize,
    pub alt_names_to_add: usize,
    pub links_to_transfer: usize,
    pub nationalities_to_add: usize,
    pub image_appearances: usize,
    pub awards: i64,
    pub festival_jury: usize,
    pub festival_award_winners: i64,
    pub page_views: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerOperand<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "B")]
    pub b: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePreview {
    pub person_a: PreviewPerson,
    pub person_b: PreviewPerson,
    pub suggested_survivor: SuggestedSurvivor,
    pub field_comparisons: Vec<FieldComparison>,
    pub shared_cast_count: usize,
    pub shared_crew_count: usize,
    pub unique_counts: PerOperand<UniqueCounts>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

struct Side {
    person: Person,
    credits: CreditCounts,
    cast: Vec<CastCredit>,
    crew: Vec<CrewCredit>,
    alternative_names: Vec<AlternativeName>,
    links: Vec<PersonLink>,
    nationalities: Vec<Nationality>,
    image_appearances: usize,
    awards: i64,
    jury_seats: usize,
    award_wins: i64,
    page_views: i64,
}

fn read_failed(source: StoreError) -> MergeError {
    MergeError::Storage {
        state: MergeState::Validated,
        source,
    }
}

async fn load_side(uow: &mut dyn MergeUnitOfWork, id: DbId) -> Result<Side, MergeError> {
    let person = uow
        .find_person(id)
        .await
        .map_err(read_failed)?
        .ok_or(MergeError::PersonNotFound(id))?;

    Ok(Side {
        person,
        credits: uow.count_credits(id).await.map_err(read_failed)?,
        cast: uow.list_cast_credits(id).await.map_err(read_failed)?,
        crew: uow.list_crew_credits(id).await.map_err(read_failed)?,
        alternative_names: uow.list_alternative_names(id).await.map_err(read_failed)?,
        links: uow.list_links(id).await.map_err(read_failed)?,
        nationalities: uow.list_nationalities(id).await.map_err(read_failed)?,
        image_appearances: uow
            .list_image_appearances(id)
            .await
            .map_err(read_failed)?
            .len(),
        awards: uow.count_awards(id).await.map_err(read_failed)?,
        jury_seats: uow.list_jury_seats(id).await.map_err(read_failed)?.len(),
        award_wins: uow.count_award_wins(id).await.map_err(read_failed)?,
        page_views: uow.count_page_views(id).await.map_err(read_failed)?,
    })
}

/// Build the preview for `person_a_id` / `person_b_id`.
///
/// The unit of work is rolled back whatever the outcome; nothing is written.
pub async fn build_preview(
    mut uow: Box<dyn MergeUnitOfWork>,
    person_a_id: DbId,
    person_b_id: DbId,
) -> Result<MergePreview, MergeError> {
    let loaded = async {
        let a = load_side(uow.as_mut(), person_a_id).await?;
        let b = load_side(uow.as_mut(), person_b_id).await?;
        Ok::<_, MergeError>((a, b))
    }
    .await;

    if let Err(err) = uow.rollback().await {
        tracing::warn!(error = %err, "Preview rollback failed");
    }

    let (a, b) = loaded?;
    Ok(compare(a, b))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

fn compare(a: Side, b: Side) -> MergePreview {
    let cast_a: HashSet<DbId> = a.cast.iter().map(|c| c.movie_id).collect();
    let cast_b: HashSet<DbId> = b.cast.iter().map(|c| c.movie_id).collect();
    let shared_cast_count = cast_a.intersection(&cast_b).count();

    let crew_a: HashSet<(DbId, DbId)> = a.crew.iter().map(|c| (c.movie_id, c.role_id)).collect();
    let crew_b: HashSet<(DbId, DbId)> = b.crew.iter().map(|c| (c.movie_id, c.role_id)).collect();
    let shared_crew_count = crew_a.intersection(&crew_b).count();

    let unique_counts = PerOperand {
        a: unique_counts(&a, &b, shared_cast_count, shared_crew_count),
        b: unique_counts(&b, &a, shared_cast_count, shared_crew_count),
    };

    MergePreview {
        suggested_survivor: suggest_survivor(a.credits, b.credits),
        field_comparisons: field_comparisons(&a.person, &b.person),
        shared_cast_count,
        shared_crew_count,
        unique_counts,
        person_a: into_preview_person(a),
        person_b: into_preview_person(b),
    }
}

fn into_preview_person(side: Side) -> PreviewPerson {
    PreviewPerson {
        movie_count: side.credits.total(),
        person: side.person,
        alternative_names: side.alternative_names,
        links: side.links,
        nationalities: side.nationalities,
    }
}

fn unique_counts(own: &Side, other: &Side, shared_cast: usize, shared_crew: usize) -> UniqueCounts {
    let other_alt_names: HashSet<String> = other
        .alternative_names
        .iter()
        .map(|n| n.full_name.to_lowercase())
        .collect();
    let own_alt_names: HashSet<String> = own
        .alternative_names
        .iter()
        .map(|n| n.full_name.to_lowercase())
        .collect();
    let other_urls: HashSet<&str> = other.links.iter().map(|l| l.url.as_str()).collect();
    let other_locations: HashSet<DbId> = other.nationalities.iter().map(|n| n.location_id).collect();

    UniqueCounts {
        cast_to_transfer: own.cast.len().saturating_sub(shared_cast),
        crew_to_transfer: own.crew.len().saturating_sub(shared_crew),
        alt_names_to_add: own_alt_names.difference(&other_alt_names).count(),
        links_to_transfer: own
            .links
            .iter()
            .filter(|l| !other_urls.contains(l.url.as_str()))
            .count(),
        nationalities_to_add: own
            .nationalities
            .iter()
            .filter(|n| !other_locations.contains(&n.location_id))
            .count(),
        image_appearances: own.image_appearances,
        awards: own.awards,
        festival_jury: own.jury_seats,
        festival_award_winners: own.award_wins,
        page_views: own.page_views,
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date_value(date: &Option<PartialDate>) -> Value {
    json!({
        "year": date.map(|d| d.year),
        "month": date.and_then(|d| d.month),
        "day": date.and_then(|d| d.day),
    })
}

fn date_display(date: &Option<PartialDate>) -> String {
    date.map(|d| d.display()).unwrap_or_default()
}

fn id_display(id: Option<DbId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn biography_display(bio: &Option<String>) -> String {
    match bio.as_deref() {
        Some(bio) if bio.chars().count() > BIOGRAPHY_PREVIEW_CHARS => {
            let cut: String = bio.chars().take(BIOGRAPHY_PREVIEW_CHARS).collect();
            format!("{cut}...")
        }
        Some(bio) => bio.to_string(),
        None => String::new(),
    }
}

/// Differences worth showing to an editor, in field-group order.
pub fn field_comparisons(a: &Person, b: &Person) -> Vec<FieldComparison> {
    let mut out = Vec::new();

    let name_a = a.full_name();
    let name_b = b.full_name();
    if normalize_for_comparison(&name_a) != normalize_for_comparison(&name_b) {
        out.push(FieldComparison {
            field: FieldGroup::Name.as_str(),
            value_a: json!({ "firstName": a.first_name, "lastName": a.last_name }),
            value_b: json!({ "firstName": b.first_name, "lastName": b.last_name }),
            display_a: name_a,
            display_b: name_b,
        });
    }

    // (group, valueA, valueB, displayA, displayB); shown when either display is non-empty.
    let scalars = [
        (
            FieldGroup::RealName,
            json!(a.real_name),
            json!(b.real_name),
            text(&a.real_name),
            text(&b.real_name),
        ),
        (
            FieldGroup::BirthDate,
            date_value(&a.birth_date),
            date_value(&b.birth_date),
            date_display(&a.birth_date),
            date_display(&b.birth_date),
        ),
        (
            FieldGroup::DeathDate,
            date_value(&a.death_date),
            date_value(&b.death_date),
            date_display(&a.death_date),
            date_display(&b.death_date),
        ),
        (
            FieldGroup::BirthLocation,
            json!(a.birth_location_id),
            json!(b.birth_location_id),
            id_display(a.birth_location_id),
            id_display(b.birth_location_id),
        ),
        (
            FieldGroup::DeathLocation,
            json!(a.death_location_id),
            json!(b.death_location_id),
            id_display(a.death_location_id),
            id_display(b.death_location_id),
        ),
        (
            FieldGroup::Biography,
            json!(a.biography),
            json!(b.biography),
            biography_display(&a.biography),
            biography_display(&b.biography),
        ),
        (
            FieldGroup::Photo,
            json!(a.photo_url),
            json!(b.photo_url),
            text(&a.photo_url),
            text(&b.photo_url),
        ),
        (
            FieldGroup::Gender,
            json!(a.gender),
            json!(b.gender),
            a.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
            b.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
        ),
        (
            FieldGroup::ImdbId,
            json!(a.imdb_id),
            json!(b.imdb_id),
            text(&a.imdb_id),
            text(&b.imdb_id),
        ),
        (
            FieldGroup::TmdbId,
            json!(a.tmdb_id),
            json!(b.tmdb_id),
            id_display(a.tmdb_id),
            id_display(b.tmdb_id),
        ),
    ];

    for (group, value_a, value_b, display_a, display_b) in scalars {
        if display_a.is_empty() && display_b.is_empty() {
            continue;
        }
        out.push(FieldComparison {
            field: group.as_str(),
            value_a,
            value_b,
            display_a,
            display_b,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::testing::{
        alt_name, cast, crew, image, jury_seat, link, nationality, person, MemoryCatalog,
    };
    use assert_matches::assert_matches;

    fn fields(comparisons: &[FieldComparison]) -> Vec<&'static str> {
        comparisons.iter().map(|c| c.field).collect()
    }

    #[test]
    fn accent_only_name_difference_is_hidden() {
        let a = person(1, "Juan", "Pérez");
        let b = person(2, "juan", "perez");
        assert!(field_comparisons(&a, &b).is_empty());
    }

    #[test]
    fn differing_name_is_listed_first() {
        let a = person(1, "Juan", "Pérez");
        let mut b = person(2, "Juan", "Peres");
        b.gender = Some(crate::person::Gender::Male);
        let out = field_comparisons(&a, &b);
        assert_eq!(fields(&out), vec!["name", "gender"]);
        assert_eq!(out[0].display_b, "Juan Peres");
        assert_eq!(out[1].display_a, "");
        assert_eq!(out[1].display_b, "MALE");
    }

    #[test]
    fn dates_render_partial_precision() {
        let mut a = person(1, "A", "A");
        a.birth_date = Some(PartialDate::new(1950, Some(3), None).unwrap());
        let b = person(2, "A", "A");
        let out = field_comparisons(&a, &b);
        assert_eq!(fields(&out), vec!["birthDate"]);
        assert_eq!(out[0].display_a, "1950-03");
        assert_eq!(out[0].value_a["year"], 1950);
        assert_eq!(out[0].value_b["year"], Value::Null);
    }

    #[test]
    fn long_biography_is_truncated() {
        let mut a = person(1, "A", "A");
        a.biography = Some("á".repeat(150));
        let b = person(2, "A", "A");
        let out = field_comparisons(&a, &b);
        assert_eq!(out[0].display_a.chars().count(), 103);
        assert!(out[0].display_a.ends_with("..."));
    }

    #[tokio::test]
    async fn preview_counts_shared_and_unique_rows() {
        let catalog = MemoryCatalog::default();
        catalog.insert_person(person(1, "Juan", "Pérez"));
        catalog.insert_person(person(2, "Juan", "Peres"));
        catalog.insert_cast(cast(10, 100, 1, None));
        catalog.insert_cast(cast(11, 101, 1, None));
        catalog.insert_cast(cast(20, 100, 2, None));
        catalog.insert_crew(crew(30, 100, 2, 5));
        catalog.insert_alt_name(alt_name(40, 1, "Johnny"));
        catalog.insert_alt_name(alt_name(41, 2, "JOHNNY"));
        catalog.insert_alt_name(alt_name(42, 2, "El Juan"));
        catalog.insert_link(link(50, 2, "https://b"));
        catalog.insert_nationality(nationality(1, 500, true));
        catalog.insert_nationality(nationality(2, 500, true));
        catalog.insert_image(image(60, 9, 2));
        catalog.insert_jury_seat(jury_seat(70, 3, 2));
        catalog.insert_awards(2, 2);
        catalog.insert_page_views(2, 11);

        let preview = build_preview(Box::new(catalog.begin()), 1, 2).await.unwrap();

        assert_eq!(preview.suggested_survivor, SuggestedSurvivor::Tie);
        assert_eq!(preview.person_a.movie_count, 2);
        assert_eq!(preview.shared_cast_count, 1);
        assert_eq!(preview.shared_crew_count, 0);
        assert_eq!(preview.unique_counts.a.cast_to_transfer, 1);
        let b = preview.unique_counts.b;
        assert_eq!(b.cast_to_transfer, 0);
        assert_eq!(b.crew_to_transfer, 1);
        assert_eq!(b.alt_names_to_add, 1);
        assert_eq!(b.links_to_transfer, 1);
        assert_eq!(b.nationalities_to_add, 0);
        assert_eq!(b.image_appearances, 1);
        assert_eq!(b.festival_jury, 1);
        assert_eq!(b.awards, 2);
        assert_eq!(b.page_views, 11);
        assert_eq!(catalog.commits(), 0);
    }

    #[tokio::test]
    async fn preview_serializes_wire_names() {
        let catalog = MemoryCatalog::default();
        catalog.insert_person(person(1, "A", "A"));
        catalog.insert_person(person(2, "B", "B"));

        let preview = build_preview(Box::new(catalog.begin()), 1, 2).await.unwrap();
        let body = serde_json::to_value(&preview).unwrap();
        assert_eq!(body["suggestedSurvivor"], "TIE");
        assert_eq!(body["personA"]["firstName"], "A");
        assert_eq!(body["personA"]["movieCount"], 0);
        assert_eq!(body["uniqueCounts"]["B"]["castToTransfer"], 0);
        assert_eq!(body["fieldComparisons"][0]["field"], "name");
    }

    #[tokio::test]
    async fn preview_of_missing_person_is_not_found() {
        let catalog = MemoryCatalog::default();
        catalog.insert_person(person(1, "A", "A"));
        let err = build_preview(Box::new(catalog.begin()), 1, 7).await.unwrap_err();
        assert_matches!(err, MergeError::PersonNotFound(7));
    }
}
