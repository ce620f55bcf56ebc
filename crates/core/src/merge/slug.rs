//! Slug regeneration for a survivor whose name changed.

use super::error::StoreResult;
use super::store::PersonStore;
use crate::slug::{person_slug, slug_candidate};
use crate::types::DbId;

/// Upper bound on candidate slugs tried before keeping the current one.
const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Find a free slug for `first`/`last`, owned by nobody but `survivor_id`.
///
/// Returns `current` unchanged when the name yields an empty slug.
pub async fn regenerate_slug<S: PersonStore + ?Sized>(
    store: &mut S,
    survivor_id: DbId,
    current: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> StoreResult<String> {
    let base = person_slug(first_name, last_name);
    if base.is_empty() {
        return Ok(current.to_string());
    }

    for attempt in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug_candidate(&base, attempt);
        match store.find_person_id_by_slug(&candidate).await? {
            None => return Ok(candidate),
            Some(owner) if owner == survivor_id => return Ok(candidate),
            Some(_) => continue,
        }
    }

    tracing::warn!(
        survivor_id,
        base = %base,
        "No free slug found, keeping current slug"
    );
    Ok(current.to_string())
}
