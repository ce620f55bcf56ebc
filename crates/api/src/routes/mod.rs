pub mod health;
pub mod people;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /people/merge                                    merge two people (POST)
/// /people/merge/preview                            compare before merging (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/people", people::router())
}
