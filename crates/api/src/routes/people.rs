//! Route definitions for the `/people` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::people_merge;
use crate::state::AppState;

/// Routes mounted at `/people`.
///
/// ```text
/// POST   /merge                         -> merge_people
/// POST   /merge/preview                 -> preview_merge
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/merge", post(people_merge::merge_people))
        .route("/merge/preview", post(people_merge::preview_merge))
}
