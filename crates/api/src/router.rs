//! HTTP router and middleware for the merge service.
//!
//! [`build_app_router`] is shared by `main.rs` and the integration tests so
//! both run the same stack.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Time allowed past the merge deadline for commit and cache purge.
pub const COMMIT_GRACE: Duration = Duration::from_secs(15);

/// `/health` must answer within this.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for one `/api/v1` request.
///
/// Never shorter than the merge deadline plus [`COMMIT_GRACE`], so a merge
/// whose pipeline finished in time is not dropped while it commits.
pub fn api_request_timeout(config: &ServerConfig) -> Duration {
    let floor = Duration::from_secs(config.merge_timeout_secs) + COMMIT_GRACE;
    Duration::from_secs(config.request_timeout_secs).max(floor)
}

/// Build the application [`Router`].
///
/// `/health` and `/api/v1` carry their own timeouts. Outside them, from the
/// innermost layer out: panic recovery, request-id propagation, tracing,
/// request-id assignment, CORS.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let api = routes::api_routes().layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        api_request_timeout(config),
    ));
    let health = routes::health::router().layer(TimeoutLayer::with_status_code(
        StatusCode::SERVICE_UNAVAILABLE,
        HEALTH_TIMEOUT,
    ));

    Router::new()
        .merge(health)
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// Span for one request, tagged with the id assigned by `SetRequestIdLayer`.
fn request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

/// CORS for the catalog admin UI: JSON `GET`/`POST`, no credentials.
///
/// Origins that are not valid header values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([REQUEST_ID])
        .max_age(Duration::from_secs(3600))
}
