//! Application router.
//!
//! `/` serves the page; JSON endpoints are nested under `/api/` with
//! `Cache-Control: no-store` so the page always sees live session state.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the full router.
///
/// CORS is open so the page can also be hosted from a static site and
/// pointed at this server.
pub fn app_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/session", get(endpoints::session::snapshot))
        .route("/analyze", post(endpoints::analyze::run))
        .route(
            "/credential",
            put(endpoints::credential::store).delete(endpoints::credential::clear),
        )
        .with_state(ctx)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(endpoints::page::index))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
