use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{handlers, request_tracing, state::AppState, today_activities_handlers};

pub fn activity_routes() -> Router<AppState> {
    Router::new().route(
        "/api/activities/today",
        get(today_activities_handlers::get_today_activities),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(handlers::metrics_endpoint))
}

/// The complete application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(activity_routes())
        .merge(health_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_tracing::tracing_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
