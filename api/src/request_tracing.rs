//! Structured request tracing middleware.
//!
//! Every incoming HTTP request gets a unique UUID (`X-Request-ID`), and one
//! structured log line is emitted after the response is produced.
//!
//! Health and metrics scrapes are skipped so they don't flood the log.
//!
//! Log fields:
//!   request_id, method, path, status, duration_ms, user_ip

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use uuid::Uuid;

use crate::config::LogFormat;

/// Paths that should never be logged.
const SKIP_LOG_PATHS: &[&str] = &["/health", "/metrics"];

/// The response header name carrying the request ID back to the caller.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Attach a request ID, log the completed request and echo the ID in the
/// `X-Request-ID` response header.
pub async fn tracing_middleware(mut req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_owned();

    // Only present when served through `into_make_service_with_connect_info`.
    let user_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let start = Instant::now();
    let mut response = next.run(req).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), val);
    }

    if SKIP_LOG_PATHS.iter().any(|p| path.starts_with(p)) {
        return response;
    }

    let status = response.status().as_u16();

    tracing::info!(
        request_id  = %request_id,
        method      = %method,
        path        = %path,
        status      = status,
        duration_ms = duration_ms,
        user_ip     = %user_ip,
        "request"
    );

    response
}

/// Request ID stored in request extensions for downstream code.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default filter. Output goes to stdout; rotation
/// is left to the deployment environment.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "activities_bff=debug,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}
