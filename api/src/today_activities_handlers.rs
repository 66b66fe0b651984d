//! Today's activities handler: GET /api/activities/today
//!
//! Forwards the caller's credentials to the activity service, then keeps
//! only the records whose timestamp falls on the server's current local
//! calendar day. Upstream order is preserved.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use shared::{ActivityRecord, DayWindow};

use crate::{
    error::{ApiError, ApiResult},
    metrics,
    state::AppState,
};

/// GET /api/activities/today
///
/// Requires an `Authorization` header (any scheme, passed through as is).
/// Responds with the filtered JSON array, `[]` when nothing matched.
pub async fn get_today_activities(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ActivityRecord>>> {
    let result = todays_activities(&state, &headers).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.outcome(),
    };
    metrics::TODAY_REQUESTS_TOTAL
        .with_label_values(&[outcome])
        .inc();

    result.map(Json)
}

async fn todays_activities(
    state: &AppState,
    headers: &HeaderMap,
) -> ApiResult<Vec<ActivityRecord>> {
    // An empty header counts as missing.
    let token = headers
        .get(header::AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    let window = DayWindow::containing(&state.clock.now());

    let activities = state.upstream.list_activities(token).await?;
    let total = activities.len();
    let todays = window.filter(activities);

    tracing::debug!(
        total,
        kept = todays.len(),
        window_start = %window.start(),
        window_end = %window.end(),
        "filtered activities to today"
    );
    metrics::TODAY_RECORDS_RETURNED.observe(todays.len() as f64);

    Ok(todays)
}
