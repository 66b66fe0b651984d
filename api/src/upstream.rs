//! Client for the activity service that owns the activity records.

use std::time::Instant;

use anyhow::Context;
use axum::http::{header, HeaderValue};
use serde_json::Value;
use shared::ActivityRecord;

use crate::{
    error::{ApiError, ApiResult, UPSTREAM_FALLBACK_MESSAGE},
    metrics,
};

pub const LIST_ACTIVITIES_PATH: &str = "/api/activity";

/// Shared handle to the activity service. Cloning is cheap; the underlying
/// `reqwest::Client` pools connections across requests.
#[derive(Debug, Clone)]
pub struct ActivityServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ActivityServiceClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("activities-bff/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET {base}/api/activity on behalf of the caller.
    ///
    /// The `Authorization` value is forwarded byte for byte.
    pub async fn list_activities(
        &self,
        authorization: &HeaderValue,
    ) -> ApiResult<Vec<ActivityRecord>> {
        let url = format!("{}{}", self.base_url, LIST_ACTIVITIES_PATH);
        let start = Instant::now();

        let result = self
            .http
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, authorization.clone())
            .send()
            .await;

        let elapsed = start.elapsed();
        metrics::UPSTREAM_REQUEST_DURATION.observe(elapsed.as_secs_f64());

        let resp = result.with_context(|| format!("Failed to reach activity service at {url}"))?;
        let status = resp.status();

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "activity service responded"
        );

        if !status.is_success() {
            let body: Value = resp
                .json()
                .await
                .context("Failed to parse activity service error body")?;
            return Err(ApiError::upstream(status, upstream_message(&body)));
        }

        let records: Vec<ActivityRecord> = resp
            .json()
            .await
            .context("Failed to parse activity service response")?;

        Ok(records)
    }
}

/// The `message` field of an upstream error body, if it is a non-empty string.
fn upstream_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(UPSTREAM_FALLBACK_MESSAGE)
        .to_string()
}
