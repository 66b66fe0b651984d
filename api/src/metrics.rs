//! Prometheus collectors for the proxy.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

pub static TODAY_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "activities_today_requests_total",
            "Requests to the today's-activities endpoint by outcome",
        ),
        &["outcome"],
    )
    .expect("metric can be created")
});

pub static UPSTREAM_REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(HistogramOpts::new(
        "activities_upstream_request_duration_seconds",
        "Latency of calls to the activity service",
    ))
    .expect("metric can be created")
});

pub static TODAY_RECORDS_RETURNED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "activities_today_records_returned",
            "Number of records left after filtering to today",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
    )
    .expect("metric can be created")
});

pub fn register_all(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(TODAY_REQUESTS_TOTAL.clone()))?;
    registry.register(Box::new(UPSTREAM_REQUEST_DURATION.clone()))?;
    registry.register(Box::new(TODAY_RECORDS_RETURNED.clone()))?;
    Ok(())
}

/// Render every collector in `registry` in the text exposition format.
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
