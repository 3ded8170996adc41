use std::time::Duration;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "locations_operations_total",
        "Location operations handled, by operation and response status",
        &["operation", "status"]
    )
    .expect("register operations_total")
});

pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "locations_operation_duration_seconds",
        "Location operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("register operation_duration")
});

pub fn record(operation: &str, status: StatusCode, elapsed: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, status.as_str()])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_operations_show_up_in_exposition() {
        record("get", StatusCode::NOT_FOUND, Duration::from_millis(3));
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("locations_operations_total"));
        assert!(body.contains(r#"operation="get",status="404""#));
        assert!(body.contains("locations_operation_duration_seconds"));
    }
}
