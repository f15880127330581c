//! Prometheus metrics for chatbot-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Registry plus every collector registered in it.
pub struct ChatMetrics {
    pub registry: Registry,
    pub chat_requests_total: IntCounterVec,
    pub chat_request_duration_seconds: HistogramVec,
    pub inference_latency_seconds: HistogramVec,
    pub inference_errors_total: IntCounterVec,
}

static METRICS: OnceLock<ChatMetrics> = OnceLock::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    METRICS.get_or_init(|| {
        let metrics = build_metrics();
        tracing::info!("Prometheus metrics initialized");
        metrics
    });
}

fn build_metrics() -> ChatMetrics {
    let registry = Registry::new();

    let chat_requests_total = IntCounterVec::new(
        Opts::new("chat_requests_total", "Total chat invocations by status code"),
        &["status"],
    )
    .expect("Failed to create chat_requests_total metric");

    let chat_request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "chat_request_duration_seconds",
            "End-to-end chat invocation duration in seconds",
        )
        .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["status"],
    )
    .expect("Failed to create chat_request_duration_seconds metric");

    let inference_latency_seconds = HistogramVec::new(
        HistogramOpts::new(
            "inference_latency_seconds",
            "Remote inference call latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )
    .expect("Failed to create inference_latency_seconds metric");

    let inference_errors_total = IntCounterVec::new(
        Opts::new("inference_errors_total", "Total remote inference failures"),
        &["provider", "error_type"],
    )
    .expect("Failed to create inference_errors_total metric");

    registry
        .register(Box::new(chat_requests_total.clone()))
        .expect("Failed to register chat_requests_total");
    registry
        .register(Box::new(chat_request_duration_seconds.clone()))
        .expect("Failed to register chat_request_duration_seconds");
    registry
        .register(Box::new(inference_latency_seconds.clone()))
        .expect("Failed to register inference_latency_seconds");
    registry
        .register(Box::new(inference_errors_total.clone()))
        .expect("Failed to register inference_errors_total");

    ChatMetrics {
        registry,
        chat_requests_total,
        chat_request_duration_seconds,
        inference_latency_seconds,
        inference_errors_total,
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record a finished chat invocation.
pub fn record_chat_request(status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();
    if let Some(m) = METRICS.get() {
        m.chat_requests_total.with_label_values(&[status.as_str()]).inc();
        m.chat_request_duration_seconds
            .with_label_values(&[status.as_str()])
            .observe(duration_secs);
    }
}

/// Record remote inference latency.
pub fn record_inference_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.inference_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a remote inference failure.
pub fn record_inference_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.inference_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_text_output() {
        init_metrics();
        record_chat_request(200, 0.25);
        record_inference_error("mock", "network");

        let text = get_metrics();
        assert!(text.contains("chat_requests_total{status=\"200\"}"));
        assert!(text.contains("inference_errors_total{error_type=\"network\",provider=\"mock\"}"));
    }

    #[test]
    fn init_is_idempotent() {
        init_metrics();
        init_metrics();
        assert!(METRICS.get().is_some());
    }
}
