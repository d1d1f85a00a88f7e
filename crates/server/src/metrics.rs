//! Prometheus metrics
//!
//! The recorder is process-global, so it is installed at most once; later
//! calls get the same handle back.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::AppState;

static PROMETHEUS: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

fn describe_metrics() {
    metrics::describe_counter!("voice_order_calls_started_total", "Calls registered");
    metrics::describe_counter!("voice_order_calls_ended_total", "Calls ended by hangup or status");
    metrics::describe_counter!("voice_order_calls_rejected_total", "Calls refused at capacity");
    metrics::describe_counter!("voice_order_turns_total", "Dialogue turns by intent");
    metrics::describe_counter!("voice_order_orders_submitted_total", "Orders persisted");
    metrics::describe_counter!("voice_order_orders_failed_total", "Order submissions that failed");
    metrics::describe_counter!(
        "voice_order_upstream_failures_total",
        "Speech provider failures by provider"
    );
    metrics::describe_gauge!("voice_order_active_calls", "Calls with a live session");
    metrics::describe_histogram!("voice_order_turn_duration_seconds", "Turn handling latency");
    metrics::describe_histogram!("voice_order_stt_duration_seconds", "Transcription latency");
    metrics::describe_histogram!("voice_order_tts_duration_seconds", "Synthesis latency");
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            "metrics disabled\n".to_string(),
        ),
    }
}
