//! HTTP Endpoints
//!
//! Telephony webhooks, the order API, call inspection and text-driven turns.

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use voice_order_agent::EndOutcome;
use voice_order_core::{EntityExtractor, LineItem, Order};
use voice_order_persistence::OrderStore;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::telephony;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config);

    Router::new()
        // Telephony webhooks
        .route("/sip/incoming_call", post(telephony::incoming_call))
        .route("/sip/handle_speech", post(telephony::handle_speech))
        .route("/sip/call_status", post(telephony::call_status))
        .route("/audio/:file", get(serve_audio))
        // Orders
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/:id", get(get_order))
        .route("/submit-order", post(create_order))
        .route("/orders", get(orders_by_id))
        // Calls
        .route("/api/calls", get(list_calls))
        .route("/api/calls/:id", get(get_call).delete(end_call))
        .route("/api/calls/:id/start", post(start_call))
        .route("/api/calls/:id/turns", post(call_turn))
        // Language understanding
        .route("/api/nlu/analyze", post(analyze))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - Disabled CORS gives a permissive layer (development only)
/// - No configured origins defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let localhost = || {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

// ---- Orders ----

#[derive(Debug, Deserialize)]
struct OrderItemRequest {
    name: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    customer_name: String,
    #[serde(default)]
    items: Vec<OrderItemRequest>,
}

async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let items: Vec<LineItem> = request
        .items
        .into_iter()
        .map(|i| LineItem {
            name: i.name,
            quantity: i.quantity,
        })
        .collect();

    let order = state.orders.create(&request.customer_name, &items).await?;
    let eta = order.eta.to_rfc3339();

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "order_id": order.order_id,
            "estimated_time_of_arrival": eta,
            "message": format!(
                "Thank you, {}. Your order (ID: {}) has been received. Estimated arrival time is {}.",
                order.customer_name, order.order_id, eta
            ),
        })),
    ))
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let orders = state.orders.list().await?;
    Ok(Json(serde_json::json!({
        "count": orders.len(),
        "orders": orders,
    })))
}

/// The stored map as-is, keyed by order id
async fn orders_by_id(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Order>>, ServerError> {
    let orders = state.orders.list().await?;
    Ok(Json(
        orders.into_iter().map(|o| (o.order_id.clone(), o)).collect(),
    ))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ServerError> {
    state
        .orders
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("order {}", id)))
}

// ---- Calls ----

async fn list_calls(State(state): State<AppState>) -> Json<serde_json::Value> {
    let calls = state.sessions().list();
    Json(serde_json::json!({
        "count": calls.len(),
        "calls": calls,
    }))
}

async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let snapshot = state
        .sessions()
        .snapshot(&id)
        .ok_or_else(|| ServerError::NotFound(format!("call {}", id)))?;
    let dialogue = &snapshot.state;

    Ok(Json(serde_json::json!({
        "call_id": snapshot.context.call_id,
        "from_number": snapshot.context.from_number,
        "to_number": snapshot.context.to_number,
        "active": snapshot.context.is_active(),
        "started_at": snapshot.context.started_at(),
        "stage": dialogue.stage(),
        "stage_name": dialogue.stage().display_name(),
        "items": dialogue.order_items(),
        "customer_name": dialogue.customer_name(),
        "last_prompt": dialogue.last_prompt(),
        "turn_count": dialogue.turn_count(),
        "history_len": dialogue.history_len(),
    })))
}

async fn end_call(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.orchestrator.end_call(&id).await {
        EndOutcome::Ended(_) => StatusCode::NO_CONTENT,
        EndOutcome::Unknown => StatusCode::NOT_FOUND,
    }
}

#[derive(Debug, Default, Deserialize)]
struct StartCallRequest {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

async fn start_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<StartCallRequest>>,
) -> impl IntoResponse {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let outcome = state
        .orchestrator
        .start_call(&id, &request.from, &request.to)
        .await;
    Json(outcome)
}

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
}

async fn call_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    let outcome = state.orchestrator.handle_turn(&id, &request.text).await;
    Ok(Json(outcome))
}

// ---- Language understanding ----

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let (intent, keyword) = state.classifier.classify_with_keyword(&request.text);
    let entities = state.extractor.extract(&request.text);

    Ok(Json(serde_json::json!({
        "text": request.text,
        "intent": intent,
        "keyword": keyword,
        "entities": entities,
    })))
}

// ---- Audio ----

async fn serve_audio(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let audio = state
        .orchestrator
        .audio_store()
        .ok_or_else(|| ServerError::NotFound(file.clone()))?;

    let (bytes, content_type) = audio.load(&file).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

// ---- Health ----

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let orders_path = state.get_config().orders.storage_path.clone();

    let mut checks = serde_json::Map::new();
    checks.insert(
        "sessions".to_string(),
        serde_json::json!({
            "status": "ok",
            "count": state.sessions().count(),
        }),
    );
    checks.insert(
        "orders".to_string(),
        serde_json::json!({
            "status": "ok",
            "path": orders_path,
        }),
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks,
        })),
    )
}

async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let sessions = state.sessions();
    let active = sessions.count();
    let max = sessions.max_sessions();
    let ready = active < max;

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "at_capacity" },
            "active_calls": active,
            "max_sessions": max,
            "providers": {
                "stt": state.orchestrator.stt_provider(),
                "tts": state.orchestrator.tts_provider().unwrap_or("telephony"),
            },
        })),
    )
}
