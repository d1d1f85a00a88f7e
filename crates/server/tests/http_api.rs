//! Router-level tests: every request goes through the full middleware stack
//! with default settings and a temporary order file.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;
use voice_order_config::{RuntimeEnvironment, Settings};
use voice_order_server::{create_router, AppState};

fn settings(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.orders.storage_path = dir.path().join("orders.json").display().to_string();
    settings.tts.audio_dir = dir.path().join("audio").display().to_string();
    settings
}

fn app(settings: Settings) -> Router {
    create_router(AppState::build(settings).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

/// Percent-encode every byte outside the unreserved set
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_and_ready() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    let ready: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(ready["active_calls"], 0);
    assert_eq!(ready["providers"]["stt"], "disabled");
    assert_eq!(ready["providers"]["tts"], "telephony");
}

#[tokio::test]
async fn test_create_and_list_orders() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, body) = send(
        &app,
        json_post(
            "/api/orders",
            serde_json::json!({
                "customer_name": "Sara",
                "items": [{"name": "شاورما دجاج", "quantity": 2}, {"name": "بيبسي"}],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: serde_json::Value = serde_json::from_str(&body).unwrap();
    let order_id = created["order_id"].as_str().unwrap().to_string();
    assert!(created["message"]
        .as_str()
        .unwrap()
        .starts_with("Thank you, Sara. Your order (ID: "));

    let (status, body) = send(&app, get(&format!("/api/orders/{}", order_id))).await;
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["customer_name"], "Sara");
    assert_eq!(order["items"][1]["quantity"], 1);

    let (_, body) = send(&app, get("/api/orders")).await;
    let listed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(listed["count"], 1);

    let (_, body) = send(&app, get("/orders")).await;
    let by_id: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(by_id.get(order_id.as_str()).is_some());

    // non-ASCII is written as-is
    let raw = std::fs::read_to_string(dir.path().join("orders.json")).unwrap();
    assert!(raw.contains("شاورما دجاج"));
}

#[tokio::test]
async fn test_invalid_orders_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, _) = send(
        &app,
        json_post("/api/orders", serde_json::json!({"customer_name": "Sara", "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_post(
            "/submit-order",
            serde_json::json!({"customer_name": "Sara", "items": [{"name": "بيبسي", "quantity": 0}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, json_post("/api/orders", serde_json::json!({"items": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/orders/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_text_call_places_order() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, body) = send(
        &app,
        json_post("/api/calls/CA1/start", serde_json::json!({"from": "+963111", "to": "+963222"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let start: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(start["stage"], "greeting");

    let mut last = serde_json::Value::Null;
    for text in ["شاورما دجاج", "أكيد", "أحمد", "أكيد"] {
        let (status, body) = send(
            &app,
            json_post("/api/calls/CA1/turns", serde_json::json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = serde_json::from_str(&body).unwrap();
    }
    assert_eq!(last["stage"], "order_placed");
    let order_id = last["order"]["order_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/api/calls/CA1")).await;
    assert_eq!(status, StatusCode::OK);
    let call: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(call["from_number"], "+963111");
    assert_eq!(call["customer_name"], "أحمد");
    assert_eq!(call["history_len"], 4);

    let (status, _) = send(&app, get(&format!("/api/orders/{}", order_id))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/calls")).await;
    let calls: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(calls["count"], 1);

    let delete = Request::delete("/api/calls/CA1").body(Body::empty()).unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let delete = Request::delete("/api/calls/CA1").body(Body::empty()).unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/calls/CA1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_telephony_webhooks() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, xml) = send(
        &app,
        form_post(
            "/sip/incoming_call",
            &[("CallSid", "CA9"), ("From", "+963111"), ("To", "+963222")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(r#"<Gather input="speech" action="/sip/handle_speech""#));
    assert!(xml.contains("مرحباً بك في تشيكن تشاركو!"));
    assert!(xml.contains("المعذرة, ما سمعت أي شيء. ودّع!"));
    assert!(xml.ends_with("<Hangup/></Response>"));

    let (status, xml) = send(
        &app,
        form_post(
            "/sip/handle_speech",
            &[("CallSid", "CA9"), ("SpeechResult", "شاورما دجاج"), ("Confidence", "0.91")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<Gather"));
    assert!(xml.contains("شاورما دجاج"));

    let (_, xml) = send(
        &app,
        form_post("/sip/handle_speech", &[("CallSid", "CA9"), ("SpeechResult", "goodbye")]),
    )
    .await;
    assert!(!xml.contains("<Gather"));
    assert!(xml.ends_with("<Hangup/></Response>"));

    let (_, xml) = send(
        &app,
        form_post("/sip/call_status", &[("CallSid", "CA9"), ("CallStatus", "completed")]),
    )
    .await;
    assert!(xml.ends_with("<Response/>"));

    let (status, _) = send(&app, get("/api/calls/CA9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nlu_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, body) = send(
        &app,
        json_post("/api/nlu/analyze", serde_json::json!({"text": "بدي 2 شاورما دجاج"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let analysis: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(analysis["intent"], "order");
    assert_eq!(analysis["entities"]["quantity"], 2);
    assert_eq!(analysis["entities"]["items"][0]["name"], "شاورما دجاج");
}

#[tokio::test]
async fn test_audio_requires_synthesizer() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(settings(&dir));

    let (status, _) = send(&app, get("/audio/response_CA1_abc.mp3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_production_api_has_no_credential_gate() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir);
    settings.environment = RuntimeEnvironment::Production;
    let app = app(settings);

    assert_eq!(send(&app, get("/api/calls")).await.0, StatusCode::OK);
    assert_eq!(send(&app, get("/api/orders")).await.0, StatusCode::OK);

    let with_header = Request::get("/api/calls")
        .header(header::AUTHORIZATION, "Bearer anything")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, with_header).await.0, StatusCode::OK);
}
