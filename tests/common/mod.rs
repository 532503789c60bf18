//! Shared fixtures: an axum mock of the marketplace backend and an in-memory camera.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pickup_scanner::camera::{CaptureDevice, CaptureStream, HardwareTrack};
use pickup_scanner::error::{CaptureError, DeviceError};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;

/// One request received by the mock confirm endpoint.
#[derive(Debug, Clone)]
pub struct ConfirmCall {
    pub token: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct Inner {
    confirm_calls: Mutex<Vec<ConfirmCall>>,
    scripted: Mutex<HashMap<String, (StatusCode, Value)>>,
    orders: Mutex<Value>,
    hold: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    received: Notify,
    gate: Notify,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBody {
    qr_code_token: String,
}

impl MockBackend {
    /// Serve the mock on an ephemeral local port. Returns its base URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/api/orders/scan", post(confirm))
            .route("/api/orders/provider", get(provider_orders))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/api")
    }

    /// Answer confirmations of `token` with `status` and `body`.
    pub fn script(&self, token: &str, status: StatusCode, body: Value) {
        self.inner
            .scripted
            .lock()
            .unwrap()
            .insert(token.to_string(), (status, body));
    }

    pub fn set_orders(&self, orders: Value) {
        *self.inner.orders.lock().unwrap() = orders;
    }

    /// Hold confirm responses until [`MockBackend::release`].
    pub fn hold_confirmations(&self) {
        *self.inner.hold.lock().unwrap() = true;
    }

    pub fn release(&self) {
        self.inner.gate.notify_one();
    }

    pub fn delay_confirmations(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = Some(delay);
    }

    pub async fn wait_for_confirm(&self) {
        self.inner.received.notified().await;
    }

    pub fn confirm_calls(&self) -> Vec<ConfirmCall> {
        self.inner.confirm_calls.lock().unwrap().clone()
    }
}

async fn confirm(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<ConfirmBody>,
) -> Response {
    let authorization = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    backend.inner.confirm_calls.lock().unwrap().push(ConfirmCall {
        token: body.qr_code_token.clone(),
        authorization,
    });
    backend.inner.received.notify_one();

    let hold = *backend.inner.hold.lock().unwrap();
    if hold {
        backend.inner.gate.notified().await;
    }
    let delay = *backend.inner.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let scripted = backend
        .inner
        .scripted
        .lock()
        .unwrap()
        .get(&body.qr_code_token)
        .cloned();

    match scripted {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => {
            let digits: String = body
                .qr_code_token
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            let id: i64 = digits.parse().unwrap_or(0);
            (StatusCode::OK, Json(json!({ "id": id, "status": "confirmed" }))).into_response()
        }
    }
}

async fn provider_orders(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response();
    }

    let orders = backend.inner.orders.lock().unwrap().clone();
    let orders = if orders.is_null() { json!([]) } else { orders };
    (StatusCode::OK, Json(orders)).into_response()
}

/// Camera that records what happened to it, in order.
#[derive(Clone, Default)]
pub struct TestCamera {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl TestCamera {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

pub struct TestStream {
    events: Arc<Mutex<Vec<String>>>,
}

pub struct TestTrack {
    events: Arc<Mutex<Vec<String>>>,
}

impl CaptureDevice for TestCamera {
    type Stream = TestStream;

    fn open(&self) -> impl Future<Output = Result<TestStream, DeviceError>> + Send {
        self.events.lock().unwrap().push("open".into());
        std::future::ready(Ok(TestStream {
            events: self.events.clone(),
        }))
    }
}

impl CaptureStream for TestStream {
    type Track = TestTrack;

    fn stop(&mut self) -> impl Future<Output = Result<(), CaptureError>> + Send {
        self.events.lock().unwrap().push("library-stop".into());
        std::future::ready(Ok(()))
    }

    fn video_tracks(&mut self) -> Vec<TestTrack> {
        vec![TestTrack {
            events: self.events.clone(),
        }]
    }
}

impl HardwareTrack for TestTrack {
    fn label(&self) -> String {
        "video".into()
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.events.lock().unwrap().push("track-stop".into());
        Ok(())
    }
}
