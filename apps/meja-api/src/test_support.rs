//! Fixtures shared by the handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use meja_db::MemoryStore;
use meja_gateway::MejaConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::state::{AppState, SharedState};

pub const QR_SECRET: &str = "table-secret";
pub const SERVER_KEY: &str = "SB-Mid-server-test";

/// Config whose remote hosts refuse connections.
pub fn offline_config() -> MejaConfig {
    config_for("http://127.0.0.1:1")
}

/// Config pointing both the restaurant API and the gateway at `base_url`.
pub fn config_for(base_url: &str) -> MejaConfig {
    let mut config = MejaConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.timeout_secs = 2;
    config.upstream.order_timeout_secs = 2;
    config.payment.base_url = base_url.to_string();
    config.payment.server_key = SERVER_KEY.to_string();
    config.payment.timeout_secs = 2;
    config.qr.secret = QR_SECRET.to_string();
    config.storage.in_memory = true;
    config
}

pub async fn state_for(config: MejaConfig) -> SharedState {
    Arc::new(AppState::new(config, MemoryStore::shared()).await.unwrap())
}

pub async fn offline_state() -> SharedState {
    state_for(offline_config()).await
}

/// The menu end-to-end example: 2 × 18 000 with 10% PB1.
pub fn nasi_goreng(qty: i64) -> Value {
    json!({
        "kind": "menu",
        "code": "NG01",
        "name": "Nasi Goreng",
        "unitPrice": 18000,
        "quantity": qty,
        "taxes": [{ "categoryName": "PB1", "percentage": 10 }]
    })
}

pub fn es_teh() -> Value {
    json!({
        "kind": "menu",
        "code": "ET01",
        "name": "Es Teh",
        "unitPrice": 5000,
        "quantity": 1
    })
}

/// Serves the restaurant API and the Midtrans endpoints on a local port
/// and returns its base URL.
pub async fn spawn_mock_backend() -> String {
    spawn_mock_backend_with(true).await.0
}

/// Like [`spawn_mock_backend`], with a gateway that rejects every charge
/// when `charge_ok` is false. Also returns how many orders were submitted.
pub async fn spawn_mock_backend_with(charge_ok: bool) -> (String, Arc<AtomicUsize>) {
    let submissions = Arc::new(AtomicUsize::new(0));
    let counter = submissions.clone();

    let app = Router::new()
        .route(
            "/stores/{store}/menus",
            get(|| async { Json(json!({ "data": [{ "code": "NG01", "name": "Nasi Goreng" }] })) }),
        )
        .route(
            "/stores/{store}/orders",
            post(move |Json(_body): Json<Value>| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "message": "created", "data": { "orderCode": "A-17" } }))
            }),
        )
        .route(
            "/stores/{store}/orders/{code}",
            get(|Path((_store, code)): Path<(String, String)>| async move {
                Json(json!({
                    "data": {
                        "orderCode": code,
                        "status": -1,
                        "grandTotal": 39600,
                        "menus": [{
                            "code": "NG01",
                            "name": "Nasi Goreng",
                            "price": 18000,
                            "qty": 2,
                            "taxes": [{ "taxName": "PB1", "taxPercentage": 10 }]
                        }],
                        "combos": []
                    }
                }))
            }),
        )
        .route(
            "/v2/charge",
            post(move |Json(body): Json<Value>| async move {
                if !charge_ok {
                    return Json(json!({
                        "status_code": "505",
                        "status_message": "Unable to create QRIS transaction"
                    }));
                }
                Json(json!({
                    "status_code": "201",
                    "status_message": "QRIS transaction is created",
                    "transaction_id": "trx-1",
                    "order_id": body["transaction_details"]["order_id"],
                    "gross_amount": format!("{}.00", body["transaction_details"]["gross_amount"]),
                    "transaction_status": "pending",
                    "qr_string": "00020101021226620014COM.GO-JEK.WWW",
                    "expiry_time": "2026-10-19 12:15:00"
                }))
            }),
        )
        .route(
            "/v2/{order_id}/status",
            get(|Path(order_id): Path<String>| async move {
                Json(json!({
                    "status_code": "200",
                    "transaction_status": "settlement",
                    "order_id": order_id,
                    "settlement_time": "2026-10-19 12:01:00"
                }))
            }),
        )
        .route(
            "/v2/{order_id}/cancel",
            post(|Path(order_id): Path<String>| async move {
                Json(json!({
                    "status_code": "200",
                    "transaction_status": "cancel",
                    "order_id": order_id
                }))
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), submissions)
}
