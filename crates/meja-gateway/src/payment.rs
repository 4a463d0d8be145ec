//! # Payment Gateway (Midtrans Core API)
//!
//! QRIS charges, status checks, cancellation and webhook verification.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout                                                               │
//! │     │  POST /v2/charge  { payment_type: "qris", transaction_details }   │
//! │     ▼                                                                   │
//! │  QrisCharge { qr_string, expires_at }  ──► shown to the customer        │
//! │     │                                                                   │
//! │     ├── PaymentPoller: GET /v2/{order_id}/status every 5s               │
//! │     │                                                                   │
//! │     └── webhook: POST /api/payments/notify                              │
//! │            signature_key = sha512(order_id + status_code +              │
//! │                                   gross_amount + server_key)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All requests authenticate with HTTP basic auth: server key as the user
//! name, empty password.

use async_trait::async_trait;
use meja_core::{Money, PaymentStatus};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha512};
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::config::PaymentSettings;
use crate::error::{GatewayError, GatewayResult};

/// Action name carrying the QR image URL when `qr_string` is absent.
const QR_ACTION_NAME: &str = "generate-qr-code";

// =============================================================================
// Wire Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeAction {
    pub name: String,
    #[serde(default)]
    pub method: String,
    pub url: String,
}

/// Response of `POST /v2/charge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeResponse {
    pub status_code: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<ChargeAction>>,
    #[serde(default)]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub qr_string: Option<String>,
}

/// Response of `GET /v2/{order_id}/status` and `POST /v2/{order_id}/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status_code: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
}

/// HTTP notification posted by the gateway on every status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

/// A created QRIS charge, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrisCharge {
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub qr_string: String,
    pub gross_amount: Money,
    pub expires_at: Option<String>,
}

/// Current state of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionState {
    pub order_id: String,
    pub status: PaymentStatus,
    pub transaction_status: String,
    pub settled_at: Option<String>,
}

// =============================================================================
// Status Source
// =============================================================================

/// Anything that can report the payment state of an order id.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn payment_status(&self, order_id: &str) -> GatewayResult<PaymentStatus>;
}

// =============================================================================
// Client
// =============================================================================

/// Midtrans Core API client.
#[derive(Clone)]
pub struct PaymentClient {
    http: Client,
    base_url: String,
    server_key: String,
    minimum_amount: i64,
    timeout_secs: u64,
}

impl PaymentClient {
    pub fn new(settings: &PaymentSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(PaymentClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            server_key: settings.server_key.clone(),
            minimum_amount: settings.minimum_amount,
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Creates a QRIS charge for `amount`.
    pub async fn charge_qris(&self, order_id: &str, amount: Money) -> GatewayResult<QrisCharge> {
        self.ensure_configured()?;
        if amount.amount() < self.minimum_amount {
            return Err(GatewayError::AmountTooSmall {
                amount: amount.amount(),
                minimum: self.minimum_amount,
            });
        }

        let body = json!({
            "payment_type": "qris",
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": amount.amount(),
            }
        });

        info!(order_id = %order_id, amount = %amount, "Creating QRIS charge");
        let response = self
            .authed(self.http.post(format!("{}/v2/charge", self.base_url)))
            .json(&body)
            .send()
            .await;
        let charge: ChargeResponse = self.read(response).await?;
        ensure_accepted(&charge.status_code, charge.status_message.as_deref())?;

        let qr_string = qr_from_charge(&charge).ok_or(GatewayError::MissingQrCode)?;
        debug!(order_id = %order_id, expiry = ?charge.expiry_time, "QRIS charge created");

        Ok(QrisCharge {
            order_id: order_id.to_string(),
            transaction_id: charge.transaction_id,
            qr_string,
            gross_amount: amount,
            expires_at: charge.expiry_time,
        })
    }

    /// Fetches the transaction state of `order_id`.
    pub async fn status(&self, order_id: &str) -> GatewayResult<TransactionState> {
        self.ensure_configured()?;

        let response = self
            .authed(self.http.get(format!("{}/v2/{}/status", self.base_url, order_id)))
            .send()
            .await;
        let status: StatusResponse = self.read(response).await?;
        Ok(transaction_state(order_id, status))
    }

    /// Cancels a pending transaction.
    pub async fn cancel(&self, order_id: &str) -> GatewayResult<TransactionState> {
        self.ensure_configured()?;

        info!(order_id = %order_id, "Cancelling transaction");
        let response = self
            .authed(self.http.post(format!("{}/v2/{}/cancel", self.base_url, order_id)))
            .send()
            .await;
        let status: StatusResponse = self.read(response).await?;
        ensure_accepted(&status.status_code, status.status_message.as_deref())?;
        Ok(transaction_state(order_id, status))
    }

    /// Checks a webhook's signature and returns the status it reports.
    pub fn verify_notification(
        &self,
        notification: &PaymentNotification,
    ) -> GatewayResult<PaymentStatus> {
        self.ensure_configured()?;

        let expected = signature_key(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &self.server_key,
        );
        if !signatures_match(&expected, &notification.signature_key) {
            warn!(order_id = %notification.order_id, "Rejecting notification with bad signature");
            return Err(GatewayError::InvalidSignature);
        }

        let status = PaymentStatus::from_transaction_status(&notification.transaction_status);
        debug!(order_id = %notification.order_id, ?status, "Notification verified");
        Ok(status)
    }

    fn ensure_configured(&self) -> GatewayResult<()> {
        if self.server_key.is_empty() {
            return Err(GatewayError::InvalidConfig("payment server key is not set".into()));
        }
        Ok(())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(&self.server_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn read<T: DeserializeOwned>(
        &self,
        response: Result<Response, reqwest::Error>,
    ) -> GatewayResult<T> {
        let response = response.map_err(|e| GatewayError::from_send(e, self.timeout_secs))?;

        let status = response.status();
        let raw = response.text().await.map_err(GatewayError::from)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Payment gateway HTTP error");
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                message: raw.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&raw).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl StatusSource for PaymentClient {
    async fn payment_status(&self, order_id: &str) -> GatewayResult<PaymentStatus> {
        Ok(self.status(order_id).await?.status)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// A fresh, unique order id for the gateway.
pub fn new_order_id() -> String {
    format!(
        "MEJA-{}-{}",
        chrono::Utc::now().format("%Y%m%d%H%M%S"),
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    )
}

/// `sha512_hex(order_id + status_code + gross_amount + server_key)`.
pub fn signature_key(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares hex signatures by their decoded bytes in constant time. Case
/// does not matter; anything that is not hex never matches.
fn signatures_match(expected: &str, received: &str) -> bool {
    let (Ok(expected), Ok(received)) = (hex::decode(expected), hex::decode(received.trim())) else {
        return false;
    };
    expected.len() == received.len() && bool::from(expected.as_slice().ct_eq(received.as_slice()))
}

/// Gateway-level status codes "200" and "201" mean accepted. Status checks
/// skip this: a "404" there means the transaction is not known yet and
/// reads as pending.
fn ensure_accepted(status_code: &str, message: Option<&str>) -> GatewayResult<()> {
    match status_code {
        "200" | "201" => Ok(()),
        other => Err(GatewayError::PaymentRejected {
            status_code: other.to_string(),
            message: message.unwrap_or("Unknown error").to_string(),
        }),
    }
}

fn qr_from_charge(charge: &ChargeResponse) -> Option<String> {
    charge.qr_string.clone().filter(|s| !s.is_empty()).or_else(|| {
        charge.actions.as_ref().and_then(|actions| {
            actions
                .iter()
                .find(|a| a.name == QR_ACTION_NAME)
                .map(|a| a.url.clone())
        })
    })
}

fn transaction_state(order_id: &str, response: StatusResponse) -> TransactionState {
    let transaction_status = response.transaction_status.unwrap_or_else(|| "pending".to_string());
    TransactionState {
        order_id: response.order_id.unwrap_or_else(|| order_id.to_string()),
        status: PaymentStatus::from_transaction_status(&transaction_status),
        transaction_status,
        settled_at: response.settlement_time,
    }
}
