//! # Upstream Restaurant API
//!
//! Client for the restaurant's ordering backend: catalogue reads, order
//! submission and order lookup.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  {base}/stores/{store}/menus          catalogue, empty on failure │
//! │  GET  {base}/stores/{store}/categories     catalogue, empty on failure │
//! │  POST {base}/stores/{store}/orders         order payload → order code  │
//! │  GET  {base}/stores/{store}/orders/{code}  order echo (menus, combos)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalogue reads are non-critical: the menu screen shows an empty list
//! rather than an error. Order submission carries its own, longer timeout.

use meja_core::boundary::parse_number;
use meja_core::{OrderPayload, OrderProgress, OrderType, PaymentSession};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::UpstreamSettings;
use crate::error::{GatewayError, GatewayResult};

const ORDER_CODE_KEYS: &[&str] = &["orderCode", "code", "orderId", "id"];
const ORDER_STATUS_KEYS: &[&str] = &["status", "orderStatus", "statusCode"];
const LIST_KEYS: &[&str] = &["data", "items", "results"];

// =============================================================================
// Order Submission
// =============================================================================

/// Body posted to the orders endpoint: the normalised payload plus who is
/// ordering and the payment it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub store_code: String,
    pub order_type: OrderType,
    pub table_number: String,
    pub payment_order_id: String,
    #[serde(flatten)]
    pub payload: OrderPayload,
}

impl OrderSubmission {
    pub fn from_session(session: &PaymentSession) -> Self {
        OrderSubmission {
            store_code: session.store_code.clone(),
            order_type: session.order_type,
            table_number: session.table_number.clone(),
            payment_order_id: session.order_id.clone(),
            payload: session.cart_do_order.clone(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the restaurant API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    order_timeout_secs: u64,
}

impl UpstreamClient {
    pub fn new(settings: &UpstreamSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(UpstreamClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            timeout_secs: settings.timeout_secs,
            order_timeout_secs: settings.order_timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Menus of `store`. Empty when the upstream cannot be reached.
    pub async fn fetch_menus(&self, store_code: &str) -> Vec<Value> {
        self.fetch_catalogue(store_code, "menus").await
    }

    /// Menu categories of `store`. Empty when the upstream cannot be reached.
    pub async fn fetch_categories(&self, store_code: &str) -> Vec<Value> {
        self.fetch_catalogue(store_code, "categories").await
    }

    async fn fetch_catalogue(&self, store_code: &str, resource: &str) -> Vec<Value> {
        let url = format!("{}/stores/{}/{}", self.base_url, store_code, resource);
        debug!(url = %url, "Fetching catalogue");

        let result = async {
            let response = self.request(Method::GET, &url).send().await;
            let body = self.read_json(response, self.timeout_secs).await?;
            Ok::<_, GatewayError>(extract_list(body))
        }
        .await;

        match result {
            Ok(list) => {
                debug!(store = %store_code, resource, count = list.len(), "Catalogue loaded");
                list
            }
            Err(e) => {
                warn!(store = %store_code, resource, error = %e, "Catalogue unavailable, returning empty list");
                Vec::new()
            }
        }
    }

    /// Submits an order and returns the upstream order code.
    pub async fn submit_order(&self, submission: &OrderSubmission) -> GatewayResult<String> {
        let url = format!("{}/stores/{}/orders", self.base_url, submission.store_code);
        info!(
            store = %submission.store_code,
            payment_order_id = %submission.payment_order_id,
            total = %submission.payload.grand_total,
            "Submitting order"
        );

        let response = self
            .request(Method::POST, &url)
            .timeout(Duration::from_secs(self.order_timeout_secs))
            .json(submission)
            .send()
            .await;
        let body = self.read_json(response, self.order_timeout_secs).await?;

        let code = extract_order_code(&body).ok_or(GatewayError::MissingOrderCode)?;
        info!(order_code = %code, "Order accepted by upstream");
        Ok(code)
    }

    /// The upstream's copy of an order.
    pub async fn fetch_order(&self, store_code: &str, order_code: &str) -> GatewayResult<Value> {
        let url = format!("{}/stores/{}/orders/{}", self.base_url, store_code, order_code);
        debug!(url = %url, "Fetching order");

        let response = self.request(Method::GET, &url).send().await;
        self.read_json(response, self.timeout_secs).await
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn read_json(
        &self,
        response: Result<Response, reqwest::Error>,
        timeout_secs: u64,
    ) -> GatewayResult<Value> {
        let response = response.map_err(|e| GatewayError::from_send(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        response.json::<Value>().await.map_err(GatewayError::from)
    }
}

// =============================================================================
// Response Shapes
// =============================================================================

/// Finds the list in a response: a bare array, or an array under one of
/// the usual wrapper keys (searched recursively).
pub fn extract_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            for key in LIST_KEYS {
                if let Some(inner) = obj.remove(*key) {
                    let list = extract_list(inner);
                    if !list.is_empty() {
                        return list;
                    }
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Order code from a submission response, looking inside `data` too.
pub fn extract_order_code(value: &Value) -> Option<String> {
    let obj = value.as_object()?;

    for key in ORDER_CODE_KEYS {
        match obj.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }

    obj.get("data").and_then(extract_order_code)
}

/// Numeric status code of an order echo, looking inside `data` too.
pub fn order_status_code(value: &Value) -> Option<i64> {
    let obj = value.as_object()?;

    ORDER_STATUS_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(parse_number)
        .map(|n| n as i64)
        .or_else(|| obj.get("data").and_then(order_status_code))
}

/// Fulfilment progress of an order echo, if it carries a status code.
pub fn order_progress(value: &Value) -> Option<OrderProgress> {
    order_status_code(value).map(OrderProgress::from_code)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
