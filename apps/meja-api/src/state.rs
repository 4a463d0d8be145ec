//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use meja_db::{CartStore, PaymentSessionRepository, SessionRepository, SharedStore};
use meja_gateway::{
    GatewayResult, MejaConfig, PaymentClient, PaymentPoller, QrTokenVerifier, UpstreamClient,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub type SharedState = Arc<AppState>;

/// Everything the handlers need.
///
/// The cart sits behind a mutex so that one mutation (or checkout) runs at
/// a time.
pub struct AppState {
    pub config: MejaConfig,
    pub cart: Mutex<CartStore>,
    pub sessions: SessionRepository,
    pub payment_sessions: PaymentSessionRepository,
    pub upstream: UpstreamClient,
    pub payments: Arc<PaymentClient>,
    pub poller: PaymentPoller,
    /// `None` when no QR secret is configured.
    pub qr: Option<QrTokenVerifier>,
}

impl AppState {
    /// Builds the state on top of `store`, loading the persisted cart.
    pub async fn new(config: MejaConfig, store: SharedStore) -> GatewayResult<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let payments = Arc::new(PaymentClient::new(&config.payment)?);
        let poller = PaymentPoller::new(
            payments.clone(),
            Duration::from_secs(config.payment.poll_interval_secs),
        );

        let qr = if config.qr.secret.is_empty() {
            warn!("QR verification disabled: no secret configured");
            None
        } else {
            Some(QrTokenVerifier::new(&config.qr.secret)?)
        };

        let cart = CartStore::load(store.clone()).await;
        info!(cart_items = cart.len(), upstream = %upstream.base_url(), "Application state ready");

        Ok(AppState {
            config,
            cart: Mutex::new(cart),
            sessions: SessionRepository::new(store.clone()),
            payment_sessions: PaymentSessionRepository::new(store),
            upstream,
            payments,
            poller,
            qr,
        })
    }
}
