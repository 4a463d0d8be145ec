//! # Payment Session Repository
//!
//! Holds the checkout snapshot: written once when the customer confirms,
//! updated with the upstream order code after submission, read by the
//! payment and order-status screens.

use meja_core::PaymentSession;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::kv::{read_json, write_json, SharedStore, PAYMENT_SESSION_KEY};

/// Repository for the payment session record.
#[derive(Clone)]
pub struct PaymentSessionRepository {
    store: SharedStore,
}

impl PaymentSessionRepository {
    pub fn new(store: SharedStore) -> Self {
        PaymentSessionRepository { store }
    }

    pub async fn get(&self) -> DbResult<Option<PaymentSession>> {
        read_json(self.store.as_ref(), PAYMENT_SESSION_KEY).await
    }

    /// Stores the snapshot, replacing any previous one.
    pub async fn save(&self, session: &PaymentSession) -> DbResult<()> {
        info!(
            order_id = %session.order_id,
            total = %session.payment_total,
            items = session.cart_raw.len(),
            "Saving payment session"
        );
        write_json(self.store.as_ref(), PAYMENT_SESSION_KEY, session).await
    }

    /// Records the upstream order code. Returns the updated snapshot, or
    /// `None` when there is no snapshot to update.
    pub async fn set_order_code(&self, order_code: &str) -> DbResult<Option<PaymentSession>> {
        let Some(mut session) = self.get().await? else {
            return Ok(None);
        };

        debug!(order_id = %session.order_id, order_code = %order_code, "Recording order code");
        session.order_code = Some(order_code.to_string());
        self.save(&session).await?;
        Ok(Some(session))
    }

    pub async fn clear(&self) -> DbResult<()> {
        self.store.remove(PAYMENT_SESSION_KEY).await
    }
}
