//! # Payment Poller
//!
//! Watches one order id at a time and publishes its payment status.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  start("A")  ──► task A: tick, check, publish, tick, ...                │
//! │                                                                         │
//! │  start("B")  ──► abort task A (its receivers see the channel close)     │
//! │              ──► task B                                                 │
//! │                                                                         │
//! │  task stops on its own when the status becomes terminal                 │
//! │  cancel()    ──► abort the current task                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failed checks are published with `last_error` set and polling goes on;
//! only a terminal status or cancellation ends a watch.

use chrono::{DateTime, Utc};
use meja_core::PaymentStatus;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::payment::StatusSource;

/// Latest known state of the watched order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollUpdate {
    pub order_id: String,
    pub status: PaymentStatus,
    /// Number of completed checks, failed ones included.
    pub attempts: u32,
    pub checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl PollUpdate {
    fn initial(order_id: &str) -> Self {
        PollUpdate {
            order_id: order_id.to_string(),
            status: PaymentStatus::Pending,
            attempts: 0,
            checked_at: None,
            last_error: None,
        }
    }
}

struct ActiveWatch {
    order_id: String,
    receiver: watch::Receiver<PollUpdate>,
    task: JoinHandle<()>,
}

/// Single-watch status poller.
pub struct PaymentPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
    active: Mutex<Option<ActiveWatch>>,
}

impl PaymentPoller {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        PaymentPoller {
            source,
            interval,
            active: Mutex::new(None),
        }
    }

    /// Starts watching `order_id`, replacing any current watch.
    pub fn start(&self, order_id: &str) -> watch::Receiver<PollUpdate> {
        let mut active = self.lock();
        if let Some(previous) = active.take() {
            debug!(order_id = %previous.order_id, "Stopping previous payment watch");
            previous.task.abort();
        }

        let (tx, rx) = watch::channel(PollUpdate::initial(order_id));
        let task = tokio::spawn(poll_loop(
            self.source.clone(),
            self.interval,
            order_id.to_string(),
            tx,
        ));

        info!(order_id = %order_id, interval_secs = self.interval.as_secs(), "Payment watch started");
        *active = Some(ActiveWatch {
            order_id: order_id.to_string(),
            receiver: rx.clone(),
            task,
        });
        rx
    }

    /// Stops the current watch, if any.
    pub fn cancel(&self) {
        if let Some(current) = self.lock().take() {
            info!(order_id = %current.order_id, "Payment watch cancelled");
            current.task.abort();
        }
    }

    /// Receiver for `order_id` when it is the watched order.
    pub fn subscribe(&self, order_id: &str) -> Option<watch::Receiver<PollUpdate>> {
        self.lock()
            .as_ref()
            .filter(|current| current.order_id == order_id)
            .map(|current| current.receiver.clone())
    }

    /// Last published update for `order_id` when it is the watched order.
    pub fn latest(&self, order_id: &str) -> Option<PollUpdate> {
        let rx = self.subscribe(order_id)?;
        let update = rx.borrow().clone();
        Some(update)
    }

    /// Order id currently watched, finished watches included.
    pub fn watched_order(&self) -> Option<String> {
        self.lock().as_ref().map(|current| current.order_id.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveWatch>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for PaymentPoller {
    fn drop(&mut self) {
        if let Some(current) = self.lock().take() {
            current.task.abort();
        }
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    period: Duration,
    order_id: String,
    tx: watch::Sender<PollUpdate>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let result = source.payment_status(&order_id).await;
        let mut update = tx.borrow().clone();
        update.attempts += 1;
        update.checked_at = Some(Utc::now());

        match result {
            Ok(status) => {
                debug!(order_id = %order_id, ?status, attempt = update.attempts, "Payment status checked");
                update.status = status;
                update.last_error = None;
            }
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Payment status check failed");
                update.last_error = Some(e.to_string());
            }
        }

        let terminal = update.status.is_terminal();
        tx.send_replace(update);

        if terminal {
            info!(order_id = %order_id, "Payment reached a final state, watch finished");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, GatewayResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays scripted answers, then keeps answering Pending.
    struct Scripted {
        answers: Mutex<VecDeque<GatewayResult<PaymentStatus>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(answers: Vec<GatewayResult<PaymentStatus>>) -> Arc<Self> {
            Arc::new(Scripted {
                answers: Mutex::new(answers.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        async fn payment_status(&self, _order_id: &str) -> GatewayResult<PaymentStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(PaymentStatus::Pending))
        }
    }

    const PERIOD: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_terminal_status() {
        let source = Scripted::new(vec![
            Ok(PaymentStatus::Pending),
            Err(GatewayError::Timeout(15)),
            Ok(PaymentStatus::Paid),
        ]);
        let poller = PaymentPoller::new(source.clone(), PERIOD);

        let mut rx = poller.start("MEJA-1");
        let update = rx.wait_for(|u| u.status.is_terminal()).await.unwrap().clone();
        assert_eq!(update.status, PaymentStatus::Paid);
        assert_eq!(update.attempts, 3);
        assert_eq!(update.last_error, None);

        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(poller.latest("MEJA-1").unwrap().status, PaymentStatus::Paid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_check_is_published() {
        let source = Scripted::new(vec![Err(GatewayError::ConnectionFailed("refused".into()))]);
        let poller = PaymentPoller::new(source, PERIOD);

        let mut rx = poller.start("MEJA-1");
        let update = rx.wait_for(|u| u.attempts == 1).await.unwrap().clone();
        assert_eq!(update.status, PaymentStatus::Pending);
        assert!(update.last_error.unwrap().contains("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_watch_replaces_previous() {
        let first = Scripted::new(vec![]);
        let poller = PaymentPoller::new(first.clone(), PERIOD);

        let mut old = poller.start("MEJA-1");
        old.wait_for(|u| u.attempts == 1).await.unwrap();

        let _new = poller.start("MEJA-2");
        assert!(old.changed().await.is_err());
        assert!(poller.subscribe("MEJA-1").is_none());
        assert_eq!(poller.watched_order().as_deref(), Some("MEJA-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let source = Scripted::new(vec![]);
        let poller = PaymentPoller::new(source.clone(), PERIOD);

        let mut rx = poller.start("MEJA-1");
        rx.wait_for(|u| u.attempts == 2).await.unwrap();

        poller.cancel();
        let calls = source.calls();
        tokio::time::sleep(PERIOD * 5).await;

        assert_eq!(source.calls(), calls);
        assert!(poller.watched_order().is_none());
    }
}
