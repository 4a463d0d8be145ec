//! # User Session Repository
//!
//! Stores who is ordering: the store and table from the scanned QR code
//! and the order type.

use meja_core::UserSession;
use tracing::debug;

use crate::error::DbResult;
use crate::kv::{read_json, write_json, SharedStore, USER_KEY};

/// Repository for the user session record.
#[derive(Clone)]
pub struct SessionRepository {
    store: SharedStore,
}

impl SessionRepository {
    pub fn new(store: SharedStore) -> Self {
        SessionRepository { store }
    }

    /// Current session, `None` before the QR code is scanned.
    pub async fn get(&self) -> DbResult<Option<UserSession>> {
        read_json(self.store.as_ref(), USER_KEY).await
    }

    /// Replaces the session.
    pub async fn save(&self, session: &UserSession) -> DbResult<()> {
        debug!(
            store = %session.store_location,
            table = %session.table_number,
            "Saving user session"
        );
        write_json(self.store.as_ref(), USER_KEY, session).await
    }

    pub async fn clear(&self) -> DbResult<()> {
        self.store.remove(USER_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KeyValueStore, MemoryStore};
    use meja_core::OrderType;

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = SessionRepository::new(MemoryStore::shared());
        assert_eq!(repo.get().await.unwrap(), None);

        let session = UserSession::dine_in("JKT-01", "7");
        repo.save(&session).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), Some(session));

        repo.clear().await.unwrap();
        assert_eq!(repo.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_wire_shape() {
        let store = MemoryStore::shared();
        store
            .set(
                USER_KEY,
                r#"{"storeLocation":"BDG-02","orderType":"TA","tableNumber":"3"}"#,
            )
            .await
            .unwrap();

        let session = SessionRepository::new(store).get().await.unwrap().unwrap();
        assert_eq!(session.store_location, "BDG-02");
        assert_eq!(session.order_type, OrderType::TakeAway);
    }
}
