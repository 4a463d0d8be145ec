//! # Cart Store
//!
//! Ordered, durable list of line items. The only component that mutates
//! the cart.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append / replace_at / remove_at / clear                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build the next list from the in-memory copy                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write the whole list under "cart"                                      │
//! │       │                                                                 │
//! │       ├── ok     → next list becomes the in-memory copy                 │
//! │       │                                                                 │
//! │       └── error  → warn!, in-memory copy unchanged                      │
//! │                                                                         │
//! │  Every call returns the current list. Nothing here returns an error.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge Rule
//! `append` merges into an existing entry with the same signature (code,
//! condiments, note) by adding quantities. `replace_at` never merges: an
//! edit that happens to match another entry's configuration stays a
//! separate entry with exactly the edited quantity.

use meja_core::boundary::parse_order_lines;
use meja_core::LineItem;
use serde_json::Value;
use tracing::{debug, warn};

use crate::kv::{SharedStore, CART_KEY};

/// The customer's cart.
pub struct CartStore {
    store: SharedStore,
    items: Vec<LineItem>,
}

impl CartStore {
    /// Loads the persisted cart. Unreadable storage gives an empty cart.
    pub async fn load(store: SharedStore) -> Self {
        let items = read_items(&store).await.unwrap_or_default();
        debug!(items = items.len(), "Cart loaded");
        CartStore { store, items }
    }

    /// Current items in insertion order.
    pub fn list(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-reads the persisted cart, keeping the in-memory copy if storage
    /// cannot be read.
    pub async fn refresh(&mut self) -> &[LineItem] {
        if let Some(items) = read_items(&self.store).await {
            self.items = items;
        }
        &self.items
    }

    /// Adds `item`, merging with an entry of the same signature.
    pub async fn append(&mut self, item: LineItem) -> &[LineItem] {
        let signature = item.signature();
        let mut next = self.items.clone();

        match next.iter_mut().find(|existing| existing.signature() == signature) {
            Some(existing) => {
                let merged = existing.quantity().saturating_add(item.quantity());
                debug!(code = %item.code(), quantity = merged, "Merging into existing cart entry");
                existing.set_quantity(merged);
            }
            None => {
                debug!(code = %item.code(), quantity = item.quantity(), "Appending cart entry");
                next.push(item);
            }
        }

        self.commit(next).await
    }

    /// Replaces the entry at `index`. Out-of-range indexes are ignored.
    pub async fn replace_at(&mut self, index: usize, item: LineItem) -> &[LineItem] {
        if index >= self.items.len() {
            warn!(index, len = self.items.len(), "replace_at: index out of range");
            return &self.items;
        }

        debug!(index, code = %item.code(), "Replacing cart entry");
        let mut next = self.items.clone();
        next[index] = item;
        self.commit(next).await
    }

    /// Removes the entry at `index`. Out-of-range indexes are ignored.
    pub async fn remove_at(&mut self, index: usize) -> &[LineItem] {
        if index >= self.items.len() {
            warn!(index, len = self.items.len(), "remove_at: index out of range");
            return &self.items;
        }

        debug!(index, "Removing cart entry");
        let mut next = self.items.clone();
        next.remove(index);
        self.commit(next).await
    }

    /// Empties the cart.
    pub async fn clear(&mut self) -> &[LineItem] {
        debug!("Clearing cart");
        match self.store.remove(CART_KEY).await {
            Ok(()) => self.items.clear(),
            Err(e) => warn!(error = %e, "Failed to clear cart, keeping last state"),
        }
        &self.items
    }

    async fn commit(&mut self, next: Vec<LineItem>) -> &[LineItem] {
        let written = match serde_json::to_string(&next) {
            Ok(raw) => self.store.set(CART_KEY, &raw).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(()) => self.items = next,
            Err(error) => warn!(%error, "Failed to persist cart, keeping last state"),
        }
        &self.items
    }
}

/// `None` when storage failed; malformed content yields what could be read.
async fn read_items(store: &SharedStore) -> Option<Vec<LineItem>> {
    let raw = match store.get(CART_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Some(Vec::new()),
        Err(e) => {
            warn!(error = %e, "Failed to read cart");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => Some(parse_order_lines(&value)),
        Err(e) => {
            warn!(error = %e, "Stored cart is not valid JSON, starting empty");
            Some(Vec::new())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
