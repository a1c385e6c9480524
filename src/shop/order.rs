//! Order placement.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::persist::KeyValueStore;
use crate::promise::{promise, PromiseFuture};

use super::{cart_state, CartAction, CartLine, ShopStore};

/// Operation name under which checkouts are tracked in the promise branch.
pub const NEW_ORDER: &str = "newOrder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub lines: Vec<CartLine>,
    pub total: f64,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Cannot place an order for an empty cart")]
    EmptyCart,

    #[error("Order history under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode order history: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Append-only order history kept under one key of a [`KeyValueStore`].
#[derive(Clone)]
pub struct OrderLedger {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl OrderLedger {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// All orders placed so far, oldest first.
    pub fn history(&self) -> Result<Vec<Order>, OrderError> {
        match self.storage.get(&self.key) {
            None => Ok(Vec::new()),
            Some(blob) => serde_json::from_str(&blob).map_err(|source| OrderError::Corrupt {
                key: self.key.clone(),
                source,
            }),
        }
    }

    /// Place an order for `lines`.
    pub fn submit(
        &self,
        lines: Vec<CartLine>,
    ) -> impl Future<Output = Result<Order, OrderError>> + Send + 'static {
        let ledger = self.clone();
        async move { ledger.place(lines) }
    }

    fn place(&self, lines: Vec<CartLine>) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let total = lines.iter().map(CartLine::subtotal).sum();
        let order = Order {
            id: Uuid::new_v4(),
            lines,
            total,
        };

        let mut history = self.history()?;
        history.push(order.clone());
        let blob = serde_json::to_string(&history).map_err(OrderError::Encode)?;
        self.storage.set(&self.key, blob);
        Ok(order)
    }
}

/// Submit the current cart to `ledger`, tracked as [`NEW_ORDER`].
///
/// The cart is cleared only once the order is placed. A rejected order
/// leaves the cart untouched and resolves to `None`.
pub fn checkout(ledger: OrderLedger) -> impl FnOnce(&ShopStore) -> PromiseFuture<Order> {
    move |store: &ShopStore| -> PromiseFuture<Order> {
        let lines: Vec<CartLine> = cart_state(&store.get_state()).lines().cloned().collect();
        let placed = store.dispatch_thunk(promise(NEW_ORDER, ledger.submit(lines)));
        let store = store.clone();
        Box::pin(async move {
            let order = placed.await?;
            store.dispatch(CartAction::Clear.into());
            Some(order)
        })
    }
}
